//! Typed, fail-safe accessors over a claim collection.
//!
//! "Not found" is the common case here: every accessor returns `Ok(None)`
//! when no claim of the requested type exists. Only a missing identity or an
//! empty claim-type key is rejected.

use crate::services::identity::claims::{ClaimsIdentity, ClaimsSource, claim_types};
use crate::services::identity::error::{IdentityError, IdentityResult};

/// Value of the first claim (by insertion order) whose type equals `claim_type`.
pub fn get_first<'a>(
    identity: &'a ClaimsIdentity,
    claim_type: &str,
) -> IdentityResult<Option<&'a str>> {
    if claim_type.is_empty() {
        return Err(IdentityError::InvalidArgument("claim type must not be empty"));
    }

    Ok(identity
        .claims()
        .iter()
        .find(|c| c.claim_type() == claim_type)
        .map(|c| c.value()))
}

fn resolve<S: ClaimsSource + ?Sized>(source: &S) -> IdentityResult<&ClaimsIdentity> {
    source
        .claims_identity()
        .ok_or(IdentityError::InvalidArgument("no claims identity to inspect"))
}

/// Same as [`get_first`], but accepts any wrapper (principal, optional identity).
pub fn get_first_from<'a, S: ClaimsSource + ?Sized>(
    source: &'a S,
    claim_type: &str,
) -> IdentityResult<Option<&'a str>> {
    get_first(resolve(source)?, claim_type)
}

pub fn get_user_identifier<S: ClaimsSource + ?Sized>(source: &S) -> IdentityResult<Option<&str>> {
    get_first_from(source, claim_types::NAME_IDENTIFIER)
}

pub fn get_mail_address<S: ClaimsSource + ?Sized>(source: &S) -> IdentityResult<Option<&str>> {
    get_first_from(source, claim_types::EMAIL)
}

pub fn get_name<S: ClaimsSource + ?Sized>(source: &S) -> IdentityResult<Option<&str>> {
    get_first_from(source, claim_types::NAME)
}

pub fn get_display_name<S: ClaimsSource + ?Sized>(source: &S) -> IdentityResult<Option<&str>> {
    get_first_from(source, claim_types::DISPLAY_NAME)
}

pub fn get_household_id<S: ClaimsSource + ?Sized>(source: &S) -> IdentityResult<Option<&str>> {
    get_first_from(source, claim_types::HOUSEHOLD_ID)
}

pub fn get_household_role<S: ClaimsSource + ?Sized>(source: &S) -> IdentityResult<Option<&str>> {
    get_first_from(source, claim_types::HOUSEHOLD_ROLE)
}
