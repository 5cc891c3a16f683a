//! ticket → base ClaimsIdentity
//!
//! 純粋な変換のみ (I/O なし、await なし)。

use crate::services::identity::claims::{Claim, ClaimsIdentity, claim_types};
use crate::services::identity::error::{IdentityError, IdentityResult};
use crate::services::ticket::AuthenticationTicket;

#[derive(Debug, Clone, Copy, Default)]
pub struct PrincipalAssembler;

impl PrincipalAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Builds the base identity for a ticket.
    ///
    /// - `None` means an anonymous request and yields `Ok(None)`.
    /// - A ticket without a usable principal name is `InvalidArgument`.
    pub fn assemble(
        &self,
        ticket: Option<&AuthenticationTicket>,
    ) -> IdentityResult<Option<ClaimsIdentity>> {
        let Some(ticket) = ticket else {
            return Ok(None);
        };

        let name = ticket
            .principal_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(IdentityError::InvalidArgument(
                "ticket does not carry a principal name",
            ))?;

        let name_claim = Claim::new(claim_types::NAME, name);

        let mut claims = Vec::with_capacity(ticket.claims.len() + 1);
        claims.push(name_claim.clone());
        claims.extend(ticket.claims.iter().filter(|c| **c != name_claim).cloned());

        Ok(Some(ClaimsIdentity::new(
            ticket.authentication_type.clone(),
            claims,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::services::identity::claims::IdentityStage;

    fn ticket(name: &str) -> AuthenticationTicket {
        AuthenticationTicket::new(name, Utc::now() + Duration::minutes(20))
    }

    #[test]
    fn no_ticket_yields_no_identity() {
        assert_eq!(PrincipalAssembler::new().assemble(None).unwrap(), None);
    }

    #[test]
    fn builds_name_claim_from_principal_name() {
        let identity = PrincipalAssembler::new()
            .assemble(Some(&ticket("alice")))
            .unwrap()
            .unwrap();

        assert_eq!(identity.claims(), &[Claim::new(claim_types::NAME, "alice")]);
        assert_eq!(identity.stage(), IdentityStage::Base);
        assert!(identity.is_authenticated());
    }

    #[test]
    fn carries_embedded_claims_after_name_without_duplicating_it() {
        let t = ticket("bob").with_claims(vec![
            Claim::new(claim_types::NAME, "bob"),
            Claim::new(claim_types::EMAIL, "old@x.com"),
            Claim::new(claim_types::NAME_IDENTIFIER, "u-9"),
        ]);

        let identity = PrincipalAssembler::new().assemble(Some(&t)).unwrap().unwrap();

        let types: Vec<&str> = identity.claims().iter().map(Claim::claim_type).collect();
        assert_eq!(types, vec!["name", "email", "name-identifier"]);
    }

    #[test]
    fn ticket_without_principal_name_is_invalid() {
        let mut t = ticket("x");
        t.principal_name = None;

        assert!(matches!(
            PrincipalAssembler::new().assemble(Some(&t)),
            Err(IdentityError::InvalidArgument(_))
        ));
    }

    #[test]
    fn blank_principal_name_is_invalid() {
        assert!(matches!(
            PrincipalAssembler::new().assemble(Some(&ticket("   "))),
            Err(IdentityError::InvalidArgument(_))
        ));
    }
}
