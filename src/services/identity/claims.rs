/*
 * Responsibility
 * - Claim / ClaimsIdentity / ClaimsPrincipal の型定義
 * - claim の並び順 (insertion order) を保持する。reader は先頭一致で値を選ぶ
 * - identity の stage は Base -> Enriched の一方向のみ
 */
use serde::{Deserialize, Serialize};

/// Well-known claim type keys.
pub mod claim_types {
    pub const NAME: &str = "name";
    pub const NAME_IDENTIFIER: &str = "name-identifier";
    pub const EMAIL: &str = "email";
    pub const DISPLAY_NAME: &str = "display-name";
    pub const HOUSEHOLD_ID: &str = "household-id";
    pub const HOUSEHOLD_ROLE: &str = "household-role";
}

/// Claim value type labels.
pub mod claim_value_types {
    pub const STRING: &str = "string";
}

fn default_value_type() -> String {
    claim_value_types::STRING.to_string()
}

/// A typed fact about a principal. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    claim_type: String,
    value: String,
    #[serde(default = "default_value_type")]
    value_type: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_value_type(claim_type, value, claim_value_types::STRING)
    }

    pub fn with_value_type(
        claim_type: impl Into<String>,
        value: impl Into<String>,
        value_type: impl Into<String>,
    ) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            value_type: value_type.into(),
        }
    }

    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn value_type(&self) -> &str {
        &self.value_type
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStage {
    /// Built from the ticket, not yet augmented.
    Base,
    /// Augmentation finished; the claim list is frozen.
    Enriched,
}

/// Ordered claim collection for one principal within one request.
///
/// Claims can only be appended, and only by the augmenter (see `append_enriched`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsIdentity {
    claims: Vec<Claim>,
    is_authenticated: bool,
    authentication_type: String,
    stage: IdentityStage,
}

impl ClaimsIdentity {
    pub fn new(authentication_type: impl Into<String>, claims: Vec<Claim>) -> Self {
        Self {
            claims,
            is_authenticated: true,
            authentication_type: authentication_type.into(),
            stage: IdentityStage::Base,
        }
    }

    /// An identity carrying claims but no authenticated subject.
    pub fn unauthenticated(claims: Vec<Claim>) -> Self {
        Self {
            claims,
            is_authenticated: false,
            authentication_type: String::new(),
            stage: IdentityStage::Base,
        }
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn authentication_type(&self) -> &str {
        &self.authentication_type
    }

    pub fn stage(&self) -> IdentityStage {
        self.stage
    }

    pub fn is_enriched(&self) -> bool {
        self.stage == IdentityStage::Enriched
    }

    /// Appends `fetched` in one step and freezes the identity.
    ///
    /// Existing claims are never touched.
    pub(crate) fn append_enriched(&mut self, fetched: Vec<Claim>) {
        debug_assert_eq!(self.stage, IdentityStage::Base);
        self.claims.extend(fetched);
        self.stage = IdentityStage::Enriched;
    }
}

/// The active security subject of a request. Exactly one identity is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsPrincipal {
    identities: Vec<ClaimsIdentity>,
}

impl ClaimsPrincipal {
    pub fn new(identity: ClaimsIdentity) -> Self {
        Self {
            identities: vec![identity],
        }
    }

    /// A principal with nothing attached. Readers reject it with `InvalidArgument`.
    pub fn empty() -> Self {
        Self {
            identities: Vec::new(),
        }
    }

    pub fn identity(&self) -> Option<&ClaimsIdentity> {
        self.identities.first()
    }

    pub fn identities(&self) -> &[ClaimsIdentity] {
        &self.identities
    }
}

/// Anything a `ClaimsIdentity` can be read from.
pub trait ClaimsSource {
    fn claims_identity(&self) -> Option<&ClaimsIdentity>;
}

impl ClaimsSource for ClaimsIdentity {
    fn claims_identity(&self) -> Option<&ClaimsIdentity> {
        Some(self)
    }
}

impl ClaimsSource for ClaimsPrincipal {
    fn claims_identity(&self) -> Option<&ClaimsIdentity> {
        self.identity()
    }
}

impl<T: ClaimsSource> ClaimsSource for Option<T> {
    fn claims_identity(&self) -> Option<&ClaimsIdentity> {
        self.as_ref().and_then(|inner| inner.claims_identity())
    }
}

impl<T: ClaimsSource + ?Sized> ClaimsSource for &T {
    fn claims_identity(&self) -> Option<&ClaimsIdentity> {
        (**self).claims_identity()
    }
}
