use chrono::{DateTime, Utc};

use crate::services::identity::claims::Claim;

/// Authentication ticket handed over by the transport layer, once per request.
///
/// Only the decoder builds these; everything downstream treats them as read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationTicket {
    pub principal_name: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub authentication_type: String,
    /// Claims serialized into the ticket when it was issued.
    pub claims: Vec<Claim>,
}

impl AuthenticationTicket {
    pub fn new(principal_name: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            principal_name: Some(principal_name.into()),
            expires_at,
            authentication_type: DEFAULT_AUTHENTICATION_TYPE.to_string(),
            claims: Vec::new(),
        }
    }

    pub fn with_claims(mut self, claims: Vec<Claim>) -> Self {
        self.claims = claims;
        self
    }
}

pub const DEFAULT_AUTHENTICATION_TYPE: &str = "cookies";
