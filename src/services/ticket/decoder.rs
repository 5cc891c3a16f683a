use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::identity::claims::Claim;
use crate::services::ticket::types::{AuthenticationTicket, DEFAULT_AUTHENTICATION_TYPE};

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("ticket verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("empty '{0}' claim")]
    EmptyClaim(&'static str),
    #[error("ticket expiry out of range")]
    InvalidExpiry,
}

/// Wire shape of a signed ticket.
///
/// NOTE:
/// - `sub` is optional on the wire; a ticket without it is rejected later by
///   the principal assembler, not here.
/// - `claims` are the claims serialized into the ticket at sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketClaims {
    pub iss: String,
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub amr: Option<String>,
    #[serde(default)]
    pub claims: Vec<Claim>,
}

/// HS256 ticket verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TicketDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TicketDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TicketDecoder {
    pub fn new(signing_secret: &str, issuer: &str, leeway_seconds: u64) -> Self {
        let decoding_key = DecodingKey::from_secret(signing_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.leeway = leeway_seconds;
        // Tickets are not audience-bound.
        validation.validate_aud = false;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Verify signature, issuer and expiry, then convert into an `AuthenticationTicket`.
    pub fn decode(&self, raw: &str) -> Result<AuthenticationTicket, TicketError> {
        let data = jsonwebtoken::decode::<TicketClaims>(raw, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        if claims.iss.trim().is_empty() {
            return Err(TicketError::EmptyClaim("iss"));
        }

        let exp = i64::try_from(claims.exp).map_err(|_| TicketError::InvalidExpiry)?;
        let expires_at: DateTime<Utc> =
            DateTime::from_timestamp(exp, 0).ok_or(TicketError::InvalidExpiry)?;

        Ok(AuthenticationTicket {
            principal_name: claims.sub,
            expires_at,
            authentication_type: claims
                .amr
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_AUTHENTICATION_TYPE.to_string()),
            claims: claims.claims,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};

    use crate::services::identity::claims::claim_types;

    const SECRET: &str = "test-ticket-secret";
    const ISSUER: &str = "household-web";

    fn sign(claims: &TicketClaims, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(sub: Option<&str>, exp_offset: i64) -> TicketClaims {
        let now = Utc::now().timestamp();
        TicketClaims {
            iss: ISSUER.to_string(),
            sub: sub.map(str::to_string),
            exp: (now + exp_offset) as u64,
            iat: Some(now as u64),
            amr: None,
            claims: vec![Claim::new(claim_types::EMAIL, "old@x.com")],
        }
    }

    #[test]
    fn decodes_valid_ticket() {
        let decoder = TicketDecoder::new(SECRET, ISSUER, 0);
        let raw = sign(&claims(Some("alice"), 600), SECRET);

        let ticket = decoder.decode(&raw).unwrap();

        assert_eq!(ticket.principal_name.as_deref(), Some("alice"));
        assert_eq!(ticket.authentication_type, DEFAULT_AUTHENTICATION_TYPE);
        assert_eq!(ticket.claims, vec![Claim::new(claim_types::EMAIL, "old@x.com")]);
        assert!(ticket.expires_at > Utc::now());
    }

    #[test]
    fn ticket_without_subject_still_decodes() {
        let decoder = TicketDecoder::new(SECRET, ISSUER, 0);
        let raw = sign(&claims(None, 600), SECRET);

        assert_eq!(decoder.decode(&raw).unwrap().principal_name, None);
    }

    #[test]
    fn rejects_wrong_signature() {
        let decoder = TicketDecoder::new(SECRET, ISSUER, 0);
        let raw = sign(&claims(Some("alice"), 600), "another-secret");

        assert!(matches!(decoder.decode(&raw), Err(TicketError::Jwt(_))));
    }

    #[test]
    fn rejects_expired_ticket() {
        let decoder = TicketDecoder::new(SECRET, ISSUER, 0);
        let raw = sign(&claims(Some("alice"), -600), SECRET);

        assert!(decoder.decode(&raw).is_err());
    }

    #[test]
    fn rejects_foreign_issuer() {
        let decoder = TicketDecoder::new(SECRET, "someone-else", 0);
        let raw = sign(&claims(Some("alice"), 600), SECRET);

        assert!(decoder.decode(&raw).is_err());
    }
}
