use async_trait::async_trait;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::identity::claims::Claim;

/// Claim store failures. The augmenter maps every variant to a dependency
/// failure; the request then fails closed.
#[derive(Debug, Error)]
pub enum ClaimStoreError {
    #[error("membership lookup failed: {0}")]
    Repo(#[from] RepoError),

    #[error("claim store unavailable: {0}")]
    Unavailable(String),

    #[error("claim store timed out")]
    Timeout,
}

/// Source of supplementary claims (household membership, roles, profile).
///
/// Implementations are shared across requests and accessed read-only.
#[async_trait]
pub trait SupplementaryClaimStore: Send + Sync {
    // Returns the name used in logs.
    fn store_name(&self) -> &'static str;

    // Fetch every supplementary claim for `user_identifier`.
    //
    // Returns:
    // - Ok(vec![]) => user unknown to the store (not an error)
    // - Err(_)     => backend failure (caller must fail closed)
    async fn fetch_supplementary_claims(
        &self,
        user_identifier: &str,
    ) -> Result<Vec<Claim>, ClaimStoreError>;
}
