use thiserror::Error;

use crate::services::claim_store::ClaimStoreError;

/// Errors raised by the identity pipeline.
///
/// A missing claim or a missing ticket is not an error; readers and the
/// assembler report absence as `Ok(None)`.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Programmer error or malformed input at a call site. Never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The supplementary claim store failed while augmenting.
    /// Callers must fail closed.
    #[error("claim store failure: {0}")]
    DependencyFailure(#[from] ClaimStoreError),
}

pub type IdentityResult<T> = Result<T, IdentityError>;
