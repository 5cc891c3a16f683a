//! Per-request identity pipeline.
//!
//! ```text
//! Unauthenticated --assemble--> BasePrincipalAssembled --augment--> Enriched
//!        ^ (no ticket: stays here, nothing installed)
//! ```
//!
//! The pipeline is run exactly once per request by the identity middleware.
//! The security context it writes into is owned by that request only.

use std::sync::Arc;

use tracing::debug;

use crate::services::identity::assembler::PrincipalAssembler;
use crate::services::identity::augmenter::LocalClaimAugmenter;
use crate::services::identity::claims::{ClaimsIdentity, ClaimsPrincipal};
use crate::services::identity::error::{IdentityError, IdentityResult};
use crate::services::ticket::AuthenticationTicket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Unauthenticated,
    BasePrincipalAssembled,
    Enriched,
}

/// Request-scoped slot for the active principal.
///
/// Written at most once; holds either nothing (anonymous) or a fully
/// enriched principal.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    principal: Option<Arc<ClaimsPrincipal>>,
}

impl SecurityContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn principal(&self) -> Option<&ClaimsPrincipal> {
        self.principal.as_deref()
    }

    pub fn shared_principal(&self) -> Option<Arc<ClaimsPrincipal>> {
        self.principal.clone()
    }

    pub fn is_installed(&self) -> bool {
        self.principal.is_some()
    }

    /// Installs `identity` as the active principal.
    pub fn install(&mut self, identity: ClaimsIdentity) -> IdentityResult<()> {
        if self.principal.is_some() {
            return Err(IdentityError::InvalidArgument(
                "security context is already installed",
            ));
        }
        if !identity.is_enriched() {
            return Err(IdentityError::InvalidArgument(
                "only enriched identities can be installed",
            ));
        }

        self.principal = Some(Arc::new(ClaimsPrincipal::new(identity)));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdentityPipeline {
    assembler: PrincipalAssembler,
    augmenter: LocalClaimAugmenter,
}

impl RequestIdentityPipeline {
    pub fn new(assembler: PrincipalAssembler, augmenter: LocalClaimAugmenter) -> Self {
        Self {
            assembler,
            augmenter,
        }
    }

    /// Runs assemble → augment → install and returns the terminal state.
    ///
    /// On error nothing has been written to `ctx`.
    pub async fn run(
        &self,
        ticket: Option<&AuthenticationTicket>,
        ctx: &mut SecurityContext,
    ) -> IdentityResult<PipelineState> {
        let mut state = PipelineState::Unauthenticated;

        let Some(mut identity) = self.assembler.assemble(ticket)? else {
            debug!(?state, "no ticket; request proceeds as anonymous");
            return Ok(state);
        };
        state = PipelineState::BasePrincipalAssembled;
        debug!(?state, claims = identity.claims().len(), "base principal assembled");

        // Must finish before the principal is visible to anything downstream.
        self.augmenter.augment(&mut identity).await?;
        state = PipelineState::Enriched;

        ctx.install(identity)?;
        debug!(?state, "principal installed");

        Ok(state)
    }
}
