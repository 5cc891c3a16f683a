pub mod assembler;
pub mod augmenter;
pub mod claims;
pub mod error;
pub mod pipeline;
pub mod reader;

pub use assembler::PrincipalAssembler;
pub use augmenter::LocalClaimAugmenter;
pub use claims::{Claim, ClaimsIdentity, ClaimsPrincipal, ClaimsSource, IdentityStage, claim_types};
pub use error::{IdentityError, IdentityResult};
pub use pipeline::{PipelineState, RequestIdentityPipeline, SecurityContext};
