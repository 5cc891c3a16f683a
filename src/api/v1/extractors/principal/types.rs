use std::sync::Arc;

use crate::services::identity::ClaimsPrincipal;

/// The enriched principal of an authenticated request.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Arc<ClaimsPrincipal>);

/// Same, but anonymous requests yield `None` instead of a rejection.
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<Arc<ClaimsPrincipal>>);
