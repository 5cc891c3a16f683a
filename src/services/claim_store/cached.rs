use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::services::cache::{CacheClient, CacheError};
use crate::services::claim_store::store::{ClaimStoreError, SupplementaryClaimStore};
use crate::services::identity::claims::Claim;

/// Read-through cache in front of another claim store.
///
/// Cache failures are logged and fall through to the inner store.
/// Inner store failures are never masked.
#[derive(Clone)]
pub struct CachedClaimStore<C: CacheClient> {
    inner: Arc<dyn SupplementaryClaimStore>,
    cache: C,
    ttl: Duration,
    // Key prefix to avoid collisions across environments
    prefix: String,
}

impl<C: CacheClient> CachedClaimStore<C> {
    pub fn new(inner: Arc<dyn SupplementaryClaimStore>, cache: C, ttl: Duration) -> Self {
        Self::new_with_prefix(inner, cache, ttl, "claims:supplementary")
    }

    pub fn new_with_prefix(
        inner: Arc<dyn SupplementaryClaimStore>,
        cache: C,
        ttl: Duration,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            cache,
            ttl,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, user_identifier: &str) -> String {
        format!("{}:{}", self.prefix, user_identifier)
    }

    async fn read_cached(&self, key: &str) -> Option<Vec<Claim>> {
        let raw = match self.cache.get_string(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(backend = self.cache.backend_name(), error = %err, "claim cache read failed");
                return None;
            }
        };

        match serde_json::from_str::<Vec<Claim>>(&raw) {
            Ok(claims) => Some(claims),
            Err(err) => {
                let err = CacheError::InvalidValue(err.to_string());
                warn!(key = %key, error = %err, "discarding unreadable claim cache entry");
                None
            }
        }
    }

    async fn write_cached(&self, key: &str, claims: &[Claim]) {
        let raw = match serde_json::to_string(claims) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "claim cache serialization failed");
                return;
            }
        };

        if let Err(err) = self.cache.set_with_ttl(key, &raw, self.ttl).await {
            warn!(backend = self.cache.backend_name(), error = %err, "claim cache write failed");
        }
    }
}

#[async_trait]
impl<C: CacheClient> SupplementaryClaimStore for CachedClaimStore<C> {
    fn store_name(&self) -> &'static str {
        "cached"
    }

    async fn fetch_supplementary_claims(
        &self,
        user_identifier: &str,
    ) -> Result<Vec<Claim>, ClaimStoreError> {
        let key = self.key(user_identifier);

        if let Some(claims) = self.read_cached(&key).await {
            debug!(key = %key, "claim cache hit");
            return Ok(claims);
        }

        let claims = self.inner.fetch_supplementary_claims(user_identifier).await?;
        self.write_cached(&key, &claims).await;

        Ok(claims)
    }
}
