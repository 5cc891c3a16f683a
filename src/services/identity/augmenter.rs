//! Appends claims fetched from the supplementary claim stores.
//!
//! The append is all-or-nothing: every lookup is awaited into a local buffer
//! first, and the identity is only touched after the last one succeeded.

use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::services::claim_store::{ClaimStoreError, SupplementaryClaimStore};
use crate::services::identity::claims::{Claim, ClaimsIdentity};
use crate::services::identity::error::{IdentityError, IdentityResult};
use crate::services::identity::reader;

#[derive(Clone)]
pub struct LocalClaimAugmenter {
    stores: Vec<Arc<dyn SupplementaryClaimStore>>,
    lookup_timeout: Duration,
}

impl std::fmt::Debug for LocalClaimAugmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.stores.iter().map(|s| s.store_name()).collect();
        f.debug_struct("LocalClaimAugmenter")
            .field("stores", &names)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish()
    }
}

impl LocalClaimAugmenter {
    pub fn new(store: Arc<dyn SupplementaryClaimStore>, lookup_timeout: Duration) -> Self {
        Self::with_stores(vec![store], lookup_timeout)
    }

    /// Stores are queried in order; their claims are appended in the same order.
    pub fn with_stores(
        stores: Vec<Arc<dyn SupplementaryClaimStore>>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            stores,
            lookup_timeout,
        }
    }

    /// Augments a base identity in place and moves it to the enriched stage.
    ///
    /// - An identity that is already enriched is rejected before any lookup.
    /// - Without a resolvable lookup key the identity is enriched with nothing added.
    /// - On store failure or timeout the identity is left untouched.
    pub async fn augment(&self, identity: &mut ClaimsIdentity) -> IdentityResult<()> {
        if identity.is_enriched() {
            return Err(IdentityError::InvalidArgument(
                "identity has already been augmented",
            ));
        }

        let Some(key) = lookup_key(identity)? else {
            debug!("no user identifier on identity; skipping claim lookup");
            identity.append_enriched(Vec::new());
            return Ok(());
        };

        let mut fetched: Vec<Claim> = Vec::new();
        for store in &self.stores {
            let claims = self.fetch_one(store.as_ref(), &key).await?;
            debug!(
                store = store.store_name(),
                count = claims.len(),
                "fetched supplementary claims"
            );
            fetched.extend(claims);
        }

        // Claims carried by the ticket predate augmentation; an exact echo
        // from the store is not appended again.
        fetched.retain(|c| !identity.claims().contains(c));

        identity.append_enriched(fetched);
        Ok(())
    }

    async fn fetch_one(
        &self,
        store: &dyn SupplementaryClaimStore,
        lookup_key: &str,
    ) -> IdentityResult<Vec<Claim>> {
        match tokio::time::timeout(
            self.lookup_timeout,
            store.fetch_supplementary_claims(lookup_key),
        )
        .await
        {
            Ok(Ok(claims)) => Ok(claims),
            Ok(Err(err)) => {
                warn!(store = store.store_name(), error = %err, "claim store failure");
                Err(IdentityError::DependencyFailure(err))
            }
            Err(_) => {
                warn!(
                    store = store.store_name(),
                    timeout = ?self.lookup_timeout,
                    "claim store timed out"
                );
                Err(IdentityError::DependencyFailure(ClaimStoreError::Timeout))
            }
        }
    }
}

// The store is keyed by the user identifier; identities whose ticket only
// carried a principal name are looked up by that name instead.
fn lookup_key(identity: &ClaimsIdentity) -> IdentityResult<Option<String>> {
    if !identity.is_authenticated() {
        return Ok(None);
    }

    let key = match reader::get_user_identifier(identity)? {
        Some(id) => Some(id),
        None => reader::get_name(identity)?,
    };

    Ok(key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::services::identity::claims::claim_types;

    struct FakeStore {
        claims: Vec<Claim>,
        fail: bool,
        delay: Option<Duration>,
        calls: AtomicUsize,
        seen_keys: std::sync::Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn returning(claims: Vec<Claim>) -> Self {
            Self {
                claims,
                fail: false,
                delay: None,
                calls: AtomicUsize::new(0),
                seen_keys: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::returning(Vec::new())
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::returning(vec![Claim::new(claim_types::HOUSEHOLD_ROLE, "member")])
            }
        }
    }

    #[async_trait]
    impl SupplementaryClaimStore for FakeStore {
        fn store_name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_supplementary_claims(
            &self,
            user_identifier: &str,
        ) -> Result<Vec<Claim>, ClaimStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_keys
                .lock()
                .unwrap()
                .push(user_identifier.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(ClaimStoreError::Unavailable("connection refused".into()));
            }
            Ok(self.claims.clone())
        }
    }

    fn base(claims: Vec<Claim>) -> ClaimsIdentity {
        ClaimsIdentity::new("ticket", claims)
    }

    fn augmenter(store: Arc<FakeStore>) -> LocalClaimAugmenter {
        LocalClaimAugmenter::new(store, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn augmentation_is_additive() {
        let store = Arc::new(FakeStore::returning(vec![
            Claim::new(claim_types::HOUSEHOLD_ROLE, "member"),
            Claim::new(claim_types::HOUSEHOLD_ID, "7"),
        ]));
        let before = vec![
            Claim::new(claim_types::NAME, "alice"),
            Claim::new(claim_types::DISPLAY_NAME, "Alice"),
        ];
        let mut identity = base(before.clone());

        augmenter(store).augment(&mut identity).await.unwrap();

        assert!(identity.is_enriched());
        assert_eq!(&identity.claims()[..before.len()], before.as_slice());
        assert_eq!(identity.claims().len(), 4);
    }

    #[tokio::test]
    async fn exact_echo_of_existing_claim_is_not_appended() {
        let store = Arc::new(FakeStore::returning(vec![
            Claim::new(claim_types::NAME_IDENTIFIER, "u-1"),
            Claim::new(claim_types::EMAIL, "bob@x.com"),
            Claim::new(claim_types::EMAIL, "work@x.com"),
            Claim::new(claim_types::HOUSEHOLD_ROLE, "member"),
        ]));
        let mut identity = base(vec![
            Claim::new(claim_types::NAME, "bob"),
            Claim::new(claim_types::NAME_IDENTIFIER, "u-1"),
            Claim::new(claim_types::EMAIL, "bob@x.com"),
        ]);

        augmenter(store).augment(&mut identity).await.unwrap();

        assert_eq!(
            identity.claims(),
            &[
                Claim::new(claim_types::NAME, "bob"),
                Claim::new(claim_types::NAME_IDENTIFIER, "u-1"),
                Claim::new(claim_types::EMAIL, "bob@x.com"),
                Claim::new(claim_types::EMAIL, "work@x.com"),
                Claim::new(claim_types::HOUSEHOLD_ROLE, "member"),
            ]
        );
    }

    #[tokio::test]
    async fn same_type_and_value_with_other_value_type_is_kept() {
        let store = Arc::new(FakeStore::returning(vec![Claim::with_value_type(
            claim_types::NAME_IDENTIFIER,
            "42",
            "integer",
        )]));
        let mut identity = base(vec![
            Claim::new(claim_types::NAME, "bob"),
            Claim::new(claim_types::NAME_IDENTIFIER, "42"),
        ]);

        augmenter(store).augment(&mut identity).await.unwrap();

        assert_eq!(identity.claims().len(), 3);
    }

    #[tokio::test]
    async fn looks_up_by_identifier_before_name() {
        let store = Arc::new(FakeStore::returning(Vec::new()));
        let mut identity = base(vec![
            Claim::new(claim_types::NAME, "alice"),
            Claim::new(claim_types::NAME_IDENTIFIER, "u-1"),
        ]);

        augmenter(store.clone()).augment(&mut identity).await.unwrap();

        assert_eq!(*store.seen_keys.lock().unwrap(), vec!["u-1".to_string()]);
    }

    #[tokio::test]
    async fn unresolvable_identity_completes_without_lookup() {
        let store = Arc::new(FakeStore::returning(vec![Claim::new(
            claim_types::HOUSEHOLD_ROLE,
            "member",
        )]));
        let mut identity = base(vec![Claim::new(claim_types::EMAIL, "x@x.com")]);

        augmenter(store.clone()).augment(&mut identity).await.unwrap();

        assert!(identity.is_enriched());
        assert_eq!(identity.claims().len(), 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unauthenticated_identity_is_not_looked_up() {
        let store = Arc::new(FakeStore::returning(Vec::new()));
        let mut identity =
            ClaimsIdentity::unauthenticated(vec![Claim::new(claim_types::NAME, "guest")]);

        augmenter(store.clone()).augment(&mut identity).await.unwrap();

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_failure_leaves_identity_untouched() {
        let store = Arc::new(FakeStore::failing());
        let mut identity = base(vec![Claim::new(claim_types::NAME, "alice")]);
        let before = identity.clone();

        let err = augmenter(store).augment(&mut identity).await.unwrap_err();

        assert!(matches!(err, IdentityError::DependencyFailure(_)));
        assert_eq!(identity, before);
        assert!(!identity.is_enriched());
    }

    #[tokio::test]
    async fn later_store_failure_discards_earlier_results() {
        let ok: Arc<dyn SupplementaryClaimStore> = Arc::new(FakeStore::returning(vec![
            Claim::new(claim_types::HOUSEHOLD_ROLE, "member"),
        ]));
        let broken: Arc<dyn SupplementaryClaimStore> = Arc::new(FakeStore::failing());
        let augmenter =
            LocalClaimAugmenter::with_stores(vec![ok, broken], Duration::from_millis(200));
        let mut identity = base(vec![Claim::new(claim_types::NAME, "alice")]);

        assert!(augmenter.augment(&mut identity).await.is_err());
        assert_eq!(identity.claims().len(), 1);
    }

    #[tokio::test]
    async fn slow_store_times_out_as_dependency_failure() {
        let store = Arc::new(FakeStore::slow(Duration::from_millis(500)));
        let augmenter = LocalClaimAugmenter::new(store, Duration::from_millis(20));
        let mut identity = base(vec![Claim::new(claim_types::NAME, "alice")]);

        let err = augmenter.augment(&mut identity).await.unwrap_err();

        assert!(matches!(
            err,
            IdentityError::DependencyFailure(ClaimStoreError::Timeout)
        ));
        assert_eq!(identity.claims().len(), 1);
    }

    #[tokio::test]
    async fn second_augmentation_is_rejected() {
        let store = Arc::new(FakeStore::returning(vec![Claim::new(
            claim_types::HOUSEHOLD_ROLE,
            "member",
        )]));
        let augmenter = augmenter(store.clone());
        let mut identity = base(vec![Claim::new(claim_types::NAME, "alice")]);

        augmenter.augment(&mut identity).await.unwrap();
        let err = augmenter.augment(&mut identity).await.unwrap_err();

        assert!(matches!(err, IdentityError::InvalidArgument(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(identity.claims().len(), 2);
    }
}
