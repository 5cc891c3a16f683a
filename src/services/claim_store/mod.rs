pub mod cached;
pub mod postgres;
pub mod store;

pub use cached::CachedClaimStore;
pub use postgres::PgMembershipClaimStore;
pub use store::{ClaimStoreError, SupplementaryClaimStore};
