pub mod cache;
pub mod claim_store;
pub mod identity;
pub mod ticket;
