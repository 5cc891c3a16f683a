pub mod error;
pub mod membership_repo;
