pub mod households;
pub mod me;
pub mod session;
