pub mod decoder;
pub mod types;

pub use decoder::{TicketClaims, TicketDecoder, TicketError};
pub use types::AuthenticationTicket;
