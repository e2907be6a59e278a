//! Ticket store: the tickets, the selected ticket, and per-concern busy flags.

pub mod reducer;
pub mod store;
pub mod types;

pub use reducer::{TicketEnvironment, TicketReducer};
pub use store::TicketStore;
pub use types::{BusyFlag, TicketAction, TicketOperation, TicketState};
