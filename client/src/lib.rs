//! # Ticketdesk Client
//!
//! Client-side state for the shared ticket board.
//!
//! The crate owns the local copy of server-authored tickets and users, runs
//! fetch and mutate operations against the REST service, tracks which kinds
//! of operation are in flight, merges successful results, and records
//! failures without touching previously known-good data.
//!
//! - [`model`]: tickets and users as exchanged with the service
//! - [`gateway`]: one async entry point per REST operation
//! - [`tickets`]: the ticket store
//! - [`users`]: the user store
//! - [`board`]: view-model helpers (labels, filters, rows)
//! - [`app`]: both stores bundled for a view layer
//!
//! ## Example
//!
//! ```ignore
//! use ticketdesk_client::{config::Config, TicketDesk};
//!
//! let desk = TicketDesk::from_config(&Config::from_env())?;
//! desk.load().await;
//! desk.tickets.set_ticket_status(TicketId::new(1), true).await?;
//! assert!(!desk.tickets.snapshot().await.status_updating);
//! ```

pub mod app;
pub mod board;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod request;
pub mod tickets;
pub mod users;

pub use app::{InitialLoad, TicketDesk};
pub use error::{ClientError, OperationError};
pub use gateway::{HttpGateway, MockGateway, RemoteError, RemoteGateway};
pub use model::{Ticket, TicketId, User, UserId};
pub use tickets::{TicketState, TicketStore};
pub use users::{UserState, UserStore};
