//! Remote gateway: one async entry point per operation of the ticket service.
//!
//! Every call either resolves with a decoded payload or fails with a
//! [`RemoteError`]. The stores only ever see this trait, so tests swap in
//! [`mock::MockGateway`] and production uses [`http::HttpGateway`].

pub mod http;
pub mod mock;

use crate::model::{Ticket, TicketId, User, UserId};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

pub use http::HttpGateway;
pub use mock::{Endpoint, GatewayCall, MockGateway};

/// Gateway result
pub type GatewayResult<T> = Result<T, RemoteError>;

/// Boxed future returned by every gateway call
pub type GatewayFuture<T> = Pin<Box<dyn Future<Output = GatewayResult<T>> + Send>>;

/// Gateway shared between the stores
pub type SharedGateway = Arc<dyn RemoteGateway>;

/// Failure of a remote call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request could not complete (connection refused, DNS, reset...)
    #[error("Could not reach ticket service: {message}")]
    Transport {
        /// Transport-level description
        message: String,
    },

    /// The service answered with a non-success status
    ///
    /// Displays as the response body verbatim.
    #[error("{}", rejected_message(.status, .body))]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body as sent by the service
        body: String,
    },

    /// The service answered 2xx but the payload could not be decoded
    #[error("Unexpected response from ticket service: {message}")]
    Decode {
        /// Decoder error
        message: String,
    },
}

fn rejected_message(status: &u16, body: &str) -> String {
    if body.trim().is_empty() {
        format!("Request failed with status {status}")
    } else {
        body.to_string()
    }
}

impl RemoteError {
    /// The message surfaced on a store's `error` field
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Convenience constructor for a rejected request
    #[must_use]
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }

    /// Convenience constructor for a transport failure
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// HTTP status, when the service answered
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}

/// Confirmation of `PUT /tickets/{id}/assign/{userId}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// Ticket that was assigned
    pub ticket_id: TicketId,
    /// New assignee
    pub user_id: UserId,
}

/// Confirmation of `PUT /tickets/{id}/unassign`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unassignment {
    /// Ticket that lost its assignee
    pub ticket_id: TicketId,
}

/// Confirmation of a completion change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// Ticket whose status changed
    pub id: TicketId,
    /// New completion state
    pub completed: bool,
}

/// The service models completion as a sub-resource that is created or deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusVerb {
    /// `PUT /tickets/{id}/complete`
    Complete,
    /// `DELETE /tickets/{id}/complete`
    Incomplete,
}

impl StatusVerb {
    /// Verb that moves a ticket to the requested completion state
    #[must_use]
    pub const fn for_completed(completed: bool) -> Self {
        if completed { Self::Complete } else { Self::Incomplete }
    }

    /// Completion state this verb produces
    #[must_use]
    pub const fn completed(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Remote gateway trait
///
/// One entry point per operation of the ticket service.
pub trait RemoteGateway: Send + Sync {
    /// `GET /tickets`
    fn list_tickets(&self) -> GatewayFuture<Vec<Ticket>>;

    /// `POST /tickets` with `{description}`; the server assigns the id
    fn create_ticket(&self, description: String) -> GatewayFuture<Ticket>;

    /// `GET /tickets/{id}`
    fn get_ticket(&self, id: TicketId) -> GatewayFuture<Ticket>;

    /// `PUT /tickets/{id}/assign/{userId}`
    fn assign_ticket(&self, ticket_id: TicketId, user_id: UserId) -> GatewayFuture<Assignment>;

    /// `PUT /tickets/{id}/unassign`
    fn unassign_ticket(&self, ticket_id: TicketId) -> GatewayFuture<Unassignment>;

    /// `PUT` (complete) or `DELETE` (incomplete) `/tickets/{id}/complete`
    fn set_ticket_status(&self, id: TicketId, completed: bool) -> GatewayFuture<StatusChange>;

    /// `GET /users`
    fn list_users(&self) -> GatewayFuture<Vec<User>>;

    /// `GET /users/{id}`
    fn get_user(&self, id: UserId) -> GatewayFuture<User>;
}
