//! Entity model for tickets and users.
//!
//! Plain data shapes mirroring the JSON exchanged with the ticket service.
//! Ids are assigned by the server and never invented locally.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Server-assigned ticket identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(u64);

impl TicketId {
    /// Wraps a raw id received from the server
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Server-assigned user identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wraps a raw id received from the server
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A work item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique within the held collection, immutable once created
    pub id: TicketId,
    /// Free-text description
    pub description: String,
    /// Whether the ticket has been completed
    #[serde(default)]
    pub completed: bool,
    /// Responsible user; `None` means unassigned
    #[serde(default)]
    pub assignee_id: Option<UserId>,
}

impl Ticket {
    /// Creates an unassigned, incomplete ticket
    #[must_use]
    pub fn new(id: TicketId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            completed: false,
            assignee_id: None,
        }
    }

    /// Sets the assignee
    #[must_use]
    pub const fn assigned_to(mut self, user: UserId) -> Self {
        self.assignee_id = Some(user);
        self
    }

    /// Sets the completion flag
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// A user that tickets can be assigned to. Read-only on the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user id
    pub id: UserId,
    /// Display name
    pub name: String,
}

impl User {
    /// Creates a user
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Request body for `POST /tickets`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    /// Description of the ticket to create
    pub description: String,
}
