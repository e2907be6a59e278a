//! Ticket store state and actions.

use crate::error::OperationError;
use crate::gateway::{Assignment, StatusChange, Unassignment};
use crate::model::{Ticket, TicketId, User};
use crate::request::RequestId;

// ============================================================================
// State
// ============================================================================

/// Locally held copy of the tickets and the status of operations on them
///
/// The three busy flags are independent: fetching, assigning and status
/// changes are separate concerns that may be in flight at the same time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketState {
    /// Tickets in server response order
    pub tickets: Vec<Ticket>,
    /// Ticket shown in the details view
    pub selected_ticket: Option<Ticket>,
    /// A fetch or create is in flight
    pub loading: bool,
    /// An assign or unassign is in flight
    pub assigning: bool,
    /// A status change is in flight
    pub status_updating: bool,
    /// Message of the most recent failed operation
    pub error: Option<String>,
}

impl TicketState {
    /// Empty, idle state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Held ticket with the given id
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|ticket| ticket.id == id)
    }

    /// Whether any operation is in flight
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.loading || self.assigning || self.status_updating
    }

    pub(crate) fn set_busy(&mut self, flag: BusyFlag, busy: bool) {
        match flag {
            BusyFlag::Loading => self.loading = busy,
            BusyFlag::Assigning => self.assigning = busy,
            BusyFlag::StatusUpdating => self.status_updating = busy,
        }
    }

    /// Apply `patch` to the selected ticket (if its id matches) and to the
    /// held ticket with that id. Slots without a match are left alone.
    pub(crate) fn patch_ticket(&mut self, id: TicketId, patch: impl Fn(&mut Ticket)) {
        if let Some(selected) = self.selected_ticket.as_mut().filter(|t| t.id == id) {
            patch(selected);
        }
        if let Some(held) = self.tickets.iter_mut().find(|t| t.id == id) {
            patch(held);
        }
    }
}

/// Busy flag of the ticket store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusyFlag {
    /// `loading`
    Loading,
    /// `assigning`
    Assigning,
    /// `status_updating`
    StatusUpdating,
}

/// Operation kinds of the ticket store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketOperation {
    /// Fetch the ticket list
    FetchAll,
    /// Create a ticket
    Create,
    /// Fetch one ticket into the selection
    FetchOne,
    /// Assign a user
    Assign,
    /// Remove the assignee
    Unassign,
    /// Mark complete or incomplete
    SetStatus,
}

impl TicketOperation {
    /// Flag raised while this operation is in flight
    #[must_use]
    pub const fn busy_flag(self) -> BusyFlag {
        match self {
            Self::FetchAll | Self::Create | Self::FetchOne => BusyFlag::Loading,
            Self::Assign | Self::Unassign => BusyFlag::Assigning,
            Self::SetStatus => BusyFlag::StatusUpdating,
        }
    }
}

impl std::fmt::Display for TicketOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FetchAll => "fetch tickets",
            Self::Create => "create ticket",
            Self::FetchOne => "fetch ticket",
            Self::Assign => "assign user",
            Self::Unassign => "unassign user",
            Self::SetStatus => "update status",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the ticket store
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TicketAction {
    // Commands
    /// Fetch all tickets
    FetchTickets {
        /// Invocation id
        request: RequestId,
    },

    /// Create a ticket with the given description
    CreateTicket {
        /// Invocation id
        request: RequestId,
        /// Description of the new ticket
        description: String,
    },

    /// Fetch one ticket into the selection
    FetchTicket {
        /// Invocation id
        request: RequestId,
        /// Ticket to fetch
        id: TicketId,
    },

    /// Assign a user given as free text, after checking the user exists
    AssignUser {
        /// Invocation id
        request: RequestId,
        /// Ticket to assign
        ticket_id: TicketId,
        /// User id as entered
        assignee: String,
    },

    /// Remove the assignee of a ticket
    UnassignUser {
        /// Invocation id
        request: RequestId,
        /// Ticket to unassign
        ticket_id: TicketId,
    },

    /// Mark a ticket complete or incomplete
    SetTicketStatus {
        /// Invocation id
        request: RequestId,
        /// Ticket to update
        id: TicketId,
        /// Requested completion state
        completed: bool,
    },

    /// Clear the error message
    DismissError,

    /// Return to the empty, idle state
    Reset,

    /// The assignee lookup succeeded; the assignment itself may be sent
    AssigneeVerified {
        /// Invocation id
        request: RequestId,
        /// Ticket to assign
        ticket_id: TicketId,
        /// Verified user
        user: User,
    },

    // Events
    /// The ticket list was fetched
    TicketsLoaded {
        /// Invocation id
        request: RequestId,
        /// Tickets in server order
        tickets: Vec<Ticket>,
    },

    /// A ticket was created
    TicketCreated {
        /// Invocation id
        request: RequestId,
        /// The ticket as returned by the server
        ticket: Ticket,
    },

    /// A single ticket was fetched
    TicketLoaded {
        /// Invocation id
        request: RequestId,
        /// The fetched ticket
        ticket: Ticket,
    },

    /// A user was assigned
    UserAssigned {
        /// Invocation id
        request: RequestId,
        /// Confirmed assignment
        assignment: Assignment,
    },

    /// An assignee was removed
    UserUnassigned {
        /// Invocation id
        request: RequestId,
        /// Confirmed unassignment
        unassignment: Unassignment,
    },

    /// A completion change was confirmed
    StatusUpdated {
        /// Invocation id
        request: RequestId,
        /// Confirmed change
        change: StatusChange,
    },

    /// An operation failed
    OperationFailed {
        /// Invocation id
        request: RequestId,
        /// Which operation failed
        operation: TicketOperation,
        /// Why
        error: OperationError,
    },
}

impl TicketAction {
    /// Invocation id carried by this action
    #[must_use]
    pub const fn request(&self) -> Option<RequestId> {
        match self {
            Self::FetchTickets { request }
            | Self::CreateTicket { request, .. }
            | Self::FetchTicket { request, .. }
            | Self::AssignUser { request, .. }
            | Self::UnassignUser { request, .. }
            | Self::SetTicketStatus { request, .. }
            | Self::AssigneeVerified { request, .. }
            | Self::TicketsLoaded { request, .. }
            | Self::TicketCreated { request, .. }
            | Self::TicketLoaded { request, .. }
            | Self::UserAssigned { request, .. }
            | Self::UserUnassigned { request, .. }
            | Self::StatusUpdated { request, .. }
            | Self::OperationFailed { request, .. } => Some(*request),
            Self::DismissError | Self::Reset => None,
        }
    }

    /// Whether this action ends an operation (merge or failure)
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TicketsLoaded { .. }
                | Self::TicketCreated { .. }
                | Self::TicketLoaded { .. }
                | Self::UserAssigned { .. }
                | Self::UserUnassigned { .. }
                | Self::StatusUpdated { .. }
                | Self::OperationFailed { .. }
        )
    }

    /// Whether this action ends the operation started by `request`
    #[must_use]
    pub fn resolves(&self, request: RequestId) -> bool {
        self.is_terminal() && self.request() == Some(request)
    }
}
