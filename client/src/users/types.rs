//! User store state and actions.

use crate::error::OperationError;
use crate::model::{User, UserId};
use crate::request::RequestId;

/// Locally held copy of the users
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserState {
    /// Users in server response order
    pub users: Vec<User>,
    /// The user list is being fetched
    pub loading: bool,
    /// Message of the most recent failed operation
    pub error: Option<String>,
}

impl UserState {
    /// Empty, idle state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Held user with the given id
    #[must_use]
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }
}

/// Operation kinds of the user store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserOperation {
    /// Fetch the user list
    FetchAll,
    /// Look one user up
    GetById,
}

impl std::fmt::Display for UserOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::FetchAll => "fetch users",
            Self::GetById => "get user",
        })
    }
}

/// Actions for the user store
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserAction {
    // Commands
    /// Fetch all users
    FetchUsers {
        /// Invocation id
        request: RequestId,
    },

    /// Look a user up without storing it
    GetUserById {
        /// Invocation id
        request: RequestId,
        /// User to look up
        id: UserId,
    },

    /// Clear the error message
    DismissError,

    /// Return to the empty, idle state
    Reset,

    // Events
    /// The user list was fetched
    UsersLoaded {
        /// Invocation id
        request: RequestId,
        /// Users in server order
        users: Vec<User>,
    },

    /// A lookup found its user
    UserFound {
        /// Invocation id
        request: RequestId,
        /// The user as returned by the service
        user: User,
    },

    /// An operation failed
    OperationFailed {
        /// Invocation id
        request: RequestId,
        /// Which operation failed
        operation: UserOperation,
        /// Why
        error: OperationError,
    },
}

impl UserAction {
    /// Whether this action ends the operation started by `request`
    #[must_use]
    pub fn resolves(&self, request: RequestId) -> bool {
        match self {
            Self::UsersLoaded { request: r, .. }
            | Self::UserFound { request: r, .. }
            | Self::OperationFailed { request: r, .. } => *r == request,
            Self::FetchUsers { .. }
            | Self::GetUserById { .. }
            | Self::DismissError
            | Self::Reset => false,
        }
    }
}
