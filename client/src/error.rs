//! Error types for store operations

use crate::gateway::RemoteError;
use thiserror::Error;
use ticketdesk_runtime::StoreError;

/// Why an operation failed
///
/// Carried by the failure action and surfaced as a string on the store's
/// `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The remote call failed (transport, rejected, or undecodable)
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A client-side precondition failed before any mutation request was sent
    #[error("{0}")]
    Validation(String),
}

impl OperationError {
    /// Creates a validation failure
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Message recorded on the store
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether this failure was detected locally
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Error returned by the store facades
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The operation itself failed; the store's `error` field holds the same message
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// The store could not run the operation (shut down, observer lagged)
    #[error("Store unavailable: {0}")]
    Store(#[from] StoreError),

    /// The request resolved with an action of another operation
    #[error("Unexpected outcome: {0}")]
    UnexpectedOutcome(String),
}

impl ClientError {
    /// The operation failure, if that is what this is
    #[must_use]
    pub const fn operation(&self) -> Option<&OperationError> {
        match self {
            Self::Operation(error) => Some(error),
            Self::Store(_) | Self::UnexpectedOutcome(_) => None,
        }
    }

    pub(crate) fn unexpected(outcome: &impl std::fmt::Debug) -> Self {
        Self::UnexpectedOutcome(format!("{outcome:?}"))
    }
}
