//! User store facade.

use super::reducer::{UserEnvironment, UserReducer};
use super::types::{UserAction, UserState};
use crate::error::ClientError;
use crate::gateway::SharedGateway;
use crate::model::{User, UserId};
use crate::request::{RequestId, RequestIds};
use std::sync::Arc;
use std::time::Duration;
use ticketdesk_runtime::{Store, StoreConfig, StoreError};

type UserRuntime = Store<UserState, UserAction, UserEnvironment, UserReducer>;

/// Owns the local copy of the users. Read-only: users are never mutated.
#[derive(Clone)]
pub struct UserStore {
    store: UserRuntime,
    requests: Arc<RequestIds>,
}

impl UserStore {
    /// Creates an empty, idle store
    #[must_use]
    pub fn new(gateway: SharedGateway) -> Self {
        Self::with_config(gateway, StoreConfig::default())
    }

    /// Creates an empty, idle store with custom runtime configuration
    #[must_use]
    pub fn with_config(gateway: SharedGateway, config: StoreConfig) -> Self {
        Self {
            store: Store::with_config(
                UserState::new(),
                UserReducer::new(),
                UserEnvironment::new(gateway),
                config,
            ),
            requests: Arc::new(RequestIds::new()),
        }
    }

    async fn run(
        &self,
        command: impl FnOnce(RequestId) -> UserAction,
    ) -> Result<UserAction, ClientError> {
        let request = self.requests.allocate();
        let outcome = self
            .store
            .send_and_wait_for(command(request), move |action| action.resolves(request))
            .await?;

        match outcome {
            UserAction::OperationFailed { error, .. } => Err(error.into()),
            outcome => Ok(outcome),
        }
    }

    /// Replace the held users with the service's list
    ///
    /// # Errors
    ///
    /// Returns the operation failure; `users` is left as it was.
    pub async fn fetch_all(&self) -> Result<Vec<User>, ClientError> {
        match self.run(|request| UserAction::FetchUsers { request }).await? {
            UserAction::UsersLoaded { users, .. } => Ok(users),
            other => Err(ClientError::unexpected(&other)),
        }
    }

    /// Look a user up; the result is returned, not stored
    ///
    /// # Errors
    ///
    /// Returns the operation failure, also recorded on `error`.
    pub async fn get_by_id(&self, id: UserId) -> Result<User, ClientError> {
        match self.run(|request| UserAction::GetUserById { request, id }).await? {
            UserAction::UserFound { user, .. } => Ok(user),
            other => Err(ClientError::unexpected(&other)),
        }
    }

    /// Clear the error message; a no-op when there is none
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn dismiss_error(&self) -> Result<(), StoreError> {
        self.store.send(UserAction::DismissError).await
    }

    /// Return to the empty, idle state
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store.send(UserAction::Reset).await
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> UserState {
        self.store.state(Clone::clone).await
    }

    /// Read current state via a closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&UserState) -> T,
    {
        self.store.state(f).await
    }

    /// Stop accepting operations; results still in flight are discarded
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if gateway calls are still
    /// running when `timeout` expires.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }
}
