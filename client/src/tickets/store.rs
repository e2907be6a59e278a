//! Ticket store facade: explicit async methods over the reducer runtime.

use super::reducer::{TicketEnvironment, TicketReducer};
use super::types::{TicketAction, TicketState};
use crate::error::ClientError;
use crate::gateway::{Assignment, SharedGateway, StatusChange, Unassignment};
use crate::model::{Ticket, TicketId};
use crate::request::{RequestId, RequestIds};
use std::sync::Arc;
use std::time::Duration;
use ticketdesk_runtime::{Store, StoreConfig, StoreError};

type TicketRuntime = Store<TicketState, TicketAction, TicketEnvironment, TicketReducer>;

/// Owns the local copy of the tickets
///
/// Each method runs one operation to completion: it raises the busy flag,
/// waits for the gateway call, and returns once the outcome has been merged
/// into state. Clones share the same state.
#[derive(Clone)]
pub struct TicketStore {
    store: TicketRuntime,
    requests: Arc<RequestIds>,
}

impl TicketStore {
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
                TicketState::new(),
                TicketReducer::new(),
                TicketEnvironment::new(gateway),
                config,
            ),
            requests: Arc::new(RequestIds::new()),
        }
    }

    /// Send a command and wait for the action that ends it
    async fn run(
        &self,
        command: impl FnOnce(RequestId) -> TicketAction,
    ) -> Result<TicketAction, ClientError> {
        let request = self.requests.allocate();
        let outcome = self
            .store
            .send_and_wait_for(command(request), move |action| action.resolves(request))
            .await?;

        match outcome {
            TicketAction::OperationFailed { error, .. } => Err(error.into()),
            outcome => Ok(outcome),
        }
    }

    /// Replace the held tickets with the service's list
    ///
    /// # Errors
    ///
    /// Returns the operation failure (also recorded on `error`), or a store
    /// error if the store is shut down.
    pub async fn fetch_all(&self) -> Result<Vec<Ticket>, ClientError> {
        match self.run(|request| TicketAction::FetchTickets { request }).await? {
            TicketAction::TicketsLoaded { tickets, .. } => Ok(tickets),
            other => Err(ClientError::unexpected(&other)),
        }
    }

    /// Create a ticket and append it to the held tickets
    ///
    /// # Errors
    ///
    /// Fails with a validation error, without contacting the service, when
    /// the description is blank.
    pub async fn create(&self, description: impl Into<String>) -> Result<Ticket, ClientError> {
        let description = description.into();
        match self
            .run(|request| TicketAction::CreateTicket {
                request,
                description,
            })
            .await?
        {
            TicketAction::TicketCreated { ticket, .. } => Ok(ticket),
            other => Err(ClientError::unexpected(&other)),
        }
    }

    /// Fetch one ticket into the selection
    ///
    /// # Errors
    ///
    /// Returns the operation failure; the previous selection is kept.
    pub async fn fetch_one(&self, id: TicketId) -> Result<Ticket, ClientError> {
        match self.run(|request| TicketAction::FetchTicket { request, id }).await? {
            TicketAction::TicketLoaded { ticket, .. } => Ok(ticket),
            other => Err(ClientError::unexpected(&other)),
        }
    }

    /// Assign the user whose id was entered as `assignee`
    ///
    /// The user is looked up first; the assignment is only sent when the
    /// service knows that user.
    ///
    /// # Errors
    ///
    /// Fails with a validation error when `assignee` is not an id or the
    /// lookup fails, and with the remote error when the assignment is rejected.
    pub async fn assign_user(
        &self,
        ticket_id: TicketId,
        assignee: &str,
    ) -> Result<Assignment, ClientError> {
        let assignee = assignee.to_string();
        match self
            .run(|request| TicketAction::AssignUser {
                request,
                ticket_id,
                assignee,
            })
            .await?
        {
            TicketAction::UserAssigned { assignment, .. } => Ok(assignment),
            other => Err(ClientError::unexpected(&other)),
        }
    }

    /// Remove the assignee of a ticket
    ///
    /// # Errors
    ///
    /// Returns the operation failure.
    pub async fn unassign(&self, ticket_id: TicketId) -> Result<Unassignment, ClientError> {
        match self
            .run(|request| TicketAction::UnassignUser { request, ticket_id })
            .await?
        {
            TicketAction::UserUnassigned { unassignment, .. } => Ok(unassignment),
            other => Err(ClientError::unexpected(&other)),
        }
    }

    /// Mark a ticket complete (`true`) or incomplete (`false`)
    ///
    /// # Errors
    ///
    /// Returns the operation failure.
    pub async fn set_ticket_status(
        &self,
        id: TicketId,
        completed: bool,
    ) -> Result<StatusChange, ClientError> {
        match self
            .run(|request| TicketAction::SetTicketStatus {
                request,
                id,
                completed,
            })
            .await?
        {
            TicketAction::StatusUpdated { change, .. } => Ok(change),
            other => Err(ClientError::unexpected(&other)),
        }
    }

    /// Clear the error message; a no-op when there is none
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn dismiss_error(&self) -> Result<(), StoreError> {
        self.store.send(TicketAction::DismissError).await
    }

    /// Return to the empty, idle state
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store.send(TicketAction::Reset).await
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> TicketState {
        self.store.state(Clone::clone).await
    }

    /// Read current state via a closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&TicketState) -> T,
    {
        self.store.state(f).await
    }

    /// Subscribe to resolved actions, e.g. to re-render on every merge
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TicketAction> {
        self.store.subscribe_actions()
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
