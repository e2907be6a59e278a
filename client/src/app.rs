//! Application bundle: both stores built over one shared gateway.

use crate::config::Config;
use crate::error::ClientError;
use crate::gateway::{GatewayResult, HttpGateway, SharedGateway};
use crate::model::{Ticket, User};
use crate::tickets::TicketStore;
use crate::users::UserStore;
use std::sync::Arc;
use std::time::Duration;
use ticketdesk_runtime::{StoreConfig, StoreError};

/// Outcome of the initial load
#[derive(Debug)]
pub struct InitialLoad {
    /// Ticket list fetch
    pub tickets: Result<Vec<Ticket>, ClientError>,
    /// User list fetch
    pub users: Result<Vec<User>, ClientError>,
}

impl InitialLoad {
    /// Whether both fetches succeeded
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.tickets.is_ok() && self.users.is_ok()
    }
}

/// The stores handed to the view layer
///
/// Built explicitly and passed around; there is no global instance.
#[derive(Clone)]
pub struct TicketDesk {
    /// Tickets and the selected ticket
    pub tickets: TicketStore,
    /// Users
    pub users: UserStore,
    shutdown_timeout: Duration,
}

impl TicketDesk {
    /// Builds both stores over `gateway`
    #[must_use]
    pub fn new(gateway: SharedGateway) -> Self {
        Self::with_store_config(gateway, StoreConfig::default())
    }

    /// Builds both stores with custom runtime configuration
    #[must_use]
    pub fn with_store_config(gateway: SharedGateway, config: StoreConfig) -> Self {
        Self {
            tickets: TicketStore::with_config(Arc::clone(&gateway), config.clone()),
            users: UserStore::with_config(gateway, config.clone()),
            shutdown_timeout: config.default_shutdown_timeout,
        }
    }

    /// Builds both stores over an HTTP gateway described by `config`
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> GatewayResult<Self> {
        let gateway = HttpGateway::from_config(&config.api)?;
        tracing::info!(base_url = gateway.base_url(), "Using ticket service");
        Ok(Self::with_store_config(
            Arc::new(gateway),
            config.store.store_config(),
        ))
    }

    /// Fetch the ticket list and the user list concurrently
    pub async fn load(&self) -> InitialLoad {
        let (tickets, users) = tokio::join!(self.tickets.fetch_all(), self.users.fetch_all());
        InitialLoad { tickets, users }
    }

    /// Return both stores to their initial state
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.tickets.reset().await?;
        self.users.reset().await
    }

    /// Shut both stores down, discarding results still in flight
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError::ShutdownTimeout`] encountered.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        let (tickets, users) = tokio::join!(
            self.tickets.shutdown(self.shutdown_timeout),
            self.users.shutdown(self.shutdown_timeout)
        );
        tickets.and(users)
    }
}
