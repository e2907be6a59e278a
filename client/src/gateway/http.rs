//! HTTP implementation of the remote gateway, on `reqwest`.

use super::{
    Assignment, GatewayFuture, GatewayResult, RemoteError, RemoteGateway, StatusChange,
    StatusVerb, Unassignment,
};
use crate::config::ApiConfig;
use crate::model::{NewTicket, Ticket, TicketId, User, UserId};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// Ticket service client over HTTP
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for the service rooted at `base_url` (e.g. `http://host/api`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a gateway reusing an existing `reqwest` client
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Create a gateway from configuration
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Transport`] if the HTTP client cannot be built
    /// (for example when TLS initialisation fails).
    pub fn from_config(config: &ApiConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RemoteError::transport(e.to_string()))?;

        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Base URL every path is appended to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{path}", self.base_url))
    }

    fn fetch<T>(&self, method: Method, path: String) -> GatewayFuture<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = self.request(method.clone(), &path);
        Box::pin(async move {
            let response = dispatch(request, &method, &path).await?;
            decode(response).await
        })
    }

    /// Issue a request whose success body carries nothing we need
    fn command<T>(&self, method: Method, path: String, confirmation: T) -> GatewayFuture<T>
    where
        T: Send + 'static,
    {
        let request = self.request(method.clone(), &path);
        Box::pin(async move {
            dispatch(request, &method, &path).await?;
            Ok(confirmation)
        })
    }
}

/// Send the request and turn transport failures and non-2xx statuses into errors
async fn dispatch(request: RequestBuilder, method: &Method, path: &str) -> GatewayResult<Response> {
    tracing::debug!(%method, path, "Calling ticket service");

    let response = request.send().await.map_err(|e| {
        tracing::warn!(%method, path, error = %e, "Ticket service unreachable");
        RemoteError::transport(e.to_string())
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%method, path, status = status.as_u16(), body = %body, "Ticket service rejected request");

    Err(RemoteError::Rejected {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::Decode {
            message: e.to_string(),
        })
}

impl RemoteGateway for HttpGateway {
    fn list_tickets(&self) -> GatewayFuture<Vec<Ticket>> {
        self.fetch(Method::GET, "/tickets".to_string())
    }

    fn create_ticket(&self, description: String) -> GatewayFuture<Ticket> {
        let path = "/tickets".to_string();
        let request = self
            .request(Method::POST, &path)
            .json(&NewTicket { description });

        Box::pin(async move {
            let response = dispatch(request, &Method::POST, &path).await?;
            decode(response).await
        })
    }

    fn get_ticket(&self, id: TicketId) -> GatewayFuture<Ticket> {
        self.fetch(Method::GET, format!("/tickets/{id}"))
    }

    fn assign_ticket(&self, ticket_id: TicketId, user_id: UserId) -> GatewayFuture<Assignment> {
        self.command(
            Method::PUT,
            format!("/tickets/{ticket_id}/assign/{user_id}"),
            Assignment { ticket_id, user_id },
        )
    }

    fn unassign_ticket(&self, ticket_id: TicketId) -> GatewayFuture<Unassignment> {
        self.command(
            Method::PUT,
            format!("/tickets/{ticket_id}/unassign"),
            Unassignment { ticket_id },
        )
    }

    fn set_ticket_status(&self, id: TicketId, completed: bool) -> GatewayFuture<StatusChange> {
        let method = match StatusVerb::for_completed(completed) {
            StatusVerb::Complete => Method::PUT,
            StatusVerb::Incomplete => Method::DELETE,
        };

        self.command(
            method,
            format!("/tickets/{id}/complete"),
            StatusChange { id, completed },
        )
    }

    fn list_users(&self) -> GatewayFuture<Vec<User>> {
        self.fetch(Method::GET, "/users".to_string())
    }

    fn get_user(&self, id: UserId) -> GatewayFuture<User> {
        self.fetch(Method::GET, format!("/users/{id}"))
    }
}
