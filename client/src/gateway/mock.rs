//! In-memory ticket service for development and testing.
//!
//! Behaves like the real service: ids are assigned sequentially on create,
//! mutations change the held tickets, and unknown ids are rejected with a
//! 404 whose body names the missing entity. Failures and latency can be
//! injected per endpoint, and every call is recorded.

use super::{
    Assignment, GatewayFuture, GatewayResult, RemoteError, RemoteGateway, SharedGateway,
    StatusChange, StatusVerb, Unassignment,
};
use crate::model::{Ticket, TicketId, User, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Gateway entry points, used to target failure and latency injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /tickets`
    ListTickets,
    /// `POST /tickets`
    CreateTicket,
    /// `GET /tickets/{id}`
    GetTicket,
    /// `PUT /tickets/{id}/assign/{userId}`
    AssignTicket,
    /// `PUT /tickets/{id}/unassign`
    UnassignTicket,
    /// `PUT|DELETE /tickets/{id}/complete`
    SetTicketStatus,
    /// `GET /users`
    ListUsers,
    /// `GET /users/{id}`
    GetUser,
}

/// A call received by the mock gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `GET /tickets`
    ListTickets,
    /// `POST /tickets`
    CreateTicket {
        /// Submitted description
        description: String,
    },
    /// `GET /tickets/{id}`
    GetTicket(TicketId),
    /// `PUT /tickets/{id}/assign/{userId}`
    AssignTicket {
        /// Target ticket
        ticket_id: TicketId,
        /// Requested assignee
        user_id: UserId,
    },
    /// `PUT /tickets/{id}/unassign`
    UnassignTicket(TicketId),
    /// `PUT|DELETE /tickets/{id}/complete`
    SetTicketStatus {
        /// Target ticket
        id: TicketId,
        /// Verb that was issued
        verb: StatusVerb,
    },
    /// `GET /users`
    ListUsers,
    /// `GET /users/{id}`
    GetUser(UserId),
}

impl GatewayCall {
    /// Endpoint this call hit
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::ListTickets => Endpoint::ListTickets,
            Self::CreateTicket { .. } => Endpoint::CreateTicket,
            Self::GetTicket(_) => Endpoint::GetTicket,
            Self::AssignTicket { .. } => Endpoint::AssignTicket,
            Self::UnassignTicket(_) => Endpoint::UnassignTicket,
            Self::SetTicketStatus { .. } => Endpoint::SetTicketStatus,
            Self::ListUsers => Endpoint::ListUsers,
            Self::GetUser(_) => Endpoint::GetUser,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    tickets: Vec<Ticket>,
    users: Vec<User>,
    next_ticket_id: u64,
    failures: HashMap<Endpoint, RemoteError>,
    latency: HashMap<Endpoint, Duration>,
    default_latency: Duration,
    calls: Vec<GatewayCall>,
}

impl MockState {
    fn ticket_mut(&mut self, id: TicketId) -> GatewayResult<&mut Ticket> {
        self.tickets
            .iter_mut()
            .find(|ticket| ticket.id == id)
            .ok_or_else(|| ticket_not_found(id))
    }

    fn user(&self, id: UserId) -> GatewayResult<&User> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .ok_or_else(|| user_not_found(id))
    }
}

fn ticket_not_found(id: TicketId) -> RemoteError {
    RemoteError::rejected(404, format!("Ticket {id} not found"))
}

fn user_not_found(id: UserId) -> RemoteError {
    RemoteError::rejected(404, format!("User {id} not found"))
}

/// In-memory gateway
///
/// Clones share the same backing data, so a test can keep one handle for
/// inspection while the stores own another.
#[derive(Clone, Debug, Default)]
pub struct MockGateway {
    inner: Arc<Mutex<MockState>>,
}

impl MockGateway {
    /// Creates an empty service with ids starting at 1
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an Arc-wrapped handle for the stores, sharing this gateway's data
    #[must_use]
    pub fn shared(&self) -> SharedGateway {
        Arc::new(self.clone())
    }

    /// Seeds the held tickets; new ids continue after the highest seeded id
    #[must_use]
    pub fn with_tickets(self, tickets: Vec<Ticket>) -> Self {
        {
            let mut state = self.lock();
            state.next_ticket_id = tickets.iter().map(|t| t.id.get()).max().unwrap_or(0);
            state.tickets = tickets;
        }
        self
    }

    /// Seeds the known users
    #[must_use]
    pub fn with_users(self, users: Vec<User>) -> Self {
        self.lock().users = users;
        self
    }

    /// Delays every call by `latency`
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().default_latency = latency;
        self
    }

    /// Delays calls to one endpoint by `latency`
    #[must_use]
    pub fn with_endpoint_latency(self, endpoint: Endpoint, latency: Duration) -> Self {
        self.lock().latency.insert(endpoint, latency);
        self
    }

    /// Makes every call to `endpoint` fail with `error` until cleared
    pub fn fail(&self, endpoint: Endpoint, error: RemoteError) {
        self.lock().failures.insert(endpoint, error);
    }

    /// Restores normal behavior of `endpoint`
    pub fn clear_failure(&self, endpoint: Endpoint) {
        self.lock().failures.remove(&endpoint);
    }

    /// Every call received so far, in arrival order
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    /// Number of calls received by `endpoint`
    #[must_use]
    pub fn calls_to(&self, endpoint: Endpoint) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.endpoint() == endpoint)
            .count()
    }

    /// Tickets as the service currently holds them
    #[must_use]
    pub fn tickets(&self) -> Vec<Ticket> {
        self.lock().tickets.clone()
    }

    /// Users as the service currently holds them
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call, wait out the configured latency, then answer
    fn respond<T, F>(&self, call: GatewayCall, handler: F) -> GatewayFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut MockState) -> GatewayResult<T> + Send + 'static,
    {
        let endpoint = call.endpoint();
        let latency = {
            let mut state = self.lock();
            tracing::debug!(?call, "Mock gateway received call");
            state.calls.push(call);
            state
                .latency
                .get(&endpoint)
                .copied()
                .unwrap_or(state.default_latency)
        };

        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }

            let mut state = inner.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(error) = state.failures.get(&endpoint) {
                return Err(error.clone());
            }
            handler(&mut state)
        })
    }
}

impl RemoteGateway for MockGateway {
    fn list_tickets(&self) -> GatewayFuture<Vec<Ticket>> {
        self.respond(GatewayCall::ListTickets, |state| Ok(state.tickets.clone()))
    }

    fn create_ticket(&self, description: String) -> GatewayFuture<Ticket> {
        let call = GatewayCall::CreateTicket {
            description: description.clone(),
        };
        self.respond(call, move |state| {
            state.next_ticket_id += 1;
            let ticket = Ticket::new(TicketId::new(state.next_ticket_id), description);
            state.tickets.push(ticket.clone());
            Ok(ticket)
        })
    }

    fn get_ticket(&self, id: TicketId) -> GatewayFuture<Ticket> {
        self.respond(GatewayCall::GetTicket(id), move |state| {
            state.ticket_mut(id).map(|ticket| ticket.clone())
        })
    }

    fn assign_ticket(&self, ticket_id: TicketId, user_id: UserId) -> GatewayFuture<Assignment> {
        let call = GatewayCall::AssignTicket { ticket_id, user_id };
        self.respond(call, move |state| {
            state.user(user_id)?;
            state.ticket_mut(ticket_id)?.assignee_id = Some(user_id);
            Ok(Assignment { ticket_id, user_id })
        })
    }

    fn unassign_ticket(&self, ticket_id: TicketId) -> GatewayFuture<Unassignment> {
        self.respond(GatewayCall::UnassignTicket(ticket_id), move |state| {
            state.ticket_mut(ticket_id)?.assignee_id = None;
            Ok(Unassignment { ticket_id })
        })
    }

    fn set_ticket_status(&self, id: TicketId, completed: bool) -> GatewayFuture<StatusChange> {
        let verb = StatusVerb::for_completed(completed);
        self.respond(GatewayCall::SetTicketStatus { id, verb }, move |state| {
            state.ticket_mut(id)?.completed = verb.completed();
            Ok(StatusChange { id, completed })
        })
    }

    fn list_users(&self) -> GatewayFuture<Vec<User>> {
        self.respond(GatewayCall::ListUsers, |state| Ok(state.users.clone()))
    }

    fn get_user(&self, id: UserId) -> GatewayFuture<User> {
        self.respond(GatewayCall::GetUser(id), move |state| {
            state.user(id).cloned()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn seeded() -> MockGateway {
        MockGateway::new()
            .with_tickets(vec![
                Ticket::new(TicketId::new(1), "Fix monitor arm").assigned_to(UserId::new(1)),
                Ticket::new(TicketId::new(2), "Move the desk"),
            ])
            .with_users(vec![User::new(UserId::new(1), "Alice")])
    }

    #[tokio::test]
    async fn create_assigns_next_id() {
        let gateway = seeded();

        let ticket = gateway.create_ticket("Order chairs".to_string()).await.unwrap();

        assert_eq!(ticket.id, TicketId::new(3));
        assert!(!ticket.completed);
        assert_eq!(ticket.assignee_id, None);
        assert_eq!(gateway.tickets().len(), 3);
    }

    #[tokio::test]
    async fn unknown_ids_are_rejected_with_404() {
        let gateway = seeded();

        let error = gateway.get_user(UserId::new(999)).await.unwrap_err();
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.message(), "User 999 not found");

        let error = gateway.get_ticket(TicketId::new(42)).await.unwrap_err();
        assert_eq!(error.message(), "Ticket 42 not found");
    }

    #[tokio::test]
    async fn mutations_change_held_tickets() {
        let gateway = seeded();

        gateway.unassign_ticket(TicketId::new(1)).await.unwrap();
        gateway.set_ticket_status(TicketId::new(2), true).await.unwrap();

        let tickets = gateway.tickets();
        assert_eq!(tickets[0].assignee_id, None);
        assert!(tickets[1].completed);
    }

    #[tokio::test]
    async fn injected_failures_apply_until_cleared() {
        let gateway = seeded();
        gateway.fail(Endpoint::ListTickets, RemoteError::rejected(500, "boom"));

        assert_eq!(
            gateway.list_tickets().await.unwrap_err(),
            RemoteError::rejected(500, "boom")
        );

        gateway.clear_failure(Endpoint::ListTickets);
        assert_eq!(gateway.list_tickets().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn calls_are_recorded_in_order() {
        let gateway = seeded();

        let _ = gateway.get_user(UserId::new(1)).await;
        let _ = gateway.set_ticket_status(TicketId::new(1), false).await;

        assert_eq!(
            gateway.calls(),
            vec![
                GatewayCall::GetUser(UserId::new(1)),
                GatewayCall::SetTicketStatus {
                    id: TicketId::new(1),
                    verb: StatusVerb::Incomplete,
                },
            ]
        );
        assert_eq!(gateway.calls_to(Endpoint::AssignTicket), 0);
    }
}
