//! Ticket store reducer.
//!
//! Every command runs the start phase (raise its busy flag, clear `error`)
//! and returns one effect calling the gateway. That effect resolves into
//! exactly one terminal action: the success merge or `OperationFailed`.
//! Assignment goes through an extra `AssigneeVerified` step so the assign
//! endpoint is only called for a user the service knows.

use super::types::{TicketAction, TicketOperation, TicketState};
use crate::error::OperationError;
use crate::gateway::{GatewayFuture, RemoteError, SharedGateway};
use crate::model::{TicketId, UserId};
use crate::request::RequestId;
use ticketdesk_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the ticket store
#[derive(Clone)]
pub struct TicketEnvironment {
    /// Remote ticket service
    pub gateway: SharedGateway,
}

impl TicketEnvironment {
    /// Creates a new `TicketEnvironment`
    #[must_use]
    pub fn new(gateway: SharedGateway) -> Self {
        Self { gateway }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the ticket store
#[derive(Clone, Debug, Default)]
pub struct TicketReducer;

impl TicketReducer {
    /// Creates a new `TicketReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn start(state: &mut TicketState, request: RequestId, operation: TicketOperation) {
        tracing::debug!(%request, %operation, "Ticket operation started");
        state.set_busy(operation.busy_flag(), true);
        state.error = None;
    }

    /// Await a gateway call and map its outcome to a terminal action
    fn call<T, F>(
        request: RequestId,
        operation: TicketOperation,
        call: GatewayFuture<T>,
        on_success: F,
    ) -> Effect<TicketAction>
    where
        T: Send + 'static,
        F: FnOnce(T) -> TicketAction + Send + 'static,
    {
        async_effect! {
            Some(match call.await {
                Ok(value) => on_success(value),
                Err(error) => TicketAction::OperationFailed {
                    request,
                    operation,
                    error: error.into(),
                },
            })
        }
    }

    /// Resolve an operation as failed without calling the gateway
    fn reject(
        request: RequestId,
        operation: TicketOperation,
        error: OperationError,
    ) -> Effect<TicketAction> {
        async_effect! {
            Some(TicketAction::OperationFailed { request, operation, error })
        }
    }

    /// Look the assignee up before anything is mutated
    fn verify_assignee(
        request: RequestId,
        ticket_id: TicketId,
        assignee: &str,
        env: &TicketEnvironment,
    ) -> Effect<TicketAction> {
        let Ok(user_id) = assignee.parse::<UserId>() else {
            return Self::reject(
                request,
                TicketOperation::Assign,
                OperationError::validation(format!("\"{}\" is not a valid user id", assignee.trim())),
            );
        };

        let lookup = env.gateway.get_user(user_id);
        async_effect! {
            let error = match lookup.await {
                Ok(user) if user.id == user_id => {
                    return Some(TicketAction::AssigneeVerified { request, ticket_id, user });
                },
                Ok(_) | Err(RemoteError::Rejected { status: 404, .. }) => {
                    OperationError::validation(format!("User {user_id} does not exist"))
                },
                Err(error) => OperationError::validation(format!(
                    "Could not verify user {user_id}: {error}"
                )),
            };
            Some(TicketAction::OperationFailed {
                request,
                operation: TicketOperation::Assign,
                error,
            })
        }
    }

    /// Applies a terminal action to state
    fn apply_event(state: &mut TicketState, action: &TicketAction) {
        match action {
            TicketAction::TicketsLoaded { tickets, .. } => {
                state.tickets.clone_from(tickets);
                state.loading = false;
            },

            TicketAction::TicketCreated { ticket, .. } => {
                state.tickets.push(ticket.clone());
                state.loading = false;
            },

            TicketAction::TicketLoaded { ticket, .. } => {
                state.selected_ticket = Some(ticket.clone());
                state.loading = false;
            },

            TicketAction::UserAssigned { assignment, .. } => {
                let user_id = assignment.user_id;
                state.patch_ticket(assignment.ticket_id, |t| t.assignee_id = Some(user_id));
                state.assigning = false;
            },

            TicketAction::UserUnassigned { unassignment, .. } => {
                state.patch_ticket(unassignment.ticket_id, |t| t.assignee_id = None);
                state.assigning = false;
            },

            TicketAction::StatusUpdated { change, .. } => {
                let completed = change.completed;
                state.patch_ticket(change.id, |t| t.completed = completed);
                state.status_updating = false;
            },

            TicketAction::OperationFailed {
                request,
                operation,
                error,
            } => {
                tracing::warn!(%request, %operation, %error, "Ticket operation failed");
                state.set_busy(operation.busy_flag(), false);
                state.error = Some(error.message());
            },

            // Commands are handled in reduce
            TicketAction::FetchTickets { .. }
            | TicketAction::CreateTicket { .. }
            | TicketAction::FetchTicket { .. }
            | TicketAction::AssignUser { .. }
            | TicketAction::UnassignUser { .. }
            | TicketAction::SetTicketStatus { .. }
            | TicketAction::AssigneeVerified { .. }
            | TicketAction::DismissError
            | TicketAction::Reset => {},
        }
    }
}

impl Reducer for TicketReducer {
    type State = TicketState;
    type Action = TicketAction;
    type Environment = TicketEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TicketAction::FetchTickets { request } => {
                Self::start(state, request, TicketOperation::FetchAll);
                smallvec![Self::call(
                    request,
                    TicketOperation::FetchAll,
                    env.gateway.list_tickets(),
                    move |tickets| TicketAction::TicketsLoaded { request, tickets },
                )]
            },

            TicketAction::CreateTicket {
                request,
                description,
            } => {
                Self::start(state, request, TicketOperation::Create);
                if description.trim().is_empty() {
                    return smallvec![Self::reject(
                        request,
                        TicketOperation::Create,
                        OperationError::validation("Ticket description cannot be empty"),
                    )];
                }
                smallvec![Self::call(
                    request,
                    TicketOperation::Create,
                    env.gateway.create_ticket(description),
                    move |ticket| TicketAction::TicketCreated { request, ticket },
                )]
            },

            TicketAction::FetchTicket { request, id } => {
                Self::start(state, request, TicketOperation::FetchOne);
                smallvec![Self::call(
                    request,
                    TicketOperation::FetchOne,
                    env.gateway.get_ticket(id),
                    move |ticket| TicketAction::TicketLoaded { request, ticket },
                )]
            },

            TicketAction::AssignUser {
                request,
                ticket_id,
                assignee,
            } => {
                Self::start(state, request, TicketOperation::Assign);
                smallvec![Self::verify_assignee(request, ticket_id, &assignee, env)]
            },

            TicketAction::AssigneeVerified {
                request,
                ticket_id,
                user,
            } => {
                tracing::debug!(%request, %ticket_id, user_id = %user.id, "Assignee verified");
                smallvec![Self::call(
                    request,
                    TicketOperation::Assign,
                    env.gateway.assign_ticket(ticket_id, user.id),
                    move |assignment| TicketAction::UserAssigned { request, assignment },
                )]
            },

            TicketAction::UnassignUser { request, ticket_id } => {
                Self::start(state, request, TicketOperation::Unassign);
                smallvec![Self::call(
                    request,
                    TicketOperation::Unassign,
                    env.gateway.unassign_ticket(ticket_id),
                    move |unassignment| TicketAction::UserUnassigned {
                        request,
                        unassignment,
                    },
                )]
            },

            TicketAction::SetTicketStatus {
                request,
                id,
                completed,
            } => {
                Self::start(state, request, TicketOperation::SetStatus);
                smallvec![Self::call(
                    request,
                    TicketOperation::SetStatus,
                    env.gateway.set_ticket_status(id, completed),
                    move |change| TicketAction::StatusUpdated { request, change },
                )]
            },

            TicketAction::DismissError => {
                state.error = None;
                SmallVec::new()
            },

            TicketAction::Reset => {
                *state = TicketState::new();
                SmallVec::new()
            },

            event => {
                Self::apply_event(state, &event);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::{Assignment, Endpoint, GatewayCall, MockGateway, StatusChange};
    use crate::model::{Ticket, User};
    use ticketdesk_testing::{assertions, ReducerTest};

    const REQUEST: RequestId = RequestId::new(1);

    fn gateway() -> MockGateway {
        MockGateway::new()
            .with_tickets(vec![
                Ticket::new(TicketId::new(1), "Fix monitor arm").assigned_to(UserId::new(1)),
                Ticket::new(TicketId::new(2), "Move the desk"),
            ])
            .with_users(vec![
                User::new(UserId::new(1), "Alice"),
                User::new(UserId::new(2), "Bob"),
            ])
    }

    fn env(gateway: &MockGateway) -> TicketEnvironment {
        TicketEnvironment::new(gateway.shared())
    }

    fn loaded_state() -> TicketState {
        TicketState {
            tickets: vec![
                Ticket::new(TicketId::new(1), "Fix monitor arm").assigned_to(UserId::new(1)),
                Ticket::new(TicketId::new(2), "Move the desk"),
            ],
            error: Some("previous failure".to_string()),
            ..TicketState::new()
        }
    }

    #[test]
    fn fetch_starts_loading_and_clears_error() {
        let gateway = gateway();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(loaded_state())
            .when_action(TicketAction::FetchTickets { request: REQUEST })
            .then_state(|state| {
                assert!(state.loading);
                assert!(!state.assigning);
                assert!(!state.status_updating);
                assert_eq!(state.error, None);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .then_actions(|actions| {
                assert!(matches!(
                    actions,
                    [TicketAction::TicketsLoaded { request, tickets }]
                        if *request == REQUEST && tickets.len() == 2
                ));
            })
            .run();
    }

    #[test]
    fn tickets_loaded_replaces_list_wholesale() {
        let gateway = gateway();
        let replacement = vec![Ticket::new(TicketId::new(9), "Only one left")];
        let expected = replacement.clone();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(TicketState {
                loading: true,
                ..loaded_state()
            })
            .when_action(TicketAction::TicketsLoaded {
                request: REQUEST,
                tickets: replacement,
            })
            .then_state(move |state| {
                assert_eq!(state.tickets, expected);
                assert!(!state.loading);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn created_ticket_is_appended() {
        let gateway = gateway();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(TicketState {
                loading: true,
                ..loaded_state()
            })
            .when_action(TicketAction::TicketCreated {
                request: REQUEST,
                ticket: Ticket::new(TicketId::new(3), "Order chairs"),
            })
            .then_state(|state| {
                assert_eq!(state.tickets.len(), 3);
                assert_eq!(state.tickets[2].id, TicketId::new(3));
                assert!(!state.loading);
            })
            .run();
    }

    #[test]
    fn empty_description_fails_without_request() {
        let gateway = gateway();
        let observed = gateway.clone();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(TicketState::new())
            .when_action(TicketAction::CreateTicket {
                request: REQUEST,
                description: "   ".to_string(),
            })
            .then_state(|state| assert!(state.loading))
            .then_actions(move |actions| {
                assert!(matches!(
                    actions,
                    [TicketAction::OperationFailed {
                        operation: TicketOperation::Create,
                        error: OperationError::Validation(_),
                        ..
                    }]
                ));
                assert!(observed.calls().is_empty());
            })
            .run();
    }

    #[test]
    fn fetched_ticket_replaces_selection() {
        let gateway = gateway();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(TicketState {
                selected_ticket: Some(Ticket::new(TicketId::new(2), "Move the desk")),
                loading: true,
                ..loaded_state()
            })
            .when_action(TicketAction::TicketLoaded {
                request: REQUEST,
                ticket: Ticket::new(TicketId::new(1), "Fix monitor arm").with_completed(true),
            })
            .then_state(|state| {
                let selected = state.selected_ticket.as_ref().unwrap();
                assert_eq!(selected.id, TicketId::new(1));
                assert!(selected.completed);
                // The list is not touched by a single-ticket fetch
                assert!(!state.tickets[0].completed);
            })
            .run();
    }

    #[test]
    fn assign_with_unparseable_id_is_a_validation_failure() {
        let gateway = gateway();
        let observed = gateway.clone();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(loaded_state())
            .when_action(TicketAction::AssignUser {
                request: REQUEST,
                ticket_id: TicketId::new(2),
                assignee: "alice".to_string(),
            })
            .then_state(|state| {
                assert!(state.assigning);
                assert_eq!(state.error, None);
            })
            .then_actions(move |actions| {
                assert!(matches!(
                    actions,
                    [TicketAction::OperationFailed {
                        error: OperationError::Validation(message),
                        ..
                    }] if message.contains("alice")
                ));
                assert!(observed.calls().is_empty());
            })
            .run();
    }

    #[test]
    fn assign_with_unknown_user_never_calls_assign() {
        let gateway = gateway();
        let observed = gateway.clone();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(loaded_state())
            .when_action(TicketAction::AssignUser {
                request: REQUEST,
                ticket_id: TicketId::new(1),
                assignee: "999".to_string(),
            })
            .then_actions(move |actions| {
                assert_eq!(
                    actions,
                    [TicketAction::OperationFailed {
                        request: REQUEST,
                        operation: TicketOperation::Assign,
                        error: OperationError::validation("User 999 does not exist"),
                    }]
                );
                assert_eq!(observed.calls(), vec![GatewayCall::GetUser(UserId::new(999))]);
            })
            .run();
    }

    #[test]
    fn assign_with_known_user_verifies_first() {
        let gateway = gateway();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(loaded_state())
            .when_action(TicketAction::AssignUser {
                request: REQUEST,
                ticket_id: TicketId::new(2),
                assignee: " 2 ".to_string(),
            })
            .then_actions(|actions| {
                assert_eq!(
                    actions,
                    [TicketAction::AssigneeVerified {
                        request: REQUEST,
                        ticket_id: TicketId::new(2),
                        user: User::new(UserId::new(2), "Bob"),
                    }]
                );
            })
            .run();
    }

    #[test]
    fn lookup_transport_failure_aborts_assignment() {
        let gateway = gateway();
        gateway.fail(Endpoint::GetUser, RemoteError::transport("connection refused"));

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(loaded_state())
            .when_action(TicketAction::AssignUser {
                request: REQUEST,
                ticket_id: TicketId::new(2),
                assignee: "2".to_string(),
            })
            .then_actions(|actions| {
                assert!(matches!(
                    actions,
                    [TicketAction::OperationFailed {
                        error: OperationError::Validation(message),
                        ..
                    }] if message.starts_with("Could not verify user 2")
                ));
            })
            .run();
    }

    #[test]
    fn verified_assignee_is_sent_to_assign_endpoint() {
        let gateway = gateway();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(TicketState {
                assigning: true,
                ..loaded_state()
            })
            .when_action(TicketAction::AssigneeVerified {
                request: REQUEST,
                ticket_id: TicketId::new(2),
                user: User::new(UserId::new(2), "Bob"),
            })
            .then_state(|state| {
                assert!(state.assigning);
                assert_eq!(state.tickets[1].assignee_id, None);
            })
            .then_actions(|actions| {
                assert_eq!(
                    actions,
                    [TicketAction::UserAssigned {
                        request: REQUEST,
                        assignment: Assignment {
                            ticket_id: TicketId::new(2),
                            user_id: UserId::new(2),
                        },
                    }]
                );
            })
            .run();
    }

    #[test]
    fn unassign_patches_selection_and_list() {
        let gateway = gateway();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(TicketState {
                selected_ticket: Some(
                    Ticket::new(TicketId::new(1), "Fix monitor arm").assigned_to(UserId::new(1)),
                ),
                assigning: true,
                ..loaded_state()
            })
            .when_action(TicketAction::UserUnassigned {
                request: REQUEST,
                unassignment: crate::gateway::Unassignment {
                    ticket_id: TicketId::new(1),
                },
            })
            .then_state(|state| {
                assert_eq!(state.tickets[0].assignee_id, None);
                assert_eq!(
                    state.selected_ticket.as_ref().and_then(|t| t.assignee_id),
                    None
                );
                assert!(!state.assigning);
            })
            .run();
    }

    #[test]
    fn status_update_for_unknown_ticket_changes_only_the_flag() {
        let gateway = gateway();
        let before = loaded_state();
        let expected = before.tickets.clone();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(TicketState {
                status_updating: true,
                ..before
            })
            .when_action(TicketAction::StatusUpdated {
                request: REQUEST,
                change: StatusChange {
                    id: TicketId::new(42),
                    completed: true,
                },
            })
            .then_state(move |state| {
                assert_eq!(state.tickets, expected);
                assert!(!state.status_updating);
            })
            .run();
    }

    #[test]
    fn failure_records_message_and_clears_only_its_flag() {
        let gateway = gateway();
        let before = TicketState {
            assigning: true,
            status_updating: true,
            error: None,
            ..loaded_state()
        };
        let expected = before.tickets.clone();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(before)
            .when_action(TicketAction::OperationFailed {
                request: REQUEST,
                operation: TicketOperation::SetStatus,
                error: RemoteError::rejected(500, "Database unavailable").into(),
            })
            .then_state(move |state| {
                assert_eq!(state.tickets, expected);
                assert!(state.assigning);
                assert!(!state.status_updating);
                assert_eq!(state.error.as_deref(), Some("Database unavailable"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn dismiss_error_is_a_no_op_without_error() {
        let gateway = gateway();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(TicketState::new())
            .when_action(TicketAction::DismissError)
            .then_state(|state| assert_eq!(*state, TicketState::new()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let gateway = gateway();

        ReducerTest::new(TicketReducer::new())
            .with_env(env(&gateway))
            .given_state(TicketState {
                loading: true,
                ..loaded_state()
            })
            .when_action(TicketAction::Reset)
            .then_state(|state| assert_eq!(*state, TicketState::new()))
            .run();
    }
}
