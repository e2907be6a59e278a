//! Property tests for the ticket store merge rules and board filtering.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use proptest::prelude::*;
use ticketdesk_client::board::{StatusFilter, TicketFilter};
use ticketdesk_client::error::OperationError;
use ticketdesk_client::gateway::{MockGateway, RemoteError, StatusChange};
use ticketdesk_client::request::RequestId;
use ticketdesk_client::tickets::{
    TicketAction, TicketEnvironment, TicketOperation, TicketReducer, TicketState,
};
use ticketdesk_client::{Ticket, TicketId, UserId};
use ticketdesk_core::reducer::Reducer;

// ============================================================================
// Generators
// ============================================================================

/// Generates a single ticket.
fn arb_ticket() -> impl Strategy<Value = Ticket> {
    (1..40u64, "[a-z ]{0,16}", any::<bool>(), prop::option::of(1..6u64)).prop_map(
        |(id, description, completed, assignee)| Ticket {
            id: TicketId::new(id),
            description,
            completed,
            assignee_id: assignee.map(UserId::new),
        },
    )
}

/// Generates a ticket list.
fn arb_tickets() -> impl Strategy<Value = Vec<Ticket>> {
    prop::collection::vec(arb_ticket(), 0..20)
}

/// Generates a store state with arbitrary flags.
fn arb_state() -> impl Strategy<Value = TicketState> {
    (
        arb_tickets(),
        prop::option::of(arb_ticket()),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(tickets, selected_ticket, loading, assigning, status_updating)| {
            TicketState {
                tickets,
                selected_ticket,
                loading,
                assigning,
                status_updating,
                error: None,
            }
        })
}

fn arb_operation() -> impl Strategy<Value = TicketOperation> {
    prop::sample::select(vec![
        TicketOperation::FetchAll,
        TicketOperation::Create,
        TicketOperation::FetchOne,
        TicketOperation::Assign,
        TicketOperation::Unassign,
        TicketOperation::SetStatus,
    ])
}

fn arb_status_filter() -> impl Strategy<Value = StatusFilter> {
    prop::sample::select(vec![StatusFilter::All, StatusFilter::Completed, StatusFilter::Incomplete])
}

fn reduce(state: &mut TicketState, action: TicketAction) {
    let env = TicketEnvironment::new(MockGateway::new().shared());
    let _effects = TicketReducer::new().reduce(state, action, &env);
}

const REQUEST: RequestId = RequestId::new(1);

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: a successful list fetch leaves exactly the server's tickets, in order.
    #[test]
    fn prop_loaded_list_replaces_wholesale(mut state in arb_state(), tickets in arb_tickets()) {
        state.loading = true;

        reduce(&mut state, TicketAction::TicketsLoaded { request: REQUEST, tickets: tickets.clone() });

        prop_assert_eq!(&state.tickets, &tickets);
        prop_assert!(!state.loading);
        prop_assert_eq!(state.error, None);
    }

    /// Property: a failure only touches its own busy flag and the error.
    #[test]
    fn prop_failure_keeps_collections(
        state in arb_state(),
        operation in arb_operation(),
        message in "[A-Za-z ]{1,30}",
    ) {
        let before = state.clone();
        let mut after = state;

        reduce(&mut after, TicketAction::OperationFailed {
            request: REQUEST,
            operation,
            error: OperationError::Remote(RemoteError::rejected(500, message.clone())),
        });

        prop_assert_eq!(&after.tickets, &before.tickets);
        prop_assert_eq!(&after.selected_ticket, &before.selected_ticket);
        prop_assert_eq!(after.error.as_deref(), Some(message.as_str()));

        prop_assert_eq!(
            (after.loading, after.assigning, after.status_updating),
            flags_after_failure(&before, operation)
        );
    }

    /// Property: applying the same status change twice equals applying it once.
    #[test]
    fn prop_status_patch_is_idempotent(
        state in arb_state(),
        id in 1..40u64,
        completed in any::<bool>(),
    ) {
        let change = TicketAction::StatusUpdated {
            request: REQUEST,
            change: StatusChange { id: TicketId::new(id), completed },
        };

        let mut once = state.clone();
        reduce(&mut once, change.clone());
        let mut twice = state;
        reduce(&mut twice, change.clone());
        reduce(&mut twice, change);

        prop_assert_eq!(once, twice);
    }

    /// Property: filtering never reorders tickets.
    #[test]
    fn prop_filter_preserves_order(
        tickets in arb_tickets(),
        status in arb_status_filter(),
        search in "[a-z]{0,2}",
    ) {
        let filter = TicketFilter::new().with_status(status).with_description(search);

        let kept = filter.apply(&tickets);

        let mut remaining = tickets.iter();
        for ticket in kept {
            prop_assert!(remaining.any(|candidate| std::ptr::eq(candidate, ticket)));
        }
    }
}

/// Busy flags after a failure: the failed operation's flag drops, others stay.
const fn flags_after_failure(state: &TicketState, operation: TicketOperation) -> (bool, bool, bool) {
    match operation {
        TicketOperation::FetchAll | TicketOperation::Create | TicketOperation::FetchOne => {
            (false, state.assigning, state.status_updating)
        },
        TicketOperation::Assign | TicketOperation::Unassign => {
            (state.loading, false, state.status_updating)
        },
        TicketOperation::SetStatus => (state.loading, state.assigning, false),
    }
}
