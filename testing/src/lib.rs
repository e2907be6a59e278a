//! # Ticketdesk Testing
//!
//! Testing utilities for the ticketdesk state engine.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`assertions`]: Effect assertion helpers
//! - [`resolve_effects`]: Drives effect descriptions to the actions they produce
//!
//! ## Example
//!
//! ```ignore
//! use ticketdesk_testing::{resolve_effects, ReducerTest};
//!
//! #[tokio::test]
//! async fn fetch_resolves_to_loaded() {
//!     let mut state = TicketState::new();
//!     let effects = reducer.reduce(&mut state, TicketAction::FetchTickets { request }, &env);
//!     let actions = resolve_effects(effects).await;
//!     assert!(matches!(actions[0], TicketAction::TicketsLoaded { .. }));
//! }
//! ```


/// Effect execution helpers for tests
pub mod effects {
    use ticketdesk_core::effect::Effect;

    /// Execute effects in declaration order and collect the actions they produce
    ///
    /// Unlike the Store, nothing is fed back into a reducer: the caller
    /// decides what to do with the produced actions.
    pub async fn resolve_effects<A, I>(effects: I) -> Vec<A>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut actions = Vec::new();

        for effect in effects {
            if let Effect::Future(fut) = effect {
                if let Some(action) = fut.await {
                    actions.push(action);
                }
            }
        }

        actions
    }

    /// Execute effects and return the single action they produce, if exactly one
    pub async fn resolve_single<A, I>(effects: I) -> Option<A>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut actions = resolve_effects(effects).await;
        if actions.len() == 1 { actions.pop() } else { None }
    }
}

// Re-export commonly used items
pub use effects::{resolve_effects, resolve_single};
pub use reducer_test::{assertions, ReducerTest};

#[cfg(test)]
mod tests {
    use super::*;
    use ticketdesk_core::effect::Effect;

    #[derive(Debug, Clone, PartialEq)]
    enum Step {
        First,
        Second,
    }

    #[tokio::test]
    async fn resolve_effects_keeps_declaration_order() {
        let effects = vec![
            Effect::Future(Box::pin(async { Some(Step::First) })),
            Effect::None,
            Effect::Future(Box::pin(async { None })),
            Effect::Future(Box::pin(async { Some(Step::Second) })),
        ];

        let actions = resolve_effects(effects).await;
        assert_eq!(actions, vec![Step::First, Step::Second]);
    }

    #[tokio::test]
    async fn resolve_single_requires_exactly_one() {
        let one = vec![Effect::Future(Box::pin(async { Some(Step::First) }))];
        assert_eq!(resolve_single(one).await, Some(Step::First));

        let none: Vec<Effect<Step>> = vec![Effect::None];
        assert_eq!(resolve_single(none).await, None);
    }
}
