//! Declarative macro for ergonomic effect construction
//!
//! Most reducers in this workspace return a single gateway call wrapped in
//! `Effect::Future`; this macro keeps that boilerplate out of the match arms.

/// Create an `Effect::Future` from an async block
///
/// The body is moved into an `async move` block and must evaluate to
/// `Option<Action>`.
///
/// # Example
///
/// ```rust,ignore
/// use ticketdesk_core::async_effect;
///
/// async_effect! {
///     let tickets = gateway.list_tickets().await;
///     Some(TicketAction::from_list(request, tickets))
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}
