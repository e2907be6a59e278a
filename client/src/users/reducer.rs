//! User store reducer.
//!
//! `GetUserById` is a lookup: its outcome goes back to the caller and is never
//! merged into `users`, and it does not raise `loading`.

use super::types::{UserAction, UserOperation, UserState};
use crate::gateway::SharedGateway;
use ticketdesk_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};

/// Environment dependencies for the user store
#[derive(Clone)]
pub struct UserEnvironment {
    /// Remote ticket service
    pub gateway: SharedGateway,
}

impl UserEnvironment {
    /// Creates a new `UserEnvironment`
    #[must_use]
    pub fn new(gateway: SharedGateway) -> Self {
        Self { gateway }
    }
}

/// Reducer for the user store
#[derive(Clone, Debug, Default)]
pub struct UserReducer;

impl UserReducer {
    /// Creates a new `UserReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for UserReducer {
    type State = UserState;
    type Action = UserAction;
    type Environment = UserEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            UserAction::FetchUsers { request } => {
                tracing::debug!(%request, "Fetching users");
                state.loading = true;
                state.error = None;

                let call = env.gateway.list_users();
                smallvec![async_effect! {
                    Some(match call.await {
                        Ok(users) => UserAction::UsersLoaded { request, users },
                        Err(error) => UserAction::OperationFailed {
                            request,
                            operation: UserOperation::FetchAll,
                            error: error.into(),
                        },
                    })
                }]
            },

            UserAction::GetUserById { request, id } => {
                tracing::debug!(%request, user_id = %id, "Looking up user");
                state.error = None;

                let call = env.gateway.get_user(id);
                smallvec![async_effect! {
                    Some(match call.await {
                        Ok(user) => UserAction::UserFound { request, user },
                        Err(error) => UserAction::OperationFailed {
                            request,
                            operation: UserOperation::GetById,
                            error: error.into(),
                        },
                    })
                }]
            },

            UserAction::UsersLoaded { users, .. } => {
                state.users = users;
                state.loading = false;
                SmallVec::new()
            },

            UserAction::UserFound { .. } => SmallVec::new(),

            UserAction::OperationFailed {
                request,
                operation,
                error,
            } => {
                tracing::warn!(%request, %operation, %error, "User operation failed");
                if operation == UserOperation::FetchAll {
                    state.loading = false;
                }
                state.error = Some(error.message());
                SmallVec::new()
            },

            UserAction::DismissError => {
                state.error = None;
                SmallVec::new()
            },

            UserAction::Reset => {
                *state = UserState::new();
                SmallVec::new()
            },
        }
    }
}
