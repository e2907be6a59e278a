//! User store: the users tickets can be assigned to.

pub mod reducer;
pub mod store;
pub mod types;

pub use reducer::{UserEnvironment, UserReducer};
pub use store::UserStore;
pub use types::{UserAction, UserOperation, UserState};
