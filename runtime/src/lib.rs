//! # Ticketdesk Runtime
//!
//! Store runtime for the ticketdesk client state engine.
//!
//! This crate provides the Store that owns client-side state, runs reducers
//! and executes the effects they return.
//!
//! ## Core Components
//!
//! - **Store**: Manages state and executes effects
//! - **Effect Executor**: Runs effect futures and feeds their actions back to the reducer
//! - **Reply Registry**: Hands each waiting caller the action that resolves its request
//! - **Action Broadcast**: Lets observers follow every merged action
//!
//! ## Example
//!
//! ```ignore
//! use ticketdesk_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use ticketdesk_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, oneshot};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Returned by `send()` after shutdown was initiated, and by
        /// `send_and_wait_for()` when shutdown happens while waiting.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a matching action
        #[error("Timeout waiting for action")]
        Timeout,

        /// Reply channel closed before a matching action arrived
        #[error("Reply channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(256)
///     .with_shutdown_timeout(Duration::from_secs(5));
///
/// let store = Store::with_config(state, reducer, env, config);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity of the action broadcast channel seen by observers
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize, default_shutdown_timeout: Duration) -> Self {
        Self {
            broadcast_capacity,
            default_shutdown_timeout,
        }
    }

    /// Set the broadcast channel capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 64,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// A caller blocked in `send_and_wait_for`
struct Waiter<A> {
    /// Which action ends the caller's request
    matches: Box<dyn Fn(&A) -> bool + Send>,
    /// Where that action is delivered
    sender: oneshot::Sender<A>,
}

/// Callers waiting for the action that resolves their request
///
/// Every waiter owns its own reply channel, so a burst of unrelated actions
/// can never push a reply out of reach.
struct Waiters<A> {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, Waiter<A>>>,
}

impl<A: Clone> Waiters<A> {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, Waiter<A>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register interest in the first action matching `matches`
    fn register(
        self: &Arc<Self>,
        matches: Box<dyn Fn(&A) -> bool + Send>,
    ) -> (WaiterGuard<A>, oneshot::Receiver<A>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        self.lock().insert(id, Waiter { matches, sender });

        let guard = WaiterGuard {
            waiters: Arc::clone(self),
            id,
        };
        (guard, receiver)
    }

    /// Deliver an applied action to every waiter it resolves
    fn resolve(&self, action: &A) {
        let mut pending = self.lock();
        let resolved: Vec<u64> = pending
            .iter()
            .filter(|(_, waiter)| (waiter.matches)(action))
            .map(|(id, _)| *id)
            .collect();

        for id in resolved {
            if let Some(waiter) = pending.remove(&id) {
                let _ = waiter.sender.send(action.clone());
            }
        }
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Removes a waiter that gave up (timeout, shutdown, dropped future)
struct WaiterGuard<A: Clone> {
    waiters: Arc<Waiters<A>>,
    id: u64,
}

impl<A: Clone> Drop for WaiterGuard<A> {
    fn drop(&mut self) {
        self.waiters.lock().remove(&self.id);
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
///
/// Ensures the counter is always decremented, even if the effect panics.
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicCounterGuard, AtomicUsize, Duration, Effect, Ordering, Reducer, RwLock,
        StoreConfig, StoreError, Waiters,
    };
    use tokio::sync::{broadcast, watch};

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (state transitions)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Reducers run one at a time under the write lock, so every merge of a
    /// resolved request is applied atomically with respect to other merges.
    /// Effects run concurrently in spawned tasks.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<watch::Sender<bool>>,
        pending_effects: Arc<AtomicUsize>,
        /// Callers waiting for the action that ends their request
        waiters: Arc<Waiters<A>>,
        /// Actions produced by effects, published after the reducer applied them.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default()`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));
            let (shutdown, _) = watch::channel(false);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(shutdown),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                waiters: Arc::new(Waiters::new()),
                action_broadcast,
            }
        }

        /// Whether shutdown has been initiated
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            *self.shutdown.borrow()
        }

        /// Number of effects currently running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Number of callers blocked in [`Store::send_and_wait_for`]
        #[must_use]
        pub fn waiting_requests(&self) -> usize {
            self.waiters.len()
        }

        /// Initiate graceful shutdown
        ///
        /// After this call the store rejects new actions, including actions
        /// fed back by effects that are still in flight. Results of requests
        /// that resolve after shutdown are therefore discarded. Callers
        /// blocked in [`Store::send_and_wait_for`] are released with
        /// [`StoreError::ShutdownInProgress`].
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.send_replace(true);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(20);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::warn!(pending_effects = pending, "Shutdown timed out");
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Starts the returned effects asynchronously
        ///
        /// `send()` returns after starting effect execution, not completion.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.is_shutting_down() {
                tracing::debug!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.commands.total").increment(1);

            let effects = {
                let mut state = self.state.write().await;

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect);
            }

            Ok(())
        }

        /// Send an action and wait for a matching action produced by effects
        ///
        /// This is the request-response bridge: register a reply channel for
        /// the predicate, send the initial action, then return the first
        /// action matching the predicate. By the time it is returned, the
        /// reducer has already applied it, so reading state afterwards
        /// observes the merge. Any number of callers may wait at once.
        ///
        /// There is no timeout; the request's own transport decides how long
        /// it may hang. Use [`Store::send_and_wait_for_within`] to bound it.
        ///
        /// # Errors
        ///
        /// - [`StoreError::ShutdownInProgress`]: the store is (or starts) shutting down
        /// - [`StoreError::ChannelClosed`]: the reply channel closed without a match
        pub async fn send_and_wait_for<F>(&self, action: A, predicate: F) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool + Send + 'static,
        {
            // Register BEFORE sending to avoid missing a fast result
            let (_registration, reply) = self.waiters.register(Box::new(predicate));
            let mut shutdown = self.shutdown.subscribe();

            self.send(action).await?;

            tokio::select! {
                received = reply => received.map_err(|_| StoreError::ChannelClosed),
                _ = shutdown.wait_for(|down| *down) => Err(StoreError::ShutdownInProgress),
            }
        }

        /// Like [`Store::send_and_wait_for`], bounded by a timeout
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Timeout`] when no matching action arrives in
        /// time, plus every error of [`Store::send_and_wait_for`].
        pub async fn send_and_wait_for_within<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool + Send + 'static,
        {
            tokio::time::timeout(timeout, self.send_and_wait_for(action, predicate))
                .await
                .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to all actions produced by effects
        ///
        /// Actions are published after the reducer has applied them. Initial
        /// actions passed to `send` are not broadcast. A subscriber that falls
        /// more than the configured capacity behind skips actions; waiting
        /// callers are unaffected.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.tickets.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Feed an action produced by an effect back into the store
        ///
        /// The action reaches waiters and subscribers only once the reducer
        /// accepted it; after shutdown it is dropped.
        async fn feed_back(&self, action: A)
        where
            R: Clone,
            E: Clone,
        {
            match self.send(action.clone()).await {
                Ok(()) => {
                    self.waiters.resolve(&action);
                    let _ = self.action_broadcast.send(action);
                },
                Err(error) => {
                    tracing::debug!(%error, "Discarded action produced by effect");
                },
            }
        }

        /// Execute an effect
        ///
        /// - `None`: No-op
        /// - `Future`: Executes async computation, feeds resulting action back if `Some`
        ///
        /// Effect panics are contained in their task; the [`AtomicCounterGuard`]
        /// keeps the pending count correct.
        fn execute_effect(&self, effect: Effect<A>)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _pending_guard = pending_guard;

                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action");
                            store.feed_back(action).await;
                        }
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                waiters: Arc::clone(&self.waiters),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

pub use store::Store;
