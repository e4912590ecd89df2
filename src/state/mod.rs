pub mod clock;
pub mod match_state;
mod sse;
pub mod state_machine;

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::timeout};
use tracing::warn;

use crate::{config::AppConfig, dao::state_store::StateStore, error::ServiceError};

pub use self::sse::SseHub;
use self::{clock::Clock, state_machine::MatchStateMachine};

/// Shared handle passed to every handler.
pub type SharedState = Arc<AppState>;
/// Upper bound on a single read-modify-write cycle.
pub const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_secs(5);
const SSE_CAPACITY: usize = 16;

/// Central application state: the store handle, the clock, and the rules in force.
pub struct AppState {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    config: AppConfig,
    machine: MatchStateMachine,
    sse: SseHub,
    transition_gate: Mutex<()>,
    transition_timeout: Option<Duration>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn StateStore>, clock: Arc<dyn Clock>, config: AppConfig) -> SharedState {
        Self::with_timeout(store, clock, config, Some(DEFAULT_TRANSITION_TIMEOUT))
    }

    /// Same as [`AppState::new`] with an explicit bound on each read-modify-write cycle.
    pub fn with_timeout(
        store: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        config: AppConfig,
        transition_timeout: Option<Duration>,
    ) -> SharedState {
        let machine = MatchStateMachine::new(config.rules().clone());
        Arc::new(Self {
            store,
            clock,
            config,
            machine,
            sse: SseHub::new(SSE_CAPACITY),
            transition_gate: Mutex::new(()),
            transition_timeout,
        })
    }

    /// Handle to the state store.
    pub fn store(&self) -> Arc<dyn StateStore> {
        self.store.clone()
    }

    /// Current wall-clock time in epoch milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// State machine built from the configured rules.
    pub fn machine(&self) -> &MatchStateMachine {
        &self.machine
    }

    /// Broadcast hub used for the scoreboard SSE stream.
    pub fn scoreboard_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Run one read-modify-write cycle against the store.
    ///
    /// Cycles in this process are serialized behind a single gate and bounded by the transition
    /// timeout. Other processes writing the same key are not coordinated with.
    pub async fn run_transition<F, Fut, T>(&self, work: F) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let gate = self.transition_gate.lock().await;

        let work_future = work();
        let outcome = match self.transition_timeout {
            Some(limit) => match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        timeout_ms = limit.as_millis() as u64,
                        "scoreboard transition timed out"
                    );
                    Err(ServiceError::Timeout)
                }
            },
            None => work_future.await,
        };

        drop(gate);
        outcome
    }
}
