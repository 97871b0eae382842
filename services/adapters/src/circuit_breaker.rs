//! Circuit breaker pattern for fault tolerance across polling cycles.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, requests pass through.
    Closed,
    /// Failing, requests are rejected without calling the underlying adapter.
    Open,
    /// Testing recovery, a limited number of requests are allowed through.
    HalfOpen,
}

impl Default for CircuitState {
    fn default() -> Self {
        CircuitState::Closed
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// Time to wait in the open state before testing recovery.
    pub recovery_timeout: Duration,
    /// Consecutive successes in half-open needed to close the circuit.
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

/// Thread-safe circuit breaker. One instance guards one venue's adapter
/// across every polling cycle, so a venue stuck returning errors stops being
/// hit every cycle once the threshold trips.
pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    last_failure: RwLock<Option<Instant>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            last_failure: RwLock::new(None),
            config,
        }
    }

    /// Whether an operation should be attempted right now. Transitions
    /// `Open` -> `HalfOpen` once the recovery timeout has elapsed.
    pub async fn should_attempt(&self) -> bool {
        let mut state = self.state.write().await;
        match *state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let last_failure = *self.last_failure.read().await;
                match last_failure {
                    Some(at) if at.elapsed() >= self.config.recovery_timeout => {
                        *state = CircuitState::HalfOpen;
                        self.success_count.store(0, Ordering::Relaxed);
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    pub async fn on_success(&self) {
        let mut state = self.state.write().await;
        match *state {
            CircuitState::Closed => {
                self.failure_count.store(0, Ordering::Relaxed);
            }
            CircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
                if successes >= self.config.success_threshold {
                    *state = CircuitState::Closed;
                    self.failure_count.store(0, Ordering::Relaxed);
                }
            }
            CircuitState::Open => {}
        }
    }

    pub async fn on_failure(&self) {
        let mut state = self.state.write().await;
        *self.last_failure.write().await = Some(Instant::now());
        match *state {
            CircuitState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
                if failures >= self.config.failure_threshold {
                    *state = CircuitState::Open;
                }
            }
            CircuitState::HalfOpen => {
                *state = CircuitState::Open;
            }
            CircuitState::Open => {}
        }
    }

    pub async fn state(&self) -> CircuitState {
        *self.state.read().await
    }
}

/// Health snapshot for a single adapter, exposed through `VenueAdapter::health`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterHealth {
    pub circuit_state: CircuitState,
    pub error_count: u64,
}
