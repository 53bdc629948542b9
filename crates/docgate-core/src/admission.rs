//! Per-client admission control.
//!
//! Every client identifier gets a [`ClientState`] holding the instant at
//! which its next request becomes eligible. A check admits when the shared
//! clock has reached that instant and pushes it one refill interval ahead,
//! so at most one request per interval gets through and unused intervals
//! never accumulate into a burst.
//!
//! The map is a [`DashMap`]: all reads and writes of one identifier's slot
//! happen under the write lock of its shard, which makes lazy creation,
//! ticket consumption and reclamation mutually exclusive per identifier.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use crate::clock::{Clock, SystemClock};
use crate::config::LimiterConfig;
use crate::error::CoreResult;

/// Admission state of a single client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientState {
    next_eligible: Instant,
    last_seen: Instant,
}

impl ClientState {
    fn fresh(now: Instant) -> Self {
        Self {
            next_eligible: now,
            last_seen: now,
        }
    }

    /// `false` if the stored instants cannot have been produced by this
    /// controller (eligibility more than one interval ahead, or a last-seen
    /// time in the future).
    fn is_consistent(&self, now: Instant, config: &LimiterConfig) -> bool {
        self.next_eligible.saturating_duration_since(now) <= config.refill_interval
            && self.last_seen <= now
    }

    fn try_consume(&mut self, now: Instant, config: &LimiterConfig) -> bool {
        self.last_seen = now;
        if now < self.next_eligible {
            return false;
        }
        self.next_eligible = now.checked_add(config.refill_interval).unwrap_or(now);
        true
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    pub fn next_eligible(&self) -> Instant {
        self.next_eligible
    }
}

/// Process-wide per-client rate limiter.
///
/// Construct once at startup and share it behind an [`Arc`]; the
/// configuration cannot change after construction.
pub struct AdmissionController {
    clients: DashMap<String, ClientState>,
    config: LimiterConfig,
    clock: Arc<dyn Clock>,
}

impl AdmissionController {
    /// Creates a controller driven by the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`](crate::CoreError::InvalidConfig)
    /// if `config` fails [`LimiterConfig::validate`].
    pub fn new(config: LimiterConfig) -> CoreResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a controller reading time from `clock`.
    pub fn with_clock(config: LimiterConfig, clock: Arc<dyn Clock>) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            clients: DashMap::new(),
            config,
            clock,
        })
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Decides whether a request from `identifier` may proceed.
    ///
    /// Never blocks waiting for a refill: if the client is not eligible yet
    /// the call returns `false` immediately. Logging the rejection is left
    /// to the caller.
    pub fn check_admission(&self, identifier: &str) -> bool {
        let config = &self.config;

        if let Some(mut state) = self.clients.get_mut(identifier) {
            let now = self.clock.now();
            if !state.is_consistent(now, config) {
                tracing::warn!("Inconsistent limiter state for {identifier}, resetting");
                *state = ClientState::fresh(now);
            }
            return state.try_consume(now, config);
        }

        // Another request may insert the same identifier between the lookup
        // above and this point; `entry` settles it under the shard lock.
        let mut state = self
            .clients
            .entry(identifier.to_owned())
            .or_insert_with(|| {
                tracing::debug!("Client state created: {identifier}");
                ClientState::fresh(self.clock.now())
            });
        let now = self.clock.now();
        state.try_consume(now, config)
    }

    /// Removes every client idle for longer than the staleness threshold.
    pub fn reclaim(&self) {
        self.sweep();
    }

    /// Same as [`reclaim`](Self::reclaim), returning how many entries were
    /// removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let staleness = self.config.staleness_threshold;
        let mut removed = 0;
        self.clients.retain(|_, state| {
            let keep = now.saturating_duration_since(state.last_seen) <= staleness;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.clients.contains_key(identifier)
    }

    /// Snapshot of one client's state.
    pub fn client_state(&self, identifier: &str) -> Option<ClientState> {
        self.clients.get(identifier).map(|s| *s)
    }
}
