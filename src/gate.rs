//! Top-level entrypoint that wires the admission engine to its reaper.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{AdmissionDecision, AdmissionEngine, Policy, RecordSnapshot, reaper::ReaperHandle};

/// Default time between reaper sweeps: 5 minutes.
pub const DEFAULT_REAP_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// Default grace period: a record is evicted only once it has been inactive
/// for its window length plus this long (60 seconds).
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 60 * 1000;

/// Admission-control entrypoint: the engine plus its reaper lifecycle.
///
/// Construct one instance per process (or per test) and share it behind an
/// [`Arc`]; all state is owned by the instance, so independent instances
/// never interact. All interaction is by key lookup through this surface —
/// records are never handed out by reference.
///
/// The reaper is an explicitly owned background thread: start it with
/// [`run_reaper_loop`](Tollgate::run_reaper_loop), stop it with
/// [`stop_reaper_loop`](Tollgate::stop_reaper_loop) or
/// [`destroy`](Tollgate::destroy). Dropping the instance also stops it, so
/// test suites that create many instances never leak sweep threads.
pub struct Tollgate {
    engine: Arc<AdmissionEngine>,
    reaper: Mutex<Option<ReaperHandle>>,
}

impl Default for Tollgate {
    fn default() -> Self {
        Self::new()
    }
}

impl Tollgate {
    /// Create a new instance with an empty key store and no reaper running.
    pub fn new() -> Self {
        Self {
            engine: Arc::new(AdmissionEngine::new()),
            reaper: Mutex::new(None),
        }
    }

    /// Decide whether to admit the current request for `key` under `policy`.
    ///
    /// See [`AdmissionEngine::check`] for the algorithm and an example.
    pub fn check(&self, key: &str, policy: &Policy) -> AdmissionDecision {
        self.engine.check(key, policy)
    }

    /// Remove the record for `key`. No-op if the key is untracked.
    pub fn reset(&self, key: &str) {
        self.engine.reset(key);
    }

    /// Remove every record.
    pub fn reset_all(&self) {
        self.engine.reset_all();
    }

    /// Read-only snapshot of a key's state, or `None` if untracked.
    pub fn status(&self, key: &str) -> Option<RecordSnapshot> {
        self.engine.status(key)
    }

    /// Number of tracked keys.
    pub fn size(&self) -> usize {
        self.engine.size()
    }

    /// Start the reaper with the default grace period and sweep interval
    /// ([`DEFAULT_GRACE_PERIOD_MS`], [`DEFAULT_REAP_INTERVAL_MS`]).
    ///
    /// Idempotent: a no-op if the reaper is already running.
    pub fn run_reaper_loop(&self) {
        self.run_reaper_loop_with_config(DEFAULT_GRACE_PERIOD_MS, DEFAULT_REAP_INTERVAL_MS);
    }

    /// Start the reaper with an explicit grace period and sweep interval.
    ///
    /// The first sweep runs immediately, then once per `interval_ms`. A sweep
    /// evicts every key that has been inactive past its window boundary plus
    /// `grace_period_ms`; active keys keep refreshing their boundary and are
    /// never swept.
    ///
    /// Idempotent: if the reaper is already running, the call is a no-op and
    /// the running configuration is kept.
    pub fn run_reaper_loop_with_config(&self, grace_period_ms: u64, interval_ms: u64) {
        let mut slot = self.reaper_slot();

        if slot.is_some() {
            return;
        }

        *slot = Some(ReaperHandle::spawn(
            self.engine.clone(),
            grace_period_ms,
            interval_ms,
        ));
    } // end method run_reaper_loop_with_config

    /// Stop the reaper and wait for its thread to exit.
    ///
    /// Idempotent: a no-op if the reaper is not running. The reaper can be
    /// restarted afterwards.
    pub fn stop_reaper_loop(&self) {
        let handle = self.reaper_slot().take();

        if let Some(handle) = handle {
            handle.stop();
        }
    }

    /// Stop the reaper and clear all state. Intended for process shutdown;
    /// the instance itself remains usable and behaves as freshly constructed.
    pub fn destroy(&self) {
        self.stop_reaper_loop();
        self.engine.reset_all();
    }

    fn reaper_slot(&self) -> MutexGuard<'_, Option<ReaperHandle>> {
        match self.reaper.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for Tollgate {
    fn drop(&mut self) {
        self.stop_reaper_loop();
    }
}
