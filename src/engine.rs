use dashmap::DashMap;
use tracing::warn;

use crate::{
    AdmissionDecision, Policy, RecordSnapshot,
    common::{AdmissionRecord, now_ms},
};

/// Sliding-window-log admission checker with its key store.
///
/// Maintains one admission record per key in a concurrent map. Records are
/// created lazily on first check and live until explicitly reset or evicted
/// by the reaper; [`status`](AdmissionEngine::status) exposes them as
/// [`RecordSnapshot`] values.
///
/// # Algorithm
///
/// Each check, under the key's map entry guard:
///
/// 1. Prune timestamps that have aged out of the window (`now − t >= window`)
/// 2. Reject if the remaining in-window count has reached the quota
/// 3. Otherwise record `now`, refresh the window boundary, and admit
///
/// Exact timestamps are retained, so admission is evaluated against the true
/// elapsed-time window rather than a fixed calendar bucket: a burst of
/// `max_requests` followed immediately by one more is always rejected.
///
/// # Thread safety
///
/// The whole check for a key runs while holding that key's
/// [`DashMap`](dashmap::DashMap) entry guard, so concurrent checks on the same
/// key are serialized — no over-admission and no spurious rejection. Distinct
/// keys only contend on the map shard. The reaper's sweep uses the same map,
/// so it cannot race a check on the record it is evicting.
///
/// # Cost
///
/// Pruning is O(entries in window), which is bounded by `max_requests` since
/// no more than `max_requests` timestamps are ever retained per key. The
/// sweep is O(tracked keys) and runs off the request path.
pub struct AdmissionEngine {
    records: DashMap<String, AdmissionRecord>,
}

impl AdmissionEngine {
    pub(crate) fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    } // end constructor

    /// Decide whether to admit the current request for `key` under `policy`.
    ///
    /// Rejection is a normal outcome, not an error. On rejection a
    /// warning-level `tracing` event is emitted carrying the key, the
    /// in-window load, the configured quota, and the computed retry delay.
    ///
    /// # Examples
    ///
    /// ```
    /// use tollgate::{MaxRequests, Policy, Tollgate, WindowMs};
    ///
    /// let gate = Tollgate::new();
    /// let policy = Policy::new(
    ///     WindowMs::try_from(60_000).unwrap(),
    ///     MaxRequests::try_from(2).unwrap(),
    /// );
    ///
    /// assert_eq!(gate.check("user:42", &policy).remaining(), 1);
    /// assert_eq!(gate.check("user:42", &policy).remaining(), 0);
    /// assert!(!gate.check("user:42", &policy).is_allowed());
    /// ```
    pub fn check(&self, key: &str, policy: &Policy) -> AdmissionDecision {
        let now = now_ms();
        let window_ms = *policy.window_ms;
        let max_requests = *policy.max_requests;

        let mut record = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| AdmissionRecord::new(now + window_ms));

        while let Some(&timestamp) = record.window_requests.front() {
            if now.saturating_sub(timestamp) >= window_ms {
                record.window_requests.pop_front();
            } else {
                break;
            }
        }

        if record.window_requests.len() as u64 >= max_requests
            && let Some(&oldest) = record.window_requests.front()
        {
            // Oldest entry survived pruning, so `oldest + window_ms > now`
            // and the clamp below only fires on sub-second remainders.
            let retry_after_seconds = (oldest + window_ms)
                .saturating_sub(now)
                .div_ceil(1000)
                .max(1);

            warn!(
                key,
                in_window = record.window_requests.len(),
                max_requests,
                retry_after_seconds,
                "admission rejected"
            );

            return AdmissionDecision::Rejected {
                retry_after_seconds,
                reset_at: record.window_reset_at,
            };
        }

        record.window_requests.push_back(now);
        record.total_admitted += 1;
        record.window_reset_at = now + window_ms;

        AdmissionDecision::Allowed {
            remaining: max_requests - record.window_requests.len() as u64,
            reset_at: record.window_reset_at,
        }
    } // end method check

    /// Remove the record for `key`. No-op if the key is untracked.
    ///
    /// The next check for the key sees a full quota.
    pub fn reset(&self, key: &str) {
        self.records.remove(key);
    }

    /// Remove every record. Used for test isolation or administrative
    /// override.
    pub fn reset_all(&self) {
        self.records.clear();
    }

    /// Read-only snapshot of a key's state, or `None` if untracked.
    ///
    /// Does not mutate or prune: timestamps already outside the window may
    /// still appear until the next check for the key runs.
    pub fn status(&self, key: &str) -> Option<RecordSnapshot> {
        self.records
            .get(key)
            .map(|record| RecordSnapshot::from(record.value()))
    }

    /// Number of tracked keys, for capacity monitoring.
    pub fn size(&self) -> usize {
        self.records.len()
    }

    /// Evict every record that has been inactive past its window boundary
    /// plus `grace_period_ms`. Returns the number of evicted records.
    ///
    /// Active keys refresh their boundary on each admission, so they are
    /// never swept.
    pub(crate) fn reap_stale(&self, grace_period_ms: u64) -> usize {
        let now = now_ms();
        let before = self.records.len();

        self.records
            .retain(|_, record| now <= record.window_reset_at.saturating_add(grace_period_ms));

        before.saturating_sub(self.records.len())
    } // end method reap_stale
}
