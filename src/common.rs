use std::{
    collections::VecDeque,
    ops::Deref,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::TollgateError;

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Sliding window length in milliseconds. Must be greater than 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WindowMs(u64);

impl Deref for WindowMs {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u64> for WindowMs {
    type Error = TollgateError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(TollgateError::InvalidWindowMs(
                "Window length must be greater than 0".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}

/// Request quota per window. Must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MaxRequests(u64);

impl Deref for MaxRequests {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u64> for MaxRequests {
    type Error = TollgateError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(TollgateError::InvalidMaxRequests(
                "Max requests must be at least 1".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// The request is admitted.
    Allowed {
        /// Requests left in the current window after this admission.
        remaining: u64,
        /// Epoch milliseconds when the window boundary next advances
        /// (suitable for an `X-RateLimit-Reset` header).
        reset_at: u64,
    },
    /// The request is refused.
    Rejected {
        /// Whole seconds until the oldest in-window request ages out
        /// (suitable for a `Retry-After` header). Always at least 1.
        retry_after_seconds: u64,
        /// Epoch milliseconds of the key's window boundary.
        reset_at: u64,
    },
}

impl AdmissionDecision {
    /// Whether the request was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, AdmissionDecision::Allowed { .. })
    }

    /// Requests left in the window; 0 when rejected.
    pub fn remaining(&self) -> u64 {
        match self {
            AdmissionDecision::Allowed { remaining, .. } => *remaining,
            AdmissionDecision::Rejected { .. } => 0,
        }
    }

    /// Epoch milliseconds of the key's window boundary.
    pub fn reset_at(&self) -> u64 {
        match self {
            AdmissionDecision::Allowed { reset_at, .. }
            | AdmissionDecision::Rejected { reset_at, .. } => *reset_at,
        }
    }

    /// Suggested backoff in whole seconds; `None` when admitted.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            AdmissionDecision::Allowed { .. } => None,
            AdmissionDecision::Rejected {
                retry_after_seconds, ..
            } => Some(*retry_after_seconds),
        }
    }
}

/// Per-key admission state.
///
/// `window_requests` is authoritative for admission: it holds the epoch-ms
/// timestamps of admitted requests still inside the window, pruned lazily on
/// each check. `total_admitted` is a lifetime counter (requests ever admitted
/// for this key since the record was created), never decremented by pruning.
pub(crate) struct AdmissionRecord {
    pub window_requests: VecDeque<u64>,
    pub window_reset_at: u64,
    pub total_admitted: u64,
}

impl AdmissionRecord {
    pub fn new(window_reset_at: u64) -> Self {
        Self {
            window_requests: VecDeque::new(),
            window_reset_at,
            total_admitted: 0,
        }
    }
}

/// Read-only snapshot of a key's admission state, for diagnostics.
///
/// Taken as-is from the store: timestamps that have aged out of the window but
/// have not been pruned by a subsequent check may still appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSnapshot {
    /// Epoch-ms timestamps of admitted requests as of the last evaluation.
    pub window_requests: Vec<u64>,
    /// Epoch milliseconds of the key's window boundary.
    pub window_reset_at: u64,
    /// Requests ever admitted for this key since the record was created.
    pub total_admitted: u64,
}

impl From<&AdmissionRecord> for RecordSnapshot {
    fn from(record: &AdmissionRecord) -> Self {
        Self {
            window_requests: record.window_requests.iter().copied().collect(),
            window_reset_at: record.window_reset_at,
            total_admitted: record.total_admitted,
        }
    }
}
