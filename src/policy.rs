use crate::{MaxRequests, WindowMs};

/// Caller-supplied admission policy for a single [`check`](crate::Tollgate::check) call.
///
/// A policy is not persisted; each call is evaluated against the policy it is
/// given. Callers typically keep one policy per route or per purpose (e.g. a
/// stricter one for authentication endpoints than for general API traffic).
///
/// Validation lives in the [`WindowMs`] and [`MaxRequests`] constructors, so a
/// constructed policy is always valid and checks never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Sliding window length.
    pub window_ms: WindowMs,
    /// Request quota per window.
    pub max_requests: MaxRequests,
    /// Optional human-readable text for the caller's rejection response body.
    /// Not read by the engine.
    pub message: Option<String>,
    /// Advisory flag: the caller intends not to count requests whose handler
    /// succeeded. Enforcing this is the caller's responsibility (it would have
    /// to skip the `check` call); the engine does not read it.
    pub skip_successful_requests: bool,
    /// Advisory flag: the caller intends not to count requests whose handler
    /// failed. Same contract as `skip_successful_requests`.
    pub skip_failed_requests: bool,
}

impl Policy {
    /// Create a policy with the optional fields defaulted.
    pub fn new(window_ms: WindowMs, max_requests: MaxRequests) -> Self {
        Self {
            window_ms,
            max_requests,
            message: None,
            skip_successful_requests: false,
            skip_failed_requests: false,
        }
    }
}
