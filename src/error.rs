/// Error type for this crate.
///
/// Rejecting a request is not an error; it is a normal decision carried in
/// [`AdmissionDecision`](crate::AdmissionDecision). The only failure class is
/// caller misuse: a policy value that would make the admission arithmetic
/// meaningless.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TollgateError {
    /// The window length is invalid.
    #[error("invalid policy: {0}")]
    InvalidWindowMs(String),
    /// The request quota is invalid.
    #[error("invalid policy: {0}")]
    InvalidMaxRequests(String),
}
