/// Errors surfaced by the approval engine.
///
/// All errors are returned synchronously from the operation that detected
/// them; the engine never retries or silently recovers. Messages carry the
/// offending field or the expected state so a frontend can explain the
/// failure without knowing engine internals.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// Malformed input, rejected before any state mutation.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// The input field that failed validation.
        field: String,
        /// Why the field was rejected.
        reason: String,
    },

    /// A transition was attempted from a state that does not allow it.
    #[error("{subject} is {actual}, expected {expected}")]
    InvalidState {
        /// The action or rule the transition targeted.
        subject: String,
        /// The state the operation requires.
        expected: String,
        /// The state actually found.
        actual: String,
    },

    /// Unknown action or rule id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal invariant violated (e.g. trust counters diverged).
    ///
    /// Fatal to the operation. Indicates a bug in a store's transaction
    /// boundary, not a normal runtime condition.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Storage backend error (lock poisoned, persistence failed, etc.).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
