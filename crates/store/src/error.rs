/// Errors returned by [`crate::Store`] operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Input failed validation; nothing was written.
    #[error("{0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A unique key is already taken.
    #[error("{0}")]
    Conflict(String),

    /// The store has been closed; writes are rejected.
    #[error("store is closed")]
    Closed,
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound { kind, id: id.into() }
    }
}

/// Reject `value` when it is shorter than `min` characters.
pub(crate) fn require_min_len(field: &str, value: &str, min: usize) -> Result<(), StoreError> {
    if value.chars().count() < min {
        return Err(StoreError::Validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(())
}
