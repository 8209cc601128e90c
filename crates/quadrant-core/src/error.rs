//! Error types for Quadrant core.

/// The main error type for Quadrant core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Thread pool error.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] ThreadPoolError),
    /// Main context error.
    #[error("Main context error: {0}")]
    Context(#[from] ContextError),
}

/// Thread pool errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThreadPoolError {
    /// The global pool has already been initialized.
    #[error("Global thread pool has already been initialized")]
    AlreadyInitialized,
    /// The underlying pool could not be built.
    #[error("Failed to create thread pool: {0}")]
    CreationFailed(String),
}

/// Errors raised when talking to a [`MainContext`](crate::MainContext).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// The context has been dropped; nothing will drain the queue.
    #[error("Main context has been closed")]
    Closed,
}

/// A specialized Result type for Quadrant core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wraps_inner_error() {
        let err = CoreError::from(ThreadPoolError::CreationFailed("no threads".into()));
        assert_eq!(
            err.to_string(),
            "Thread pool error: Failed to create thread pool: no threads"
        );
    }

    #[test]
    fn test_context_closed_display() {
        let err: CoreError = ContextError::Closed.into();
        assert_eq!(err.to_string(), "Main context error: Main context has been closed");
    }
}
