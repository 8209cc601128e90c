//! Error types for the filter/sort/search engine.

use quadrant_core::CoreError;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving a filter table or loading configuration.
///
/// Missing optional facets, an empty filter selection, cancelled work and
/// out-of-range reads of an output are never errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A selection index does not name a table function.
    #[error("Selection index {index} is out of range for {len} table functions")]
    IndexOutOfRange { index: usize, len: usize },

    /// A filter toggle targeted a sort.
    #[error("Table function {index} is not a filter")]
    NotAFilter { index: usize },

    /// A sort selection targeted a filter.
    #[error("Table function {index} is not a sort")]
    NotASort { index: usize },

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Runtime error from the core crate.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl Error {
    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
