//! Logging facilities for Quadrant.
//!
//! Quadrant uses the `tracing` crate for instrumentation and never installs
//! a subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("quadrant=debug,quadrant_core=debug")
//!         .init();
//! }
//! ```
//!
//! The constants in [`targets`] and [`span_names`] can be used to filter by
//! subsystem.

/// Span names used throughout Quadrant for tracing.
pub mod span_names {
    /// One filter/sort evaluation.
    pub const EVALUATE: &str = "quadrant::evaluate";
    /// One keyword search.
    pub const SEARCH: &str = "quadrant::search";
}

/// Target names for log filtering.
pub mod targets {
    /// Main context draining.
    pub const CONTEXT: &str = "quadrant_core::context";
    /// Thread pool lifecycle.
    pub const THREADPOOL: &str = "quadrant_core::threadpool";
    /// Cancel-and-replace recomputation.
    pub const RECOMPUTE: &str = "quadrant_core::recompute";
    /// Signal emission.
    pub const SIGNAL: &str = "quadrant_core::signal";
    /// Filter tables.
    pub const FILTER_TABLE: &str = "quadrant::filter_table";
    /// Keyword search.
    pub const SEARCH: &str = "quadrant::search";
    /// Performance spans.
    pub const PERF: &str = "quadrant::perf";
}

/// A guard that keeps a performance span entered until dropped.
///
/// # Example
///
/// ```
/// use quadrant_core::logging::{PerfSpan, span_names};
///
/// {
///     let _span = PerfSpan::new(span_names::EVALUATE);
///     // ... timed work ...
/// }
/// ```
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new performance span named `operation`.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::info_span!(target: "quadrant::perf", "perf", operation);
        Self {
            _span: span.entered(),
        }
    }
}

impl std::fmt::Debug for PerfSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfSpan").finish_non_exhaustive()
    }
}
