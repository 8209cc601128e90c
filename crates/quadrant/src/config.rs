//! Engine configuration.
//!
//! Every field has a default, so an empty document is a valid configuration.
//!
//! ```
//! use quadrant::config::QuadrantConfig;
//!
//! let config = QuadrantConfig::from_toml_str(
//!     r#"
//!     checkpoint_stride = 16
//!     nearby_radius_miles = 2.5
//!
//!     [pool]
//!     num_threads = 2
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.checkpoint_stride, 16);
//! assert_eq!(config.pool.num_threads, Some(2));
//! assert_eq!(config.pool.thread_name, "quadrant-worker");
//! ```

use std::sync::Arc;

use quadrant_core::{ThreadPool, ThreadPoolConfig};
use serde::{Deserialize, Serialize};

use crate::capability::Coordinate;
use crate::error::Result;

/// Default rows evaluated between cancellation checks.
pub const DEFAULT_CHECKPOINT_STRIDE: usize = 64;

/// Default fallback reference point: the center of the Berkeley campus.
pub const DEFAULT_CAMPUS_CENTER: Coordinate = Coordinate::new(37.871684, -122.259934);

/// Default radius of the "Nearby" filter, in miles.
pub const DEFAULT_NEARBY_RADIUS_MILES: f64 = 10.0;

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads. `None` means one per CPU core.
    pub num_threads: Option<usize>,
    /// Name prefix for worker threads.
    pub thread_name: String,
    /// Stack size for worker threads in bytes.
    pub stack_size: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let pool = ThreadPoolConfig::default();
        Self {
            num_threads: pool.num_threads,
            thread_name: pool.thread_name,
            stack_size: pool.stack_size,
        }
    }
}

impl From<&PoolConfig> for ThreadPoolConfig {
    fn from(config: &PoolConfig) -> Self {
        ThreadPoolConfig {
            num_threads: config.num_threads,
            thread_name: config.thread_name.clone(),
            stack_size: config.stack_size,
        }
    }
}

/// Configuration for filter tables and search controllers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadrantConfig {
    /// Worker pool settings.
    pub pool: PoolConfig,
    /// Rows (or groups) evaluated between cancellation checks. `1` checks
    /// before every row.
    pub checkpoint_stride: usize,
    /// Reference point for distance sorting when the location provider has
    /// no fix.
    pub campus_center: Coordinate,
    /// Radius of the "Nearby" filter, in miles.
    pub nearby_radius_miles: f64,
}

impl Default for QuadrantConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            checkpoint_stride: DEFAULT_CHECKPOINT_STRIDE,
            campus_center: DEFAULT_CAMPUS_CENTER,
            nearby_radius_miles: DEFAULT_NEARBY_RADIUS_MILES,
        }
    }
}

impl QuadrantConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: QuadrantConfig = toml::from_str(source)?;
        Ok(config.normalized())
    }

    /// Set the number of worker threads.
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.pool.num_threads = Some(num_threads);
        self
    }

    /// Set the checkpoint stride. `0` is treated as `1`.
    pub fn with_checkpoint_stride(mut self, stride: usize) -> Self {
        self.checkpoint_stride = stride.max(1);
        self
    }

    /// Set the fallback reference point.
    pub fn with_campus_center(mut self, center: Coordinate) -> Self {
        self.campus_center = center;
        self
    }

    /// Set the "Nearby" radius.
    pub fn with_nearby_radius_miles(mut self, miles: f64) -> Self {
        self.nearby_radius_miles = miles;
        self
    }

    /// Build a dedicated worker pool from [`pool`](Self::pool).
    pub fn build_pool(&self) -> Result<Arc<ThreadPool>> {
        Ok(Arc::new(ThreadPool::new((&self.pool).into())?))
    }

    fn normalized(mut self) -> Self {
        self.checkpoint_stride = self.checkpoint_stride.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let config = QuadrantConfig::default();
        assert_eq!(config.checkpoint_stride, 64);
        assert_eq!(config.campus_center, Coordinate::new(37.871684, -122.259934));
        assert_eq!(config.nearby_radius_miles, 10.0);
        assert_eq!(config.pool.num_threads, None);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(QuadrantConfig::from_toml_str("").unwrap(), QuadrantConfig::default());
    }

    #[test]
    fn test_campus_center_table() {
        let config = QuadrantConfig::from_toml_str(
            "[campus_center]\nlatitude = 34.0689\nlongitude = -118.4452\n",
        )
        .unwrap();
        assert_eq!(config.campus_center, Coordinate::new(34.0689, -118.4452));
    }

    #[test]
    fn test_zero_stride_normalized() {
        let config = QuadrantConfig::from_toml_str("checkpoint_stride = 0").unwrap();
        assert_eq!(config.checkpoint_stride, 1);
        assert_eq!(QuadrantConfig::default().with_checkpoint_stride(0).checkpoint_stride, 1);
    }

    #[test]
    fn test_invalid_document() {
        let err = QuadrantConfig::from_toml_str("checkpoint_stride = \"many\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_build_pool() {
        let pool = QuadrantConfig::default().with_threads(2).build_pool().unwrap();
        assert_eq!(pool.num_threads(), 2);
    }
}
