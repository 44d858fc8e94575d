//! Engine configuration.
//!
//! [`EngineConfig`] collects the few tunables the engine exposes. Defaults
//! match the behavior frontends expect out of the box: rules need a 0.8
//! success rate to keep auto-approving, and listings page at 50 records.

use serde::{Deserialize, Serialize};

/// Minimum success rate a scored rule needs to remain eligible for
/// auto-approval. Rules below this are "on probation": still visible and
/// matchable for inspection, never applied.
pub const DEFAULT_TRUST_THRESHOLD: f64 = 0.8;

/// Page size applied when a listing does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Upper bound on caller-supplied page sizes.
pub const MAX_PAGE_SIZE: usize = 500;

/// Tunables for the approval engine.
///
/// # Example
///
/// ```
/// use greenlight_approval::config::EngineConfig;
///
/// let config = EngineConfig::default().with_trust_threshold(0.9);
/// assert!((config.trust_threshold - 0.9).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum success rate for a scored rule to auto-approve.
    pub trust_threshold: f64,
    /// Page size used when the caller does not supply one.
    pub default_page_size: usize,
    /// Largest page size the engine will honor.
    pub max_page_size: usize,
}

impl EngineConfig {
    /// Set the trust threshold, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_trust_threshold(mut self, threshold: f64) -> Self {
        self.trust_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the default page size (at least 1, at most `max_page_size`).
    #[must_use]
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size.clamp(1, self.max_page_size);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trust_threshold: DEFAULT_TRUST_THRESHOLD,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}
