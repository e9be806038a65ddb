//! Saturation report for a remote filter.

use std::fmt;

/// How far a filter has drifted from its configured error rate.
///
/// Produced by [`RemoteBloomFilter::health_check`](super::RemoteBloomFilter::health_check)
/// from one bit count over all segments.
///
/// | State | Fill | Observed / target FP rate |
/// |-------|------|---------------------------|
/// | `Healthy` | < 50% | < 2× |
/// | `Degraded` | < 70% | < 5× |
/// | `Critical` | otherwise | |
#[derive(Debug, Clone, PartialEq)]
pub enum FilterHealth {
    /// Operating within its design parameters.
    Healthy {
        /// Fraction of bits set (0.0 to 1.0).
        fill_rate: f64,
        /// False positive rate implied by the fill.
        current_fpr: f64,
        /// Estimated number of distinct items.
        estimated_items: u64,
    },
    /// Still usable, but the error rate is above target.
    Degraded {
        /// Fraction of bits set (0.0 to 1.0).
        fill_rate: f64,
        /// False positive rate implied by the fill.
        current_fpr: f64,
        /// `current_fpr / error_rate`.
        fpr_ratio: f64,
        /// Estimated number of distinct items.
        estimated_items: u64,
    },
    /// Saturated; answers are mostly false positives.
    Critical {
        /// Fraction of bits set (0.0 to 1.0).
        fill_rate: f64,
        /// False positive rate implied by the fill.
        current_fpr: f64,
        /// `current_fpr / error_rate`.
        fpr_ratio: f64,
        /// Estimated number of distinct items (`u64::MAX` when fully set).
        estimated_items: u64,
    },
}

impl FilterHealth {
    /// Classify a filter from its fill and target error rate.
    #[must_use]
    pub fn classify(fill_rate: f64, current_fpr: f64, target_fpr: f64, estimated_items: u64) -> Self {
        let fpr_ratio = if target_fpr > 0.0 {
            current_fpr / target_fpr
        } else {
            1.0
        };

        if fill_rate < 0.5 && fpr_ratio < 2.0 {
            Self::Healthy {
                fill_rate,
                current_fpr,
                estimated_items,
            }
        } else if fill_rate < 0.7 && fpr_ratio < 5.0 {
            Self::Degraded {
                fill_rate,
                current_fpr,
                fpr_ratio,
                estimated_items,
            }
        } else {
            Self::Critical {
                fill_rate,
                current_fpr,
                fpr_ratio,
                estimated_items,
            }
        }
    }

    /// Fraction of bits set.
    #[must_use]
    pub fn fill_rate(&self) -> f64 {
        match self {
            Self::Healthy { fill_rate, .. }
            | Self::Degraded { fill_rate, .. }
            | Self::Critical { fill_rate, .. } => *fill_rate,
        }
    }

    /// False positive rate implied by the fill.
    #[must_use]
    pub fn current_fpr(&self) -> f64 {
        match self {
            Self::Healthy { current_fpr, .. }
            | Self::Degraded { current_fpr, .. }
            | Self::Critical { current_fpr, .. } => *current_fpr,
        }
    }

    /// Estimated number of distinct items.
    #[must_use]
    pub fn estimated_items(&self) -> u64 {
        match self {
            Self::Healthy { estimated_items, .. }
            | Self::Degraded { estimated_items, .. }
            | Self::Critical { estimated_items, .. } => *estimated_items,
        }
    }

    /// Whether the filter is healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }

    /// Whether the filter is degraded.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Whether the filter is saturated.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical { .. })
    }
}

impl fmt::Display for FilterHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy {
                fill_rate,
                current_fpr,
                estimated_items,
            } => write!(
                f,
                "[OK] Healthy: Fill {:.1}%, FPR {current_fpr:.4}, Items ~{estimated_items}",
                fill_rate * 100.0
            ),
            Self::Degraded {
                fill_rate, fpr_ratio, ..
            } => write!(
                f,
                "[WARN] Degraded: Fill {:.1}%, FPR {fpr_ratio:.1}x target - plan a larger filter",
                fill_rate * 100.0
            ),
            Self::Critical {
                fill_rate, fpr_ratio, ..
            } => write!(
                f,
                "[CRIT] Critical: Fill {:.1}%, FPR {fpr_ratio:.1}x target - rebuild with a larger capacity",
                fill_rate * 100.0
            ),
        }
    }
}
