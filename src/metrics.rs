//! Per-evaluation statistics delivered to a pluggable sink.
//!
//! The filter does not depend on any metrics backend. Implement
//! [`MetricsSink`] and hand it to
//! [`NamespaceFilter::with_metrics_sink`](crate::NamespaceFilter::with_metrics_sink);
//! without one, stats are dropped.
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use namespace_filter_core::{EvaluationStats, MetricsSink};
//!
//! #[derive(Default)]
//! struct DenialCounter(AtomicU64);
//!
//! impl MetricsSink for DenialCounter {
//!     fn on_evaluation(&self, stats: &EvaluationStats) {
//!         if stats.filtered {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//!
//! let filter = filter.with_metrics_sink(Arc::new(DenialCounter::default()));
//! ```

use serde::Serialize;
use std::time::Duration;

/// Snapshot of one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationStats {
    /// Wall-clock time for the whole evaluation, directory reads included.
    pub duration: Duration,
    /// Target identifier.
    pub target: String,
    /// Target namespace, `None` when the target was passed through.
    pub namespace: Option<String>,
    /// Number of proposed candidates.
    pub candidates: usize,
    /// Number of candidates that failed a check.
    pub denied: usize,
    /// `true` when the all-or-nothing rule cleared the accepted lists.
    pub filtered: bool,
}

/// Evaluation time broken down by step, in milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationPhases {
    pub resolve_namespace_ms: f64,
    pub classify_ms: f64,
    pub enforce_ms: f64,
    pub total_ms: f64,
}

impl EvaluationPhases {
    /// Time not accounted for by the measured steps.
    pub fn overhead_ms(&self) -> f64 {
        self.total_ms - (self.resolve_namespace_ms + self.classify_ms + self.enforce_ms)
    }
}

/// Consumer of evaluation metrics.
///
/// Called synchronously at the end of every evaluation, so implementations
/// must not block. They must be thread-safe because a filter may serve
/// concurrent requests.
pub trait MetricsSink: Send + Sync {
    fn on_evaluation(&self, stats: &EvaluationStats);

    /// Optional per-phase breakdown; ignored by default.
    fn on_evaluation_phases(&self, _stats: &EvaluationStats, _phases: &EvaluationPhases) {}
}

/// Drops everything.
#[derive(Debug, Default)]
pub(crate) struct NoOpSink;

impl MetricsSink for NoOpSink {
    fn on_evaluation(&self, _stats: &EvaluationStats) {}
}
