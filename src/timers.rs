//! Phase timing for evaluations.
//!
//! `PhaseTimer` adds the time between its creation and its drop to a
//! `Duration` slot, so early returns are still measured.

use std::time::{Duration, Instant};

use crate::metrics::EvaluationPhases;

pub struct PhaseTimer<'a> {
    start: Instant,
    slot: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(slot: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            slot,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        *self.slot += self.start.elapsed();
    }
}

/// Time spent in each step of one evaluation.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PhaseDurations {
    pub resolve_namespace: Duration,
    pub classify: Duration,
    pub enforce: Duration,
}

impl PhaseDurations {
    pub fn into_phases(self, total: Duration) -> EvaluationPhases {
        EvaluationPhases {
            resolve_namespace_ms: millis(self.resolve_namespace),
            classify_ms: millis(self.classify),
            enforce_ms: millis(self.enforce),
            total_ms: millis(total),
        }
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
