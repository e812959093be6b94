//! Progress sinks receiving completed units of work per phase.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use super::{PHASE_COUNT, Phase};

/// Observer notified as units of work complete.
///
/// Sinks are purely observational: nothing they do may influence the
/// clustering result.
pub trait ProgressSink: Send + Sync {
    /// Records that `units` more units of `phase` have completed.
    fn log_progress(&self, phase: Phase, units: usize);
}

/// Sink that discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn log_progress(&self, _phase: Phase, _units: usize) {}
}

/// Sink that keeps a running total per phase and emits it as a `tracing`
/// event.
///
/// With the `metrics` feature enabled it also increments the
/// `hdbstar_progress_units_total` counter labelled by phase.
///
/// # Examples
/// ```
/// use hdbstar_core::{Phase, ProgressSink, TracingProgress};
///
/// let progress = TracingProgress::default();
/// progress.log_progress(Phase::CoreDistances, 3);
/// progress.log_progress(Phase::CoreDistances, 2);
/// assert_eq!(progress.completed(Phase::CoreDistances), 5);
/// assert_eq!(progress.completed(Phase::Boruvka), 0);
/// ```
#[derive(Debug, Default)]
pub struct TracingProgress {
    completed: [AtomicUsize; PHASE_COUNT],
}

impl TracingProgress {
    /// Returns the total units reported so far for `phase`.
    #[must_use]
    pub fn completed(&self, phase: Phase) -> usize {
        self.completed[phase.index()].load(Ordering::Relaxed)
    }

    #[cfg(feature = "metrics")]
    fn record_units(phase: Phase, units: usize) {
        metrics::counter!("hdbstar_progress_units_total", "phase" => phase.as_str())
            .increment(u64::try_from(units).unwrap_or(u64::MAX));
    }

    #[cfg(not(feature = "metrics"))]
    fn record_units(_phase: Phase, _units: usize) {}
}

impl ProgressSink for TracingProgress {
    fn log_progress(&self, phase: Phase, units: usize) {
        let total = self.completed[phase.index()].fetch_add(units, Ordering::Relaxed) + units;
        Self::record_units(phase, units);
        debug!(phase = phase.as_str(), units, total, "progress");
    }
}
