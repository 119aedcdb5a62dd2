// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Model performance monitoring hooks. Purely observational — timing reports
// are fire-and-forget and never affect the detection result.

use std::time::Duration;

/// The two instrumented phases of a frame analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreProcessing,
    Inference,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PreProcessing => "pre-processing",
            Self::Inference => "inference",
        }
    }
}

/// Receives per-phase timing and free-text stats for each analysed frame.
pub trait ModelPerformanceMonitor: Send + Sync {
    fn record(&self, phase: Phase, elapsed: Duration, stats: &str);
}

/// Emits phase timings as `tracing` debug events.
#[derive(Debug, Default)]
pub struct TracingMonitor;

impl ModelPerformanceMonitor for TracingMonitor {
    fn record(&self, phase: Phase, elapsed: Duration, stats: &str) {
        tracing::debug!(
            phase = phase.name(),
            elapsed_ms = elapsed.as_millis() as u64,
            stats,
            "model phase complete"
        );
    }
}

/// Discards all reports.
#[derive(Debug, Default)]
pub struct NoopMonitor;

impl ModelPerformanceMonitor for NoopMonitor {
    fn record(&self, _phase: Phase, _elapsed: Duration, _stats: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Test double that captures every report.
    #[derive(Default)]
    struct RecordingMonitor {
        reports: Mutex<Vec<(Phase, String)>>,
    }

    impl ModelPerformanceMonitor for RecordingMonitor {
        fn record(&self, phase: Phase, _elapsed: Duration, stats: &str) {
            self.reports
                .lock()
                .expect("lock")
                .push((phase, stats.to_string()));
        }
    }

    #[test]
    fn phase_names() {
        assert_eq!(Phase::PreProcessing.name(), "pre-processing");
        assert_eq!(Phase::Inference.name(), "inference");
    }

    #[test]
    fn recording_monitor_captures_reports() {
        let monitor = RecordingMonitor::default();
        monitor.record(Phase::Inference, Duration::from_millis(3), "ok");
        let reports = monitor.reports.lock().expect("lock");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, Phase::Inference);
    }
}
