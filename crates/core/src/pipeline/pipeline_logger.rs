use std::time::Instant;

use crate::detection::domain::detector::DetectorError;
use crate::pipeline::telemetry::DiagnosticRecord;

/// Cross-cutting logger for frame pipeline telemetry.
///
/// Decouples the pipeline worker from specific output mechanisms (log
/// crate, GUI overlays, test recorders) so each host can observe latency
/// and throughput without changing the pipeline.
pub trait PipelineLogger: Send {
    /// Periodic latency and resource report, once per FPS window.
    fn diagnostic(&mut self, record: &DiagnosticRecord);

    /// A detection failed. The pipeline keeps running.
    fn failure(&mut self, error: &DetectorError);

    /// A frame arrived while a detection was in flight and was released unprocessed.
    fn dropped_frame(&mut self, frame_index: usize);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn diagnostic(&mut self, _record: &DiagnosticRecord) {}
    fn failure(&mut self, _error: &DetectorError) {}
    fn dropped_frame(&mut self, _frame_index: usize) {}
}

/// Logger that reports through the `log` crate and keeps enough history for
/// a summary when the pipeline shuts down.
///
/// Diagnostics go out at debug level, failures at warn; dropped frames are
/// only counted since a fast camera drops most frames behind a slow detector.
pub struct LogPipelineLogger {
    start_time: Instant,
    last_diagnostic: Option<DiagnosticRecord>,
    diagnostics: usize,
    failures: usize,
    dropped_frames: usize,
}

impl LogPipelineLogger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            last_diagnostic: None,
            diagnostics: 0,
            failures: 0,
            dropped_frames: 0,
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.diagnostics == 0 && self.failures == 0 && self.dropped_frames == 0 {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!("Frame pipeline summary ({elapsed_s:.1}s):")];

        if let Some(record) = &self.last_diagnostic {
            lines.push(format!(
                "  latency: avg {:6.1}ms  min {:6.1}ms  max {:6.1}ms  ({} runs)",
                record.avg_latency_ms,
                record.min_latency_ms,
                record.max_latency_ms,
                record.run_count
            ));
        }
        lines.push(format!("  failures: {}", self.failures));
        lines.push(format!("  dropped frames: {}", self.dropped_frames));

        Some(lines.join("\n"))
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn dropped_frames(&self) -> usize {
        self.dropped_frames
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn diagnostic(&mut self, record: &DiagnosticRecord) {
        log::debug!("{record}");
        self.diagnostics += 1;
        self.last_diagnostic = Some(record.clone());
    }

    fn failure(&mut self, error: &DetectorError) {
        log::warn!("Detection failed: {error}");
        self.failures += 1;
    }

    fn dropped_frame(&mut self, frame_index: usize) {
        log::trace!("Dropped frame {frame_index}: detector busy");
        self.dropped_frames += 1;
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(run_count: u64) -> DiagnosticRecord {
        DiagnosticRecord {
            max_latency_ms: 40.0,
            min_latency_ms: 10.0,
            avg_latency_ms: 25.0,
            run_count,
            available_memory_mb: Some(1024),
        }
    }

    // --- NullPipelineLogger tests ---

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.diagnostic(&record(1));
        logger.failure(&DetectorError::Abandoned);
        logger.dropped_frame(3);
        logger.summary();
        // No panics = success
    }

    // --- LogPipelineLogger tests ---

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = LogPipelineLogger::new();
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_counts_failures_and_drops() {
        let mut logger = LogPipelineLogger::new();
        logger.failure(&DetectorError::Failed("boom".into()));
        logger.dropped_frame(1);
        logger.dropped_frame(2);

        assert_eq!(logger.failures(), 1);
        assert_eq!(logger.dropped_frames(), 2);
    }

    #[test]
    fn test_summary_uses_latest_diagnostic() {
        let mut logger = LogPipelineLogger::new();
        logger.diagnostic(&record(3));
        logger.diagnostic(&record(9));

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Frame pipeline summary"));
        assert!(summary.contains("(9 runs)"));
        assert!(summary.contains("avg   25.0ms"));
    }

    #[test]
    fn test_summary_without_diagnostics_still_reports_failures() {
        let mut logger = LogPipelineLogger::new();
        logger.failure(&DetectorError::Abandoned);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("failures: 1"));
        assert!(!summary.contains("latency"));
    }
}
