use std::fmt;
use std::time::Duration;

/// Running latency figures over successful detections.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LatencyStats {
    run_count: u64,
    total: Duration,
    max: Duration,
    min: Option<Duration>,
}

impl LatencyStats {
    pub fn record(&mut self, latency: Duration) {
        self.run_count += 1;
        self.total += latency;
        self.max = self.max.max(latency);
        self.min = Some(self.min.map_or(latency, |min| min.min(latency)));
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn run_count(&self) -> u64 {
        self.run_count
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// `None` until the first run is recorded.
    pub fn min(&self) -> Option<Duration> {
        self.min
    }

    pub fn average(&self) -> Option<Duration> {
        if self.run_count == 0 {
            return None;
        }
        let runs = u32::try_from(self.run_count).unwrap_or(u32::MAX);
        Some(self.total / runs)
    }
}

/// Successes per sampling window.
///
/// `record` counts into the open window; `tick` closes it, publishing the
/// count as the current frames-per-second and starting a new window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FpsCounter {
    processed_in_window: u32,
    frames_per_second: u32,
}

impl FpsCounter {
    /// Counts one success. Returns `true` if it is the first of its window.
    pub fn record(&mut self) -> bool {
        self.processed_in_window += 1;
        self.processed_in_window == 1
    }

    pub fn tick(&mut self) {
        self.frames_per_second = self.processed_in_window;
        self.processed_in_window = 0;
    }

    pub fn processed_in_window(&self) -> u32 {
        self.processed_in_window
    }

    /// Count published by the last `tick`.
    pub fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }
}

/// Periodic latency/resource report, emitted once per FPS window.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosticRecord {
    pub max_latency_ms: f64,
    pub min_latency_ms: f64,
    pub avg_latency_ms: f64,
    pub run_count: u64,
    pub available_memory_mb: Option<u64>,
}

impl DiagnosticRecord {
    pub fn from_stats(stats: &LatencyStats, available_memory_mb: Option<u64>) -> Self {
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        Self {
            max_latency_ms: ms(stats.max()),
            min_latency_ms: stats.min().map_or(0.0, ms),
            avg_latency_ms: stats.average().map_or(0.0, ms),
            run_count: stats.run_count(),
            available_memory_mb,
        }
    }
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max latency {:.1}ms, min latency {:.1}ms, runs {}, avg latency {:.1}ms",
            self.max_latency_ms, self.min_latency_ms, self.run_count, self.avg_latency_ms
        )?;
        match self.available_memory_mb {
            Some(mb) => write!(f, ", memory available {mb} MB"),
            None => write!(f, ", memory available unknown"),
        }
    }
}
