use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::detection::domain::detector::{DetectionTask, Detector, DetectorError};
use crate::detection::domain::feature_reading::FeatureReading;
use crate::shared::frame::InputImage;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay script {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse replay script {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Recorded detector output, one entry per frame index.
///
/// `None` entries replay as a detector failure for that frame.
pub type ReplayScript = Vec<Option<Vec<FeatureReading>>>;

/// Loads a script from a JSON array whose items are either an array of
/// readings or `null`.
pub fn load_script(path: &Path) -> Result<ReplayScript, ReplayError> {
    let json = fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| ReplayError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Replays recorded face readings by frame index, with an optional
/// simulated inference latency.
///
/// Stands in for a real face detector when exercising the pipeline: frames
/// past the end of the script produce no faces.
pub struct ReplayDetector {
    script: Arc<ReplayScript>,
    latency: Duration,
}

impl ReplayDetector {
    pub fn new(script: Arc<ReplayScript>, latency: Duration) -> Self {
        Self { script, latency }
    }

    fn outcome_for(&self, index: usize) -> Result<Vec<FeatureReading>, DetectorError> {
        match self.script.get(index) {
            Some(Some(readings)) => Ok(readings.clone()),
            Some(None) => Err(DetectorError::Failed(format!(
                "recorded failure at frame {index}"
            ))),
            None => Ok(Vec::new()),
        }
    }
}

impl Detector for ReplayDetector {
    type Output = Vec<FeatureReading>;

    fn detect(&mut self, image: &InputImage) -> DetectionTask<Self::Output> {
        let outcome = self.outcome_for(image.index());
        if self.latency.is_zero() {
            return DetectionTask::ready(outcome);
        }
        let latency = self.latency;
        DetectionTask::spawn(move || {
            thread::sleep(latency);
            outcome
        })
    }
}
