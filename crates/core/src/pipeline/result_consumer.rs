use std::time::Duration;

use image::RgbImage;

use crate::detection::domain::detector::DetectorError;

/// Receives the outcome of every detection the pipeline completes.
///
/// Called on the pipeline worker thread, one call at a time, in completion
/// order. `fps` is the last published frames-per-second sample, when the
/// pipeline decides to attach one. `camera_image` is the decoded still of
/// the frame, present only when still capture is enabled and succeeded.
pub trait ResultConsumer<T>: Send {
    fn on_result(
        &mut self,
        result: T,
        latency: Duration,
        fps: Option<u32>,
        camera_image: Option<&RgbImage>,
    );

    fn on_failure(&mut self, error: &DetectorError);
}
