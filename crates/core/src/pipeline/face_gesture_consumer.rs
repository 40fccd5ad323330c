use std::time::Duration;

use image::RgbImage;

use crate::detection::domain::detector::DetectorError;
use crate::detection::domain::feature_reading::FeatureReading;
use crate::gesture::domain::face_movement_detector::FaceMovementDetector;
use crate::pipeline::result_consumer::ResultConsumer;

/// Draws detection results for the user. Implemented by the host's overlay.
pub trait ResultRenderer: Send {
    fn render(
        &mut self,
        readings: &[FeatureReading],
        latency: Duration,
        fps: Option<u32>,
        camera_image: Option<&RgbImage>,
    );

    /// Removes stale results after a failed detection.
    fn clear(&mut self);
}

/// Connects a face detector's results to gesture detection and rendering.
pub struct FaceGestureConsumer {
    movement_detector: FaceMovementDetector,
    renderer: Option<Box<dyn ResultRenderer>>,
}

impl FaceGestureConsumer {
    pub fn new(
        movement_detector: FaceMovementDetector,
        renderer: Option<Box<dyn ResultRenderer>>,
    ) -> Self {
        Self {
            movement_detector,
            renderer,
        }
    }

    pub fn movement_detector(&self) -> &FaceMovementDetector {
        &self.movement_detector
    }
}

impl ResultConsumer<Vec<FeatureReading>> for FaceGestureConsumer {
    fn on_result(
        &mut self,
        readings: Vec<FeatureReading>,
        latency: Duration,
        fps: Option<u32>,
        camera_image: Option<&RgbImage>,
    ) {
        for reading in &readings {
            log::trace!(
                "Face {:?}: eyes {:?}/{:?}, smiling {:?}, angles ({:.1}, {:.1}, {:.1})",
                reading.track_id,
                reading.left_eye_open_probability,
                reading.right_eye_open_probability,
                reading.smiling_probability,
                reading.head_euler_angle_x,
                reading.head_euler_angle_y,
                reading.head_euler_angle_z
            );
        }

        self.movement_detector.process_frame(&readings);

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&readings, latency, fps, camera_image);
        }
    }

    fn on_failure(&mut self, error: &DetectorError) {
        log::debug!("Face detection failed: {error}");
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.clear();
        }
    }
}
