use serde::{Deserialize, Serialize};

/// One subject's measurements for one frame, as reported by a face detector.
///
/// Classification fields are optional because detectors only fill them in
/// when classification is enabled and the face is clear enough. Head angles
/// are Euler angles in degrees: x is pitch, y is yaw, z is roll.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureReading {
    pub track_id: Option<u32>,
    pub left_eye_open_probability: Option<f32>,
    pub right_eye_open_probability: Option<f32>,
    pub smiling_probability: Option<f32>,
    #[serde(default)]
    pub head_euler_angle_x: f32,
    #[serde(default)]
    pub head_euler_angle_y: f32,
    #[serde(default)]
    pub head_euler_angle_z: f32,
}

/// A reading with every field the gesture state machine needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompleteReading {
    pub track_id: u32,
    pub left_eye_open: f32,
    pub right_eye_open: f32,
    pub smiling: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl FeatureReading {
    /// Returns `None` when the track id, either eye probability or the smile
    /// probability is missing. Such readings are skipped, never half-evaluated.
    pub fn complete(&self) -> Option<CompleteReading> {
        Some(CompleteReading {
            track_id: self.track_id?,
            left_eye_open: self.left_eye_open_probability?,
            right_eye_open: self.right_eye_open_probability?,
            smiling: self.smiling_probability?,
            pitch: self.head_euler_angle_x,
            yaw: self.head_euler_angle_y,
            roll: self.head_euler_angle_z,
        })
    }
}
