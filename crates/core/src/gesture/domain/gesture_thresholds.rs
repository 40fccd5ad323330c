use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    CLOSED_EYE_MAX_THRESHOLD, HEAD_CENTRED_MAX_DEGREES, HEAD_MOVED_MIN_DEGREES,
    NOT_SMILING_MAX_THRESHOLD, OPENED_EYE_MIN_THRESHOLD, SMILING_MIN_THRESHOLD,
};

/// Hysteresis bounds for gesture detection.
///
/// Each gesture fires when its value crosses the high bound and re-arms only
/// after the value falls back past the low bound. All comparisons are strict.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    pub eye_open_min: f32,
    pub eye_closed_max: f32,
    pub smiling_min: f32,
    pub not_smiling_max: f32,
    pub head_moved_min_degrees: f32,
    pub head_centred_max_degrees: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            eye_open_min: OPENED_EYE_MIN_THRESHOLD,
            eye_closed_max: CLOSED_EYE_MAX_THRESHOLD,
            smiling_min: SMILING_MIN_THRESHOLD,
            not_smiling_max: NOT_SMILING_MAX_THRESHOLD,
            head_moved_min_degrees: HEAD_MOVED_MIN_DEGREES,
            head_centred_max_degrees: HEAD_CENTRED_MAX_DEGREES,
        }
    }
}

impl GestureThresholds {
    pub fn is_eye_open(&self, probability: f32) -> bool {
        probability > self.eye_open_min
    }

    pub fn is_eye_closed(&self, probability: f32) -> bool {
        probability < self.eye_closed_max
    }

    pub fn is_centred(&self, degrees: f32) -> bool {
        degrees > -self.head_centred_max_degrees && degrees < self.head_centred_max_degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::above(0.96, true)]
    #[case::at_bound(0.95, false)]
    #[case::below(0.5, false)]
    fn test_eye_open_is_strict(#[case] probability: f32, #[case] expected: bool) {
        assert_eq!(GestureThresholds::default().is_eye_open(probability), expected);
    }

    #[rstest]
    #[case::inside(9.9, true)]
    #[case::upper_bound(10.0, false)]
    #[case::lower_bound(-10.0, false)]
    #[case::negative_inside(-3.0, true)]
    fn test_centred_is_open_interval(#[case] degrees: f32, #[case] expected: bool) {
        assert_eq!(GestureThresholds::default().is_centred(degrees), expected);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let thresholds: GestureThresholds =
            serde_json::from_str(r#"{"smiling_min": 0.8}"#).unwrap();
        assert_eq!(thresholds.smiling_min, 0.8);
        assert_eq!(thresholds.eye_open_min, OPENED_EYE_MIN_THRESHOLD);
    }
}
