use crate::detection::domain::feature_reading::CompleteReading;
use crate::gesture::domain::gesture_event::GestureEvent;
use crate::gesture::domain::gesture_thresholds::GestureThresholds;

/// Debounce state for one tracked face.
///
/// Three independent sub-machines (eyes, smile, head) each fire at most one
/// event per reading and then stay latched until their value returns to the
/// neutral band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackState {
    pub both_eyes_open: bool,
    pub is_smiling: bool,
    pub is_head_moving: bool,
}

impl Default for TrackState {
    fn default() -> Self {
        Self {
            both_eyes_open: true,
            is_smiling: false,
            is_head_moving: false,
        }
    }
}

impl TrackState {
    /// Advances all three sub-machines by one reading and returns the events
    /// fired, in eye, smile, head order.
    pub fn step(
        &mut self,
        reading: &CompleteReading,
        thresholds: &GestureThresholds,
    ) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        events.extend(self.step_eyes(reading, thresholds));
        events.extend(self.step_smile(reading, thresholds));
        events.extend(self.step_head(reading, thresholds));
        events
    }

    // Left eye open with right eye shut reports a right-eye wink, and vice
    // versa. Consumers depend on this pairing.
    fn step_eyes(
        &mut self,
        reading: &CompleteReading,
        t: &GestureThresholds,
    ) -> Option<GestureEvent> {
        let left = reading.left_eye_open;
        let right = reading.right_eye_open;

        if self.both_eyes_open && t.is_eye_open(left) && t.is_eye_closed(right) {
            self.both_eyes_open = false;
            Some(GestureEvent::RightEyeWink)
        } else if self.both_eyes_open && t.is_eye_open(right) && t.is_eye_closed(left) {
            self.both_eyes_open = false;
            Some(GestureEvent::LeftEyeWink)
        } else {
            if !self.both_eyes_open && t.is_eye_open(right) && t.is_eye_open(left) {
                self.both_eyes_open = true;
            }
            None
        }
    }

    fn step_smile(
        &mut self,
        reading: &CompleteReading,
        t: &GestureThresholds,
    ) -> Option<GestureEvent> {
        if !self.is_smiling && reading.smiling > t.smiling_min {
            self.is_smiling = true;
            Some(GestureEvent::Smile)
        } else {
            if reading.smiling < t.not_smiling_max {
                self.is_smiling = false;
            }
            None
        }
    }

    fn step_head(
        &mut self,
        reading: &CompleteReading,
        t: &GestureThresholds,
    ) -> Option<GestureEvent> {
        if self.is_head_moving {
            if t.is_centred(reading.pitch) && t.is_centred(reading.yaw) && t.is_centred(reading.roll)
            {
                self.is_head_moving = false;
                log::debug!("Face {} stable in centre", reading.track_id);
            }
            return None;
        }

        let limit = t.head_moved_min_degrees;
        let event = if reading.pitch > limit {
            GestureEvent::TurnedUp
        } else if reading.pitch < -limit {
            GestureEvent::TurnedDown
        } else if reading.yaw > limit {
            GestureEvent::TurnedRight
        } else if reading.yaw < -limit {
            GestureEvent::TurnedLeft
        } else if reading.roll > limit {
            GestureEvent::TiltedRight
        } else if reading.roll < -limit {
            GestureEvent::TiltedLeft
        } else {
            return None;
        };
        self.is_head_moving = true;
        Some(event)
    }
}
