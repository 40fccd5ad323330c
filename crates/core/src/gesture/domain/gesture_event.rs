use std::fmt;

use serde::{Deserialize, Serialize};

/// A discrete, one-shot gesture derived from a tracked face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureEvent {
    LeftEyeWink,
    RightEyeWink,
    Smile,
    TurnedUp,
    TurnedDown,
    TurnedLeft,
    TurnedRight,
    TiltedLeft,
    TiltedRight,
}

impl GestureEvent {
    pub const ALL: &[GestureEvent] = &[
        GestureEvent::LeftEyeWink,
        GestureEvent::RightEyeWink,
        GestureEvent::Smile,
        GestureEvent::TurnedUp,
        GestureEvent::TurnedDown,
        GestureEvent::TurnedLeft,
        GestureEvent::TurnedRight,
        GestureEvent::TiltedLeft,
        GestureEvent::TiltedRight,
    ];
}

impl fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureEvent::LeftEyeWink => write!(f, "Left eye wink"),
            GestureEvent::RightEyeWink => write!(f, "Right eye wink"),
            GestureEvent::Smile => write!(f, "Smile"),
            GestureEvent::TurnedUp => write!(f, "Face turned up"),
            GestureEvent::TurnedDown => write!(f, "Face turned down"),
            GestureEvent::TurnedLeft => write!(f, "Face turned left"),
            GestureEvent::TurnedRight => write!(f, "Face turned right"),
            GestureEvent::TiltedLeft => write!(f, "Face tilted left"),
            GestureEvent::TiltedRight => write!(f, "Face tilted right"),
        }
    }
}
