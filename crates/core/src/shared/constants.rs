/// Eye-open probability above which an eye counts as open.
pub const OPENED_EYE_MIN_THRESHOLD: f32 = 0.95;
/// Eye-open probability below which an eye counts as closed.
pub const CLOSED_EYE_MAX_THRESHOLD: f32 = 0.1;

pub const SMILING_MIN_THRESHOLD: f32 = 0.95;
pub const NOT_SMILING_MAX_THRESHOLD: f32 = 0.1;

/// Head Euler angle (degrees) beyond which the head counts as turned or tilted.
pub const HEAD_MOVED_MIN_DEGREES: f32 = 30.0;
/// All three angles must be strictly inside this bound for the head to be centred again.
pub const HEAD_CENTRED_MAX_DEGREES: f32 = 10.0;

/// Length of one FPS sampling window.
pub const FPS_WINDOW_MS: u64 = 1000;

pub const SETTINGS_DIR_NAME: &str = "FaceGesture";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
