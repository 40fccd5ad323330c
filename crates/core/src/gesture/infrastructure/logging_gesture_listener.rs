use crate::gesture::domain::gesture_event::GestureEvent;
use crate::gesture::domain::gesture_listener::GestureListener;

/// Reports every gesture through the `log` crate at info level.
pub struct LoggingGestureListener;

impl GestureListener for LoggingGestureListener {
    fn on_gesture(&mut self, track_id: u32, event: GestureEvent) {
        log::info!("{event} detected (face {track_id})");
    }
}
