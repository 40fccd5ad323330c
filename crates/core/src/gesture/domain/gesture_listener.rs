use crate::gesture::domain::gesture_event::GestureEvent;

/// Receives gestures as they are detected, one callback per gesture kind.
///
/// Every callback defaults to a no-op so listeners only implement what they
/// care about. `on_gesture` is the single entry point the detector calls;
/// override it instead to handle all kinds in one place.
pub trait GestureListener: Send {
    fn on_left_eye_wink(&mut self, _track_id: u32) {}
    fn on_right_eye_wink(&mut self, _track_id: u32) {}
    fn on_smile(&mut self, _track_id: u32) {}
    fn on_turned_up(&mut self, _track_id: u32) {}
    fn on_turned_down(&mut self, _track_id: u32) {}
    fn on_turned_left(&mut self, _track_id: u32) {}
    fn on_turned_right(&mut self, _track_id: u32) {}
    fn on_tilted_left(&mut self, _track_id: u32) {}
    fn on_tilted_right(&mut self, _track_id: u32) {}

    fn on_gesture(&mut self, track_id: u32, event: GestureEvent) {
        match event {
            GestureEvent::LeftEyeWink => self.on_left_eye_wink(track_id),
            GestureEvent::RightEyeWink => self.on_right_eye_wink(track_id),
            GestureEvent::Smile => self.on_smile(track_id),
            GestureEvent::TurnedUp => self.on_turned_up(track_id),
            GestureEvent::TurnedDown => self.on_turned_down(track_id),
            GestureEvent::TurnedLeft => self.on_turned_left(track_id),
            GestureEvent::TurnedRight => self.on_turned_right(track_id),
            GestureEvent::TiltedLeft => self.on_tilted_left(track_id),
            GestureEvent::TiltedRight => self.on_tilted_right(track_id),
        }
    }
}

/// Listener that ignores every gesture.
pub struct NullGestureListener;

impl GestureListener for NullGestureListener {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct KindRecorder {
        calls: Vec<(&'static str, u32)>,
    }

    impl GestureListener for KindRecorder {
        fn on_left_eye_wink(&mut self, track_id: u32) {
            self.calls.push(("left_wink", track_id));
        }
        fn on_right_eye_wink(&mut self, track_id: u32) {
            self.calls.push(("right_wink", track_id));
        }
        fn on_smile(&mut self, track_id: u32) {
            self.calls.push(("smile", track_id));
        }
        fn on_turned_up(&mut self, track_id: u32) {
            self.calls.push(("up", track_id));
        }
        fn on_turned_down(&mut self, track_id: u32) {
            self.calls.push(("down", track_id));
        }
        fn on_turned_left(&mut self, track_id: u32) {
            self.calls.push(("left", track_id));
        }
        fn on_turned_right(&mut self, track_id: u32) {
            self.calls.push(("right", track_id));
        }
        fn on_tilted_left(&mut self, track_id: u32) {
            self.calls.push(("tilt_left", track_id));
        }
        fn on_tilted_right(&mut self, track_id: u32) {
            self.calls.push(("tilt_right", track_id));
        }
    }

    #[test]
    fn test_on_gesture_routes_each_kind_to_its_callback() {
        let mut recorder = KindRecorder::default();
        for (i, event) in GestureEvent::ALL.iter().enumerate() {
            recorder.on_gesture(i as u32, *event);
        }
        assert_eq!(
            recorder.calls,
            vec![
                ("left_wink", 0),
                ("right_wink", 1),
                ("smile", 2),
                ("up", 3),
                ("down", 4),
                ("left", 5),
                ("right", 6),
                ("tilt_left", 7),
                ("tilt_right", 8),
            ]
        );
    }

    #[test]
    fn test_null_listener_accepts_everything() {
        let mut listener = NullGestureListener;
        for event in GestureEvent::ALL {
            listener.on_gesture(1, *event);
        }
    }
}
