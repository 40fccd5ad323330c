use crossbeam_channel::{Receiver, Sender};

use crate::gesture::domain::gesture_event::GestureEvent;
use crate::gesture::domain::gesture_listener::GestureListener;

/// Forwards gestures to another thread over a channel.
///
/// Gestures are detected on the pipeline worker; hosts that react to them
/// elsewhere (a UI loop, the CLI main thread) read from the paired receiver.
pub struct ChannelGestureListener {
    sender: Sender<(u32, GestureEvent)>,
}

impl ChannelGestureListener {
    pub fn new() -> (Self, Receiver<(u32, GestureEvent)>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl GestureListener for ChannelGestureListener {
    fn on_gesture(&mut self, track_id: u32, event: GestureEvent) {
        if self.sender.send((track_id, event)).is_err() {
            log::debug!("Gesture receiver dropped, discarding {event}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwards_events_in_order() {
        let (mut listener, rx) = ChannelGestureListener::new();
        listener.on_gesture(1, GestureEvent::Smile);
        listener.on_gesture(2, GestureEvent::TurnedLeft);

        assert_eq!(rx.try_recv().unwrap(), (1, GestureEvent::Smile));
        assert_eq!(rx.try_recv().unwrap(), (2, GestureEvent::TurnedLeft));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_tolerated() {
        let (mut listener, rx) = ChannelGestureListener::new();
        drop(rx);
        listener.on_gesture(1, GestureEvent::Smile);
    }
}
