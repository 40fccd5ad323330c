use std::collections::HashMap;

use crate::detection::domain::feature_reading::FeatureReading;
use crate::gesture::domain::eviction_policy::EvictionPolicy;
use crate::gesture::domain::gesture_event::GestureEvent;
use crate::gesture::domain::gesture_listener::GestureListener;
use crate::gesture::domain::gesture_thresholds::GestureThresholds;
use crate::gesture::domain::track_state::TrackState;

struct TrackEntry {
    state: TrackState,
    last_seen_frame: u64,
}

/// Turns per-frame face readings into debounced gesture events.
///
/// Keeps one [`TrackState`] per track id, created on first sighting.
/// Not thread-safe by itself: the owner must call it from one thread at a
/// time (the frame pipeline calls it from its worker).
pub struct FaceMovementDetector {
    tracks: HashMap<u32, TrackEntry>,
    thresholds: GestureThresholds,
    eviction: EvictionPolicy,
    listener: Box<dyn GestureListener>,
    frame: u64,
}

impl FaceMovementDetector {
    pub fn new(listener: Box<dyn GestureListener>) -> Self {
        Self::with_config(listener, GestureThresholds::default(), EvictionPolicy::Never)
    }

    pub fn with_config(
        listener: Box<dyn GestureListener>,
        thresholds: GestureThresholds,
        eviction: EvictionPolicy,
    ) -> Self {
        Self {
            tracks: HashMap::new(),
            thresholds,
            eviction,
            listener,
            frame: 0,
        }
    }

    /// Evaluates one reading against its track, notifies the listener and
    /// returns the events fired. Incomplete readings are ignored.
    pub fn detect_movement(&mut self, reading: &FeatureReading) -> Vec<GestureEvent> {
        let Some(reading) = reading.complete() else {
            return Vec::new();
        };

        let frame = self.frame;
        let entry = self
            .tracks
            .entry(reading.track_id)
            .or_insert_with(|| TrackEntry {
                state: TrackState::default(),
                last_seen_frame: frame,
            });
        entry.last_seen_frame = frame;

        let events = entry.state.step(&reading, &self.thresholds);
        for event in &events {
            log::debug!("Face {}: {event}", reading.track_id);
            self.listener.on_gesture(reading.track_id, *event);
        }
        events
    }

    /// Evaluates every reading of one detection result, then applies the
    /// eviction policy. Returns `(track_id, event)` pairs in reading order.
    pub fn process_frame(&mut self, readings: &[FeatureReading]) -> Vec<(u32, GestureEvent)> {
        let mut fired = Vec::new();
        for reading in readings {
            let events = self.detect_movement(reading);
            if let Some(track_id) = reading.track_id {
                fired.extend(events.into_iter().map(|event| (track_id, event)));
            }
        }
        self.evict();
        self.frame += 1;
        fired
    }

    pub fn track_state(&self, track_id: u32) -> Option<&TrackState> {
        self.tracks.get(&track_id).map(|entry| &entry.state)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn evict(&mut self) {
        if self.eviction == EvictionPolicy::Never {
            return;
        }
        let last_seen: HashMap<u32, u64> = self
            .tracks
            .iter()
            .map(|(&id, entry)| (id, entry.last_seen_frame))
            .collect();
        for id in self.eviction.select_evictions(&last_seen, self.frame) {
            self.tracks.remove(&id);
            log::debug!("Evicted gesture state for face {id}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(u32, GestureEvent)>>>;

    struct RecordingListener {
        log: Log,
    }

    impl GestureListener for RecordingListener {
        fn on_gesture(&mut self, track_id: u32, event: GestureEvent) {
            self.log.lock().unwrap().push((track_id, event));
        }
    }

    fn detector_with(eviction: EvictionPolicy) -> (FaceMovementDetector, Log) {
        let log: Log = Arc::default();
        let listener = Box::new(RecordingListener { log: log.clone() });
        (
            FaceMovementDetector::with_config(listener, GestureThresholds::default(), eviction),
            log,
        )
    }

    fn reading(track_id: u32, left: f32, right: f32, smiling: f32) -> FeatureReading {
        FeatureReading {
            track_id: Some(track_id),
            left_eye_open_probability: Some(left),
            right_eye_open_probability: Some(right),
            smiling_probability: Some(smiling),
            ..Default::default()
        }
    }

    fn neutral(track_id: u32) -> FeatureReading {
        reading(track_id, 0.99, 0.99, 0.5)
    }

    #[test]
    fn test_listener_receives_events_with_track_id() {
        let (mut detector, log) = detector_with(EvictionPolicy::Never);

        let events = detector.detect_movement(&reading(3, 0.99, 0.02, 0.5));

        assert_eq!(events, vec![GestureEvent::RightEyeWink]);
        assert_eq!(*log.lock().unwrap(), vec![(3, GestureEvent::RightEyeWink)]);
    }

    #[test]
    fn test_wink_then_reopen_restores_both_eyes_open() {
        let (mut detector, log) = detector_with(EvictionPolicy::Never);

        detector.detect_movement(&reading(1, 0.99, 0.02, 0.5));
        assert!(!detector.track_state(1).unwrap().both_eyes_open);
        let second = detector.detect_movement(&reading(1, 0.99, 0.99, 0.5));

        assert!(second.is_empty());
        assert!(detector.track_state(1).unwrap().both_eyes_open);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_incomplete_readings_create_no_state() {
        let (mut detector, log) = detector_with(EvictionPolicy::Never);

        let untracked = FeatureReading {
            track_id: None,
            ..reading(1, 0.99, 0.02, 0.99)
        };
        let no_smile = FeatureReading {
            smiling_probability: None,
            ..reading(2, 0.99, 0.02, 0.99)
        };
        detector.detect_movement(&untracked);
        detector.detect_movement(&no_smile);

        assert_eq!(detector.track_count(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_interleaved_tracks_are_independent() {
        let (mut detector, _log) = detector_with(EvictionPolicy::Never);

        let a1 = detector.detect_movement(&reading(1, 0.99, 0.02, 0.97));
        let b1 = detector.detect_movement(&reading(2, 0.99, 0.99, 0.97));
        let a2 = detector.detect_movement(&reading(1, 0.99, 0.02, 0.97));
        let b2 = detector.detect_movement(&reading(2, 0.99, 0.02, 0.05));

        assert_eq!(a1, vec![GestureEvent::RightEyeWink, GestureEvent::Smile]);
        assert_eq!(b1, vec![GestureEvent::Smile]);
        assert!(a2.is_empty());
        assert_eq!(b2, vec![GestureEvent::RightEyeWink]);
        assert!(detector.track_state(1).unwrap().is_smiling);
        assert!(!detector.track_state(2).unwrap().is_smiling);
    }

    #[test]
    fn test_one_state_per_distinct_track() {
        let (mut detector, _log) = detector_with(EvictionPolicy::Never);

        for _ in 0..3 {
            detector.process_frame(&[neutral(1), neutral(2), neutral(1)]);
        }

        assert_eq!(detector.track_count(), 2);
    }

    #[test]
    fn test_process_frame_pairs_events_with_tracks() {
        let (mut detector, _log) = detector_with(EvictionPolicy::Never);

        let fired = detector.process_frame(&[
            reading(5, 0.02, 0.99, 0.5),
            neutral(6),
            reading(7, 0.99, 0.99, 0.99),
        ]);

        assert_eq!(
            fired,
            vec![(5, GestureEvent::LeftEyeWink), (7, GestureEvent::Smile)]
        );
    }

    #[test]
    fn test_never_policy_keeps_stale_tracks() {
        let (mut detector, _log) = detector_with(EvictionPolicy::Never);

        detector.process_frame(&[neutral(1)]);
        for _ in 0..100 {
            detector.process_frame(&[]);
        }

        assert!(detector.track_state(1).is_some());
    }

    #[test]
    fn test_idle_policy_forgets_and_recreates_track() {
        let (mut detector, log) = detector_with(EvictionPolicy::IdleFrames(2));

        detector.process_frame(&[reading(1, 0.99, 0.99, 0.99)]); // frame 0: smile
        detector.process_frame(&[neutral(2)]); // frame 1
        detector.process_frame(&[neutral(2)]); // frame 2
        assert!(detector.track_state(1).is_some());
        detector.process_frame(&[neutral(2)]); // frame 3: track 1 idle for 3 frames
        assert!(detector.track_state(1).is_none());

        // A fresh state for the same id fires again without a re-arm reading.
        detector.process_frame(&[reading(1, 0.99, 0.99, 0.99)]);
        let smiles = log
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, e)| *id == 1 && *e == GestureEvent::Smile)
            .count();
        assert_eq!(smiles, 2);
    }

    #[test]
    fn test_capacity_policy_keeps_most_recent_tracks() {
        let (mut detector, _log) = detector_with(EvictionPolicy::Capacity(2));

        detector.process_frame(&[neutral(1)]);
        detector.process_frame(&[neutral(2)]);
        detector.process_frame(&[neutral(3)]);

        assert_eq!(detector.track_count(), 2);
        assert!(detector.track_state(1).is_none());
        assert!(detector.track_state(2).is_some());
        assert!(detector.track_state(3).is_some());
    }
}
