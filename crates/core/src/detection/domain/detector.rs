use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use thiserror::Error;

use crate::shared::frame::InputImage;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("detection failed: {0}")]
    Failed(String),
    #[error("detector panicked: {0}")]
    Panicked(String),
    #[error("detection was abandoned before it completed")]
    Abandoned,
}

/// Capability interface for anything that turns an image into a result.
///
/// `detect` starts the work and returns immediately; the result arrives
/// through the returned task. Implementations may be stateful (e.g. tracking
/// across frames), hence `&mut self`. The frame pipeline never has more
/// than one task from the same detector outstanding.
pub trait Detector: Send {
    type Output: Send + 'static;

    fn detect(&mut self, image: &InputImage) -> DetectionTask<Self::Output>;

    /// Frees detector resources. Called once when the owning pipeline is torn down.
    fn close(&mut self) {}
}

pub type DetectionOutcome<T> = Result<T, DetectorError>;

/// A detection in flight: resolves exactly once, to a result or an error.
pub struct DetectionTask<T> {
    receiver: Receiver<DetectionOutcome<T>>,
}

/// Write side of a [`DetectionTask`], for callback-style detectors.
///
/// `complete` consumes the completer, so a task can never be resolved twice.
/// Dropping it without completing resolves the task to
/// [`DetectorError::Abandoned`].
pub struct DetectionCompleter<T> {
    sender: Sender<DetectionOutcome<T>>,
}

impl<T> DetectionCompleter<T> {
    pub fn complete(self, outcome: DetectionOutcome<T>) {
        // The task may already be gone (pipeline stopped); nobody is waiting then.
        let _ = self.sender.send(outcome);
    }
}

impl<T> DetectionTask<T> {
    pub fn pending() -> (DetectionCompleter<T>, Self) {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        (DetectionCompleter { sender }, Self { receiver })
    }

    pub fn ready(outcome: DetectionOutcome<T>) -> Self {
        let (completer, task) = Self::pending();
        completer.complete(outcome);
        task
    }

    /// Returns the outcome if the task has resolved, without blocking.
    pub fn try_outcome(&self) -> Option<DetectionOutcome<T>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(DetectorError::Abandoned)),
        }
    }

    /// Blocks until the task resolves.
    pub fn wait(self) -> DetectionOutcome<T> {
        self.receiver
            .recv()
            .unwrap_or(Err(DetectorError::Abandoned))
    }

    pub(crate) fn receiver(&self) -> &Receiver<DetectionOutcome<T>> {
        &self.receiver
    }
}

impl<T: Send + 'static> DetectionTask<T> {
    /// Runs `job` on its own thread. A panic inside `job` resolves the task
    /// to [`DetectorError::Panicked`].
    pub fn spawn<F>(job: F) -> Self
    where
        F: FnOnce() -> DetectionOutcome<T> + Send + 'static,
    {
        let (completer, task) = Self::pending();
        thread::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(job))
                .unwrap_or_else(|payload| Err(DetectorError::Panicked(panic_message(&*payload))));
            completer.complete(outcome);
        });
        task
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
