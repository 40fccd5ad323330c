use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::detection::domain::detector::Detector;
use crate::pipeline::infrastructure::pipeline_worker::{Command, PipelineWorker, WorkerOptions};
use crate::pipeline::infrastructure::proc_meminfo_monitor::ProcMeminfoMonitor;
use crate::pipeline::pipeline_logger::{LogPipelineLogger, PipelineLogger};
use crate::pipeline::resource_monitor::ResourceMonitor;
use crate::pipeline::result_consumer::ResultConsumer;
use crate::shared::constants::FPS_WINDOW_MS;
use crate::shared::frame::Frame;
use crate::shared::settings::Settings;

pub use crate::pipeline::infrastructure::pipeline_worker::PipelineSnapshot;

/// Configuration for a frame pipeline.
pub struct PipelineConfig {
    /// Length of one FPS sampling window; the first tick fires one window
    /// after construction.
    pub fps_window: Duration,
    pub always_show_fps: bool,
    /// Decode an upright RGB still of each dispatched frame for the consumer.
    pub capture_camera_image: bool,
    pub resource_monitor: Box<dyn ResourceMonitor>,
    pub logger: Box<dyn PipelineLogger>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fps_window: Duration::from_millis(FPS_WINDOW_MS),
            always_show_fps: false,
            capture_camera_image: false,
            resource_monitor: Box::new(ProcMeminfoMonitor::new()),
            logger: Box::new(LogPipelineLogger::new()),
        }
    }
}

impl PipelineConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            fps_window: Duration::from_millis(settings.fps_window_ms.max(1)),
            always_show_fps: settings.always_show_fps,
            capture_camera_image: !settings.camera_live_viewport,
            ..Self::default()
        }
    }
}

/// Feeds camera frames to a detector, one detection at a time.
///
/// A frame submitted while a detection is in flight is released straight
/// back to the camera, so a slow detector lowers the processed frame rate
/// instead of building a queue. Every submitted frame is released exactly
/// once: dispatched frames after their detection resolves, all others
/// immediately.
///
/// Dropping the pipeline stops it, waits for any in-flight detection to
/// resolve, closes the detector and joins the worker thread.
pub struct FramePipeline {
    commands: Option<Sender<Command>>,
    shut_down: AtomicBool,
    worker: Option<JoinHandle<()>>,
}

impl FramePipeline {
    pub fn new<D, C>(detector: D, consumer: C, config: PipelineConfig) -> Self
    where
        D: Detector + 'static,
        C: ResultConsumer<D::Output> + 'static,
    {
        let options = WorkerOptions {
            fps_window: config.fps_window,
            always_show_fps: config.always_show_fps,
            capture_camera_image: config.capture_camera_image,
            resource_monitor: config.resource_monitor,
            logger: config.logger,
        };
        let (tx, rx) = crossbeam_channel::unbounded();
        let worker = PipelineWorker::new(detector, consumer, options);
        let handle = std::thread::spawn(move || worker.run(rx));

        Self {
            commands: Some(tx),
            shut_down: AtomicBool::new(false),
            worker: Some(handle),
        }
    }

    /// Hands a frame to the pipeline. Never blocks on the detector.
    pub fn submit(&self, frame: Frame) {
        if self.is_shut_down() {
            log::trace!("Pipeline shut down, releasing frame {}", frame.index());
            return;
        }
        if let Some(commands) = &self.commands {
            // If the worker is gone the frame comes back inside the error and
            // is released when that is dropped.
            let _ = commands.send(Command::Submit(frame));
        }
    }

    /// Stops processing: later completions are ignored, latency counters are
    /// zeroed and FPS sampling ends. The detector is closed right away, or
    /// once an in-flight detection resolves. Safe to call more than once.
    pub fn stop(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(commands) = &self.commands {
            let _ = commands.send(Command::Stop);
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Reads the counters through the worker. Frames submitted before this
    /// call have been handled by the time it returns.
    pub fn snapshot(&self) -> Option<PipelineSnapshot> {
        let commands = self.commands.as_ref()?;
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        commands.send(Command::Snapshot(reply_tx)).ok()?;
        reply_rx.recv().ok()
    }
}

impl Drop for FramePipeline {
    fn drop(&mut self) {
        self.stop();
        self.commands.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("Frame pipeline worker panicked");
            }
        }
    }
}
