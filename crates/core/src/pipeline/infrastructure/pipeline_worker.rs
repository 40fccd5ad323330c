use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crossbeam_channel::{select, Receiver, Sender};
use image::RgbImage;

use crate::detection::domain::detector::{
    panic_message, DetectionOutcome, DetectionTask, Detector, DetectorError,
};
use crate::pipeline::camera_image::to_rgb_image;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::resource_monitor::ResourceMonitor;
use crate::pipeline::result_consumer::ResultConsumer;
use crate::pipeline::telemetry::{DiagnosticRecord, FpsCounter, LatencyStats};
use crate::shared::frame::Frame;

pub(crate) enum Command {
    Submit(Frame),
    Snapshot(Sender<PipelineSnapshot>),
    Stop,
}

/// Point-in-time copy of the pipeline's counters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineSnapshot {
    pub latency: LatencyStats,
    pub fps: FpsCounter,
    pub dropped_frames: u64,
    pub in_flight: bool,
    pub shut_down: bool,
    pub detector_closed: bool,
}

struct InFlight<T> {
    // Held until the detection resolves; dropping it releases the frame.
    frame: Frame,
    task: DetectionTask<T>,
    started: Instant,
    camera_image: Option<RgbImage>,
}

pub(crate) struct WorkerOptions {
    pub fps_window: Duration,
    pub always_show_fps: bool,
    pub capture_camera_image: bool,
    pub resource_monitor: Box<dyn ResourceMonitor>,
    pub logger: Box<dyn PipelineLogger>,
}

/// Single owner of the detector, the consumer and every counter.
///
/// Layout: `camera thread → commands → worker [detect / complete / tick] → consumer`
///
/// Submissions, detector completions and FPS ticks are all handled on this
/// one thread, so counters are never updated concurrently and the consumer
/// is never called re-entrantly.
pub(crate) struct PipelineWorker<D: Detector, C> {
    detector: D,
    consumer: C,
    options: WorkerOptions,
    ticker: Receiver<Instant>,
    latency: LatencyStats,
    fps: FpsCounter,
    dropped_frames: u64,
    in_flight: Option<InFlight<D::Output>>,
    shut_down: bool,
    detector_closed: bool,
}

impl<D, C> PipelineWorker<D, C>
where
    D: Detector,
    C: ResultConsumer<D::Output>,
{
    pub fn new(detector: D, consumer: C, options: WorkerOptions) -> Self {
        let ticker = crossbeam_channel::tick(options.fps_window);
        Self {
            detector,
            consumer,
            options,
            ticker,
            latency: LatencyStats::default(),
            fps: FpsCounter::default(),
            dropped_frames: 0,
            in_flight: None,
            shut_down: false,
            detector_closed: false,
        }
    }

    /// Runs until every command sender is dropped.
    pub fn run(mut self, commands: Receiver<Command>) {
        loop {
            let ticker = self.ticker.clone();
            let pending = self
                .in_flight
                .as_ref()
                .map(|f| f.task.receiver().clone())
                .unwrap_or_else(crossbeam_channel::never);

            select! {
                recv(commands) -> command => match command {
                    Ok(command) => {
                        // A completion that raced with this command is
                        // handled first, so commands see up-to-date state.
                        self.poll_in_flight();
                        self.handle(command);
                    }
                    Err(_) => break,
                },
                recv(ticker) -> _ => self.fps.tick(),
                recv(pending) -> outcome => {
                    self.finish(outcome.unwrap_or(Err(DetectorError::Abandoned)));
                }
            }
        }
        self.teardown();
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Submit(frame) => self.submit(frame),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Stop => self.stop(),
        }
    }

    fn submit(&mut self, frame: Frame) {
        if self.shut_down {
            log::trace!("Pipeline shut down, releasing frame {}", frame.index());
            return;
        }
        if self.in_flight.is_some() {
            self.dropped_frames += 1;
            self.options.logger.dropped_frame(frame.index());
            return;
        }
        self.start(frame);
    }

    fn start(&mut self, frame: Frame) {
        let started = Instant::now();
        let detector = &mut self.detector;
        let task = panic::catch_unwind(AssertUnwindSafe(|| detector.detect(frame.image())))
            .unwrap_or_else(|payload| {
                DetectionTask::ready(Err(DetectorError::Panicked(panic_message(&*payload))))
            });

        // Decoded after detection has started so the detector never waits on it.
        let camera_image = if self.options.capture_camera_image {
            to_rgb_image(frame.image())
                .map_err(|e| log::warn!("Could not decode still for frame {}: {e}", frame.index()))
                .ok()
        } else {
            None
        };

        self.in_flight = Some(InFlight {
            frame,
            task,
            started,
            camera_image,
        });
        self.poll_in_flight();
    }

    fn poll_in_flight(&mut self) {
        let outcome = self.in_flight.as_ref().and_then(|f| f.task.try_outcome());
        if let Some(outcome) = outcome {
            self.finish(outcome);
        }
    }

    fn finish(&mut self, outcome: DetectionOutcome<D::Output>) {
        let Some(InFlight {
            frame,
            started,
            camera_image,
            ..
        }) = self.in_flight.take()
        else {
            return;
        };
        let latency = started.elapsed();

        if self.shut_down {
            log::trace!("Ignoring completion for frame {} after stop", frame.index());
            drop(frame);
            self.close_detector();
            return;
        }

        match outcome {
            Ok(result) => {
                self.latency.record(latency);
                if self.fps.record() {
                    let record = DiagnosticRecord::from_stats(
                        &self.latency,
                        self.options.resource_monitor.available_memory_mb(),
                    );
                    self.options.logger.diagnostic(&record);
                }
                let fps = (self.options.always_show_fps || self.fps.processed_in_window() > 0)
                    .then(|| self.fps.frames_per_second());
                self.consumer
                    .on_result(result, latency, fps, camera_image.as_ref());
            }
            Err(error) => {
                self.options.logger.failure(&error);
                self.consumer.on_failure(&error);
            }
        }
        drop(frame);
    }

    fn stop(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.latency.reset();
        self.ticker = crossbeam_channel::never();
        log::debug!("Frame pipeline stopped");
        // With a detection in flight the detector is closed once it resolves.
        if self.in_flight.is_none() {
            self.close_detector();
        }
    }

    fn close_detector(&mut self) {
        if !self.detector_closed {
            self.detector_closed = true;
            self.detector.close();
        }
    }

    fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            latency: self.latency,
            fps: self.fps,
            dropped_frames: self.dropped_frames,
            in_flight: self.in_flight.is_some(),
            shut_down: self.shut_down,
            detector_closed: self.detector_closed,
        }
    }

    fn teardown(mut self) {
        self.stop();
        if let Some(InFlight { frame, task, .. }) = self.in_flight.take() {
            // The camera gets the buffer back only once the detector is done with it.
            let _ = task.wait();
            drop(frame);
        }
        self.close_detector();
        self.options.logger.summary();
    }
}
