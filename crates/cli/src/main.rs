use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;

use facegesture_core::detection::infrastructure::replay_detector::{load_script, ReplayDetector};
use facegesture_core::gesture::domain::eviction_policy::EvictionPolicy;
use facegesture_core::gesture::domain::face_movement_detector::FaceMovementDetector;
use facegesture_core::gesture::domain::gesture_event::GestureEvent;
use facegesture_core::gesture::domain::gesture_listener::GestureListener;
use facegesture_core::gesture::infrastructure::channel_gesture_listener::ChannelGestureListener;
use facegesture_core::gesture::infrastructure::logging_gesture_listener::LoggingGestureListener;
use facegesture_core::pipeline::face_gesture_consumer::FaceGestureConsumer;
use facegesture_core::pipeline::frame_pipeline::{FramePipeline, PipelineConfig, PipelineSnapshot};
use facegesture_core::shared::frame::Frame;
use facegesture_core::shared::settings::Settings;

const FRAME_WIDTH: u32 = 64;
const FRAME_HEIGHT: u32 = 48;
const FRAME_CHANNELS: u8 = 3;

/// Face gesture detection over a stream of camera frames.
#[derive(Parser)]
#[command(name = "facegesture")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay recorded face readings through the frame pipeline.
    Replay(ReplayArgs),
}

#[derive(clap::Args)]
struct ReplayArgs {
    /// JSON file: one entry per frame, an array of readings or null for a failed detection.
    input: PathBuf,

    /// Rate at which synthetic camera frames are submitted.
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Simulated detector latency in milliseconds.
    #[arg(long, default_value = "0")]
    latency_ms: u64,

    /// Settings file (defaults to the per-user settings location).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Attach the FPS sample to every result.
    #[arg(long)]
    always_show_fps: bool,

    /// Track eviction: never, idle:N or capacity:N.
    #[arg(long)]
    eviction: Option<EvictionPolicy>,

    /// Log gestures as they happen instead of listing them at the end.
    #[arg(long)]
    log_events: bool,

    /// Write the effective settings back to the settings file before replaying.
    #[arg(long)]
    save_settings: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => run_replay(args),
    }
}

fn run_replay(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    validate(&args)?;

    // A settings file that is about to be created starts from defaults.
    let mut settings = match args.settings.as_deref() {
        Some(path) if !path.exists() => Settings::default(),
        path => load_settings(path)?,
    };
    settings.always_show_fps |= args.always_show_fps;
    if let Some(eviction) = args.eviction {
        settings.eviction = eviction;
    }
    if args.save_settings {
        save_settings(&settings, args.settings.as_deref())?;
    }

    let script = Arc::new(load_script(&args.input)?);
    let frame_count = script.len();
    log::info!(
        "Replaying {frame_count} frames at {} fps, detector latency {} ms, eviction {}",
        args.fps,
        args.latency_ms,
        settings.eviction
    );

    let (listener, events): (Box<dyn GestureListener>, Option<Receiver<(u32, GestureEvent)>>) =
        if args.log_events {
            (Box::new(LoggingGestureListener), None)
        } else {
            let (listener, events) = ChannelGestureListener::new();
            (Box::new(listener), Some(events))
        };
    let movement_detector =
        FaceMovementDetector::with_config(listener, settings.thresholds, settings.eviction);
    let consumer = FaceGestureConsumer::new(movement_detector, None);
    let detector = ReplayDetector::new(script, Duration::from_millis(args.latency_ms));
    let pipeline = FramePipeline::new(detector, consumer, PipelineConfig::from_settings(&settings));

    let released = Arc::new(AtomicUsize::new(0));
    let started = Instant::now();

    for index in 0..frame_count {
        let due = frame_due(index, args.fps);
        if let Some(wait) = due.checked_sub(started.elapsed()) {
            thread::sleep(wait);
        }
        pipeline.submit(synthetic_frame(index, due, released.clone()));
    }

    let snapshot = wait_until_idle(&pipeline)?;
    drop(pipeline);

    if let Some(events) = events {
        for (track_id, event) in events.try_iter() {
            println!("face {track_id}: {event}");
        }
    }
    print_summary(&snapshot, frame_count, released.load(Ordering::SeqCst));
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Settings::load_from(path)?),
        None => Ok(Settings::load()),
    }
}

fn save_settings(
    settings: &Settings,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => settings.save_to(path)?,
        None => settings.save()?,
    }
    log::info!("Settings saved");
    Ok(())
}

/// Submission time of a frame, relative to the first one.
fn frame_due(index: usize, fps: u32) -> Duration {
    Duration::from_secs_f64(index as f64 / f64::from(fps))
}

fn synthetic_frame(index: usize, timestamp: Duration, released: Arc<AtomicUsize>) -> Frame {
    let len = FRAME_WIDTH as usize * FRAME_HEIGHT as usize * FRAME_CHANNELS as usize;
    Frame::new(vec![0u8; len], FRAME_WIDTH, FRAME_HEIGHT, FRAME_CHANNELS, index)
        .with_timestamp(timestamp)
        .with_release(move |_| {
            released.fetch_add(1, Ordering::SeqCst);
        })
}

fn wait_until_idle(
    pipeline: &FramePipeline,
) -> Result<PipelineSnapshot, Box<dyn std::error::Error>> {
    loop {
        let snapshot = pipeline
            .snapshot()
            .ok_or("Frame pipeline worker exited unexpectedly")?;
        if !snapshot.in_flight {
            return Ok(snapshot);
        }
        thread::sleep(Duration::from_millis(5));
    }
}

fn print_summary(snapshot: &PipelineSnapshot, submitted: usize, released: usize) {
    let latency = &snapshot.latency;
    println!("detections: {}", latency.run_count());
    if let (Some(min), Some(avg)) = (latency.min(), latency.average()) {
        println!(
            "latency: min {:.1} ms, avg {:.1} ms, max {:.1} ms",
            min.as_secs_f64() * 1000.0,
            avg.as_secs_f64() * 1000.0,
            latency.max().as_secs_f64() * 1000.0
        );
    }
    println!("last fps sample: {}", snapshot.fps.frames_per_second());
    println!(
        "frames: {submitted} submitted, {} dropped, {released} released",
        snapshot.dropped_frames
    );
}

fn validate(args: &ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.input.exists() {
        return Err(format!("Input file not found: {}", args.input.display()).into());
    }
    if args.fps == 0 || args.fps > 1000 {
        return Err(format!("FPS must be between 1 and 1000, got {}", args.fps).into());
    }
    if let Some(path) = &args.settings {
        if !path.exists() && !args.save_settings {
            return Err(format!("Settings file not found: {}", path.display()).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Frame timing tests ---

    #[test]
    fn test_frame_due_spaces_frames_by_rate() {
        assert_eq!(frame_due(0, 30), Duration::ZERO);
        assert_eq!(frame_due(10, 10), Duration::from_secs(1));
        assert_eq!(frame_due(3, 4), Duration::from_millis(750));
    }

    #[test]
    fn test_frame_due_beyond_u32_index() {
        let index = u32::MAX as usize + 1;
        assert_eq!(frame_due(index, 1), Duration::from_secs(u32::MAX as u64 + 1));
    }

    // --- Settings tests ---

    #[test]
    fn test_save_settings_writes_overrides_to_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            always_show_fps: true,
            eviction: EvictionPolicy::Capacity(4),
            ..Settings::default()
        };

        save_settings(&settings, Some(path.as_path())).unwrap();

        assert_eq!(load_settings(Some(path.as_path())).unwrap(), settings);
    }

    #[test]
    fn test_replay_args_parse() {
        let cli = Cli::try_parse_from([
            "facegesture",
            "replay",
            "readings.json",
            "--eviction",
            "idle:5",
            "--save-settings",
        ])
        .unwrap();

        let Command::Replay(args) = cli.command;
        assert_eq!(args.eviction, Some(EvictionPolicy::IdleFrames(5)));
        assert!(args.save_settings);
        assert_eq!(args.fps, 30);
    }
}
