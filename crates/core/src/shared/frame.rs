use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ndarray::ArrayView3;

/// Clockwise rotation the camera reports for a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// Read-only view of a frame's pixels, handed to detectors.
///
/// Cloning is cheap: the pixel buffer is shared, so a detector that runs
/// on its own thread can keep the image alive without copying it.
#[derive(Clone, Debug)]
pub struct InputImage {
    data: Arc<[u8]>,
    width: u32,
    height: u32,
    channels: u8,
    rotation: Rotation,
    timestamp: Duration,
    index: usize,
}

impl InputImage {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Capture time on the camera's clock.
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Pixels as `(height, width, channels)`, before rotation.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

/// Called with the frame index when the frame is handed back to its source.
pub type ReleaseCallback = Box<dyn FnOnce(usize) + Send>;

struct ReleaseGuard {
    index: usize,
    callback: Option<ReleaseCallback>,
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(self.index);
        }
    }
}

/// A camera frame: contiguous bytes in row-major order plus capture metadata.
///
/// The buffer belongs to the camera source. Whoever holds the `Frame` last
/// releases it back to the source when the value is dropped, so the release
/// callback runs exactly once no matter which path the frame took.
pub struct Frame {
    image: InputImage,
    _release: ReleaseGuard,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            image: InputImage {
                data: data.into(),
                width,
                height,
                channels,
                rotation: Rotation::Deg0,
                timestamp: Duration::ZERO,
                index,
            },
            _release: ReleaseGuard {
                index,
                callback: None,
            },
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.image.rotation = rotation;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Duration) -> Self {
        self.image.timestamp = timestamp;
        self
    }

    /// Registers the callback that returns the buffer to the camera source.
    pub fn with_release<F>(mut self, release: F) -> Self
    where
        F: FnOnce(usize) + Send + 'static,
    {
        self._release.callback = Some(Box::new(release));
        self
    }

    pub fn image(&self) -> &InputImage {
        &self.image
    }

    pub fn index(&self) -> usize {
        self.image.index
    }

    /// Hands the frame back to its source now instead of at end of scope.
    pub fn release(self) {}
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("index", &self.image.index)
            .field("width", &self.image.width)
            .field("height", &self.image.height)
            .field("rotation", &self.image.rotation)
            .field("timestamp", &self.image.timestamp)
            .finish()
    }
}
