use image::RgbImage;
use ndarray::{s, Array3, ArrayView3};
use thiserror::Error;

use crate::shared::frame::{InputImage, Rotation};

#[derive(Debug, Error)]
pub enum CameraImageError {
    #[error("unsupported channel count {0}, expected 1, 3 or 4")]
    UnsupportedChannels(u8),
    #[error("pixel buffer does not match {width}x{height}x{channels}")]
    BufferMismatch { width: u32, height: u32, channels: u8 },
}

/// Decodes a frame into an upright RGB still for display alongside results.
///
/// Grayscale frames are expanded to RGB, alpha is dropped, and the frame's
/// rotation is applied clockwise so the still matches what the camera saw.
pub fn to_rgb_image(image: &InputImage) -> Result<RgbImage, CameraImageError> {
    let mismatch = || CameraImageError::BufferMismatch {
        width: image.width(),
        height: image.height(),
        channels: image.channels(),
    };
    let expected_len =
        image.width() as usize * image.height() as usize * image.channels() as usize;
    if image.data().len() != expected_len {
        return Err(mismatch());
    }

    let view = image.as_ndarray();
    let rgb: Array3<u8> = match image.channels() {
        3 => view.to_owned(),
        4 => view.slice(s![.., .., 0..3]).to_owned(),
        1 => {
            let (h, w, _) = view.dim();
            Array3::from_shape_fn((h, w, 3), |(y, x, _)| view[[y, x, 0]])
        }
        other => return Err(CameraImageError::UnsupportedChannels(other)),
    };

    let upright = rotate_clockwise(rgb.view(), image.rotation());
    let (height, width, _) = upright.dim();
    let pixels: Vec<u8> = upright.iter().copied().collect();
    RgbImage::from_raw(width as u32, height as u32, pixels).ok_or_else(mismatch)
}

/// Rotation as a strided view; no pixels are copied.
fn rotate_clockwise(view: ArrayView3<'_, u8>, rotation: Rotation) -> ArrayView3<'_, u8> {
    match rotation {
        Rotation::Deg0 => view,
        Rotation::Deg90 => view.permuted_axes([1, 0, 2]).slice_move(s![.., ..;-1, ..]),
        Rotation::Deg180 => view.slice_move(s![..;-1, ..;-1, ..]),
        Rotation::Deg270 => view.permuted_axes([1, 0, 2]).slice_move(s![..;-1, .., ..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::Frame;
    use rstest::rstest;

    const A: [u8; 3] = [1, 2, 3];
    const B: [u8; 3] = [4, 5, 6];
    const C: [u8; 3] = [7, 8, 9];
    const D: [u8; 3] = [10, 11, 12];

    /// 2x2 frame laid out as
    /// ```text
    /// A B
    /// C D
    /// ```
    fn quad(rotation: Rotation) -> Frame {
        let data = [A, B, C, D].concat();
        Frame::new(data, 2, 2, 3, 0).with_rotation(rotation)
    }

    fn pixel(image: &RgbImage, x: u32, y: u32) -> [u8; 3] {
        image.get_pixel(x, y).0
    }

    #[rstest]
    #[case::none(Rotation::Deg0, [A, B, C, D])]
    #[case::quarter(Rotation::Deg90, [C, A, D, B])]
    #[case::half(Rotation::Deg180, [D, C, B, A])]
    #[case::three_quarter(Rotation::Deg270, [B, D, A, C])]
    fn test_rotation(#[case] rotation: Rotation, #[case] expected: [[u8; 3]; 4]) {
        let image = to_rgb_image(quad(rotation).image()).unwrap();
        let actual = [
            pixel(&image, 0, 0),
            pixel(&image, 1, 0),
            pixel(&image, 0, 1),
            pixel(&image, 1, 1),
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_quarter_rotation_swaps_dimensions() {
        // 3 wide, 1 high: A B C
        let data = [A, B, C].concat();
        let frame = Frame::new(data, 3, 1, 3, 0).with_rotation(Rotation::Deg90);

        let image = to_rgb_image(frame.image()).unwrap();

        assert_eq!(image.dimensions(), (1, 3));
        assert_eq!(pixel(&image, 0, 0), A);
        assert_eq!(pixel(&image, 0, 2), C);
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let frame = Frame::new(vec![1, 2, 3, 255], 1, 1, 4, 0);
        let image = to_rgb_image(frame.image()).unwrap();
        assert_eq!(pixel(&image, 0, 0), [1, 2, 3]);
    }

    #[test]
    fn test_grayscale_expands_to_rgb() {
        let frame = Frame::new(vec![42, 7], 2, 1, 1, 0);
        let image = to_rgb_image(frame.image()).unwrap();
        assert_eq!(pixel(&image, 0, 0), [42, 42, 42]);
        assert_eq!(pixel(&image, 1, 0), [7, 7, 7]);
    }

    #[test]
    fn test_two_channel_frames_are_rejected() {
        let frame = Frame::new(vec![0; 4], 1, 2, 2, 0);
        assert!(matches!(
            to_rgb_image(frame.image()),
            Err(CameraImageError::UnsupportedChannels(2))
        ));
    }
}
