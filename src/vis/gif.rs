use std::{fs::File, io, path::Path};

use anyhow::Result;
use gif::{Encoder, Frame, Repeat};
use tracing::{debug, trace};

use super::BACKGROUND_COLOR;
use crate::core::frame::FrameBuffer;

const DEFAULT_FPS: u32 = 12;
const DEFAULT_SPEED: i32 = 10;

#[allow(clippy::module_name_repetitions)]
pub struct GifBundle {
    pub data: Vec<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// Bakes the frames onto the white export background and encodes them as
/// an infinitely looping GIF.
///
/// Every frame is handed to the encoder with a delay of `1000 / fps`
/// milliseconds (stored in the format's 10 ms units). If a path is given
/// the encoded file is written there; the composited RGB rasters are
/// returned either way. The optional progress callback observes a
/// fraction in `[0, 1]`, first while frames are composited and again
/// while they are encoded. In-memory frames keep their transparency; the
/// background is baked out only into the export copies.
///
/// # Errors
///
/// Returns an error if no frames are given, if the frames disagree on
/// dimensions, if the frame rate is not positive, if the quantization
/// speed is outside 1..=30 or if the file cannot be written.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#[tracing::instrument(level = "trace", skip(frames, on_progress))]
pub fn animation_gif(
    frames: &[FrameBuffer],
    path: Option<&Path>,
    fps: Option<u32>,
    speed: Option<i32>,
    mut on_progress: Option<&mut dyn FnMut(f32)>,
) -> Result<GifBundle> {
    trace!("Encoding animation gif.");

    let fps = fps.unwrap_or(DEFAULT_FPS);
    let speed = speed.unwrap_or(DEFAULT_SPEED);

    if fps < 1 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "frame rate must be positive",
        )
        .into());
    }
    if !(1..=30).contains(&speed) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "quantization speed must be between 1 and 30",
        )
        .into());
    }
    let Some(first) = frames.first() else {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "no frames to encode").into());
    };

    let width = first.width() as u32;
    let height = first.height() as u32;

    for frame in frames {
        if frame.width() as u32 != width || frame.height() as u32 != height {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "frames don't have the same dimensions",
            )
            .into());
        }
    }

    debug!("Compositing {} frames for export", frames.len());
    let mut baked: Vec<Vec<u8>> = Vec::with_capacity(frames.len());
    for (index, frame) in frames.iter().enumerate() {
        baked.push(frame.baked_rgb(BACKGROUND_COLOR));
        if let Some(on_progress) = on_progress.as_mut() {
            on_progress((index + 1) as f32 / frames.len() as f32);
        }
    }

    let delay = u16::try_from(1000 / fps)? / 10;

    if let Some(path) = path {
        let mut file = File::create(path)?;
        let mut encoder = Encoder::new(&mut file, width as u16, height as u16, &[])?;
        encoder.set_repeat(Repeat::Infinite)?;

        for (index, data) in baked.iter().enumerate() {
            let mut frame = Frame::from_rgb_speed(width as u16, height as u16, data, speed);
            frame.delay = delay;
            encoder.write_frame(&frame)?;
            if let Some(on_progress) = on_progress.as_mut() {
                on_progress((index + 1) as f32 / baked.len() as f32);
            }
        }
    }

    Ok(GifBundle {
        data: baked,
        width,
        height,
        fps,
    })
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use crate::tests::{clean_files, setup_folder};

    use super::*;

    const COMMON_PATH: &str = "tests/vis/gif";

    fn setup_frames() -> Vec<FrameBuffer> {
        let mut frames = vec![
            FrameBuffer::empty(16, 12),
            FrameBuffer::empty(16, 12),
            FrameBuffer::empty(16, 12),
        ];
        for (index, frame) in frames.iter_mut().enumerate() {
            frame.set_pixel(index, index, [200, 40, 40, 255]);
        }
        frames
    }

    #[test]
    fn test_animation_gif_valid_input() {
        let frames = setup_frames();
        let result = animation_gif(&frames, None, Some(12), None, None);
        assert!(result.is_ok());

        let bundle = result.unwrap();
        assert_eq!(bundle.fps, 12);
        assert_eq!(bundle.width, 16);
        assert_eq!(bundle.height, 12);
        assert_eq!(bundle.data.len(), 3);
        assert!(bundle
            .data
            .iter()
            .all(|frame| frame.len() == 16 * 12 * 3));
    }

    #[test]
    fn test_animation_gif_bakes_background_into_export_only() {
        let frames = setup_frames();
        let bundle = animation_gif(&frames, None, None, None, None).unwrap();

        // Transparent pixels show the backdrop, opaque pixels keep their
        // color.
        assert_eq!(&bundle.data[0][0..3], &[200, 40, 40]);
        assert_eq!(&bundle.data[0][3..6], &[255, 255, 255]);
        // The source frames are untouched and still transparent.
        assert_eq!(frames[0].pixel(1, 0), [0, 0, 0, 0]);
        assert_eq!(frames[0].pixel(0, 0), [200, 40, 40, 255]);
    }

    #[test]
    fn test_animation_gif_no_frames() {
        let result = animation_gif(&[], None, None, None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_animation_gif_zero_fps() {
        let frames = setup_frames();
        let result = animation_gif(&frames, None, Some(0), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_animation_gif_mismatched_dimensions() {
        let mut frames = setup_frames();
        frames.push(FrameBuffer::empty(8, 8));
        let result = animation_gif(&frames, None, None, None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_animation_gif_invalid_speed() {
        let frames = setup_frames();
        let result = animation_gif(&frames, None, None, Some(0), None);
        assert!(result.is_err());
        let result = animation_gif(&frames, None, None, Some(31), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_animation_gif_with_path() {
        let path = Path::new(COMMON_PATH);
        setup_folder(path.to_path_buf()).unwrap();
        let files = vec![path.join("test_animation_gif_with_path.gif")];
        clean_files(&files).unwrap();

        let frames = setup_frames();
        let result = animation_gif(&frames, Some(&files[0]), Some(12), Some(10), None);

        assert!(result.is_ok());
        assert!(files[0].is_file());
    }

    #[test]
    fn test_animation_gif_reports_progress() {
        let frames = setup_frames();
        let mut fractions = Vec::new();
        let mut on_progress = |fraction: f32| fractions.push(fraction);

        animation_gif(&frames, None, None, None, Some(&mut on_progress)).unwrap();

        assert!(!fractions.is_empty());
        assert!(fractions
            .iter()
            .all(|fraction| (0.0..=1.0).contains(fraction)));
        assert!((fractions.last().unwrap() - 1.0).abs() < f32::EPSILON);
    }
}
