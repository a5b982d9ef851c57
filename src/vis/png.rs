use std::{io, path::Path};

use anyhow::Result;
use image::RgbImage;
use tracing::trace;

use super::BACKGROUND_COLOR;
use crate::core::frame::FrameBuffer;

#[allow(clippy::module_name_repetitions)]
pub struct PngBundle {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Bakes a single frame onto the white export background, optionally
/// saving the composite as a PNG. Used for the export preview.
///
/// # Errors
///
/// Returns an error if the frame has zero size or if the file cannot be
/// written.
#[allow(clippy::cast_possible_truncation)]
#[tracing::instrument(level = "trace", skip(frame))]
pub fn frame_png(frame: &FrameBuffer, path: Option<&Path>) -> Result<PngBundle> {
    trace!("Compositing frame png.");

    let width = frame.width() as u32;
    let height = frame.height() as u32;

    if width < 1 || height < 1 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "frame dimensions must be positive",
        )
        .into());
    }

    let data = frame.baked_rgb(BACKGROUND_COLOR);

    if let Some(path) = path {
        let image = RgbImage::from_raw(width, height, data.clone()).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "frame buffer size does not match its dimensions",
            )
        })?;
        image.save(path)?;
    }

    Ok(PngBundle {
        data,
        width,
        height,
    })
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use crate::tests::{clean_files, setup_folder};

    use super::*;

    const COMMON_PATH: &str = "tests/vis/png";

    #[test]
    fn test_frame_png_valid_input() {
        let mut frame = FrameBuffer::empty(16, 12);
        frame.set_pixel(3, 2, [10, 200, 30, 255]);

        let result = frame_png(&frame, None);
        assert!(result.is_ok());

        let bundle = result.unwrap();
        assert_eq!(bundle.width, 16);
        assert_eq!(bundle.height, 12);
        assert_eq!(bundle.data.len(), 16 * 12 * 3);

        let index = (2 * 16 + 3) * 3;
        assert_eq!(&bundle.data[index..index + 3], &[10, 200, 30]);
        assert_eq!(&bundle.data[0..3], &[255, 255, 255]);
    }

    #[test]
    fn test_frame_png_zero_size() {
        let frame = FrameBuffer::empty(0, 0);
        let result = frame_png(&frame, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_frame_png_with_path() {
        let path = Path::new(COMMON_PATH);
        setup_folder(path.to_path_buf()).unwrap();
        let files = vec![path.join("test_frame_png_with_path.png")];
        clean_files(&files).unwrap();

        let mut frame = FrameBuffer::empty(16, 12);
        frame.set_pixel(0, 0, [0, 0, 0, 255]);
        let result = frame_png(&frame, Some(&files[0]));

        assert!(result.is_ok());
        assert!(files[0].is_file());
    }
}
