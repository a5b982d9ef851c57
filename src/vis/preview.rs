use std::io;

use anyhow::Result;
use tracing::trace;

use super::{allocate_buffer, BACKGROUND_COLOR, ONION_SKIN_OPACITY, STANDARD_RESOLUTION};
use crate::core::{editor::Editor, frame::FrameBuffer};

#[allow(clippy::module_name_repetitions)]
pub struct PreviewBundle {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Composites the editor's active frame onto a white display surface.
///
/// The surface is first filled with the opaque backdrop. If onion skinning
/// is enabled and the editor is not on the first frame, the previous frame
/// is blended in at reduced opacity before the active frame is drawn at
/// full opacity on top. The frame buffers are upscaled to the display
/// resolution by nearest-neighbor sampling and are never mutated.
///
/// # Errors
///
/// Returns an error if the resolution is not positive.
#[tracing::instrument(level = "trace", skip(editor))]
pub fn compose_preview(
    editor: &Editor,
    resolution: Option<(u32, u32)>,
) -> Result<PreviewBundle> {
    trace!("Compositing preview surface.");

    let (width, height) = resolution.unwrap_or(STANDARD_RESOLUTION);

    if width < 1 || height < 1 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "resolution must be positive",
        )
        .into());
    }

    let mut buffer = allocate_buffer(width, height);
    for pixel in buffer.chunks_exact_mut(3) {
        pixel.copy_from_slice(&BACKGROUND_COLOR);
    }

    if editor.onion_skin() {
        if let Some(previous) = editor.previous_frame() {
            blend_frame(&mut buffer, width, height, previous, ONION_SKIN_OPACITY);
        }
    }
    blend_frame(&mut buffer, width, height, editor.active_frame(), 1.0);

    Ok(PreviewBundle {
        data: buffer,
        width,
        height,
    })
}

/// Blends a frame into the RGB surface with the given opacity, sampling
/// nearest-neighbor so every buffer pixel covers a uniform block of
/// display pixels. Fully transparent pixels leave the surface untouched.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_frame(buffer: &mut [u8], width: u32, height: u32, frame: &FrameBuffer, opacity: f32) {
    for display_y in 0..height as usize {
        let source_y = display_y * frame.height() / height as usize;
        for display_x in 0..width as usize {
            let source_x = display_x * frame.width() / width as usize;
            let [red, green, blue, alpha] = frame.pixel(source_x, source_y);
            if alpha == 0 {
                continue;
            }
            let alpha = f32::from(alpha) / 255.0 * opacity;
            let index = (display_y * width as usize + display_x) * 3;
            for (offset, channel) in [red, green, blue].into_iter().enumerate() {
                let backdrop = f32::from(buffer[index + offset]);
                buffer[index + offset] =
                    f32::from(channel).mul_add(alpha, backdrop * (1.0 - alpha)).round() as u8;
            }
        }
    }
}
