use tracing::trace;

pub mod gif;
pub mod png;
pub mod preview;

/// Backdrop color for the preview surface and for export compositing.
///
/// White is a visual backdrop only; it is never written into frame
/// storage.
pub const BACKGROUND_COLOR: [u8; 3] = [255, 255, 255];

/// Opacity of the previous frame when onion skinning is enabled.
pub const ONION_SKIN_OPACITY: f32 = 0.3;

/// Default display surface size, scaled up from the 256x192 buffer.
pub const STANDARD_RESOLUTION: (u32, u32) = (512, 384);

/// Allocates a buffer for storing pixel data for an image of the given
/// width and height, 3 bytes per pixel (RGB).
#[tracing::instrument(level = "trace")]
pub(crate) fn allocate_buffer(width: u32, height: u32) -> Vec<u8> {
    trace!("Allocating buffer.");
    let buffer: Vec<u8> = vec![0; width as usize * height as usize * 3];
    buffer
}
