use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;
use tracing::{debug, trace};

use super::{
    config::{Brush, Canvas},
    frame::FrameBuffer,
};

/// Preset palette available to the brush.
#[derive(Default, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, Copy, Clone, EnumIter)]
pub enum BrushColor {
    #[default]
    Black,
    White,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl BrushColor {
    /// Opaque RGB triple for this palette entry.
    #[must_use]
    pub const fn rgb(self) -> [u8; 3] {
        match self {
            Self::Black => [0x00, 0x00, 0x00],
            Self::White => [0xff, 0xff, 0xff],
            Self::Red => [0xe7, 0x4c, 0x3c],
            Self::Orange => [0xe6, 0x7e, 0x22],
            Self::Yellow => [0xf1, 0xc4, 0x0f],
            Self::Green => [0x2e, 0xcc, 0x71],
            Self::Blue => [0x34, 0x98, 0xdb],
            Self::Purple => [0x9b, 0x59, 0xb6],
        }
    }
}

/// Current drawing tool.
///
/// Painting with a palette color and erasing are mutually exclusive by
/// construction. Selecting a color always leaves eraser mode; activating
/// the eraser drops the color selection.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum BrushMode {
    Paint(BrushColor),
    Erase,
}

impl Default for BrushMode {
    fn default() -> Self {
        Self::Paint(BrushColor::default())
    }
}

/// The frame buffer editor.
///
/// Owns the fixed collection of frames together with the drawing state:
/// active frame index, brush size and mode, and the onion-skin flag. Input
/// coordinates arrive in display space and are mapped down to the smaller
/// storage buffer; coordinates that land outside the buffer are clipped
/// pixel by pixel, never reported as errors.
#[derive(Debug, Clone)]
pub struct Editor {
    frames: Vec<FrameBuffer>,
    active_frame: usize,
    brush_size: usize,
    mode: BrushMode,
    onion_skin: bool,
    display_width: u32,
    display_height: u32,
}

impl Editor {
    /// Allocates the frame collection and initializes the drawing state.
    ///
    /// Every frame shares the fixed buffer dimensions for the lifetime of
    /// the session; the collection is never resized afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if any dimension, the frame count or the brush
    /// size is zero.
    #[tracing::instrument(level = "debug")]
    pub fn new(canvas: &Canvas, brush: &Brush) -> Result<Self, String> {
        if canvas.buffer_width < 1 || canvas.buffer_height < 1 {
            return Err(format!(
                "Buffer dimensions must be positive but were {}x{}",
                canvas.buffer_width, canvas.buffer_height
            ));
        }
        if canvas.display_width < 1 || canvas.display_height < 1 {
            return Err(format!(
                "Display dimensions must be positive but were {}x{}",
                canvas.display_width, canvas.display_height
            ));
        }
        if canvas.frame_count < 1 {
            return Err("Frame count must be positive but was 0".to_string());
        }
        if brush.size < 1 {
            return Err("Brush size must be positive but was 0".to_string());
        }
        debug!(
            "Allocating {} transparent frames of {}x{}",
            canvas.frame_count, canvas.buffer_width, canvas.buffer_height
        );
        let frames = (0..canvas.frame_count)
            .map(|_| FrameBuffer::empty(canvas.buffer_width, canvas.buffer_height))
            .collect();
        Ok(Self {
            frames,
            active_frame: 0,
            brush_size: brush.size,
            mode: BrushMode::Paint(brush.color),
            onion_skin: canvas.onion_skin,
            display_width: canvas.display_width,
            display_height: canvas.display_height,
        })
    }

    #[must_use]
    pub fn frames(&self) -> &[FrameBuffer] {
        &self.frames
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active_frame
    }

    #[must_use]
    pub fn active_frame(&self) -> &FrameBuffer {
        &self.frames[self.active_frame]
    }

    /// The frame below the active one, used for onion skinning. `None` on
    /// the first frame.
    #[must_use]
    pub fn previous_frame(&self) -> Option<&FrameBuffer> {
        if self.active_frame > 0 {
            self.frames.get(self.active_frame - 1)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn brush_size(&self) -> usize {
        self.brush_size
    }

    #[must_use]
    pub const fn mode(&self) -> BrushMode {
        self.mode
    }

    #[must_use]
    pub const fn onion_skin(&self) -> bool {
        self.onion_skin
    }

    #[must_use]
    pub const fn display_size(&self) -> (u32, u32) {
        (self.display_width, self.display_height)
    }

    /// Maps a display-space coordinate down to buffer space.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn to_buffer(&self, x: f32, y: f32) -> (i64, i64) {
        let scale_x = self.display_width as f32 / self.frames[0].width() as f32;
        let scale_y = self.display_height as f32 / self.frames[0].height() as f32;
        ((x / scale_x).floor() as i64, (y / scale_y).floor() as i64)
    }

    /// Writes a `size` x `size` block of pixels anchored at the given
    /// buffer coordinate into the active frame. Block pixels outside the
    /// buffer are skipped individually, so partial blocks at the edges are
    /// fine.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn write_block(&mut self, buffer_x: i64, buffer_y: i64) {
        let rgba = match self.mode {
            BrushMode::Paint(color) => {
                let [red, green, blue] = color.rgb();
                [red, green, blue, 255]
            }
            BrushMode::Erase => [0, 0, 0, 0],
        };
        let size = self.brush_size as i64;
        let frame = &mut self.frames[self.active_frame];
        for offset_x in 0..size {
            for offset_y in 0..size {
                let pixel_x = buffer_x + offset_x;
                let pixel_y = buffer_y + offset_y;
                if pixel_x >= 0
                    && pixel_y >= 0
                    && (pixel_x as usize) < frame.width()
                    && (pixel_y as usize) < frame.height()
                {
                    frame.set_pixel(pixel_x as usize, pixel_y as usize, rgba);
                }
            }
        }
    }

    /// Stamps one brush-sized block at the display-space coordinate.
    ///
    /// Erase mode writes fully transparent pixels, paint mode writes the
    /// selected palette color with full opacity.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn set_pixel_block(&mut self, x: f32, y: f32) {
        let (buffer_x, buffer_y) = self.to_buffer(x, y);
        self.write_block(buffer_x, buffer_y);
    }

    /// Draws a continuous stroke between two display-space points.
    ///
    /// The segment is rasterized with integer Bresenham stepping in buffer
    /// space and a brush-sized block is written at every step, which keeps
    /// thick lines gap-free at any slope. A degenerate segment writes
    /// exactly one block.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        let (mut x0, mut y0) = self.to_buffer(x0, y0);
        let (x1, y1) = self.to_buffer(x1, y1);

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            self.write_block(x0, y0);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x0 += sx;
            }
            if e2 < dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Resets the active frame to fully transparent. Asking the user for
    /// confirmation is a host concern; the operation itself is idempotent
    /// and total.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn clear_active_frame(&mut self) {
        debug!("Clearing frame {}", self.active_frame);
        self.frames[self.active_frame].clear();
    }

    /// Makes the given frame the editing target.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range; the active frame is
    /// left unchanged in that case.
    pub fn select_frame(&mut self, index: usize) -> Result<(), String> {
        if index >= self.frames.len() {
            return Err(format!(
                "Can only select one of {} frames but index was {index}",
                self.frames.len()
            ));
        }
        self.active_frame = index;
        Ok(())
    }

    /// Playback path for moving the active frame; wraps modulo the frame
    /// count instead of rejecting.
    pub(crate) fn wrap_to_frame(&mut self, index: usize) {
        self.active_frame = index % self.frames.len();
    }

    /// Selects a palette color, leaving eraser mode if it was active.
    pub fn select_color(&mut self, color: BrushColor) {
        trace!("Selecting color {color:?}");
        self.mode = BrushMode::Paint(color);
    }

    /// Activates the eraser, dropping any color selection.
    pub fn activate_eraser(&mut self) {
        trace!("Activating eraser");
        self.mode = BrushMode::Erase;
    }

    /// Sets the brush size in buffer pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero; the brush is left unchanged.
    pub fn set_brush_size(&mut self, size: usize) -> Result<(), String> {
        if size < 1 {
            return Err("Brush size must be positive but was 0".to_string());
        }
        self.brush_size = size;
        Ok(())
    }

    pub fn set_onion_skin(&mut self, enabled: bool) {
        self.onion_skin = enabled;
    }
}
