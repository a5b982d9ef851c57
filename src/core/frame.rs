use ndarray::Array3;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Pixel storage for a single animation frame.
///
/// Has dimensions (`height`, `width`, 4), with the last axis holding the
/// red, green, blue and alpha channels. Alpha 0 marks a fully transparent
/// pixel, which is both the erase state and the initial state of every
/// frame.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FrameBuffer {
    pub values: Array3<u8>,
}

impl FrameBuffer {
    #[must_use]
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            values: Array3::zeros((height, width, 4)),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.values.shape()[1]
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.values.shape()[0]
    }

    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        [
            self.values[(y, x, 0)],
            self.values[(y, x, 1)],
            self.values[(y, x, 2)],
            self.values[(y, x, 3)],
        ]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        for (channel, value) in rgba.into_iter().enumerate() {
            self.values[(y, x, channel)] = value;
        }
    }

    /// Resets every pixel to fully transparent.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn clear(&mut self) {
        trace!("Clearing frame to transparent");
        self.values.fill(0);
    }

    /// Produces an RGB copy of the frame composited over an opaque
    /// background color via source-over blending.
    ///
    /// Transparency is only ever baked out here. The in-memory pixel data
    /// keeps its alpha channel untouched so erased regions stay erasable.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn baked_rgb(&self, background: [u8; 3]) -> Vec<u8> {
        trace!("Compositing frame over background color");
        let mut buffer = Vec::with_capacity(self.width() * self.height() * 3);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let [red, green, blue, alpha] = self.pixel(x, y);
                let alpha = f32::from(alpha) / 255.0;
                for (channel, backdrop) in [red, green, blue].into_iter().zip(background) {
                    let blended =
                        f32::from(channel).mul_add(alpha, f32::from(backdrop) * (1.0 - alpha));
                    buffer.push(blended.round() as u8);
                }
            }
        }
        buffer
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_frame_is_fully_transparent() {
        let frame = FrameBuffer::empty(256, 192);
        assert_eq!(frame.width(), 256);
        assert_eq!(frame.height(), 192);
        assert!(frame.values.iter().all(|value| *value == 0));
    }

    #[test]
    fn test_clear_resets_pixels_and_is_idempotent() {
        let mut frame = FrameBuffer::empty(8, 8);
        frame.set_pixel(3, 4, [10, 20, 30, 255]);
        frame.clear();
        assert!(frame.values.iter().all(|value| *value == 0));
        frame.clear();
        assert!(frame.values.iter().all(|value| *value == 0));
    }

    #[test]
    fn test_baked_rgb_fills_transparent_pixels_with_background() {
        let mut frame = FrameBuffer::empty(2, 1);
        frame.set_pixel(0, 0, [12, 34, 56, 255]);

        let baked = frame.baked_rgb([255, 255, 255]);

        assert_eq!(baked.len(), 2 * 3);
        assert_eq!(&baked[0..3], &[12, 34, 56]);
        assert_eq!(&baked[3..6], &[255, 255, 255]);
    }

    #[test]
    fn test_baked_rgb_does_not_mutate_frame_storage() {
        let mut frame = FrameBuffer::empty(4, 4);
        frame.set_pixel(1, 2, [200, 100, 50, 255]);
        let before = frame.clone();

        let _baked = frame.baked_rgb([255, 255, 255]);

        assert_eq!(frame, before);
        assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
    }
}
