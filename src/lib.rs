#![warn(clippy::pedantic, clippy::nursery)]
pub mod core;
pub mod vis;

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::core::{
    config::Config,
    editor::{BrushColor, Editor},
    player::{Player, PlayerState},
};
use crate::vis::{
    gif::{animation_gif, GifBundle},
    png::{frame_png, PngBundle},
    preview::{compose_preview, PreviewBundle},
};

/// A complete editing session.
///
/// Owns the frame buffer editor, the animation player and the last
/// composited preview surface; constructed once per session, no
/// process-wide state. Input events are translated into core operations
/// here, and every mutation recomposites the preview so the host can blit
/// it right away.
pub struct Studio {
    pub editor: Editor,
    pub player: Player,
    pub preview: PreviewBundle,
    config: Config,
    stroke: Option<(f32, f32)>,
}

impl Studio {
    /// Builds a session from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    #[tracing::instrument(level = "debug", skip(config))]
    pub fn new(config: Config) -> Result<Self> {
        debug!("Creating studio session");
        let editor = Editor::new(&config.canvas, &config.brush).map_err(anyhow::Error::msg)?;
        let player = Player::new(config.playback.frame_rate);
        let preview = compose_preview(
            &editor,
            Some((config.canvas.display_width, config.canvas.display_height)),
        )?;
        Ok(Self {
            editor,
            player,
            preview,
            config,
            stroke: None,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn redraw(&mut self) -> Result<()> {
        self.preview = compose_preview(
            &self.editor,
            Some((
                self.config.canvas.display_width,
                self.config.canvas.display_height,
            )),
        )?;
        Ok(())
    }

    /// Begins a stroke at the given display coordinate and stamps one
    /// brush block.
    ///
    /// # Errors
    ///
    /// Returns an error if the preview cannot be recomposited.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<()> {
        self.stroke = Some((x, y));
        self.editor.set_pixel_block(x, y);
        self.redraw()
    }

    /// Extends the active stroke to the given display coordinate with a
    /// continuous line. Ignored while no stroke is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the preview cannot be recomposited.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Result<()> {
        let Some((last_x, last_y)) = self.stroke else {
            return Ok(());
        };
        self.editor.draw_line(last_x, last_y, x, y);
        self.stroke = Some((x, y));
        self.redraw()
    }

    /// Ends the active stroke. Pointer-up and pointer-out both land here.
    pub fn pointer_up(&mut self) {
        self.stroke = None;
    }

    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn select_frame(&mut self, index: usize) -> Result<()> {
        self.editor.select_frame(index).map_err(anyhow::Error::msg)?;
        self.redraw()
    }

    pub fn select_color(&mut self, color: BrushColor) {
        self.editor.select_color(color);
    }

    pub fn activate_eraser(&mut self) {
        self.editor.activate_eraser();
    }

    /// # Errors
    ///
    /// Returns an error if the size is zero.
    pub fn set_brush_size(&mut self, size: usize) -> Result<()> {
        self.editor.set_brush_size(size).map_err(anyhow::Error::msg)
    }

    /// # Errors
    ///
    /// Returns an error if the preview cannot be recomposited.
    pub fn set_onion_skin(&mut self, enabled: bool) -> Result<()> {
        self.editor.set_onion_skin(enabled);
        self.redraw()
    }

    /// Clears the active frame to transparent. The confirmation dialog the
    /// reference behavior shows first is a host concern.
    ///
    /// # Errors
    ///
    /// Returns an error if the preview cannot be recomposited.
    pub fn clear_active_frame(&mut self) -> Result<()> {
        self.editor.clear_active_frame();
        self.redraw()
    }

    /// # Errors
    ///
    /// Returns an error if the frame rate is not positive.
    pub fn start_playback(&mut self) -> Result<()> {
        self.player.start(&self.editor).map_err(anyhow::Error::msg)
    }

    /// Advances playback by one frame; the host calls this from its timer
    /// at the period reported by [`Player::interval`]. Ticks arriving
    /// after a stop are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the preview cannot be recomposited.
    pub fn tick(&mut self) -> Result<()> {
        if self.player.state() == PlayerState::Playing {
            self.player.tick(&mut self.editor);
            self.redraw()?;
        }
        Ok(())
    }

    /// Stops playback and re-renders the frame that was being edited
    /// before playback began. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the preview cannot be recomposited.
    pub fn stop_playback(&mut self) -> Result<()> {
        if self.player.state() == PlayerState::Playing {
            self.player.stop(&mut self.editor);
            self.redraw()?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the frame rate is not positive.
    pub fn set_frame_rate(&mut self, frame_rate: u32) -> Result<()> {
        self.player
            .set_frame_rate(frame_rate)
            .map_err(anyhow::Error::msg)
    }

    /// Exports the animation as a looping GIF at the current frame rate.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails; the in-memory frames stay
    /// editable regardless.
    pub fn export_gif(
        &self,
        path: Option<&Path>,
        on_progress: Option<&mut dyn FnMut(f32)>,
    ) -> Result<GifBundle> {
        animation_gif(
            self.editor.frames(),
            path,
            Some(self.player.frame_rate()),
            Some(self.config.export.speed),
            on_progress,
        )
    }

    /// Exports a single frame composited onto the export background,
    /// e.g. frame 0 for the export preview image.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the file cannot
    /// be written.
    pub fn export_frame(&self, index: usize, path: Option<&Path>) -> Result<PngBundle> {
        let frame = self.editor.frames().get(index).ok_or_else(|| {
            anyhow::Error::msg(format!(
                "Can only export one of {} frames but index was {index}",
                self.editor.frame_count()
            ))
        })?;
        frame_png(frame, path)
    }
}
