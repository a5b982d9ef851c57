use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::editor::Editor;

/// Playback state of the animation player.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Stopped,
    Playing,
}

/// Cycles the editor's active frame to preview the animation.
///
/// The player is a plain state machine: the host owns the timer primitive
/// and calls [`tick`](Player::tick) at the period reported by
/// [`interval`](Player::interval). Re-reading the interval after every
/// start, stop or rate change keeps at most one timer alive per player.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Player {
    state: PlayerState,
    frame_rate: u32,
    resume_index: usize,
    cursor: usize,
}

impl Player {
    #[must_use]
    pub const fn new(frame_rate: u32) -> Self {
        Self {
            state: PlayerState::Stopped,
            frame_rate,
            resume_index: 0,
            cursor: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> PlayerState {
        self.state
    }

    #[must_use]
    pub const fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Tick period for the host's timer, `1000 / fps` milliseconds.
    ///
    /// `None` while stopped, which doubles as the signal that no timer
    /// should exist.
    #[must_use]
    pub const fn interval(&self) -> Option<Duration> {
        match self.state {
            PlayerState::Stopped => None,
            PlayerState::Playing => Some(Duration::from_millis(1000 / self.frame_rate as u64)),
        }
    }

    /// Starts playback from the top of the cycle.
    ///
    /// Records the editor's active frame so a later stop can return to it.
    /// Starting an already playing player is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame rate is not positive; the player
    /// stays stopped in that case.
    #[tracing::instrument(level = "debug", skip(editor))]
    pub fn start(&mut self, editor: &Editor) -> Result<(), String> {
        if self.state == PlayerState::Playing {
            return Ok(());
        }
        if self.frame_rate < 1 {
            return Err(format!(
                "Can only start playback with a positive frame rate but frame rate was {}",
                self.frame_rate
            ));
        }
        debug!("Starting playback at {} fps", self.frame_rate);
        self.resume_index = editor.active_index();
        self.cursor = 0;
        self.state = PlayerState::Playing;
        Ok(())
    }

    /// Advances playback by one frame.
    ///
    /// A tick that arrives after the player was stopped is ignored, so a
    /// stale host timer cannot move the view.
    #[tracing::instrument(level = "trace", skip(self, editor))]
    pub fn tick(&mut self, editor: &mut Editor) {
        if self.state != PlayerState::Playing {
            return;
        }
        trace!("Showing frame {}", self.cursor);
        editor.wrap_to_frame(self.cursor);
        self.cursor = (self.cursor + 1) % editor.frame_count();
    }

    /// Stops playback and returns the editor to the frame that was being
    /// edited when playback started. Stopping an already stopped player
    /// is a no-op.
    #[tracing::instrument(level = "debug", skip(self, editor))]
    pub fn stop(&mut self, editor: &mut Editor) {
        if self.state != PlayerState::Playing {
            return;
        }
        debug!("Stopping playback, resuming on frame {}", self.resume_index);
        self.state = PlayerState::Stopped;
        editor.wrap_to_frame(self.resume_index);
    }

    /// Changes the playback frame rate.
    ///
    /// While playing, the new interval takes effect with the next
    /// scheduled tick and the cycle restarts at frame 0. The resume index
    /// recorded at start is kept, so stopping still returns to the frame
    /// that was being edited.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame rate is not positive; the current
    /// rate is left unchanged.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_frame_rate(&mut self, frame_rate: u32) -> Result<(), String> {
        if frame_rate < 1 {
            return Err(format!(
                "Frame rate must be a positive number of frames per second but was {frame_rate}"
            ));
        }
        self.frame_rate = frame_rate;
        if self.state == PlayerState::Playing {
            self.cursor = 0;
        }
        Ok(())
    }
}
