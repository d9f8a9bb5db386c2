//! Sprite animation playback state.
//!
//! This module keeps the bookkeeping of a frame-based animation (active clip, elapsed time, loop
//! flag and playback state) apart from any rendering. The renderer only asks for the current frame.

use std::{collections::BTreeMap, time::Duration};

use tracing::warn;

/// Playback state of a [`SpriteAnimator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Playback {
    /// Not advancing; the elapsed time is kept.
    #[default]
    Stopped,
    /// Advancing with every update.
    Playing,
    /// Temporarily not advancing; [`SpriteAnimator::resume`] continues where it left off.
    Paused,
}

/// Sequence of glyphs shown one after another at a fixed rate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clip {
    /// Glyphs of the clip, in playback order.
    frames: Vec<char>,
    /// Time each glyph stays on screen.
    frame_duration: Duration,
}

impl Clip {
    /// Builds a clip from its frames and the time each frame is shown.
    pub fn new(frames: &[char], frame_duration: Duration) -> Self {
        Self {
            frames: frames.to_vec(),
            frame_duration,
        }
    }

    /// Returns the total duration of the clip.
    pub fn duration(&self) -> Duration {
        self.frame_duration
            .saturating_mul(u32::try_from(self.frames.len()).unwrap_or(u32::MAX))
    }

    /// Returns the frame shown after `elapsed` time, clamped to the last frame.
    pub fn frame_at(&self, elapsed: Duration) -> Option<char> {
        let index = if self.frame_duration.is_zero() {
            0
        } else {
            usize::try_from(elapsed.as_nanos() / self.frame_duration.as_nanos())
                .unwrap_or(usize::MAX)
        };

        self.frames
            .get(index)
            .or_else(|| self.frames.last())
            .copied()
    }
}

/// Playback state machine over a set of named clips.
#[derive(Clone, Debug, Default)]
pub struct SpriteAnimator {
    /// Known clips by identifier.
    clips: BTreeMap<String, Clip>,
    /// Identifier of the clip frames are taken from.
    active: Option<String>,
    /// Current playback state.
    state: Playback,
    /// Time spent playing the active clip.
    elapsed: Duration,
    /// Whether the active clip restarts when it ends.
    looping: bool,
}

impl SpriteAnimator {
    /// Builds an animator without clips.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a clip, replacing any clip with the same identifier.
    pub fn add_clip(&mut self, id: &str, clip: Clip) {
        let _ = self.clips.insert(id.to_owned(), clip);
    }

    /// Makes a clip active without playing it.
    pub fn activate(&mut self, id: &str) {
        if !self.clips.contains_key(id) {
            warn!(clip = id, "cannot activate unknown animation clip");
            return;
        }

        self.active = Some(id.to_owned());
        self.state = Playback::Stopped;
        self.elapsed = Duration::ZERO;
    }

    /// Plays a clip from its first frame.
    ///
    /// Unknown clips are ignored and leave the current playback untouched.
    pub fn play(&mut self, id: &str, looping: bool) {
        if !self.clips.contains_key(id) {
            warn!(clip = id, "cannot play unknown animation clip");
            return;
        }

        self.active = Some(id.to_owned());
        self.elapsed = Duration::ZERO;
        self.state = Playback::Playing;
        self.looping = looping;
    }

    /// Stops playback and clears the loop flag.
    pub fn stop(&mut self) {
        self.state = Playback::Stopped;
        self.looping = false;
    }

    /// Pauses a playing clip.
    pub fn pause(&mut self) {
        if self.state == Playback::Playing {
            self.state = Playback::Paused;
        }
    }

    /// Resumes a paused clip.
    pub fn resume(&mut self) {
        if self.state == Playback::Paused {
            self.state = Playback::Playing;
        }
    }

    /// Advances the active clip by `delta` if it is playing.
    ///
    /// A non-looping clip that runs past its end stops, keeping its last frame on screen. A looping
    /// clip wraps around, keeping the time it overshot its end by.
    pub fn update(&mut self, delta: Duration) {
        if self.state != Playback::Playing {
            return;
        }
        let Some(duration) = self.active_clip().map(Clip::duration) else {
            return;
        };

        self.elapsed = self.elapsed.saturating_add(delta);
        if self.elapsed > duration {
            if self.looping {
                self.elapsed = self
                    .elapsed
                    .as_nanos()
                    .checked_rem(duration.as_nanos())
                    .and_then(|nanos| u64::try_from(nanos).ok())
                    .map_or(Duration::ZERO, Duration::from_nanos);
            } else {
                self.stop();
            }
        }
    }

    /// Returns the current playback state.
    pub const fn state(&self) -> Playback {
        self.state
    }

    /// Returns whether any clip is playing.
    pub fn is_playing(&self) -> bool {
        self.state == Playback::Playing
    }

    /// Returns whether the given clip is the one playing.
    pub fn is_playing_clip(&self, id: &str) -> bool {
        self.is_playing() && self.active.as_deref() == Some(id)
    }

    /// Returns the identifier of the playing clip.
    pub fn playing_clip(&self) -> Option<&str> {
        self.active.as_deref().filter(|_| self.is_playing())
    }

    /// Returns the identifier of the active clip, playing or not.
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Returns the glyph to draw for the current time.
    pub fn frame(&self) -> Option<char> {
        self.active_clip()
            .and_then(|clip| clip.frame_at(self.elapsed))
    }

    /// Returns the active clip.
    pub fn active_clip(&self) -> Option<&Clip> {
        self.active.as_ref().and_then(|id| self.clips.get(id))
    }
}
