#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-cycling animation state machine over a single sprite-sheet row.
//!
//! An [`Animation`] owns nothing but counters: the current frame index and
//! the time spent on that frame. Rendering adapters ask it for the source
//! rectangle of the current frame and blit that region themselves.

mod set;
pub mod sprites;

use std::time::Duration;

use thiserror::Error;
use tile_quest_core::{Activity, Direction, FrameRect};

pub use set::{AnimationKey, AnimationSet};

/// Declarative description of an animation before validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationSpec {
    /// Zero-based row of the sprite sheet holding the frames.
    pub sheet_row: i32,
    /// Width of each frame in unscaled pixels.
    pub frame_width: i32,
    /// Height of each frame in unscaled pixels.
    pub frame_height: i32,
    /// Number of frames laid out left to right on the row.
    pub frame_count: i32,
    /// Time each frame stays on screen.
    pub frame_duration: Duration,
    /// Whether frames are mirrored when drawn.
    pub flip_horizontally: bool,
}

impl AnimationSpec {
    /// Describes a non-mirrored animation.
    #[must_use]
    pub const fn new(
        sheet_row: i32,
        frame_width: i32,
        frame_height: i32,
        frame_count: i32,
        frame_duration: Duration,
    ) -> Self {
        Self {
            sheet_row,
            frame_width,
            frame_height,
            frame_count,
            frame_duration,
            flip_horizontally: false,
        }
    }

    /// Returns the same description mirrored horizontally.
    #[must_use]
    pub const fn flipped(mut self) -> Self {
        self.flip_horizontally = true;
        self
    }
}

/// Errors raised while building or selecting animations.
///
/// These describe broken content or setup code and are never expected at
/// runtime once construction succeeded.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AnimationError {
    /// The sprite-sheet row was negative.
    #[error("animation sprite sheet row must be at least zero (received {row})")]
    NegativeRow {
        /// Row that failed validation.
        row: i32,
    },
    /// A frame dimension was smaller than one pixel.
    #[error("animation frame size must be positive (received {width}x{height})")]
    InvalidFrameSize {
        /// Width that was provided.
        width: i32,
        /// Height that was provided.
        height: i32,
    },
    /// The animation did not contain a single frame.
    #[error("animation must contain at least one frame (received {frame_count})")]
    NoFrames {
        /// Frame count that was provided.
        frame_count: i32,
    },
    /// A cycling animation was given a frame duration below one millisecond.
    #[error("animation cycling {frame_count} frames needs a frame duration of at least 1ms")]
    InvalidFrameDuration {
        /// Frame count of the rejected animation.
        frame_count: i32,
    },
    /// An animation was registered twice for the same key.
    #[error("an animation for {activity:?} facing {direction:?} has already been registered")]
    Duplicate {
        /// Activity of the duplicated key.
        activity: Activity,
        /// Direction of the duplicated key.
        direction: Direction,
    },
    /// No animation exists for the requested key.
    #[error("no animation registered for {activity:?} facing {direction:?}")]
    Unregistered {
        /// Activity that was requested.
        activity: Activity,
        /// Direction that was requested.
        direction: Direction,
    },
}

/// Animates a series of frames on one row of a sprite sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Animation {
    sheet_row: i32,
    frame_width: i32,
    frame_height: i32,
    frame_count: u32,
    frame_duration: Duration,
    flip_horizontally: bool,
    current_frame: u32,
    elapsed: Duration,
}

impl Animation {
    /// Validates the description and creates an animation on its first frame.
    pub fn new(spec: AnimationSpec) -> Result<Self, AnimationError> {
        if spec.sheet_row < 0 {
            return Err(AnimationError::NegativeRow {
                row: spec.sheet_row,
            });
        }
        if spec.frame_width < 1 || spec.frame_height < 1 {
            return Err(AnimationError::InvalidFrameSize {
                width: spec.frame_width,
                height: spec.frame_height,
            });
        }
        let frame_count = u32::try_from(spec.frame_count)
            .ok()
            .filter(|count| *count >= 1)
            .ok_or(AnimationError::NoFrames {
                frame_count: spec.frame_count,
            })?;
        if frame_count > 1 && spec.frame_duration < Duration::from_millis(1) {
            return Err(AnimationError::InvalidFrameDuration {
                frame_count: spec.frame_count,
            });
        }

        Ok(Self {
            sheet_row: spec.sheet_row,
            frame_width: spec.frame_width,
            frame_height: spec.frame_height,
            frame_count,
            frame_duration: spec.frame_duration,
            flip_horizontally: spec.flip_horizontally,
            current_frame: 0,
            elapsed: Duration::ZERO,
        })
    }

    /// Rewinds to the first frame.
    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.elapsed = Duration::ZERO;
    }

    /// Accumulates `dt`; once the time on the current frame exceeds the frame
    /// duration the animation moves to the next frame, wrapping to the first.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);

        if self.elapsed > self.frame_duration {
            self.elapsed = Duration::ZERO;
            self.current_frame += 1;
            if self.current_frame >= self.frame_count {
                self.current_frame = 0;
            }
        }
    }

    /// Index of the frame currently shown.
    #[must_use]
    pub const fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Time spent on the current frame.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of frames on the row.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Time each frame stays on screen.
    #[must_use]
    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Sprite-sheet row holding the frames.
    #[must_use]
    pub const fn sheet_row(&self) -> i32 {
        self.sheet_row
    }

    /// Whether frames are mirrored when drawn.
    #[must_use]
    pub const fn flip_horizontally(&self) -> bool {
        self.flip_horizontally
    }

    /// Source rectangle of the current frame.
    #[must_use]
    pub fn current_frame_rect(&self) -> FrameRect {
        frame_rect(
            self.current_frame,
            self.sheet_row,
            self.frame_width,
            self.frame_height,
        )
    }
}

/// Computes the sprite-sheet source rectangle of `frame_index` on `row`.
#[must_use]
pub fn frame_rect(frame_index: u32, row: i32, frame_width: i32, frame_height: i32) -> FrameRect {
    let column = i32::try_from(frame_index).unwrap_or(i32::MAX);
    FrameRect::new(
        column.saturating_mul(frame_width),
        row.saturating_mul(frame_height),
        frame_width,
        frame_height,
    )
}
