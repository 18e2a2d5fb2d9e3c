//! Built-in sprite definitions shipped with the game assets.

use std::time::Duration;

use tile_quest_core::{Activity, Direction, DEFAULT_IDLE_SPEED, DEFAULT_WALK_SPEED};

use crate::{Animation, AnimationError, AnimationSet, AnimationSpec};

/// Frame dimensions and drawing offset shared by every animation of a sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteLayout {
    /// Width of a frame in unscaled pixels.
    pub frame_width: i32,
    /// Height of a frame in unscaled pixels.
    pub frame_height: i32,
    /// Horizontal pixel offset applied before scaling.
    pub offset_x: i32,
    /// Vertical pixel offset applied before scaling.
    pub offset_y: i32,
}

/// Layout of the cloth armor player sheet. Frames are larger than a tile so
/// the sprite is shifted up and left to stand on its cell.
pub const CLOTH_ARMOR: SpriteLayout = SpriteLayout {
    frame_width: 32,
    frame_height: 32,
    offset_x: -8,
    offset_y: -12,
};

/// Layout of the pulsing box marking the end of a planned path.
pub const PATH_TARGET: SpriteLayout = SpriteLayout {
    frame_width: 16,
    frame_height: 16,
    offset_x: 0,
    offset_y: 0,
};

/// Layout of the hand cursor.
pub const HAND_CURSOR: SpriteLayout = SpriteLayout {
    frame_width: 14,
    frame_height: 14,
    offset_x: 0,
    offset_y: 0,
};

const PATH_TARGET_FRAME_DURATION: Duration = Duration::from_millis(50);

/// Idle and walk animations for the cloth armor player sheet.
///
/// Left-facing animations reuse the right-facing rows mirrored.
pub fn cloth_armor() -> Result<AnimationSet, AnimationError> {
    let layout = CLOTH_ARMOR;
    let idle = |row| {
        AnimationSpec::new(
            row,
            layout.frame_width,
            layout.frame_height,
            2,
            DEFAULT_IDLE_SPEED,
        )
    };
    let walk = |row| {
        AnimationSpec::new(
            row,
            layout.frame_width,
            layout.frame_height,
            4,
            DEFAULT_WALK_SPEED,
        )
    };

    let mut set = AnimationSet::new();
    set.register(Activity::Idle, Direction::Up, idle(5))?;
    set.register(Activity::Idle, Direction::Down, idle(8))?;
    set.register(Activity::Idle, Direction::Left, idle(2).flipped())?;
    set.register(Activity::Idle, Direction::Right, idle(2))?;
    set.register(Activity::Walk, Direction::Up, walk(4))?;
    set.register(Activity::Walk, Direction::Down, walk(7))?;
    set.register(Activity::Walk, Direction::Left, walk(1).flipped())?;
    set.register(Activity::Walk, Direction::Right, walk(1))?;
    Ok(set)
}

/// Four-frame animation drawn on the destination of a planned path.
pub fn path_target() -> Result<Animation, AnimationError> {
    Animation::new(AnimationSpec::new(
        0,
        PATH_TARGET.frame_width,
        PATH_TARGET.frame_height,
        4,
        PATH_TARGET_FRAME_DURATION,
    ))
}

/// Static single-frame cursor.
pub fn hand_cursor() -> Result<Animation, AnimationError> {
    Animation::new(AnimationSpec::new(
        0,
        HAND_CURSOR.frame_width,
        HAND_CURSOR.frame_height,
        1,
        Duration::ZERO,
    ))
}
