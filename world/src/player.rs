//! The player entity: grid movement paired with its animation set.

use std::time::Duration;

use thiserror::Error;
use tile_quest_core::{
    Activity, CellCoord, Direction, Event, MapExtent, DEFAULT_MOVE_LENGTH, DEFAULT_MOVE_SPEED,
};
use tile_quest_system_animation::{sprites, Animation, AnimationError, AnimationKey, AnimationSet};
use tracing::warn;

use crate::movement::{MovementController, MovementError};

/// Activities every player sprite must provide in all four directions.
pub const REQUIRED_ACTIVITIES: [Activity; 2] = [Activity::Idle, Activity::Walk];

/// Errors raised while constructing a [`Player`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PlayerError {
    /// Movement parameters were rejected.
    #[error(transparent)]
    Movement(#[from] MovementError),
    /// The animation set is incomplete or invalid.
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Construction parameters of the player.
#[derive(Clone, Debug)]
pub struct PlayerConfig {
    /// Cell the player starts on.
    pub start: CellCoord,
    /// Sub-steps per cell.
    pub movement_length: u8,
    /// Time taken to cross one cell.
    pub movement_speed: Duration,
    /// Animations of the player sprite.
    pub animations: AnimationSet,
}

impl PlayerConfig {
    /// Cloth armor sprite with the default movement timing.
    pub fn cloth_armor(start: CellCoord) -> Result<Self, PlayerError> {
        Ok(Self {
            start,
            movement_length: DEFAULT_MOVE_LENGTH,
            movement_speed: DEFAULT_MOVE_SPEED,
            animations: sprites::cloth_armor()?,
        })
    }
}

/// Player state owned by the world.
#[derive(Clone, Debug)]
pub struct Player {
    movement: MovementController,
    animations: AnimationSet,
}

impl Player {
    /// Validates the configuration and creates an idle player.
    pub fn new(config: PlayerConfig) -> Result<Self, PlayerError> {
        config.animations.require_cardinals(&REQUIRED_ACTIVITIES)?;
        let movement =
            MovementController::new(config.start, config.movement_length, config.movement_speed)?;
        let mut animations = config.animations;
        animations.select(Activity::Idle, movement.orientation())?;

        Ok(Self {
            movement,
            animations,
        })
    }

    /// Movement state.
    #[must_use]
    pub fn movement(&self) -> &MovementController {
        &self.movement
    }

    /// Animation currently playing.
    #[must_use]
    pub fn animation(&self) -> Option<&Animation> {
        self.animations.current()
    }

    /// Key of the animation currently playing.
    #[must_use]
    pub fn animation_key(&self) -> Option<AnimationKey> {
        self.animations.current_key()
    }

    /// Switches to the `activity` animation for the current facing.
    ///
    /// Returns an error when the sprite declares no such animation.
    pub fn animate(&mut self, activity: Activity) -> Result<(), AnimationError> {
        self.animations.select(activity, self.movement.orientation())
    }

    pub(crate) fn place(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        self.movement.place(cell, out_events);
        self.sync_animation(self.movement.is_moving(), out_events);
    }

    pub(crate) fn move_in(
        &mut self,
        direction: Direction,
        map: MapExtent,
        out_events: &mut Vec<Event>,
    ) {
        self.movement.move_in(direction, map, out_events);
        self.sync_animation(self.movement.is_moving(), out_events);
    }

    pub(crate) fn travel_to(
        &mut self,
        destination: CellCoord,
        map: MapExtent,
        out_events: &mut Vec<Event>,
    ) {
        self.movement.travel_to(destination, map, out_events);
        self.sync_animation(self.movement.is_moving(), out_events);
    }

    /// Advances movement and animation by `dt`.
    ///
    /// Walk versus idle follows the motion state from before the tick, so the
    /// player goes idle only after a full tick without motion.
    pub(crate) fn tick(&mut self, dt: Duration, map: MapExtent, out_events: &mut Vec<Event>) {
        let was_moving = self.movement.is_moving();
        self.movement.tick(dt, map, out_events);
        self.animations.advance(dt);
        self.sync_animation(was_moving, out_events);
    }

    /// Selects the walk or idle animation for the current facing unless it
    /// is already playing.
    fn sync_animation(&mut self, moving: bool, out_events: &mut Vec<Event>) {
        let activity = if moving {
            Activity::Walk
        } else {
            Activity::Idle
        };
        let orientation = self.movement.orientation();
        let desired = AnimationKey::new(activity, orientation);
        if self.animations.current_key() == Some(desired) {
            return;
        }

        match self.animations.select(activity, orientation) {
            Ok(()) => out_events.push(Event::AnimationChanged {
                activity,
                orientation,
            }),
            Err(error) => warn!(%error, "animation_unavailable"),
        }
    }
}
