#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Translates polled keyboard and mouse state into world commands.

use glam::Vec2;
use tile_quest_core::{Command, Direction, MapExtent};
use tile_quest_system_viewport::FrameTransform;
use tracing::{debug, trace};

/// Directional keys held during the current tick. Arrow keys and WASD
/// both map onto these flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    /// Up arrow or `W`.
    pub up: bool,
    /// Down arrow or `S`.
    pub down: bool,
    /// Left arrow or `A`.
    pub left: bool,
    /// Right arrow or `D`.
    pub right: bool,
}

impl HeldKeys {
    /// First held direction in the priority order up, down, left, right.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        if self.up {
            Direction::Up
        } else if self.down {
            Direction::Down
        } else if self.left {
            Direction::Left
        } else if self.right {
            Direction::Right
        } else {
            Direction::None
        }
    }
}

/// Input snapshot polled once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlInput {
    /// Directional keys currently held.
    pub held: HeldKeys,
    /// Cursor position in back-buffer pixels, when inside the window.
    pub cursor: Option<Vec2>,
    /// Whether the primary mouse button is down.
    pub primary_down: bool,
}

/// Stateful translator from input snapshots to commands.
#[derive(Debug, Default)]
pub struct Controls {
    primary_was_down: bool,
}

impl Controls {
    /// Creates a translator that treats the primary button as released.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits the commands implied by `input`.
    ///
    /// A held directional key produces a `MovePlayer` every tick; the world
    /// decides whether the move starts, is deferred or is ignored. A click is
    /// recognised on the tick the primary button goes down and becomes a
    /// `TravelTo` when the cursor lies over the map.
    pub fn handle(
        &mut self,
        input: &ControlInput,
        transform: Option<&FrameTransform>,
        map: MapExtent,
        out: &mut Vec<Command>,
    ) {
        let direction = input.held.direction();
        if !direction.is_none() {
            out.push(Command::MovePlayer { direction });
        }

        let clicked = input.primary_down && !self.primary_was_down;
        self.primary_was_down = input.primary_down;
        if !clicked {
            return;
        }

        let Some(cursor) = input.cursor else {
            trace!("click_outside_window");
            return;
        };
        let Some(destination) = transform.and_then(|frame| frame.map_cell_from_pixel(cursor))
        else {
            debug!(x = cursor.x, y = cursor.y, "click_without_transform");
            return;
        };

        if map.contains(destination) {
            out.push(Command::TravelTo { destination });
        } else {
            trace!(cell = ?destination, "click_outside_map");
        }
    }
}
