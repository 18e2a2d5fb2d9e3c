#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Quest engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters translate polled input
//! into [`Command`] values, the world executes those commands via its
//! `apply` entry point and broadcasts [`Event`] values describing what
//! actually happened. Systems only ever read immutable views and respond
//! with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of sub-steps a single-cell move is divided into by default.
pub const DEFAULT_MOVE_LENGTH: u8 = 4;

/// Default time taken to cross one grid cell.
pub const DEFAULT_MOVE_SPEED: Duration = Duration::from_millis(120);

/// Default per-frame duration of idle animations.
pub const DEFAULT_IDLE_SPEED: Duration = Duration::from_millis(450);

/// Default per-frame duration of walk animations.
pub const DEFAULT_WALK_SPEED: Duration = Duration::from_millis(100);

/// Facing of an entity and the direction of a single-cell move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// No facing; moving in this direction leaves the position unchanged.
    #[default]
    None,
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Direction {
    /// The four directions that produce movement.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit displacement `(columns, rows)` produced by a move in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::None => (0, 0),
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Resolves the direction that leads from `from` to the orthogonally
    /// adjacent cell `to`.
    ///
    /// Returns [`Direction::None`] when the cells are equal or not adjacent.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Self {
        let column_diff = to.column() - from.column();
        let row_diff = to.row() - from.row();
        match (column_diff, row_diff) {
            (0, -1) => Self::Up,
            (0, 1) => Self::Down,
            (-1, 0) => Self::Left,
            (1, 0) => Self::Right,
            _ => Self::None,
        }
    }

    /// Reports whether the direction produces no movement.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

/// Animation category that is combined with a [`Direction`] to select a
/// specific animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Activity {
    /// Standing still.
    Idle,
    /// Moving between cells.
    Walk,
    /// Swinging a weapon.
    Attack,
}

/// Location of a single map cell expressed as signed column and row indices.
///
/// Coordinates are signed so paths can be planned between arbitrary cells;
/// the map decides which of them are actually inside its bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the neighbouring cell reached by moving once in `direction`.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (columns, rows) = direction.delta();
        Self::new(self.column + columns, self.row + rows)
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

/// Real-valued position measured in map-grid units.
///
/// Integral while the owner is at rest and fractional while a step is being
/// interpolated between two cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPosition {
    x: f32,
    y: f32,
}

impl GridPosition {
    /// Creates a position from raw grid units.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Position resting exactly on the provided cell.
    #[must_use]
    pub fn from_cell(cell: CellCoord) -> Self {
        Self::new(cell.column() as f32, cell.row() as f32)
    }

    /// Horizontal component in grid units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component in grid units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the position displaced by the provided amounts.
    #[must_use]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Cell closest to the position.
    #[must_use]
    pub fn nearest_cell(&self) -> CellCoord {
        CellCoord::new(self.x.round() as i32, self.y.round() as i32)
    }

    /// Reports whether both components lie on whole cells.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        self.x.fract() == 0.0 && self.y.fract() == 0.0
    }
}

/// Dimensions of the tile map measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapExtent {
    columns: u32,
    rows: u32,
}

impl MapExtent {
    /// Creates a new extent.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns in the map.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the map.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether `cell` lies within `[0, columns - 1] x [0, rows - 1]`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column_inside =
            u32::try_from(cell.column()).map_or(false, |column| column < self.columns);
        let row_inside = u32::try_from(cell.row()).map_or(false, |row| row < self.rows);
        column_inside && row_inside
    }
}

/// Source rectangle inside a sprite sheet, measured in unscaled pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRect {
    /// Left edge of the rectangle.
    pub x: i32,
    /// Top edge of the rectangle.
    pub y: i32,
    /// Width of the rectangle.
    pub width: i32,
    /// Height of the rectangle.
    pub height: i32,
}

impl FrameRect {
    /// Creates a new source rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Teleports the player onto a cell, discarding any movement in flight.
    PlacePlayer {
        /// Cell the player should occupy.
        cell: CellCoord,
    },
    /// Requests a single-cell move in the provided direction.
    MovePlayer {
        /// Direction of travel.
        direction: Direction,
    },
    /// Requests that the player walk to a destination along a planned path.
    TravelTo {
        /// Cell the player should end up on.
        destination: CellCoord,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Reasons a movement request may be turned into a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// The requested cell lies outside the map.
    OutOfBounds,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player was placed on a cell.
    PlayerPlaced {
        /// Cell the player now occupies.
        cell: CellCoord,
    },
    /// Announces that the player turned to face a new direction.
    PlayerTurned {
        /// New facing.
        orientation: Direction,
    },
    /// Announces that the player started moving between two adjacent cells.
    PlayerStepStarted {
        /// Cell the player is leaving.
        from: CellCoord,
        /// Cell the player is moving onto.
        to: CellCoord,
    },
    /// Confirms that the final sub-step of a move landed on a cell.
    PlayerStepCompleted {
        /// Cell the player now occupies.
        cell: CellCoord,
    },
    /// Announces that the player has no movement left and came to rest.
    PlayerStopped {
        /// Cell the player rests on.
        cell: CellCoord,
    },
    /// Reports that a path was planned toward a destination.
    PathPlanned {
        /// Final cell of the path.
        destination: CellCoord,
        /// Number of cells in the path.
        length: usize,
    },
    /// Reports that directional input cancelled the remaining path.
    PathInterrupted {
        /// Direction that will be taken once the current step completes.
        direction: Direction,
    },
    /// Reports that a move request was ignored.
    MoveRejected {
        /// Direction that was requested.
        direction: Direction,
        /// Reason the request was ignored.
        reason: MoveRejection,
    },
    /// Reports that a placement request was ignored.
    PlacementRejected {
        /// Cell that was requested.
        cell: CellCoord,
        /// Reason the request was ignored.
        reason: MoveRejection,
    },
    /// Reports that a travel request was ignored.
    TravelRejected {
        /// Destination that was requested.
        destination: CellCoord,
        /// Reason the request was ignored.
        reason: MoveRejection,
    },
    /// Announces that a different animation was selected for the player.
    AnimationChanged {
        /// Activity of the selected animation.
        activity: Activity,
        /// Facing of the selected animation.
        orientation: Direction,
    },
}
