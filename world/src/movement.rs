//! Step-wise grid movement with path following and interruption.
//!
//! A single-cell move is split into `movement_length` sub-steps that are
//! applied one per elapsed `movement_speed / movement_length`. The
//! controller is idle exactly when no sub-step is pending. A planned path
//! is consumed one cell at a time as each move completes; directional input
//! issued while on a path cancels the rest of it and takes effect once the
//! move in flight lands.

use std::{collections::VecDeque, time::Duration};

use thiserror::Error;
use tile_quest_core::{CellCoord, Direction, Event, GridPosition, MapExtent, MoveRejection};
use tile_quest_system_pathfinding::find_path;
use tracing::{debug, trace};

/// Largest supported number of sub-steps per cell.
pub const MAX_MOVEMENT_LENGTH: u8 = 16;

/// Errors raised while configuring a [`MovementController`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MovementError {
    /// The sub-step count does not fit the step buffer.
    #[error("movement length must be between 1 and 16 (received {length})")]
    InvalidLength {
        /// Requested sub-step count.
        length: u8,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct StepRecord {
    dx: f32,
    dy: f32,
    is_final: bool,
}

/// Pending sub-steps of the move in flight, consumed from the back.
#[derive(Clone, Debug, Default)]
struct StepQueue {
    records: [StepRecord; MAX_MOVEMENT_LENGTH as usize],
    remaining: usize,
}

impl StepQueue {
    fn fill(&mut self, direction: Direction, length: u8) {
        let (dx, dy) = direction.delta();
        let length = usize::from(length).min(self.records.len());
        let fraction = 1.0 / length as f32;
        for (index, record) in self.records[..length].iter_mut().enumerate() {
            *record = StepRecord {
                dx: dx as f32 * fraction,
                dy: dy as f32 * fraction,
                is_final: index == 0,
            };
        }
        self.remaining = length;
    }

    fn pop(&mut self) -> Option<StepRecord> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.records[self.remaining])
    }

    fn clear(&mut self) {
        self.remaining = 0;
    }

    fn len(&self) -> usize {
        self.remaining
    }

    fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

/// Moves an entity across the map grid one cell at a time.
#[derive(Clone, Debug)]
pub struct MovementController {
    orientation: Direction,
    position: GridPosition,
    step_target: Option<CellCoord>,
    queue: StepQueue,
    path: VecDeque<CellCoord>,
    travel_destination: Option<CellCoord>,
    interrupting: Option<Direction>,
    elapsed: Duration,
    movement_length: u8,
    movement_speed: Duration,
}

impl MovementController {
    /// Creates an idle controller resting on `start` and facing down.
    pub fn new(
        start: CellCoord,
        movement_length: u8,
        movement_speed: Duration,
    ) -> Result<Self, MovementError> {
        if movement_length == 0 || movement_length > MAX_MOVEMENT_LENGTH {
            return Err(MovementError::InvalidLength {
                length: movement_length,
            });
        }

        Ok(Self {
            orientation: Direction::Down,
            position: GridPosition::from_cell(start),
            step_target: None,
            queue: StepQueue::default(),
            path: VecDeque::new(),
            travel_destination: None,
            interrupting: None,
            elapsed: Duration::ZERO,
            movement_length,
            movement_speed,
        })
    }

    /// Current facing.
    #[must_use]
    pub const fn orientation(&self) -> Direction {
        self.orientation
    }

    /// Current position, fractional while a move is in flight.
    #[must_use]
    pub const fn position(&self) -> GridPosition {
        self.position
    }

    /// Reports whether a move is in flight.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of sub-steps left in the move in flight.
    #[must_use]
    pub fn pending_sub_steps(&self) -> usize {
        self.queue.len()
    }

    /// Cell the move in flight lands on.
    #[must_use]
    pub const fn step_target(&self) -> Option<CellCoord> {
        self.step_target
    }

    /// Cells still to be visited after the move in flight.
    #[must_use]
    pub fn path(&self) -> &VecDeque<CellCoord> {
        &self.path
    }

    /// Destination of the travel in progress.
    #[must_use]
    pub const fn travel_destination(&self) -> Option<CellCoord> {
        self.travel_destination
    }

    /// Direction queued to run once the move in flight lands.
    #[must_use]
    pub const fn interrupting(&self) -> Option<Direction> {
        self.interrupting
    }

    /// Sub-steps per cell.
    #[must_use]
    pub const fn movement_length(&self) -> u8 {
        self.movement_length
    }

    /// Time taken to cross one cell.
    #[must_use]
    pub const fn movement_speed(&self) -> Duration {
        self.movement_speed
    }

    /// Cell the controller occupies, or will occupy once the move in flight
    /// lands.
    #[must_use]
    pub fn current_cell(&self) -> CellCoord {
        self.step_target.unwrap_or_else(|| self.position.nearest_cell())
    }

    fn sub_step_duration(&self) -> Duration {
        self.movement_speed / u32::from(self.movement_length)
    }

    /// Discards all movement and rests on `cell`.
    pub fn place(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        self.queue.clear();
        self.path.clear();
        self.step_target = None;
        self.travel_destination = None;
        self.interrupting = None;
        self.elapsed = Duration::ZERO;
        self.position = GridPosition::from_cell(cell);
        out_events.push(Event::PlayerPlaced { cell });
    }

    /// Handles a directional move request.
    pub fn move_in(&mut self, direction: Direction, map: MapExtent, out_events: &mut Vec<Event>) {
        if direction.is_none() {
            return;
        }

        if self.is_moving() {
            if self.path.is_empty() {
                trace!(?direction, "move_ignored_during_step");
                return;
            }
            self.path.clear();
            self.travel_destination = None;
            self.interrupting = Some(direction);
            debug!(?direction, "path_interrupted");
            out_events.push(Event::PathInterrupted { direction });
            return;
        }

        self.path.clear();
        self.travel_destination = None;
        let _ = self.start_step(direction, map, out_events);
    }

    /// Plans a path to `destination` and starts walking it when idle.
    ///
    /// While a move is in flight the path is planned from the cell that move
    /// lands on and is picked up once it completes.
    pub fn travel_to(
        &mut self,
        destination: CellCoord,
        map: MapExtent,
        out_events: &mut Vec<Event>,
    ) {
        if !map.contains(destination) {
            debug!(cell = ?destination, "travel_rejected");
            out_events.push(Event::TravelRejected {
                destination,
                reason: MoveRejection::OutOfBounds,
            });
            return;
        }

        let origin = self.current_cell();
        self.path = find_path(origin, destination);
        self.interrupting = None;
        self.travel_destination = if self.path.is_empty() {
            None
        } else {
            Some(destination)
        };
        debug!(from = ?origin, to = ?destination, length = self.path.len(), "path_planned");
        out_events.push(Event::PathPlanned {
            destination,
            length: self.path.len(),
        });

        if !self.is_moving() {
            let _ = self.follow_path(map, out_events);
        }
    }

    /// Advances the move in flight by `dt`, applying at most one sub-step.
    pub fn tick(&mut self, dt: Duration, map: MapExtent, out_events: &mut Vec<Event>) {
        if !self.is_moving() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < self.sub_step_duration() {
            return;
        }
        self.elapsed = Duration::ZERO;

        let Some(record) = self.queue.pop() else {
            return;
        };
        self.position = self.position.translated(record.dx, record.dy);
        if record.is_final {
            self.complete_step(map, out_events);
        }
    }

    fn complete_step(&mut self, map: MapExtent, out_events: &mut Vec<Event>) {
        let cell = self.current_cell();
        self.step_target = None;
        self.position = GridPosition::from_cell(cell);
        out_events.push(Event::PlayerStepCompleted { cell });

        if let Some(direction) = self.interrupting.take() {
            if self.start_step(direction, map, out_events) {
                return;
            }
        } else if self.follow_path(map, out_events) {
            return;
        }

        self.path.clear();
        self.travel_destination = None;
        out_events.push(Event::PlayerStopped { cell });
    }

    /// Starts a move toward the next path cell that is not the current one.
    fn follow_path(&mut self, map: MapExtent, out_events: &mut Vec<Event>) -> bool {
        let origin = self.current_cell();
        while let Some(next) = self.path.pop_front() {
            let direction = Direction::between(origin, next);
            if direction.is_none() {
                continue;
            }
            return self.start_step(direction, map, out_events);
        }
        false
    }

    fn start_step(
        &mut self,
        direction: Direction,
        map: MapExtent,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let from = self.current_cell();
        let to = from.offset(direction);
        if !map.contains(to) {
            debug!(?direction, cell = ?to, "move_rejected");
            out_events.push(Event::MoveRejected {
                direction,
                reason: MoveRejection::OutOfBounds,
            });
            return false;
        }

        if self.orientation != direction {
            self.orientation = direction;
            out_events.push(Event::PlayerTurned {
                orientation: direction,
            });
        }

        self.queue.fill(direction, self.movement_length);
        self.step_target = Some(to);
        self.elapsed = Duration::ZERO;
        out_events.push(Event::PlayerStepStarted { from, to });
        true
    }
}
