#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tile Quest.

pub mod map;
pub mod movement;
pub mod player;

use thiserror::Error;
use tile_quest_core::{CellCoord, Command, Event, MoveRejection};
use tracing::debug;

use crate::{
    map::TileMap,
    player::{Player, PlayerConfig, PlayerError},
};

/// Errors raised while constructing a [`World`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The player configuration was rejected.
    #[error(transparent)]
    Player(#[from] PlayerError),
    /// The player would start outside the map.
    #[error("player start cell ({column}, {row}) lies outside the map")]
    StartOutsideMap {
        /// Requested start column.
        column: i32,
        /// Requested start row.
        row: i32,
    },
}

/// Represents the authoritative Tile Quest world state.
#[derive(Debug)]
pub struct World {
    map: TileMap,
    player: Player,
    tick_index: u64,
}

impl World {
    /// Creates a world with the player resting on its start cell.
    pub fn new(map: TileMap, player: PlayerConfig) -> Result<Self, WorldError> {
        let start: CellCoord = player.start;
        if !map.contains(start) {
            return Err(WorldError::StartOutsideMap {
                column: start.column(),
                row: start.row(),
            });
        }

        Ok(Self {
            map,
            player: Player::new(player)?,
            tick_index: 0,
        })
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let extent = world.map.extent();
    match command {
        Command::PlacePlayer { cell } => {
            if world.map.contains(cell) {
                world.player.place(cell, out_events);
            } else {
                debug!(?cell, "placement_rejected");
                out_events.push(Event::PlacementRejected {
                    cell,
                    reason: MoveRejection::OutOfBounds,
                });
            }
        }
        Command::MovePlayer { direction } => {
            world.player.move_in(direction, extent, out_events);
        }
        Command::TravelTo { destination } => {
            world.player.travel_to(destination, extent, out_events);
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.player.tick(dt, extent, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::VecDeque;

    use tile_quest_core::{CellCoord, Direction, GridPosition};
    use tile_quest_system_animation::Animation;

    use super::World;
    use crate::{map::TileMap, player::Player};

    /// Provides read-only access to the loaded map.
    #[must_use]
    pub fn tile_map(world: &World) -> &TileMap {
        &world.map
    }

    /// Provides read-only access to the player.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Current player position in map-grid units.
    #[must_use]
    pub fn player_position(world: &World) -> GridPosition {
        world.player.movement().position()
    }

    /// Current player facing.
    #[must_use]
    pub fn player_orientation(world: &World) -> Direction {
        world.player.movement().orientation()
    }

    /// Reports whether the player is between two cells.
    #[must_use]
    pub fn is_player_moving(world: &World) -> bool {
        world.player.movement().is_moving()
    }

    /// Cells the player still has to visit after the move in flight.
    #[must_use]
    pub fn player_path(world: &World) -> &VecDeque<CellCoord> {
        world.player.movement().path()
    }

    /// Destination of the travel in progress, if any.
    #[must_use]
    pub fn path_destination(world: &World) -> Option<CellCoord> {
        world.player.movement().travel_destination()
    }

    /// Animation currently drawn for the player.
    #[must_use]
    pub fn player_animation(world: &World) -> Option<&Animation> {
        world.player.animation()
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::map::TileLayer;
    use tile_quest_core::{Direction, MapExtent};

    fn world_at(start: CellCoord) -> Result<World, WorldError> {
        let map = TileMap::new(
            MapExtent::new(5, 4),
            16,
            16,
            [0x20, 0x30, 0x40],
            &[TileLayer {
                name: "ground".to_owned(),
                visible: true,
                tiles: vec![1; 20],
            }],
        )
        .expect("valid map");
        World::new(map, PlayerConfig::cloth_armor(start).expect("config"))
    }

    #[test]
    fn start_must_lie_on_the_map() {
        assert_eq!(
            world_at(CellCoord::new(5, 0)).err(),
            Some(WorldError::StartOutsideMap { column: 5, row: 0 })
        );
    }

    #[test]
    fn placement_discards_movement() {
        let mut world = world_at(CellCoord::new(1, 1)).expect("world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::Right,
            },
            &mut events,
        );
        assert!(query::is_player_moving(&world));

        apply(
            &mut world,
            Command::PlacePlayer {
                cell: CellCoord::new(4, 3),
            },
            &mut events,
        );

        assert!(!query::is_player_moving(&world));
        assert_eq!(
            query::player_position(&world).nearest_cell(),
            CellCoord::new(4, 3)
        );
    }

    #[test]
    fn placement_outside_map_is_reported() {
        let mut world = world_at(CellCoord::new(1, 1)).expect("world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlacePlayer {
                cell: CellCoord::new(-1, 0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                cell: CellCoord::new(-1, 0),
                reason: MoveRejection::OutOfBounds,
            }]
        );
    }

    #[test]
    fn ticks_are_counted_and_announced() {
        let mut world = world_at(CellCoord::new(0, 0)).expect("world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        assert_eq!(query::tick_index(&world), 1);
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            }]
        );
    }
}
