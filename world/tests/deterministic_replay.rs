use std::time::Duration;

use tile_quest_core::{CellCoord, Command, Direction, Event, GridPosition, MapExtent};
use tile_quest_world::{
    self as world,
    map::{TileLayer, TileMap},
    player::PlayerConfig,
    query, World,
};

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.position, GridPosition::new(6.0, 1.0));
    assert!(!first.moving);
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    position: GridPosition,
    moving: bool,
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let map = TileMap::new(
        MapExtent::new(12, 8),
        16,
        16,
        [0, 0, 0],
        &[TileLayer {
            name: "ground".to_owned(),
            visible: true,
            tiles: vec![3; 96],
        }],
    )
    .expect("valid map");
    let mut world = World::new(
        map,
        PlayerConfig::cloth_armor(CellCoord::new(2, 2)).expect("config"),
    )
    .expect("world");

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    ReplayOutcome {
        events,
        position: query::player_position(&world),
        moving: query::is_player_moving(&world),
    }
}

fn scripted_commands() -> Vec<Command> {
    let frame = Command::Tick {
        dt: Duration::from_millis(16),
    };
    let mut commands = vec![Command::TravelTo {
        destination: CellCoord::new(7, 4),
    }];
    commands.extend(std::iter::repeat(frame.clone()).take(20));
    commands.push(Command::MovePlayer {
        direction: Direction::Up,
    });
    commands.extend(std::iter::repeat(frame.clone()).take(40));
    commands.push(Command::MovePlayer {
        direction: Direction::Right,
    });
    commands.push(Command::MovePlayer {
        direction: Direction::Up,
    });
    commands.extend(std::iter::repeat(frame).take(40));
    commands
}
