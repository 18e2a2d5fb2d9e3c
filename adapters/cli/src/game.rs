//! Per-frame orchestration: input to commands, commands to the world, the
//! world to a scene.

use std::time::Duration;

use anyhow::Result;
use glam::{UVec2, Vec2};
use tile_quest_core::{Command, Event, GridPosition};
use tile_quest_rendering::{
    tile_source_rect, Color, DirectionalKeys, FrameInput, GridOverlay, Scene, SpriteDraw,
    SpriteKey,
};
use tile_quest_system_animation::{
    sprites::{self, SpriteLayout, CLOTH_ARMOR, PATH_TARGET},
    Animation,
};
use tile_quest_system_controls::{ControlInput, Controls, HeldKeys};
use tile_quest_system_viewport::{Display, FrameTransform, ScalePolicy};
use tile_quest_world::{apply, query, World};
use tracing::trace;

const GRID_LINE_COLOR: Color = Color::new(1.0, 1.0, 1.0, 0.25);

/// Everything that lives for the duration of the game loop.
#[derive(Debug)]
pub(crate) struct Game {
    world: World,
    display: Display,
    controls: Controls,
    path_target: Animation,
    cursor: Animation,
    tileset_columns: u32,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Game {
    pub(crate) fn new(world: World, policy: ScalePolicy, tileset_columns: u32) -> Result<Self> {
        Ok(Self {
            world,
            display: Display::new(policy),
            controls: Controls::new(),
            path_target: sprites::path_target()?,
            cursor: sprites::hand_cursor()?,
            tileset_columns,
            commands: Vec::new(),
            events: Vec::new(),
        })
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Runs one tick and rebuilds `scene` from the resulting state.
    pub(crate) fn frame(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        let map = query::tile_map(&self.world);
        let extent = map.extent();
        let tile_size = UVec2::new(map.tile_width(), map.tile_height());

        self.display.begin_frame();
        let transform = self.display.update(
            input.back_buffer,
            tile_size,
            extent,
            query::player_position(&self.world),
        );

        let control_input = ControlInput {
            held: held_keys(input.keys),
            cursor: input.cursor,
            primary_down: input.primary_down,
        };
        self.controls.handle(
            &control_input,
            self.display.frame(),
            extent,
            &mut self.commands,
        );
        self.commands.push(Command::Tick { dt });

        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.events);
        }
        for event in self.events.drain(..) {
            trace!(?event, "world_event");
        }

        if query::path_destination(&self.world).is_some() {
            self.path_target.advance(dt);
        } else {
            self.path_target.reset();
        }
        self.cursor.advance(dt);

        self.populate_scene(&transform, input.cursor, scene);
    }

    fn populate_scene(&self, transform: &FrameTransform, cursor: Option<Vec2>, scene: &mut Scene) {
        scene.clear();
        let scale = transform.scale() as f32;
        let map = query::tile_map(&self.world);

        for (viewport, cell) in transform.visible_cells() {
            let position = transform.pixel_position_from_viewport_coordinate(viewport);
            for &gid in map.terrain().tiles_at(cell) {
                match tile_source_rect(
                    gid,
                    self.tileset_columns,
                    map.tile_width(),
                    map.tile_height(),
                ) {
                    Ok(source) => scene.push(SpriteDraw::new(
                        SpriteKey::TileSheet,
                        position,
                        source,
                        scale,
                    )),
                    Err(error) => trace!(%error, ?cell, "tile_skipped"),
                }
            }
        }

        if let Some(destination) = query::path_destination(&self.world) {
            let position = transform.pixel_position_from_map_position(
                GridPosition::from_cell(destination),
                layout_offset(PATH_TARGET),
            );
            scene.push(SpriteDraw::new(
                SpriteKey::PathTarget,
                position,
                self.path_target.current_frame_rect(),
                scale,
            ));
        }

        if let Some(animation) = query::player_animation(&self.world) {
            let position = transform.pixel_position_from_map_position(
                query::player_position(&self.world),
                layout_offset(CLOTH_ARMOR),
            );
            scene.push(
                SpriteDraw::new(
                    SpriteKey::Player,
                    position,
                    animation.current_frame_rect(),
                    scale,
                )
                .flipped(animation.flip_horizontally()),
            );
        }

        if let Some(cursor) = cursor {
            scene.push(SpriteDraw::new(
                SpriteKey::Cursor,
                cursor,
                self.cursor.current_frame_rect(),
                scale,
            ));
        }

        let viewport_cells = transform.viewport_cells();
        scene.grid = Some(GridOverlay {
            origin: transform.pixel_position_from_viewport_coordinate(Vec2::ZERO),
            cell_size: (transform.tile_size() * transform.scale()).as_vec2(),
            columns: viewport_cells.x + 1,
            rows: viewport_cells.y + 1,
            line_color: GRID_LINE_COLOR,
        });
    }
}

fn held_keys(keys: DirectionalKeys) -> HeldKeys {
    HeldKeys {
        up: keys.up,
        down: keys.down,
        left: keys.left,
        right: keys.right,
    }
}

fn layout_offset(layout: SpriteLayout) -> Vec2 {
    Vec2::new(layout.offset_x as f32, layout.offset_y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_quest_core::{CellCoord, FrameRect, MapExtent};
    use tile_quest_world::{
        map::{TileLayer, TileMap},
        player::PlayerConfig,
    };

    const TICK: Duration = Duration::from_millis(30);
    const BACK_BUFFER: UVec2 = UVec2::new(640, 480);

    fn game() -> Game {
        let extent = MapExtent::new(30, 20);
        let map = TileMap::new(
            extent,
            16,
            16,
            [0, 0, 0],
            &[TileLayer {
                name: "ground".to_owned(),
                visible: true,
                tiles: vec![9; 600],
            }],
        )
        .expect("valid map");
        let player = PlayerConfig::cloth_armor(CellCoord::new(2, 2)).expect("config");
        let world = World::new(map, player).expect("world");
        Game::new(world, ScalePolicy::DEFAULT, 8).expect("game")
    }

    fn input() -> FrameInput {
        FrameInput {
            back_buffer: BACK_BUFFER,
            ..FrameInput::default()
        }
    }

    fn sprite_keys(scene: &Scene) -> Vec<SpriteKey> {
        scene.sprites.iter().map(|draw| draw.sprite).collect()
    }

    #[test]
    fn scene_layers_terrain_player_and_cursor() {
        let mut game = game();
        let mut scene = Scene::new(Color::from_rgb_u8(0, 0, 0));

        game.frame(
            TICK,
            FrameInput {
                cursor: Some(Vec2::new(100.0, 100.0)),
                ..input()
            },
            &mut scene,
        );

        let keys = sprite_keys(&scene);
        // 640x480 at 2x with 16px tiles shows 20x15 cells plus one extra edge.
        assert_eq!(keys.len(), 21 * 16 + 2);
        assert!(keys[..21 * 16]
            .iter()
            .all(|&key| key == SpriteKey::TileSheet));
        assert_eq!(keys[21 * 16..], [SpriteKey::Player, SpriteKey::Cursor]);

        let tile = scene.sprites[0];
        assert_eq!(tile.source, FrameRect::new(0, 16, 16, 16));
        assert_eq!(tile.dest_size(), Vec2::splat(32.0));

        let player = scene.sprites[21 * 16];
        assert_eq!(player.position, Vec2::new(48.0, 40.0));
        assert_eq!(player.source, FrameRect::new(0, 256, 32, 32));
    }

    #[test]
    fn click_plans_path_and_marks_destination() {
        let mut game = game();
        let mut scene = Scene::new(Color::from_rgb_u8(0, 0, 0));

        game.frame(
            TICK,
            FrameInput {
                cursor: Some(Vec2::new(5.0 * 32.0 + 1.0, 3.0 * 32.0 + 1.0)),
                primary_down: true,
                ..input()
            },
            &mut scene,
        );

        assert_eq!(
            query::path_destination(game.world()),
            Some(CellCoord::new(5, 3))
        );
        assert!(query::is_player_moving(game.world()));

        let marker = scene
            .sprites
            .iter()
            .find(|draw| draw.sprite == SpriteKey::PathTarget)
            .expect("path target is drawn");
        assert_eq!(marker.position, Vec2::new(160.0, 96.0));
        let marker_index = sprite_keys(&scene)
            .iter()
            .position(|&key| key == SpriteKey::PathTarget);
        let player_index = sprite_keys(&scene)
            .iter()
            .position(|&key| key == SpriteKey::Player);
        assert!(marker_index < player_index);
    }

    #[test]
    fn holding_a_key_walks_one_cell_per_step() {
        let mut game = game();
        let mut scene = Scene::new(Color::from_rgb_u8(0, 0, 0));
        let right = FrameInput {
            keys: DirectionalKeys {
                right: true,
                ..DirectionalKeys::default()
            },
            ..input()
        };

        for _ in 0..4 {
            game.frame(TICK, right, &mut scene);
        }

        assert_eq!(
            query::player_position(game.world()),
            GridPosition::from_cell(CellCoord::new(3, 2))
        );
        assert!(!query::is_player_moving(game.world()));

        game.frame(TICK, right, &mut scene);
        assert!(query::is_player_moving(game.world()));
    }

    #[test]
    fn grid_overlay_covers_the_viewport() {
        let mut game = game();
        let mut scene = Scene::new(Color::from_rgb_u8(0, 0, 0));

        game.frame(TICK, input(), &mut scene);

        let grid = scene.grid.expect("grid is always provided");
        assert_eq!(grid.origin, Vec2::ZERO);
        assert_eq!(grid.cell_size, Vec2::splat(32.0));
        assert_eq!((grid.columns, grid.rows), (21, 16));
    }
}
