#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Tile Quest experience.

mod config;
mod game;
mod map_file;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::UVec2;
use tile_quest_core::CellCoord;
use tile_quest_rendering::{Color, Presentation, RenderingBackend, Scene};
use tile_quest_rendering_macroquad::MacroquadBackend;
use tile_quest_world::{player::PlayerConfig, query, World};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{config::GameConfig, game::Game};

/// Explore a tile map with the keyboard or by clicking a destination.
#[derive(Debug, Parser)]
#[command(name = "tile-quest", version)]
struct CliArgs {
    /// TOML map to load.
    #[arg(long, value_name = "PATH", default_value = "assets/map.toml")]
    map: PathBuf,
    /// Optional TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Sprite manifest listing the textures to load.
    #[arg(long, value_name = "PATH", default_value = "assets/manifest.toml")]
    manifest: PathBuf,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Render as fast as possible.
    #[arg(long = "no-vsync", overrides_with = "vsync")]
    no_vsync: bool,
    /// Log frame timing once per second.
    #[arg(long)]
    show_fps: bool,
    /// Draw placeholder rectangles instead of loading sprites.
    #[arg(long)]
    no_sprites: bool,
    /// Tracing filter directives; defaults to `RUST_LOG` or `info`.
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,
    /// Cell the player starts on, as `column,row`.
    #[arg(long, value_name = "X,Y", value_parser = parse_cell, default_value = "0,0")]
    start: CellCoord,
}

impl CliArgs {
    fn vsync(&self) -> Option<bool> {
        if self.vsync {
            Some(true)
        } else if self.no_vsync {
            Some(false)
        } else {
            None
        }
    }
}

/// Entry point for the Tile Quest command-line interface.
fn main() {
    let args = CliArgs::parse();
    init_tracing(args.log_filter.as_deref());

    if let Err(error) = run(args) {
        let message = format!("{error:#}");
        error!(error = %message, "startup_failed");
        std::process::exit(1);
    }
}

fn init_tracing(directives: Option<&str>) {
    let (filter, rejected) = match directives.map(EnvFilter::try_new) {
        Some(Ok(filter)) => (filter, None),
        Some(Err(error)) => (EnvFilter::new("info"), Some(error)),
        None => (
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            None,
        ),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    if let Some(error) = rejected {
        warn!(%error, "invalid_log_filter");
    }
}

fn run(args: CliArgs) -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "tile_quest_startup");

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let loaded = map_file::load_map(&args.map)?;
    let extent = loaded.map.extent();
    info!(
        path = %args.map.display(),
        columns = extent.columns(),
        rows = extent.rows(),
        terrain_cells = loaded.map.terrain().len(),
        "map_loaded"
    );

    let mut player = PlayerConfig::cloth_armor(args.start)?;
    player.movement_length = config.movement.length;
    player.movement_speed = config.movement.speed();
    let world = World::new(loaded.map, player).context("failed to create world")?;

    let mut game = Game::new(world, config.display, loaded.tileset_columns)?;
    let [red, green, blue] = query::tile_map(game.world()).background();
    let background = Color::from_rgb_u8(red, green, blue);

    let window = config.window;
    let window_size = UVec2::new(window.width, window.height);
    info!(
        width = window.width,
        height = window.height,
        title = %window.title,
        vsync = ?args.vsync(),
        "window_configured"
    );
    let presentation = Presentation::new(window.title, window_size, Scene::new(background));

    let mut backend = MacroquadBackend::new()
        .with_show_fps(args.show_fps)
        .with_sprite_loading(!args.no_sprites)
        .with_manifest_path(args.manifest.clone());
    if let Some(enabled) = args.vsync() {
        backend = backend.with_vsync(enabled);
    }

    backend.run(presentation, move |dt, input, scene| {
        game.frame(dt, input, scene);
    })
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `column,row`, found `{value}`"))?;
    let column = column
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    let row = row
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;
    Ok(CellCoord::new(column, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn start_cell_parses_column_then_row() {
        assert_eq!(parse_cell("3,7"), Ok(CellCoord::new(3, 7)));
        assert_eq!(parse_cell(" 4 , 0 "), Ok(CellCoord::new(4, 0)));
        assert!(parse_cell("3").is_err());
        assert!(parse_cell("a,1").is_err());
    }

    #[test]
    fn vsync_flags_resolve_to_an_override() {
        let parse = |extra: &[&str]| {
            CliArgs::try_parse_from(std::iter::once("tile-quest").chain(extra.iter().copied()))
                .expect("arguments parse")
        };

        assert_eq!(parse(&[]).vsync(), None);
        assert_eq!(parse(&["--vsync"]).vsync(), Some(true));
        assert_eq!(parse(&["--no-vsync"]).vsync(), Some(false));
        assert_eq!(parse(&["--vsync", "--no-vsync"]).vsync(), Some(false));
    }

    #[test]
    fn defaults_point_at_bundled_assets() {
        let args = CliArgs::try_parse_from(["tile-quest", "--start", "2,5"]).expect("parse");

        assert_eq!(args.map, PathBuf::from("assets/map.toml"));
        assert_eq!(args.manifest, PathBuf::from("assets/manifest.toml"));
        assert_eq!(args.start, CellCoord::new(2, 5));
        assert!(args.config.is_none());
    }
}
