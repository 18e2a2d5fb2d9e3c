//! TOML map files.
//!
//! ```toml
//! columns = 40
//! rows = 30
//! tile_width = 16
//! tile_height = 16
//! tileset_columns = 8
//! background = [32, 48, 64]
//!
//! [[layers]]
//! name = "ground"
//! tiles = [1, 1, 2, ...]
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tile_quest_core::MapExtent;
use tile_quest_world::map::{TileLayer, TileMap, TileMapError};

/// Errors raised while turning a parsed map file into a [`TileMap`].
#[derive(Debug, Error)]
pub(crate) enum MapFileError {
    #[error("tile sheet must be at least one tile wide")]
    EmptyTileSheet,
    #[error(transparent)]
    Map(#[from] TileMapError),
}

/// Map together with the layout of its tile sheet.
#[derive(Debug)]
pub(crate) struct LoadedMap {
    pub(crate) map: TileMap,
    pub(crate) tileset_columns: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapFile {
    columns: u32,
    rows: u32,
    tile_width: u32,
    tile_height: u32,
    tileset_columns: u32,
    #[serde(default)]
    background: [u8; 3],
    #[serde(default)]
    layers: Vec<LayerFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayerFile {
    name: String,
    #[serde(default = "layer_visible_by_default")]
    visible: bool,
    tiles: Vec<i64>,
}

fn layer_visible_by_default() -> bool {
    true
}

pub(crate) fn load_map(path: &Path) -> Result<LoadedMap> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read map file at {}", path.display()))?;
    parse_map(&contents).with_context(|| format!("invalid map file {}", path.display()))
}

pub(crate) fn parse_map(contents: &str) -> Result<LoadedMap> {
    let file: MapFile = toml::from_str(contents).context("failed to parse map toml contents")?;
    if file.tileset_columns == 0 {
        return Err(MapFileError::EmptyTileSheet.into());
    }

    let layers: Vec<TileLayer> = file
        .layers
        .into_iter()
        .map(|layer| TileLayer {
            name: layer.name,
            visible: layer.visible,
            tiles: layer.tiles,
        })
        .collect();
    let map = TileMap::new(
        MapExtent::new(file.columns, file.rows),
        file.tile_width,
        file.tile_height,
        file.background,
        &layers,
    )
    .map_err(MapFileError::from)?;

    Ok(LoadedMap {
        map,
        tileset_columns: file.tileset_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_quest_core::CellCoord;

    #[test]
    fn layers_build_the_terrain_index() {
        let loaded = parse_map(
            r#"
            columns = 3
            rows = 2
            tile_width = 16
            tile_height = 16
            tileset_columns = 8
            background = [10, 20, 30]

            [[layers]]
            name = "ground"
            tiles = [1, 1, 1, 2, 2, 2]

            [[layers]]
            name = "decor"
            tiles = [0, 9, 0, 0, 0, -1]

            [[layers]]
            name = "hidden"
            visible = false
            tiles = [5, 5, 5, 5, 5, 5]
            "#,
        )
        .expect("map parses");

        let map = &loaded.map;
        assert_eq!(loaded.tileset_columns, 8);
        assert_eq!(map.extent(), MapExtent::new(3, 2));
        assert_eq!(map.background(), [10, 20, 30]);
        assert_eq!(map.terrain().tiles_at(CellCoord::new(1, 0)), &[1, 9]);
        assert_eq!(map.terrain().tiles_at(CellCoord::new(2, 1)), &[2]);
        assert_eq!(map.terrain().len(), 6);
    }

    #[test]
    fn bundled_map_loads() {
        let loaded = parse_map(include_str!("../../../assets/map.toml")).expect("bundled map");

        assert_eq!(loaded.map.extent(), MapExtent::new(40, 30));
        assert_eq!(loaded.tileset_columns, 8);
        assert_eq!(loaded.map.terrain().len(), 1200);
    }

    #[test]
    fn short_layers_are_rejected() {
        let error = parse_map(
            r#"
            columns = 2
            rows = 2
            tile_width = 16
            tile_height = 16
            tileset_columns = 4

            [[layers]]
            name = "ground"
            tiles = [1, 1, 1]
            "#,
        )
        .expect_err("layer is one tile short");

        assert!(matches!(
            error.downcast_ref::<MapFileError>(),
            Some(MapFileError::Map(TileMapError::LayerSize { .. }))
        ));
    }

    #[test]
    fn tile_sheet_needs_columns() {
        let error = parse_map(
            r#"
            columns = 1
            rows = 1
            tile_width = 16
            tile_height = 16
            tileset_columns = 0
            "#,
        )
        .expect_err("zero-width tile sheet");

        assert!(matches!(
            error.downcast_ref::<MapFileError>(),
            Some(MapFileError::EmptyTileSheet)
        ));
    }
}
