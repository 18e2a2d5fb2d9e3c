//! Static tile map and the terrain index built from its layers.

use std::collections::BTreeMap;

use thiserror::Error;
use tile_quest_core::{CellCoord, MapExtent};

/// One layer of global tile identifiers in row-major order.
///
/// Identifiers are 1-based; zero and negative values mark empty cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileLayer {
    /// Layer name, used in error messages.
    pub name: String,
    /// Hidden layers are ignored while building the terrain index.
    pub visible: bool,
    /// Global tile identifiers, `columns * rows` entries.
    pub tiles: Vec<i64>,
}

/// Errors raised while building a [`TileMap`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TileMapError {
    /// The map has no cells.
    #[error("tile map must have at least one column and row (received {columns}x{rows})")]
    EmptyMap {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
    },
    /// Tiles have no area.
    #[error("tile size must be positive (received {width}x{height})")]
    EmptyTile {
        /// Declared tile width.
        width: u32,
        /// Declared tile height.
        height: u32,
    },
    /// A layer does not cover the map exactly.
    #[error("layer `{layer}` holds {actual} tiles but the map has {expected} cells")]
    LayerSize {
        /// Name of the offending layer.
        layer: String,
        /// Number of cells in the map.
        expected: usize,
        /// Number of tiles in the layer.
        actual: usize,
    },
    /// A tile identifier does not fit a sheet index.
    #[error("layer `{layer}` references tile {gid} which is out of range")]
    TileOutOfRange {
        /// Name of the offending layer.
        layer: String,
        /// Identifier that failed to convert.
        gid: i64,
    },
}

/// Stacked tile-sheet identifiers per cell, in layer order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TerrainIndex {
    cells: BTreeMap<CellCoord, Vec<u32>>,
}

impl TerrainIndex {
    /// Tiles stacked on `cell`, bottom layer first.
    #[must_use]
    pub fn tiles_at(&self, cell: CellCoord) -> &[u32] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of cells carrying at least one tile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell carries a tile.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Immutable description of the loaded map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    extent: MapExtent,
    tile_width: u32,
    tile_height: u32,
    background: [u8; 3],
    terrain: TerrainIndex,
}

impl TileMap {
    /// Builds a map and its terrain index from tile layers.
    pub fn new(
        extent: MapExtent,
        tile_width: u32,
        tile_height: u32,
        background: [u8; 3],
        layers: &[TileLayer],
    ) -> Result<Self, TileMapError> {
        if extent.columns() == 0 || extent.rows() == 0 {
            return Err(TileMapError::EmptyMap {
                columns: extent.columns(),
                rows: extent.rows(),
            });
        }
        if tile_width == 0 || tile_height == 0 {
            return Err(TileMapError::EmptyTile {
                width: tile_width,
                height: tile_height,
            });
        }

        let expected = extent.columns() as usize * extent.rows() as usize;
        let mut cells: BTreeMap<CellCoord, Vec<u32>> = BTreeMap::new();
        for layer in layers {
            if layer.tiles.len() != expected {
                return Err(TileMapError::LayerSize {
                    layer: layer.name.clone(),
                    expected,
                    actual: layer.tiles.len(),
                });
            }
            if !layer.visible {
                continue;
            }

            let columns = extent.columns() as usize;
            for (index, &gid) in layer.tiles.iter().enumerate() {
                if gid <= 0 {
                    continue;
                }
                let gid = u32::try_from(gid).map_err(|_| TileMapError::TileOutOfRange {
                    layer: layer.name.clone(),
                    gid,
                })?;
                let cell = CellCoord::new((index % columns) as i32, (index / columns) as i32);
                cells.entry(cell).or_default().push(gid);
            }
        }

        Ok(Self {
            extent,
            tile_width,
            tile_height,
            background,
            terrain: TerrainIndex { cells },
        })
    }

    /// Map dimensions in cells.
    #[must_use]
    pub const fn extent(&self) -> MapExtent {
        self.extent
    }

    /// Unscaled tile width in pixels.
    #[must_use]
    pub const fn tile_width(&self) -> u32 {
        self.tile_width
    }

    /// Unscaled tile height in pixels.
    #[must_use]
    pub const fn tile_height(&self) -> u32 {
        self.tile_height
    }

    /// Background colour as red, green and blue channels.
    #[must_use]
    pub const fn background(&self) -> [u8; 3] {
        self.background
    }

    /// Per-cell tile stacks.
    #[must_use]
    pub fn terrain(&self) -> &TerrainIndex {
        &self.terrain
    }

    /// Reports whether `cell` lies on the map.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.extent.contains(cell)
    }
}
