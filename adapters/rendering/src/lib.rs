#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tile Quest adapters.
//!
//! The scene is a flat, ordered list of sprite blits expressed in back-buffer
//! pixels. Everything that depends on the map, the camera or animation state
//! is resolved before the scene reaches a backend, so backends only need a
//! textured-quad primitive and keyboard/mouse polling.

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::{UVec2, Vec2};
use thiserror::Error;
use tile_quest_core::FrameRect;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Directional keys held this frame. Arrow keys and WASD are merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectionalKeys {
    /// Up arrow or `W`.
    pub up: bool,
    /// Down arrow or `S`.
    pub down: bool,
    /// Left arrow or `A`.
    pub left: bool,
    /// Right arrow or `D`.
    pub right: bool,
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Directional keys currently held.
    pub keys: DirectionalKeys,
    /// Cursor position in back-buffer pixels, `None` when outside the window.
    pub cursor: Option<Vec2>,
    /// Whether the primary mouse button is down.
    pub primary_down: bool,
    /// Back-buffer size in pixels.
    pub back_buffer: UVec2,
}

/// Textures a scene may reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpriteKey {
    /// Terrain tile sheet.
    TileSheet,
    /// Player sprite sheet.
    Player,
    /// Marker drawn on the destination of a planned path.
    PathTarget,
    /// Mouse cursor.
    Cursor,
}

/// One textured blit in back-buffer pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteDraw {
    /// Texture to sample.
    pub sprite: SpriteKey,
    /// Top-left corner of the destination rectangle.
    pub position: Vec2,
    /// Source rectangle inside the texture, in unscaled pixels.
    pub source: FrameRect,
    /// Integer display scale applied to the source size.
    pub scale: f32,
    /// Whether the source is mirrored horizontally.
    pub flip_horizontally: bool,
}

impl SpriteDraw {
    /// Creates a non-mirrored blit.
    #[must_use]
    pub const fn new(sprite: SpriteKey, position: Vec2, source: FrameRect, scale: f32) -> Self {
        Self {
            sprite,
            position,
            source,
            scale,
            flip_horizontally: false,
        }
    }

    /// Returns the same blit with the provided mirroring.
    #[must_use]
    pub const fn flipped(mut self, flip_horizontally: bool) -> Self {
        self.flip_horizontally = flip_horizontally;
        self
    }

    /// Size of the destination rectangle.
    #[must_use]
    pub fn dest_size(&self) -> Vec2 {
        Vec2::new(self.source.width as f32, self.source.height as f32) * self.scale
    }
}

/// Grid lines drawn by the debug overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridOverlay {
    /// Pixel position of the top-left visible cell.
    pub origin: Vec2,
    /// Scaled cell size in pixels.
    pub cell_size: Vec2,
    /// Number of columns to outline.
    pub columns: u32,
    /// Number of rows to outline.
    pub rows: u32,
    /// Color of the lines.
    pub line_color: Color,
}

/// Complete description of one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Color the back buffer is cleared to.
    pub background: Color,
    /// Blits in draw order.
    pub sprites: Vec<SpriteDraw>,
    /// Grid shown while the debug overlay is enabled.
    pub grid: Option<GridOverlay>,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new(background: Color) -> Self {
        Self {
            background,
            sprites: Vec::new(),
            grid: None,
        }
    }

    /// Removes all per-frame content, keeping the background.
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.grid = None;
    }

    /// Appends a blit after everything already queued.
    pub fn push(&mut self, draw: SpriteDraw) {
        self.sprites.push(draw);
    }
}

/// Describes the window and the initial scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Initial window size in pixels.
    pub window_size: UVec2,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, window_size: UVec2, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            window_size,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Tile Quest scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rebuilds the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// The tile sheet is narrower than one tile.
    #[error("tile sheet must be at least one tile wide")]
    EmptyTileSheet,
    /// Tile identifiers are 1-based; zero marks an empty cell.
    #[error("tile identifier {gid} does not reference a tile")]
    InvalidTileId {
        /// Identifier that failed validation.
        gid: u32,
    },
}

/// Source rectangle of a 1-based tile identifier on a sheet that is
/// `sheet_columns` tiles wide.
pub fn tile_source_rect(
    gid: u32,
    sheet_columns: u32,
    tile_width: u32,
    tile_height: u32,
) -> Result<FrameRect, RenderingError> {
    if sheet_columns == 0 {
        return Err(RenderingError::EmptyTileSheet);
    }
    let index = gid
        .checked_sub(1)
        .ok_or(RenderingError::InvalidTileId { gid })?;
    let column = index % sheet_columns;
    let row = index / sheet_columns;

    Ok(FrameRect::new(
        (column * tile_width) as i32,
        (row * tile_height) as i32,
        tile_width as i32,
        tile_height as i32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_ids_wrap_across_sheet_rows() {
        assert_eq!(
            tile_source_rect(1, 8, 16, 16),
            Ok(FrameRect::new(0, 0, 16, 16))
        );
        assert_eq!(
            tile_source_rect(8, 8, 16, 16),
            Ok(FrameRect::new(112, 0, 16, 16))
        );
        assert_eq!(
            tile_source_rect(9, 8, 16, 16),
            Ok(FrameRect::new(0, 16, 16, 16))
        );
        assert_eq!(
            tile_source_rect(20, 8, 16, 24),
            Ok(FrameRect::new(48, 48, 16, 24))
        );
    }

    #[test]
    fn tile_source_rect_rejects_degenerate_inputs() {
        assert_eq!(
            tile_source_rect(0, 8, 16, 16),
            Err(RenderingError::InvalidTileId { gid: 0 })
        );
        assert_eq!(
            tile_source_rect(3, 0, 16, 16),
            Err(RenderingError::EmptyTileSheet)
        );
    }

    #[test]
    fn sprite_destination_scales_source_size() {
        let draw = SpriteDraw::new(
            SpriteKey::Player,
            Vec2::new(10.0, 20.0),
            FrameRect::new(0, 0, 32, 32),
            3.0,
        )
        .flipped(true);

        assert_eq!(draw.dest_size(), Vec2::splat(96.0));
        assert!(draw.flip_horizontally);
    }

    #[test]
    fn clearing_scene_keeps_background() {
        let background = Color::from_rgb_u8(0x20, 0x40, 0x60);
        let mut scene = Scene::new(background);
        scene.push(SpriteDraw::new(
            SpriteKey::Cursor,
            Vec2::ZERO,
            FrameRect::new(0, 0, 14, 14),
            2.0,
        ));

        scene.clear();

        assert!(scene.sprites.is_empty());
        assert_eq!(scene.background, background);
    }
}
