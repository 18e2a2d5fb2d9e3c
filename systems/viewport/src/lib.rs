#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Display transform between map cells, viewport cells and screen pixels.
//!
//! Three coordinate spaces are involved:
//!
//! * map coordinates address cells of the tile map,
//! * viewport coordinates are relative to the top-left visible cell,
//! * pixel positions address the back buffer after the integer display
//!   scale has been applied.
//!
//! The scroll offset (map coordinate of the viewport's top-left corner) is
//! computed once per frame by [`Display::update`] and handed out as an
//! immutable [`FrameTransform`].

use glam::{UVec2, Vec2};
use serde::{Deserialize, Serialize};
use tile_quest_core::{CellCoord, GridPosition, MapExtent};

/// Two-tier policy that maps back-buffer dimensions to an integer scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalePolicy {
    /// Widths up to and including this value use the small scale.
    pub threshold_width: u32,
    /// Heights up to and including this value use the small scale.
    pub threshold_height: u32,
    /// Scale used when either dimension is within its threshold.
    pub small_scale: u32,
    /// Scale used when both dimensions exceed their thresholds.
    pub large_scale: u32,
}

impl ScalePolicy {
    /// Policy shipped with the game: 1500×870 and below renders at 2×,
    /// anything larger at 3×.
    pub const DEFAULT: Self = Self {
        threshold_width: 1500,
        threshold_height: 870,
        small_scale: 2,
        large_scale: 3,
    };

    /// Resolves the scale for the provided back-buffer dimensions.
    #[must_use]
    pub const fn scale_for(&self, width: u32, height: u32) -> u32 {
        if width <= self.threshold_width || height <= self.threshold_height {
            self.small_scale
        } else {
            self.large_scale
        }
    }
}

impl Default for ScalePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Resolves the display scale using [`ScalePolicy::DEFAULT`].
#[must_use]
pub const fn compute_scale(width: u32, height: u32) -> u32 {
    ScalePolicy::DEFAULT.scale_for(width, height)
}

/// Number of whole cells that fit in the back buffer on each axis.
///
/// Back-buffer sizes that are not an exact multiple of `tile_size * scale`
/// leave a partially covered edge row or column which is not counted here.
#[must_use]
pub fn viewport_size_in_cells(back_buffer: UVec2, tile_size: UVec2, scale: u32) -> UVec2 {
    let cell = tile_size * scale;
    UVec2::new(
        back_buffer.x.checked_div(cell.x).unwrap_or(0),
        back_buffer.y.checked_div(cell.y).unwrap_or(0),
    )
}

/// Scroll offset along a single axis.
///
/// The tracked entity is kept on the viewport midpoint unless that would
/// expose space past either map edge, in which case the offset is clamped to
/// `[0, map_extent - viewport_extent]`. Maps smaller than the viewport pin
/// the offset to zero.
#[must_use]
pub fn compute_scroll_offset(
    tracked: f32,
    midpoint: f32,
    map_extent: f32,
    viewport_extent: f32,
) -> f32 {
    let upper = (map_extent - viewport_extent).max(0.0);
    (tracked - midpoint).clamp(0.0, upper)
}

/// Owns the scale policy and the transform cached for the current frame.
#[derive(Clone, Debug, Default)]
pub struct Display {
    policy: ScalePolicy,
    frame: Option<FrameTransform>,
}

impl Display {
    /// Creates a display that resolves its scale through `policy`.
    #[must_use]
    pub fn new(policy: ScalePolicy) -> Self {
        Self {
            policy,
            frame: None,
        }
    }

    /// Discards the transform of the previous frame.
    ///
    /// Must run at the start of every frame before the transform is read.
    pub fn begin_frame(&mut self) {
        self.frame = None;
    }

    /// Computes and caches the transform for the current frame.
    pub fn update(
        &mut self,
        back_buffer: UVec2,
        tile_size: UVec2,
        map: MapExtent,
        tracked: GridPosition,
    ) -> FrameTransform {
        let scale = self.policy.scale_for(back_buffer.x, back_buffer.y);
        let viewport_cells = viewport_size_in_cells(back_buffer, tile_size, scale);
        let midpoint = (viewport_cells / 2).as_vec2();
        let scroll_offset = Vec2::new(
            compute_scroll_offset(
                tracked.x(),
                midpoint.x,
                map.columns() as f32,
                viewport_cells.x as f32,
            ),
            compute_scroll_offset(
                tracked.y(),
                midpoint.y,
                map.rows() as f32,
                viewport_cells.y as f32,
            ),
        );

        let frame = FrameTransform::new(scale, viewport_cells, tile_size, scroll_offset);
        self.frame = Some(frame);
        frame
    }

    /// Transform computed for the current frame, if [`Display::update`] ran.
    #[must_use]
    pub fn frame(&self) -> Option<&FrameTransform> {
        self.frame.as_ref()
    }
}

/// Immutable coordinate transform valid for a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTransform {
    scale: u32,
    viewport_cells: UVec2,
    tile_size: UVec2,
    scroll_offset: Vec2,
}

impl FrameTransform {
    /// Creates a transform from already resolved values.
    #[must_use]
    pub const fn new(
        scale: u32,
        viewport_cells: UVec2,
        tile_size: UVec2,
        scroll_offset: Vec2,
    ) -> Self {
        Self {
            scale,
            viewport_cells,
            tile_size,
            scroll_offset,
        }
    }

    /// Integer display scale.
    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// Viewport size measured in whole cells.
    #[must_use]
    pub const fn viewport_cells(&self) -> UVec2 {
        self.viewport_cells
    }

    /// Unscaled tile size in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> UVec2 {
        self.tile_size
    }

    /// Map coordinate of the viewport's top-left corner.
    #[must_use]
    pub const fn scroll_offset(&self) -> Vec2 {
        self.scroll_offset
    }

    /// Map cell shown at the provided viewport coordinate.
    #[must_use]
    pub fn map_coordinate_from_viewport_coordinate(&self, viewport: Vec2) -> CellCoord {
        let map = (viewport + self.scroll_offset).floor();
        CellCoord::new(map.x as i32, map.y as i32)
    }

    /// Back-buffer pixel position of the provided viewport coordinate.
    ///
    /// Fractional scroll offsets shift the whole grid by the matching
    /// sub-tile amount so scrolling stays smooth.
    #[must_use]
    pub fn pixel_position_from_viewport_coordinate(&self, viewport: Vec2) -> Vec2 {
        let tile = self.tile_size.as_vec2();
        let fractional = self.scroll_offset - self.scroll_offset.floor();
        let fractional_pixel_offset = fractional * tile;
        (viewport * tile - fractional_pixel_offset) * self.scale as f32
    }

    /// Viewport coordinate of a map position.
    #[must_use]
    pub fn viewport_coordinate_from_map_position(&self, position: GridPosition) -> Vec2 {
        Vec2::new(position.x(), position.y()) - self.scroll_offset.floor()
    }

    /// Back-buffer pixel position of a map position, shifted by an unscaled
    /// sprite offset.
    #[must_use]
    pub fn pixel_position_from_map_position(
        &self,
        position: GridPosition,
        pixel_offset: Vec2,
    ) -> Vec2 {
        let viewport = self.viewport_coordinate_from_map_position(position);
        self.pixel_position_from_viewport_coordinate(viewport) + pixel_offset * self.scale as f32
    }

    /// Map cell under a back-buffer pixel, or `None` when the transform has a
    /// zero-sized tile.
    #[must_use]
    pub fn map_cell_from_pixel(&self, pixel: Vec2) -> Option<CellCoord> {
        let cell = (self.tile_size * self.scale).as_vec2();
        if cell.x <= 0.0 || cell.y <= 0.0 {
            return None;
        }
        let map = (pixel / cell + self.scroll_offset).floor();
        Some(CellCoord::new(map.x as i32, map.y as i32))
    }

    /// Viewport coordinates and map cells covering the visible area.
    ///
    /// One extra row and column is included so partially scrolled edges are
    /// filled.
    pub fn visible_cells(&self) -> impl Iterator<Item = (Vec2, CellCoord)> + '_ {
        let columns = self.viewport_cells.x + 1;
        let rows = self.viewport_cells.y + 1;
        (0..columns).flat_map(move |x| {
            (0..rows).map(move |y| {
                let viewport = Vec2::new(x as f32, y as f32);
                (viewport, self.map_coordinate_from_viewport_coordinate(viewport))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(offset: Vec2) -> FrameTransform {
        FrameTransform::new(2, UVec2::new(10, 8), UVec2::splat(16), offset)
    }

    #[test]
    fn viewport_size_divides_by_scaled_tile() {
        assert_eq!(
            viewport_size_in_cells(UVec2::new(1280, 960), UVec2::splat(16), 2),
            UVec2::new(40, 30)
        );
        assert_eq!(
            viewport_size_in_cells(UVec2::new(1300, 970), UVec2::splat(16), 2),
            UVec2::new(40, 30)
        );
        assert_eq!(
            viewport_size_in_cells(UVec2::new(1300, 970), UVec2::ZERO, 2),
            UVec2::ZERO
        );
    }

    #[test]
    fn map_coordinate_adds_scroll_offset() {
        let frame = transform(Vec2::new(3.0, 5.0));
        assert_eq!(
            frame.map_coordinate_from_viewport_coordinate(Vec2::new(2.0, 1.0)),
            CellCoord::new(5, 6)
        );
    }

    #[test]
    fn fractional_offset_shifts_pixels_by_sub_tile_amount() {
        let frame = transform(Vec2::new(3.25, 0.0));
        assert_eq!(
            frame.pixel_position_from_viewport_coordinate(Vec2::new(1.0, 1.0)),
            Vec2::new((16.0 - 4.0) * 2.0, 32.0)
        );
    }

    #[test]
    fn map_positions_project_relative_to_scroll_offset() {
        let frame = transform(Vec2::new(4.0, 2.0));
        let pixel = frame
            .pixel_position_from_map_position(GridPosition::new(5.5, 2.0), Vec2::new(-8.0, -12.0));
        assert_eq!(pixel, Vec2::new((1.5 * 16.0 - 8.0) * 2.0, -24.0));
    }

    #[test]
    fn pixel_lookup_inverts_map_projection() {
        let frame = transform(Vec2::new(4.0, 2.0));
        let cell = CellCoord::new(7, 9);
        let pixel = frame.pixel_position_from_map_position(GridPosition::from_cell(cell), Vec2::ZERO);

        assert_eq!(frame.map_cell_from_pixel(pixel + Vec2::splat(1.0)), Some(cell));
    }

    #[test]
    fn visible_cells_cover_one_extra_row_and_column() {
        let frame = transform(Vec2::new(1.0, 0.0));
        let cells: Vec<_> = frame.visible_cells().collect();

        assert_eq!(cells.len(), 11 * 9);
        assert_eq!(cells.first(), Some(&(Vec2::ZERO, CellCoord::new(1, 0))));
        assert_eq!(
            cells.last(),
            Some(&(Vec2::new(10.0, 8.0), CellCoord::new(11, 8)))
        );
    }
}
