#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic Manhattan path planner.
//!
//! Paths walk the horizontal axis first and then the vertical axis. The
//! planner ignores terrain entirely: every cell is considered walkable and
//! the world decides what to do with cells outside its bounds.

use std::collections::VecDeque;

use tile_quest_core::CellCoord;

/// Plans the cells visited when walking from `origin` to `destination`.
///
/// The origin is excluded and the destination is the last element. Each
/// element is orthogonally adjacent to its predecessor, and the path length
/// equals the Manhattan distance between the two cells. Planning from a cell
/// to itself yields an empty path.
#[must_use]
pub fn find_path(origin: CellCoord, destination: CellCoord) -> VecDeque<CellCoord> {
    let capacity = usize::try_from(origin.manhattan_distance(destination)).unwrap_or(0);
    let mut path = VecDeque::with_capacity(capacity);

    let column_step = (destination.column() - origin.column()).signum();
    let mut column = origin.column();
    while column != destination.column() {
        column += column_step;
        path.push_back(CellCoord::new(column, origin.row()));
    }

    let row_step = (destination.row() - origin.row()).signum();
    let mut row = origin.row();
    while row != destination.row() {
        row += row_step;
        path.push_back(CellCoord::new(destination.column(), row));
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_cells_produce_an_empty_path() {
        let cell = CellCoord::new(4, -9);
        assert!(find_path(cell, cell).is_empty());
    }

    #[test]
    fn purely_vertical_paths_stay_in_origin_column() {
        let path = find_path(CellCoord::new(2, 5), CellCoord::new(2, 2));
        assert_eq!(
            path,
            VecDeque::from(vec![
                CellCoord::new(2, 4),
                CellCoord::new(2, 3),
                CellCoord::new(2, 2),
            ])
        );
    }
}
