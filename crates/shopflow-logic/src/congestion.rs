//! Grid-based congestion accumulation and bottleneck detection.
//!
//! The grid is rebuilt from scratch every tick from the active shopper
//! positions. A full rebuild instead of incremental updates avoids
//! stale-state bugs; the grids are small enough that it does not matter.

use crate::constants::{BOTTLENECK_THRESHOLD, CELL_SIZE};
use std::collections::HashMap;

/// Grid cell coordinates (floor-divided position).
pub type CellKey = (i32, i32);

/// Map the cell that contains a position.
pub fn cell_of(x: f32, y: f32) -> CellKey {
    (
        (x / CELL_SIZE).floor() as i32,
        (y / CELL_SIZE).floor() as i32,
    )
}

/// Occupancy counts per grid cell for one tick.
#[derive(Debug, Clone, Default)]
pub struct CongestionGrid {
    cells: HashMap<CellKey, u32>,
}

impl CongestionGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the previous tick's counts and rebuild from positions.
    pub fn rebuild(&mut self, positions: &[(f32, f32)]) {
        self.cells.clear();
        for &(x, y) in positions {
            *self.cells.entry(cell_of(x, y)).or_insert(0) += 1;
        }
    }

    /// Total occupants across all cells (equals the active shopper count).
    pub fn sum(&self) -> u32 {
        self.cells.values().sum()
    }

    /// Mean occupant count over occupied cells, 0.0 when the grid is empty.
    pub fn average(&self) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.sum() as f32 / self.cells.len() as f32
    }

    /// Cells at or above the bottleneck threshold, with their counts.
    pub fn bottlenecks(&self) -> Vec<(CellKey, u32)> {
        let mut hot: Vec<(CellKey, u32)> = self
            .cells
            .iter()
            .filter(|(_, &count)| count >= BOTTLENECK_THRESHOLD)
            .map(|(&key, &count)| (key, count))
            .collect();
        hot.sort();
        hot
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn count_at(&self, key: CellKey) -> u32 {
        self.cells.get(&key).copied().unwrap_or(0)
    }

    /// Reporting shape: `"x,y"` cell key to occupant count.
    pub fn to_map(&self) -> HashMap<String, u32> {
        self.cells
            .iter()
            .map(|(&(cx, cy), &count)| (format!("{cx},{cy}"), count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_mapping_floors() {
        assert_eq!(cell_of(0.0, 0.0), (0, 0));
        assert_eq!(cell_of(49.9, 49.9), (0, 0));
        assert_eq!(cell_of(50.0, 0.0), (1, 0));
        assert_eq!(cell_of(-1.0, -1.0), (-1, -1));
    }

    #[test]
    fn sum_matches_position_count() {
        let mut grid = CongestionGrid::new();
        grid.rebuild(&[(10.0, 10.0), (20.0, 20.0), (120.0, 10.0), (500.0, 500.0)]);
        assert_eq!(grid.sum(), 4);
        assert_eq!(grid.occupied_cells(), 3);
    }

    #[test]
    fn empty_grid_average_is_zero() {
        let grid = CongestionGrid::new();
        assert_eq!(grid.average(), 0.0);
        assert!(grid.bottlenecks().is_empty());
    }

    #[test]
    fn average_over_occupied_cells() {
        let mut grid = CongestionGrid::new();
        // Three in one cell, one in another: mean (3 + 1) / 2.
        grid.rebuild(&[(10.0, 10.0), (12.0, 11.0), (14.0, 12.0), (120.0, 10.0)]);
        assert!((grid.average() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn bottleneck_detection_at_threshold() {
        let mut grid = CongestionGrid::new();
        grid.rebuild(&[(10.0, 10.0), (12.0, 11.0), (14.0, 12.0), (120.0, 10.0)]);
        let hot = grid.bottlenecks();
        assert_eq!(hot, vec![((0, 0), 3)]);
    }

    #[test]
    fn rebuild_discards_previous_counts() {
        let mut grid = CongestionGrid::new();
        grid.rebuild(&[(10.0, 10.0), (12.0, 11.0)]);
        grid.rebuild(&[(120.0, 10.0)]);
        assert_eq!(grid.sum(), 1);
        assert_eq!(grid.count_at((0, 0)), 0);
        assert_eq!(grid.count_at((2, 0)), 1);
    }

    #[test]
    fn reporting_map_keys() {
        let mut grid = CongestionGrid::new();
        grid.rebuild(&[(60.0, -10.0)]);
        let map = grid.to_map();
        assert_eq!(map.get("1,-1"), Some(&1));
    }
}
