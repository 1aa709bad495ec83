//! Bounded 8-connected grid with dynamic obstacles.

use crate::config::GridSettings;
use crate::core::GridCoord;
use crate::error::{PlannerError, Result};

use super::SearchSpace;

/// 8-connected 2D grid environment.
///
/// Every cell is a vertex; the arena index of cell (x, y) is
/// `y * width + x`. Moves cost 1 along an axis and sqrt(2) diagonally,
/// or `f64::INFINITY` when either endpoint is blocked or out of bounds.
/// Predecessors equal successors (the neighborhood is symmetric).
#[derive(Clone, Debug)]
pub struct GridEnvironment {
    width: i32,
    height: i32,
    blocked: Vec<bool>,
    diagonal_cost: f64,
}

impl GridEnvironment {
    /// Create an obstacle-free grid
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_settings(width, height, GridSettings::default())
    }

    /// Create an obstacle-free grid with custom settings
    pub fn with_settings(width: i32, height: i32, settings: GridSettings) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            blocked: vec![false; (width * height) as usize],
            diagonal_cost: settings.diagonal_cost,
        }
    }

    /// True if the coordinate lies inside the grid
    #[inline]
    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    /// Arena index of an in-bounds coordinate
    #[inline]
    pub fn index(&self, coord: GridCoord) -> usize {
        debug_assert!(self.in_bounds(coord));
        (coord.y * self.width + coord.x) as usize
    }

    /// Coordinate of an arena index
    #[inline]
    pub fn coord(&self, index: usize) -> GridCoord {
        let index = index as i32;
        GridCoord::new(index % self.width, index / self.width)
    }

    /// Arena index of a coordinate, or an error if it is out of bounds
    pub fn checked_index(&self, coord: GridCoord) -> Result<usize> {
        if !self.in_bounds(coord) {
            return Err(PlannerError::OutOfBounds(coord.x, coord.y));
        }
        Ok(self.index(coord))
    }

    /// True if the cell is blocked (out-of-bounds cells count as blocked)
    #[inline]
    pub fn is_obstacle(&self, coord: GridCoord) -> bool {
        !self.in_bounds(coord) || self.blocked[self.index(coord)]
    }

    /// Block or unblock a cell
    pub fn set_obstacle(&mut self, coord: GridCoord, blocked: bool) -> Result<()> {
        let index = self.checked_index(coord)?;
        self.blocked[index] = blocked;
        Ok(())
    }

    /// Cost of a single step between adjacent cells: 1 along an axis,
    /// sqrt(2) diagonally, infinite if either endpoint is blocked
    pub fn step_cost(&self, from: GridCoord, to: GridCoord) -> f64 {
        if !from.is_adjacent_8(&to) || self.is_obstacle(from) || self.is_obstacle(to) {
            return f64::INFINITY;
        }
        if from.x != to.x && from.y != to.y {
            self.diagonal_cost
        } else {
            1.0
        }
    }

    /// In-bounds 8-neighbors of a cell with step costs. Blocked
    /// neighbors are reported with infinite cost so that repair
    /// propagation can see severed arcs.
    fn neighborhood(&self, vertex: usize) -> Vec<(usize, f64)> {
        let coord = self.coord(vertex);
        coord
            .neighbors_8()
            .into_iter()
            .filter(|n| self.in_bounds(*n))
            .map(|n| (self.index(n), self.step_cost(coord, n)))
            .collect()
    }
}

impl SearchSpace for GridEnvironment {
    #[inline]
    fn node_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    #[inline]
    fn contains(&self, vertex: usize) -> bool {
        vertex < self.node_count()
    }

    fn successors(&self, vertex: usize) -> Vec<(usize, f64)> {
        self.neighborhood(vertex)
    }

    fn predecessors(&self, vertex: usize) -> Vec<(usize, f64)> {
        self.neighborhood(vertex)
    }

    fn cost(&self, from: usize, to: usize) -> f64 {
        self.step_cost(self.coord(from), self.coord(to))
    }
}
