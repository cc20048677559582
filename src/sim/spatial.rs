//! Uniform grid for broad-phase collision detection
//!
//! Divides the arena into square cells and stores body ids in each cell.
//! Collision candidates are only drawn from a cell and its 8 neighbours,
//! which is complete as long as the cell size is at least the largest body
//! diameter. That precondition is the caller's to uphold; the grid does
//! not check it.

use smallvec::SmallVec;

use crate::sim::state::{Body, BodyId};
use crate::util::vec2::Vec2;

/// Inline capacity per cell; larger clusters spill to the heap
const CELL_INLINE_CAPACITY: usize = 4;

/// Neighbour offsets `(dcol, drow)` that lie after the current cell in a
/// row-major scan. The other four neighbours visit this cell themselves,
/// so every adjacent pair of cells is visited exactly once.
const FORWARD_NEIGHBORS: [(isize, isize); 4] = [(1, 0), (-1, 1), (0, 1), (1, 1)];

/// Grid cell coordinates - (column, row)
pub type CellKey = (usize, usize);

type Cell = SmallVec<[BodyId; CELL_INLINE_CAPACITY]>;

/// Rounding slack at the grid edges, in ulps of the larger extent
const EDGE_SLACK_ULPS: f32 = 8.0;

/// Dense grid of cells covering `[0, extent]` on both axes
///
/// The far edges are closed: a wall clamp with zero inset puts a body at
/// exactly `extent`, which lands in the last column or row.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Cell edge length in world units
    cell_size: f32,
    extent: Vec2,
    /// Distance past either edge still mapped to the edge cells
    edge_slack: f32,
    cols: usize,
    rows: usize,
    /// Row-major cell storage, reused across rebuilds
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of `ceil(extent / cell_size)` cells per axis
    ///
    /// `cell_size` and `extent` must be positive and finite; the solver
    /// validates this before building its grid.
    pub fn new(extent: Vec2, cell_size: f32) -> Self {
        let cols = ((extent.x / cell_size).ceil() as usize).max(1);
        let rows = ((extent.y / cell_size).ceil() as usize).max(1);

        Self {
            cell_size,
            extent,
            edge_slack: extent.x.max(extent.y) * f32::EPSILON * EDGE_SLACK_ULPS,
            cols,
            rows,
            cells: vec![Cell::new(); cols * rows],
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Grid dimensions as (columns, rows)
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Empty every cell, keeping allocated storage
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Cell containing `position`, or `None` if it lies outside the grid
    ///
    /// Positions on the far edges, or within a few ulps outside either edge,
    /// map to the edge cells.
    pub fn cell_of(&self, position: Vec2) -> Option<CellKey> {
        let col = self.axis_index(position.x, self.extent.x, self.cols)?;
        let row = self.axis_index(position.y, self.extent.y, self.rows)?;
        Some((col, row))
    }

    #[inline]
    fn axis_index(&self, value: f32, extent: f32, count: usize) -> Option<usize> {
        // Written so that NaN fails the range check
        if !(value >= -self.edge_slack && value <= extent + self.edge_slack) {
            return None;
        }
        let index = (value.max(0.0) / self.cell_size).floor() as usize;
        Some(index.min(count - 1))
    }

    /// Insert a body at `position`
    ///
    /// # Panics
    /// If `position` is outside the grid. Boundary enforcement runs before
    /// every rebuild, so reaching this means a clamp is broken.
    #[inline]
    pub fn insert(&mut self, id: BodyId, position: Vec2) {
        let Some((col, row)) = self.cell_of(position) else {
            panic!(
                "body {:?} at ({}, {}) is outside the {}x{} collision grid",
                id, position.x, position.y, self.cols, self.rows
            );
        };
        self.cells[row * self.cols + col].push(id);
    }

    /// Clear and repopulate from the current body positions
    pub fn rebuild(&mut self, bodies: &[Body]) {
        self.clear();
        for (index, body) in bodies.iter().enumerate() {
            self.insert(BodyId(index as u32), body.position);
        }
    }

    /// Body ids in a cell (empty for out-of-range coordinates)
    pub fn cell(&self, col: usize, row: usize) -> &[BodyId] {
        if col < self.cols && row < self.rows {
            &self.cells[row * self.cols + col]
        } else {
            &[]
        }
    }

    /// Visit every unordered pair of bodies that share a cell or sit in
    /// adjacent cells, exactly once.
    ///
    /// Cells are scanned top to bottom, left to right. Each cell pairs its
    /// own bodies, then pairs them with the forward neighbours.
    #[inline]
    pub fn for_each_potential_collision<F>(&self, mut callback: F)
    where
        F: FnMut(BodyId, BodyId),
    {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = &self.cells[row * self.cols + col];
                if cell.is_empty() {
                    continue;
                }

                // Pairs within the same cell
                for i in 0..cell.len() {
                    for j in (i + 1)..cell.len() {
                        callback(cell[i], cell[j]);
                    }
                }

                for &(dc, dr) in &FORWARD_NEIGHBORS {
                    let (Some(nc), Some(nr)) =
                        (col.checked_add_signed(dc), row.checked_add_signed(dr))
                    else {
                        continue;
                    };
                    if nc >= self.cols || nr >= self.rows {
                        continue;
                    }

                    let other = &self.cells[nr * self.cols + nc];
                    for &a in cell {
                        for &b in other {
                            callback(a, b);
                        }
                    }
                }
            }
        }
    }

    /// Get statistics about the grid
    pub fn stats(&self) -> GridStats {
        let occupied_cells = self.cells.iter().filter(|c| !c.is_empty()).count();
        let total_entries = self.cells.iter().map(|c| c.len()).sum();
        let max_per_cell = self.cells.iter().map(|c| c.len()).max().unwrap_or(0);

        GridStats {
            occupied_cells,
            total_entries,
            max_per_cell,
        }
    }
}

/// Statistics about the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStats {
    pub occupied_cells: usize,
    pub total_entries: usize,
    pub max_per_cell: usize,
}
