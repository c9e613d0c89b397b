// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sparse 2-D vertex index grid and its triangulation.
//!
//! Cells hold `Option<u32>`: `None` marks a grid position with no input
//! point. Cell `[i][j]` is column `i`, row `j`.

/// Dense column-major grid of optional vertex indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexGrid {
    columns: usize,
    rows: usize,
    cells: Vec<Option<u32>>,
}

impl IndexGrid {
    /// Create a grid with every cell missing.
    ///
    /// Returns `None` if `columns * rows` overflows or the cells cannot be
    /// allocated.
    pub fn new(columns: usize, rows: usize) -> Option<Self> {
        let len = columns.checked_mul(rows)?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len).ok()?;
        cells.resize(len, None);
        Some(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Build a grid from equally long columns.
    ///
    /// Returns `None` if the columns differ in length.
    pub fn from_columns(columns: Vec<Vec<Option<u32>>>) -> Option<Self> {
        let rows = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != rows) {
            return None;
        }
        let column_count = columns.len();
        let cells = columns.into_iter().flatten().collect();
        Some(Self {
            columns: column_count,
            rows,
            cells,
        })
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Vertex index at column `i`, row `j`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<u32> {
        if i < self.columns && j < self.rows {
            self.cells[i * self.rows + j]
        } else {
            None
        }
    }

    /// Store a vertex index, overwriting any previous one (last write wins)
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, index: u32) {
        if i < self.columns && j < self.rows {
            self.cells[i * self.rows + j] = Some(index);
        }
    }

    /// Number of cells holding a vertex
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Triangulate every 2x2 cell block at native resolution.
    ///
    /// Each block yields up to two triangles, each one emitted only when its
    /// three corners are present, so sparse input leaves holes instead of
    /// failing.
    pub fn triangulate_cells(&self) -> Vec<u32> {
        let mut indices = Vec::new();
        if self.columns < 2 || self.rows < 2 {
            return indices;
        }
        for i in 0..self.columns - 1 {
            for j in 0..self.rows - 1 {
                let q00 = self.get(i, j);
                let q10 = self.get(i + 1, j);
                let q01 = self.get(i, j + 1);
                let q11 = self.get(i + 1, j + 1);

                if let (Some(a), Some(b), Some(c)) = (q00, q10, q11) {
                    indices.extend_from_slice(&[a, b, c]);
                }
                if let (Some(a), Some(b), Some(c)) = (q00, q11, q01) {
                    indices.extend_from_slice(&[a, b, c]);
                }
            }
        }
        indices
    }

    /// Triangulate blocks of `stride` x `stride` cells.
    ///
    /// Blocks start every `stride` columns/rows; the far corner is clamped
    /// to the grid edge. A block that collapses to zero width or height, or
    /// has any of its four corners missing, produces no triangles.
    pub fn triangulate_blocks(&self, stride: usize) -> Vec<u32> {
        let stride = stride.max(1);
        let mut indices = Vec::new();
        if self.columns < 2 || self.rows < 2 {
            return indices;
        }
        for i in (0..self.columns).step_by(stride) {
            let i_far = (i + stride).min(self.columns - 1);
            if i_far == i {
                continue;
            }
            for j in (0..self.rows).step_by(stride) {
                let j_far = (j + stride).min(self.rows - 1);
                if j_far == j {
                    continue;
                }
                let corners = (
                    self.get(i, j),
                    self.get(i_far, j),
                    self.get(i, j_far),
                    self.get(i_far, j_far),
                );
                if let (Some(q00), Some(q10), Some(q01), Some(q11)) = corners {
                    indices.extend_from_slice(&[q00, q10, q11, q00, q11, q01]);
                }
            }
        }
        indices
    }
}
