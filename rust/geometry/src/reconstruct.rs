// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Implicit grid reconstruction for ordered point clouds without I/J indices.
//!
//! Given the primary stepping vector, consecutive points that step along it
//! belong to the same column; any other step starts a new column. Gaps
//! inside a column become missing cells, and every column is placed against
//! a reference line (the first point extended along the axis) so that
//! columns starting earlier or later than the first one line up row by row.

use nalgebra::Vector2;
use tracing::{debug, warn};

use crate::axis::{planar, projected_steps, steps_along, unit_direction};
use crate::index_grid::IndexGrid;
use crate::mesh::Vertex;

/// Tuning for [`reconstruct_grid`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconstructionOptions {
    /// Tolerance for a step to count as parallel to the axis
    pub direction_tolerance: f64,
    /// Largest gap or column offset (in axis steps) that is padded with
    /// missing cells; anything larger is treated as an outlier
    pub max_gap_steps: usize,
}

impl Default for ReconstructionOptions {
    fn default() -> Self {
        Self {
            direction_tolerance: crate::axis::DEFAULT_DIRECTION_TOLERANCE,
            max_gap_steps: 100_000,
        }
    }
}

/// A column of vertex indices before padding
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Row of the first entry relative to the reference line, in axis steps
    pub start_offset: i64,
    pub entries: Vec<Option<u32>>,
}

impl Column {
    fn starting_at(start_offset: i64, index: u32) -> Self {
        Self {
            start_offset,
            entries: vec![Some(index)],
        }
    }

    /// Row just past the last entry, relative to the reference line
    #[inline]
    fn end_offset(&self) -> i64 {
        self.start_offset + self.entries.len() as i64
    }
}

/// Split an ordered point sequence into columns along `axis`
pub fn assemble_columns(
    points: &[Vertex],
    axis: &Vector2<f64>,
    options: &ReconstructionOptions,
) -> Vec<Column> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    if unit_direction(axis).is_none() {
        return Vec::new();
    }

    let origin = planar(first);
    let mut columns = vec![Column::starting_at(0, 0)];
    let mut outliers = 0usize;

    for (k, pair) in points.windows(2).enumerate() {
        let index = (k + 1) as u32;
        let previous = planar(&pair[0]);
        let current = planar(&pair[1]);
        let step = current - previous;

        let Some(column) = columns.last_mut() else {
            break;
        };

        if unit_direction(&step).is_none() {
            // Coincident with the previous point: the later point takes the cell
            if let Some(last) = column.entries.last_mut() {
                *last = Some(index);
            }
            continue;
        }

        match steps_along(&step, axis, options.direction_tolerance) {
            Some(steps) if steps <= options.max_gap_steps => {
                column.entries.extend(std::iter::repeat(None).take(steps - 1));
                column.entries.push(Some(index));
            }
            _ => {
                let mut offset = projected_steps(&origin, &current, axis);
                if offset.unsigned_abs() > options.max_gap_steps as u64 {
                    outliers += 1;
                    offset = 0;
                }
                columns.push(Column::starting_at(offset, index));
            }
        }
    }

    if outliers > 0 {
        warn!(
            outliers,
            max_gap_steps = options.max_gap_steps,
            "Column start offsets beyond gap limit were reset to the reference line"
        );
    }

    columns
}

/// Pad columns at both ends so they share the same row range
pub fn pad_columns(columns: Vec<Column>) -> Option<IndexGrid> {
    let largest_start_offset = columns.iter().map(|c| c.start_offset).min().unwrap_or(0);
    let largest_end_offset = columns
        .iter()
        .map(Column::end_offset)
        .max()
        .unwrap_or(0);
    let rows = (largest_end_offset - largest_start_offset).max(0) as usize;

    let padded: Vec<Vec<Option<u32>>> = columns
        .into_iter()
        .map(|column| {
            let leading = (column.start_offset - largest_start_offset) as usize;
            let trailing = rows - leading - column.entries.len();
            let mut cells = Vec::with_capacity(rows);
            cells.extend(std::iter::repeat(None).take(leading));
            cells.extend(column.entries);
            cells.extend(std::iter::repeat(None).take(trailing));
            cells
        })
        .collect();

    IndexGrid::from_columns(padded)
}

/// Reconstruct the implicit grid of an ordered point sequence.
///
/// Returns `None` when fewer than two columns are found, since such input
/// cannot be triangulated.
pub fn reconstruct_grid(
    points: &[Vertex],
    axis: &Vector2<f64>,
    options: &ReconstructionOptions,
) -> Option<IndexGrid> {
    let columns = assemble_columns(points, axis, options);
    if columns.len() < 2 {
        debug!(columns = columns.len(), "Too few columns to reconstruct a grid");
        return None;
    }
    let grid = pad_columns(columns)?;
    debug!(
        columns = grid.columns(),
        rows = grid.rows(),
        occupied = grid.occupied_count(),
        "Reconstructed point grid"
    );
    Some(grid)
}
