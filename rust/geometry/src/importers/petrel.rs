// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Petrel ASCII point export (`x y z i j [values...]`).

use std::path::Path;

use geosurf_core::{
    parse_grid_index, Line, LineReader, NoProgress, ProgressObserver, ProgressTracker,
    SurfaceFormat,
};
use tracing::{debug, warn};

use super::{parse_xyz, ImportStats, SurfaceImport, SurfaceImporter};
use crate::index_grid::IndexGrid;
use crate::mesh::Vertex;
use crate::{Result, TriangleMesh};

/// Grids may hold this many cells per accepted point before they are
/// considered too sparse to build
const MAX_CELLS_PER_POINT: usize = 64;

/// Cell count always allowed, however few points were accepted
const MIN_CELL_BUDGET: usize = 1 << 20;

/// A parsed point record with its grid coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
struct GridPoint {
    position: Vertex,
    i: i64,
    j: i64,
}

/// Parse `x y z i j`, rejecting anything that is not a surface point
fn parse_point(line: &Line<'_>) -> Option<GridPoint> {
    let fields = line.token_vec();
    let position = parse_xyz(&fields)?;
    let i = fields.get(3).copied().and_then(parse_grid_index)?;
    let j = fields.get(4).copied().and_then(parse_grid_index)?;
    if i < 0 || j < 0 {
        return None;
    }
    Some(GridPoint { position, i, j })
}

/// Inclusive I/J bounds of the accepted points
#[derive(Debug, Clone, Copy)]
struct GridExtent {
    min_i: i64,
    max_i: i64,
    min_j: i64,
    max_j: i64,
}

impl GridExtent {
    fn of(points: &[GridPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_i: first.i,
            max_i: first.i,
            min_j: first.j,
            max_j: first.j,
        };
        Some(points.iter().fold(init, |e, p| Self {
            min_i: e.min_i.min(p.i),
            max_i: e.max_i.max(p.i),
            min_j: e.min_j.min(p.j),
            max_j: e.max_j.max(p.j),
        }))
    }

    fn columns(&self) -> Option<usize> {
        span(self.min_i, self.max_i)
    }

    fn rows(&self) -> Option<usize> {
        span(self.min_j, self.max_j)
    }
}

/// Number of grid lines from `min` to `max` inclusive
fn span(min: i64, max: i64) -> Option<usize> {
    usize::try_from(max.checked_sub(min)?).ok()?.checked_add(1)
}

/// Allocate an empty grid if its cell count stays within the budget
fn allocate_grid(columns: usize, rows: usize, point_count: usize) -> Option<IndexGrid> {
    let budget = point_count
        .saturating_mul(MAX_CELLS_PER_POINT)
        .max(MIN_CELL_BUDGET);
    if columns.checked_mul(rows)? > budget {
        return None;
    }
    IndexGrid::new(columns, rows)
}

/// Petrel `.ptl` importer.
///
/// Lines whose first token is not a number are comments or headers. Points
/// are placed in a dense I/J grid (duplicate cells: last point wins) and
/// every grid square is split into two triangles, each emitted only if its
/// three corners exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct PetrelImporter;

impl PetrelImporter {
    pub fn new() -> Self {
        Self
    }
}

impl SurfaceImporter for PetrelImporter {
    fn import(&self, reader: &LineReader, progress: &dyn ProgressObserver) -> Result<SurfaceImport> {
        let mut tracker = ProgressTracker::new(progress, reader.estimated_line_count());
        let mut stats = ImportStats::default();
        let mut points = Vec::new();

        for line in reader.lines() {
            stats.lines_read += 1;
            tracker.advance(1);
            if line.is_blank() {
                continue;
            }
            match parse_point(&line) {
                Some(point) if points.len() < u32::MAX as usize => points.push(point),
                _ => stats.skipped_lines += 1,
            }
        }
        tracker.finish();

        let Some(extent) = GridExtent::of(&points) else {
            return Ok(SurfaceImport::empty(stats));
        };
        let (Some(columns), Some(rows)) = (extent.columns(), extent.rows()) else {
            warn!(?extent, "Petrel grid index range overflows");
            return Ok(SurfaceImport::empty(stats));
        };
        if columns < 2 || rows < 2 {
            debug!(columns, rows, "Petrel grid too small to triangulate");
            return Ok(SurfaceImport::empty(stats));
        }
        let Some(mut grid) = allocate_grid(columns, rows, points.len()) else {
            warn!(
                columns,
                rows,
                points = points.len(),
                "Petrel grid indices too sparse to build a grid"
            );
            return Ok(SurfaceImport::empty(stats));
        };
        for (index, point) in points.iter().enumerate() {
            grid.set(
                (point.i - extent.min_i) as usize,
                (point.j - extent.min_j) as usize,
                index as u32,
            );
        }
        let indices = grid.triangulate_cells();
        let vertices = points.into_iter().map(|p| p.position).collect();

        Ok(SurfaceImport {
            mesh: TriangleMesh::new(vertices, indices)?,
            stats,
        })
    }

    fn format(&self) -> SurfaceFormat {
        SurfaceFormat::Petrel
    }
}

/// Read a Petrel point file into a gridded triangle mesh
pub fn read_petrel_file(path: &Path) -> Result<TriangleMesh> {
    Ok(PetrelImporter.read_file(path, &NoProgress)?.mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(content: &str) -> SurfaceImport {
        let reader = LineReader::from_bytes(content.as_bytes());
        PetrelImporter::new().import(&reader, &NoProgress).unwrap()
    }

    #[test]
    fn test_full_two_by_two_grid() {
        let mesh = import("0 0 0 0 0\n1 0 0 1 0\n0 1 0 0 1\n1 1 0 1 1\n").mesh;
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_indices(), &[0, 1, 3, 0, 3, 2]);
    }

    #[test]
    fn test_missing_corner_leaves_hole() {
        let mesh = import("0 0 0 0 0\n1 0 0 1 0\n0 1 0 0 1\n").mesh;
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_comments_and_headers_are_skipped() {
        let imported = import(
            "# Petrel Points with attributes\nVERSION 1\nBEGIN HEADER\nX\nY\nZ\nEND HEADER\n\
             0 0 -10 0 0 7.5\n1 0 -10 1 0 7.5\n0 1 -10 0 1 7.5\n1 1 -10 1 1 7.5\n",
        );
        assert_eq!(imported.mesh.vertex_count(), 4);
        assert_eq!(imported.mesh.triangle_count(), 2);
        assert_eq!(imported.stats.skipped_lines, 7);
    }

    #[test]
    fn test_offset_and_float_indices() {
        let mesh = import("5 5 1 10.0 20\n6 5 1 11 20\n5 6 1 10 21.0\n6 6 1 11 21\n").mesh;
        assert_eq!(mesh.triangle_indices(), &[0, 1, 3, 0, 3, 2]);
    }

    #[test]
    fn test_invalid_records_are_rejected() {
        let imported = import("0 0 0 -1 0\n0 0 0 0.5 0\n0 0 inf 0 0\n0 0 0 0\n");
        assert!(imported.mesh.is_empty());
        assert_eq!(imported.stats.skipped_lines, 4);
    }

    #[test]
    fn test_single_column_is_empty() {
        let mesh = import("0 0 0 0 0\n0 1 0 0 1\n0 2 0 0 2\n").mesh;
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_duplicate_cell_last_point_wins() {
        let mesh = import("0 0 0 0 0\n1 0 0 1 0\n0 1 0 0 1\n1 1 0 1 1\n9 9 9 1 1\n").mesh;
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.triangle_indices(), &[0, 1, 4, 0, 4, 2]);
    }

    #[test]
    fn test_huge_index_yields_empty_surface() {
        let imported = import("0 0 0 0 0\n1 0 0 4611686018427387904 0\n0 1 0 0 1\n");
        assert!(imported.mesh.is_empty());
        assert_eq!(imported.mesh.triangle_count(), 0);
        assert_eq!(imported.stats.lines_read, 3);
        assert_eq!(imported.stats.skipped_lines, 0);
    }

    #[test]
    fn test_far_outlier_yields_empty_surface() {
        let imported = import(
            "0 0 0 0 0\n1 0 0 1 0\n0 1 0 0 1\n1 1 0 1 1\n\
             5 5 5 3000000000 3000000000\n",
        );
        assert!(imported.mesh.is_empty());
        assert_eq!(imported.mesh.triangle_count(), 0);
    }

    #[test]
    fn test_maximal_index_range_does_not_overflow() {
        let imported = import("0 0 0 0 0\n1 1 1 9223372036854775807 1\n");
        assert!(imported.mesh.is_empty());
    }

    #[test]
    fn test_sparse_grid_within_budget() {
        // 4 points spread over a 1000 x 2 grid: allowed, but no square closes
        let mesh = import("0 0 0 0 0\n0 1 0 0 1\n9 0 0 999 0\n9 1 0 999 1\n").mesh;
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_empty_input() {
        let mesh = import("").mesh;
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
    }
}
