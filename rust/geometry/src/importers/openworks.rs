// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OpenWorks XYZ export importer.
//!
//! The file is an ordered scan-line point list (`x y z [values...]`) with
//! no grid indices. The grid topology is recovered in three steps:
//!
//! 1. While reading, planar displacements between consecutive points are
//!    clustered by direction; the most frequent cluster at its shortest
//!    length is the primary stepping vector.
//! 2. The point sequence is split into columns wherever a step leaves that
//!    direction; gaps are filled with missing cells and columns are padded
//!    against a common reference line (see [`crate::reconstruct`]).
//! 3. The grid is triangulated at a stride derived from the preferred
//!    point distance.

use std::path::Path;

use geosurf_core::{
    Line, LineReader, NoProgress, ProgressObserver, ProgressTracker, SurfaceFormat,
};
use tracing::debug;

use super::{parse_xyz, ImportStats, SurfaceImport, SurfaceImporter};
use crate::axis::{decimation_stride, planar, DirectionClusters, DEFAULT_DIRECTION_TOLERANCE};
use crate::mesh::Vertex;
use crate::reconstruct::{reconstruct_grid, ReconstructionOptions};
use crate::{Result, TriangleMesh};

/// Options for [`OpenWorksXyzImporter`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenWorksOptions {
    /// Desired distance between output grid points; `0.0` keeps the native
    /// spacing
    pub preferred_point_distance: f64,
    /// Tolerance used when comparing unit step directions
    pub direction_tolerance: f64,
    /// Largest gap or column offset, in axis steps, padded with missing cells
    pub max_gap_steps: usize,
}

impl Default for OpenWorksOptions {
    fn default() -> Self {
        let reconstruction = ReconstructionOptions::default();
        Self {
            preferred_point_distance: 0.0,
            direction_tolerance: DEFAULT_DIRECTION_TOLERANCE,
            max_gap_steps: reconstruction.max_gap_steps,
        }
    }
}

impl OpenWorksOptions {
    /// Default options with a preferred output point distance
    pub fn with_point_distance(preferred_point_distance: f64) -> Self {
        Self {
            preferred_point_distance,
            ..Self::default()
        }
    }

    fn reconstruction(&self) -> ReconstructionOptions {
        ReconstructionOptions {
            direction_tolerance: self.direction_tolerance,
            max_gap_steps: self.max_gap_steps,
        }
    }
}

/// Parse `x y z`, with z normalized to be depth negative
fn parse_point(line: &Line<'_>) -> Option<Vertex> {
    let mut point = parse_xyz(&line.token_vec())?;
    if point.z > 0.0 {
        point.z = -point.z;
    }
    Some(point)
}

/// OpenWorks XYZ importer
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenWorksXyzImporter {
    options: OpenWorksOptions,
}

impl OpenWorksXyzImporter {
    pub fn new(options: OpenWorksOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &OpenWorksOptions {
        &self.options
    }
}

impl SurfaceImporter for OpenWorksXyzImporter {
    fn import(&self, reader: &LineReader, progress: &dyn ProgressObserver) -> Result<SurfaceImport> {
        let mut tracker = ProgressTracker::new(progress, reader.estimated_line_count());
        let mut stats = ImportStats::default();
        let mut points: Vec<Vertex> = Vec::new();
        let mut clusters = DirectionClusters::new(self.options.direction_tolerance);

        for line in reader.lines() {
            stats.lines_read += 1;
            tracker.advance(1);
            if line.is_blank() {
                continue;
            }
            let Some(point) = parse_point(&line) else {
                stats.skipped_lines += 1;
                continue;
            };
            if points.len() >= u32::MAX as usize {
                stats.skipped_lines += 1;
                continue;
            }
            if let Some(previous) = points.last() {
                clusters.add(planar(&point) - planar(previous));
            }
            points.push(point);
        }
        tracker.finish();

        if points.is_empty() {
            return Ok(SurfaceImport::empty(stats));
        }
        let Some(axis) = clusters.primary_axis() else {
            debug!(points = points.len(), "No step direction found in OpenWorks points");
            return Ok(SurfaceImport::empty(stats));
        };
        debug!(
            axis_x = axis.x,
            axis_y = axis.y,
            directions = clusters.len(),
            "Inferred OpenWorks primary axis"
        );

        let Some(grid) = reconstruct_grid(&points, &axis, &self.options.reconstruction()) else {
            return Ok(SurfaceImport::empty(stats));
        };

        let stride = decimation_stride(self.options.preferred_point_distance, &axis);
        debug!(stride, "OpenWorks decimation stride");
        let indices = grid.triangulate_blocks(stride);

        Ok(SurfaceImport {
            mesh: TriangleMesh::new(points, indices)?,
            stats,
        })
    }

    fn format(&self) -> SurfaceFormat {
        SurfaceFormat::OpenWorksXyz
    }
}

/// Read an OpenWorks XYZ file, triangulating at roughly the preferred point distance
pub fn read_openworks_xyz_file(path: &Path, preferred_point_distance: f64) -> Result<TriangleMesh> {
    let importer = OpenWorksXyzImporter::new(OpenWorksOptions::with_point_distance(
        preferred_point_distance,
    ));
    Ok(importer.read_file(path, &NoProgress)?.mesh)
}
