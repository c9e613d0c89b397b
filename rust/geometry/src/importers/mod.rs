// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface importers.
//!
//! The line-based importers (GOCAD, Petrel, OpenWorks XYZ) share one error
//! policy: a malformed line or field skips that record and is counted in
//! [`ImportStats`]; only an unreadable file fails the import. The VTK
//! importer is strict and has its own error type, see [`vtk::VtkError`].

pub mod gocad;
pub mod openworks;
pub mod petrel;
pub mod vtk;

use std::path::Path;

use geosurf_core::{is_numeric_token, parse_f64_into, LineReader, ProgressObserver, SurfaceFormat};
use tracing::info;

use crate::mesh::Vertex;
use crate::{Result, TriangleMesh};

pub use gocad::{read_gocad_file, GocadImporter};
pub use openworks::{read_openworks_xyz_file, OpenWorksOptions, OpenWorksXyzImporter};
pub use petrel::{read_petrel_file, PetrelImporter};
pub use vtk::{import_from_file, parse_pvd_datasets, PvdDataset, VtkError, VtkSurfaceImporter};

/// Per-import counters for records that were read, skipped or dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Lines consumed from the file
    pub lines_read: usize,
    /// Non-blank lines that did not produce a record (comments, headers,
    /// malformed records)
    pub skipped_lines: usize,
    /// Triangles discarded because they referenced unknown vertices
    pub dropped_triangles: usize,
}

/// Result of a line-based import
#[derive(Debug, Clone, Default)]
pub struct SurfaceImport {
    pub mesh: TriangleMesh,
    pub stats: ImportStats,
}

impl SurfaceImport {
    /// An import that produced nothing
    pub fn empty(stats: ImportStats) -> Self {
        Self {
            mesh: TriangleMesh::empty(),
            stats,
        }
    }
}

/// Line-based surface importer
pub trait SurfaceImporter: Send + Sync {
    /// Import from an already buffered file
    fn import(&self, reader: &LineReader, progress: &dyn ProgressObserver) -> Result<SurfaceImport>;

    /// Format handled by this importer
    fn format(&self) -> SurfaceFormat;

    /// Read and import a file
    fn read_file(&self, path: &Path, progress: &dyn ProgressObserver) -> Result<SurfaceImport> {
        let reader = LineReader::open(path)?;
        let imported = self.import(&reader, progress)?;
        info!(
            path = %path.display(),
            format = %self.format(),
            vertices = imported.mesh.vertex_count(),
            triangles = imported.mesh.triangle_count(),
            skipped_lines = imported.stats.skipped_lines,
            "Imported surface"
        );
        Ok(imported)
    }
}

/// Leading `x y z` of a point record whose first field is numeric.
///
/// Coordinates start out infinite and are only overwritten by a parsed
/// field, so a missing, malformed or non-finite field rejects the record.
pub(crate) fn parse_xyz(fields: &[&[u8]]) -> Option<Vertex> {
    if !is_numeric_token(fields.first()?) {
        return None;
    }
    let mut xyz = [f64::INFINITY; 3];
    for (value, field) in xyz.iter_mut().zip(fields) {
        parse_f64_into(field, value);
    }
    let [x, y, z] = xyz;
    xyz.iter()
        .all(|v| v.is_finite())
        .then(|| Vertex::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosurf_core::split_tokens;

    fn xyz(line: &str) -> Option<Vertex> {
        let fields: Vec<&[u8]> = split_tokens(line.as_bytes()).collect();
        parse_xyz(&fields)
    }

    #[test]
    fn test_parse_xyz() {
        assert_eq!(xyz("1 2.5 -3 7 8"), Some(Vertex::new(1.0, 2.5, -3.0)));
        assert_eq!(xyz("X Y Z"), None);
        assert_eq!(xyz("1 2"), None);
        assert_eq!(xyz("1 oops 3"), None);
        assert_eq!(xyz("1 2 nan"), None);
        assert_eq!(xyz("1 2 1e400"), None);
        assert_eq!(xyz(""), None);
    }
}
