// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GOCAD ASCII triangulated surface (`.ts`) importer.
//!
//! Supports the records needed for a single `TFACE` surface:
//!
//! - `VRTX id x y z`, `PVRTX id x y z [values...]`
//! - `ATOM id vertex-id`, `PATOM id vertex-id` (reuse of an existing vertex)
//! - `TRGL id1 id2 id3`
//! - `PROPERTIES name...`, `NO_DATA_VALUES value...`
//! - `ZPOSITIVE DEPTH|ELEVATION`
//! - `TFACE` / `END` section markers
//!
//! Only the first `TFACE` section is imported. Keywords are matched case
//! insensitively.

use std::path::Path;

use geosurf_core::{
    parse_f32, parse_finite_f64, parse_i64, LineReader, NoProgress, ProgressObserver,
    ProgressTracker, SurfaceFormat,
};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::{ImportStats, SurfaceImport, SurfaceImporter};
use crate::mesh::{Vertex, MISSING_PROPERTY_VALUE};
use crate::{Result, TriangleMesh};

/// GOCAD record keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Tface,
    Vrtx,
    Pvrtx,
    Atom,
    Trgl,
    End,
    Properties,
    NoDataValues,
    ZPositive,
}

const KEYWORDS: &[(&[u8], Keyword)] = &[
    (b"VRTX", Keyword::Vrtx),
    (b"PVRTX", Keyword::Pvrtx),
    (b"TRGL", Keyword::Trgl),
    (b"ATOM", Keyword::Atom),
    (b"PATOM", Keyword::Atom),
    (b"TFACE", Keyword::Tface),
    (b"END", Keyword::End),
    (b"PROPERTIES", Keyword::Properties),
    (b"NO_DATA_VALUES", Keyword::NoDataValues),
    (b"ZPOSITIVE", Keyword::ZPositive),
];

impl Keyword {
    #[inline]
    fn from_token(token: &[u8]) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(name, _)| token.eq_ignore_ascii_case(name))
            .map(|&(_, keyword)| keyword)
    }
}

/// Position relative to the imported `TFACE` section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// Before the first `TFACE`
    Outside,
    /// Inside the first `TFACE`
    InsideFirst,
    /// After the first section's `END`; all further input is ignored
    Done,
}

/// Accumulates one GOCAD surface while lines are fed in
struct GocadParser {
    section: Section,
    depth_positive: bool,
    vertices: Vec<Vertex>,
    id_to_index: FxHashMap<i64, u32>,
    triangles: Vec<[i64; 3]>,
    property_names: Vec<String>,
    property_values: Vec<Vec<f32>>,
    no_data_values: Vec<Option<f32>>,
    stats: ImportStats,
}

impl GocadParser {
    fn new() -> Self {
        Self {
            section: Section::Outside,
            depth_positive: false,
            vertices: Vec::new(),
            id_to_index: FxHashMap::default(),
            triangles: Vec::new(),
            property_names: Vec::new(),
            property_values: Vec::new(),
            no_data_values: Vec::new(),
            stats: ImportStats::default(),
        }
    }

    fn handle_line(&mut self, text: &[u8]) {
        self.stats.lines_read += 1;
        if self.section == Section::Done {
            return;
        }

        let mut tokens = geosurf_core::split_tokens(text);
        let Some(first) = tokens.next() else {
            return;
        };
        let Some(keyword) = Keyword::from_token(first) else {
            self.stats.skipped_lines += 1;
            return;
        };

        let accepted = match (keyword, self.section) {
            (Keyword::Tface, Section::Outside) => {
                self.section = Section::InsideFirst;
                true
            }
            (Keyword::End, Section::InsideFirst) => {
                self.section = Section::Done;
                true
            }
            (Keyword::Properties, _) => {
                self.register_properties(tokens);
                true
            }
            (Keyword::NoDataValues, _) => {
                self.no_data_values = tokens.map(parse_f32).collect();
                true
            }
            (Keyword::ZPositive, _) => {
                self.depth_positive = tokens
                    .next()
                    .is_some_and(|value| value.eq_ignore_ascii_case(b"DEPTH"));
                true
            }
            (Keyword::Vrtx, Section::InsideFirst) => self.add_vertex(tokens, false),
            (Keyword::Pvrtx, Section::InsideFirst) => self.add_vertex(tokens, true),
            (Keyword::Atom, Section::InsideFirst) => self.add_atom(tokens),
            (Keyword::Trgl, Section::InsideFirst) => self.add_triangle(tokens),
            // Records outside the surface section carry no geometry
            _ => true,
        };

        if !accepted {
            self.stats.skipped_lines += 1;
        }
    }

    /// Replace the registered property list.
    ///
    /// Vertices read before the declaration get the missing-value sentinel
    /// so every array stays aligned with the vertex list.
    fn register_properties<'a>(&mut self, names: impl Iterator<Item = &'a [u8]>) {
        self.property_names = names
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect();
        self.property_values = self
            .property_names
            .iter()
            .map(|_| vec![MISSING_PROPERTY_VALUE; self.vertices.len()])
            .collect();
        debug!(properties = ?self.property_names, "Registered GOCAD properties");
    }

    fn add_vertex<'a>(&mut self, mut tokens: impl Iterator<Item = &'a [u8]>, with_values: bool) -> bool {
        let Some(id) = tokens.next().and_then(parse_i64) else {
            return false;
        };
        let x = tokens.next().and_then(parse_finite_f64);
        let y = tokens.next().and_then(parse_finite_f64);
        let z = tokens.next().and_then(parse_finite_f64);
        let (Some(x), Some(y), Some(mut z)) = (x, y, z) else {
            return false;
        };
        if id < 0 {
            return false;
        }
        let Ok(index) = u32::try_from(self.vertices.len()) else {
            return false;
        };

        if self.depth_positive {
            z = -z;
        }
        self.vertices.push(Vertex::new(x, y, z));
        self.id_to_index.insert(id, index);

        for values in &mut self.property_values {
            let value = if with_values {
                tokens.next().and_then(parse_f32).unwrap_or(MISSING_PROPERTY_VALUE)
            } else {
                MISSING_PROPERTY_VALUE
            };
            values.push(value);
        }
        true
    }

    /// `ATOM id vertex-id`: a new vertex id sharing an existing vertex
    fn add_atom<'a>(&mut self, mut tokens: impl Iterator<Item = &'a [u8]>) -> bool {
        let id = tokens.next().and_then(parse_i64);
        let source = tokens.next().and_then(parse_i64);
        let (Some(id), Some(source)) = (id, source) else {
            return false;
        };
        if id < 0 {
            return false;
        }
        let Some(&source_index) = self.id_to_index.get(&source) else {
            return false;
        };
        let Ok(index) = u32::try_from(self.vertices.len()) else {
            return false;
        };

        let position = self.vertices[source_index as usize];
        self.vertices.push(position);
        self.id_to_index.insert(id, index);
        for values in &mut self.property_values {
            let value = values[source_index as usize];
            values.push(value);
        }
        true
    }

    fn add_triangle<'a>(&mut self, mut tokens: impl Iterator<Item = &'a [u8]>) -> bool {
        let a = tokens.next().and_then(parse_i64);
        let b = tokens.next().and_then(parse_i64);
        let c = tokens.next().and_then(parse_i64);
        match (a, b, c) {
            (Some(a), Some(b), Some(c)) if a >= 0 && b >= 0 && c >= 0 => {
                self.triangles.push([a, b, c]);
                true
            }
            _ => false,
        }
    }

    /// Resolve file-local triangle ids and build the mesh
    fn finish(mut self) -> Result<SurfaceImport> {
        if self.vertices.is_empty() {
            return Ok(SurfaceImport::empty(self.stats));
        }

        let mut indices = Vec::with_capacity(self.triangles.len() * 3);
        for triangle in &self.triangles {
            let resolved = (
                self.id_to_index.get(&triangle[0]),
                self.id_to_index.get(&triangle[1]),
                self.id_to_index.get(&triangle[2]),
            );
            match resolved {
                (Some(&a), Some(&b), Some(&c)) => indices.extend_from_slice(&[a, b, c]),
                _ => self.stats.dropped_triangles += 1,
            }
        }
        if self.stats.dropped_triangles > 0 {
            warn!(
                dropped = self.stats.dropped_triangles,
                "Dropped GOCAD triangles referencing undeclared vertex ids"
            );
        }

        for (values, no_data) in self.property_values.iter_mut().zip(&self.no_data_values) {
            if let Some(no_data) = *no_data {
                values
                    .iter_mut()
                    .filter(|v| **v == no_data)
                    .for_each(|v| *v = MISSING_PROPERTY_VALUE);
            }
        }

        let mut mesh = TriangleMesh::new(self.vertices, indices)?;
        for (name, values) in self.property_names.into_iter().zip(self.property_values) {
            if mesh.property_values(&name).is_some() {
                warn!(property = %name, "Ignoring repeated GOCAD property name");
                continue;
            }
            mesh = mesh.with_property(name, values)?;
        }

        Ok(SurfaceImport {
            mesh,
            stats: self.stats,
        })
    }
}

/// GOCAD `.ts` importer
#[derive(Debug, Clone, Copy, Default)]
pub struct GocadImporter;

impl GocadImporter {
    pub fn new() -> Self {
        Self
    }
}

impl SurfaceImporter for GocadImporter {
    fn import(&self, reader: &LineReader, progress: &dyn ProgressObserver) -> Result<SurfaceImport> {
        let mut tracker = ProgressTracker::new(progress, reader.estimated_line_count());
        let mut parser = GocadParser::new();
        for line in reader.lines() {
            parser.handle_line(line.text());
            tracker.advance(1);
        }
        tracker.finish();
        parser.finish()
    }

    fn format(&self) -> SurfaceFormat {
        SurfaceFormat::Gocad
    }
}

/// Read the first `TFACE` surface of a GOCAD file
pub fn read_gocad_file(path: &Path) -> Result<TriangleMesh> {
    Ok(GocadImporter.read_file(path, &NoProgress)?.mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn import(content: &str) -> SurfaceImport {
        let reader = LineReader::from_bytes(content.as_bytes());
        GocadImporter::new().import(&reader, &NoProgress).unwrap()
    }

    #[test]
    fn test_minimal_surface() {
        let imported = import("TFACE\nVRTX 1 0 0 0\nVRTX 2 1 0 0\nVRTX 3 0 1 0\nTRGL 1 2 3\nEND\n");
        let mesh = imported.mesh;
        assert_eq!(
            mesh.vertices(),
            &[
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(1.0, 0.0, 0.0),
                Vertex::new(0.0, 1.0, 0.0)
            ]
        );
        assert_eq!(mesh.triangle_indices(), &[0, 1, 2]);
        assert_eq!(mesh.property_names().count(), 0);
        assert_eq!(imported.stats.dropped_triangles, 0);
    }

    #[test]
    fn test_zpositive_depth_negates_z() {
        let mesh = import("ZPOSITIVE Depth\nTFACE\nVRTX 1 0 0 5.0\nEND\n").mesh;
        assert_relative_eq!(mesh.vertices()[0].z, -5.0);

        let mesh = import("ZPOSITIVE ELEVATION\nTFACE\nVRTX 1 0 0 5.0\nEND\n").mesh;
        assert_relative_eq!(mesh.vertices()[0].z, 5.0);

        let mesh = import("TFACE\nVRTX 1 0 0 5.0\nEND\n").mesh;
        assert_relative_eq!(mesh.vertices()[0].z, 5.0);
    }

    #[test]
    fn test_property_alignment() {
        let imported = import(
            "GOCAD TSurf 1\nPROPERTIES A B\nTFACE\n\
             PVRTX 1 0 0 0 1.5 10\n\
             PVRTX 2 1 0 0 2.5 20\n\
             PVRTX 3 0 1 0 3.5 30\n\
             TRGL 1 2 3\nEND\n",
        );
        let mesh = imported.mesh;
        assert_eq!(mesh.property_names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(mesh.property_values("A"), Some(&[1.5, 2.5, 3.5][..]));
        assert_eq!(mesh.property_values("B"), Some(&[10.0, 20.0, 30.0][..]));
    }

    #[test]
    fn test_missing_property_values_use_sentinel() {
        let mesh = import(
            "PROPERTIES A B\nTFACE\nPVRTX 1 0 0 0 1.0\nPVRTX 2 1 0 0 x 2.0\nVRTX 3 0 1 0\nEND\n",
        )
        .mesh;
        let a = mesh.property_values("A").unwrap();
        let b = mesh.property_values("B").unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 3);
        assert_relative_eq!(a[0], 1.0);
        assert_eq!(b[0], MISSING_PROPERTY_VALUE);
        assert_eq!(a[1], MISSING_PROPERTY_VALUE);
        assert_relative_eq!(b[1], 2.0);
        assert_eq!(a[2], MISSING_PROPERTY_VALUE);
    }

    #[test]
    fn test_late_properties_are_backfilled() {
        let mesh = import("TFACE\nVRTX 1 0 0 0\nPROPERTIES A\nPVRTX 2 1 0 0 7\nEND\n").mesh;
        assert_eq!(mesh.property_values("A"), Some(&[MISSING_PROPERTY_VALUE, 7.0][..]));
    }

    #[test]
    fn test_no_data_values_map_to_sentinel() {
        let mesh = import(
            "PROPERTIES A\nNO_DATA_VALUES -99999\nTFACE\nPVRTX 1 0 0 0 -99999\nPVRTX 2 1 0 0 4\nEND\n",
        )
        .mesh;
        assert_eq!(mesh.property_values("A"), Some(&[MISSING_PROPERTY_VALUE, 4.0][..]));
    }

    #[test]
    fn test_only_first_tface_is_imported() {
        let mesh = import(
            "TFACE\nVRTX 1 0 0 0\nVRTX 2 1 0 0\nVRTX 3 0 1 0\nTRGL 1 2 3\nEND\n\
             TFACE\nVRTX 4 5 5 5\nTRGL 1 2 4\nEND\n",
        )
        .mesh;
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_records_outside_tface_are_ignored() {
        let mesh = import("VRTX 1 0 0 0\nTRGL 1 1 1\n").mesh;
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_dangling_triangle_is_dropped() {
        let imported = import("TFACE\nVRTX 1 0 0 0\nVRTX 2 1 0 0\nVRTX 3 0 1 0\nTRGL 1 2 9\nTRGL 3 2 1\nEND\n");
        assert_eq!(imported.mesh.triangle_indices(), &[2, 1, 0]);
        assert_eq!(imported.stats.dropped_triangles, 1);
        assert!(imported.mesh.indices_in_bounds());
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let imported = import(
            "TFACE\nVRTX 1 0 0\nVRTX -1 0 0 0\nVRTX a 0 0 0\nVRTX 2 1 1 1\nTRGL 1 -2 3\nTRGL 2 2\nEND\n",
        );
        assert_eq!(imported.mesh.vertex_count(), 1);
        assert_eq!(imported.mesh.triangle_count(), 0);
        assert_eq!(imported.stats.skipped_lines, 5);
    }

    #[test]
    fn test_repeated_vertex_id_last_write_wins() {
        let mesh = import("TFACE\nVRTX 1 0 0 0\nVRTX 2 1 0 0\nVRTX 3 0 1 0\nVRTX 1 9 9 9\nTRGL 1 2 3\nEND\n").mesh;
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_indices(), &[3, 1, 2]);
    }

    #[test]
    fn test_atom_reuses_vertex() {
        let mesh = import(
            "PROPERTIES A\nTFACE\nPVRTX 1 0 0 0 1\nPVRTX 2 1 0 0 2\nATOM 3 1\nTRGL 1 2 3\nEND\n",
        )
        .mesh;
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertices()[2], mesh.vertices()[0]);
        assert_eq!(mesh.property_values("A"), Some(&[1.0, 2.0, 1.0][..]));
        assert_eq!(mesh.triangle_indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_lowercase_keywords() {
        let mesh = import("tface\nvrtx 1 0 0 0\nvrtx 2 1 0 0\nvrtx 3 0 1 0\ntrgl 1 2 3\nend\n").mesh;
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_empty_input() {
        let imported = import("");
        assert!(imported.mesh.is_empty());
        assert_eq!(imported.mesh.triangle_count(), 0);
        assert_eq!(imported.stats.lines_read, 0);
    }
}
