// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable surface summaries.

use geosurf_core::SurfaceFormat;
use serde::Serialize;

use crate::batch::{BatchReport, FailedImport};
use crate::router::ImportedSurface;

/// Axis-aligned bounds of a surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

/// Summary of one imported surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceSummary {
    /// Source file path
    pub file: String,
    pub format: SurfaceFormat,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub property_names: Vec<String>,
    /// `None` for an empty mesh
    pub bounds: Option<Bounds>,
    pub skipped_lines: usize,
    pub dropped_triangles: usize,
}

impl SurfaceSummary {
    pub fn from_surface(surface: &ImportedSurface) -> Self {
        let mesh = &surface.mesh;
        Self {
            file: surface.path.display().to_string(),
            format: surface.format,
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
            property_names: mesh.property_names().map(String::from).collect(),
            bounds: mesh.bounds().map(|(min, max)| Bounds {
                min: [min.x, min.y, min.z],
                max: [max.x, max.y, max.z],
            }),
            skipped_lines: surface.stats.skipped_lines,
            dropped_triangles: surface.stats.dropped_triangles,
        }
    }
}

/// Summary of a batch import
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub surfaces: Vec<SurfaceSummary>,
    pub failed: Vec<FailedImport>,
}

impl From<&BatchReport> for BatchSummary {
    fn from(report: &BatchReport) -> Self {
        Self {
            surfaces: report.surfaces.iter().map(SurfaceSummary::from_surface).collect(),
            failed: report.failed.clone(),
        }
    }
}

impl BatchSummary {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
