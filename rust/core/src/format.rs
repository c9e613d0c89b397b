// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface file format selection

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// Supported surface file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceFormat {
    /// GOCAD ASCII triangulated surface (`.ts`)
    Gocad,
    /// Petrel ASCII point export with explicit I/J indices
    Petrel,
    /// OpenWorks XYZ point list without grid indices
    OpenWorksXyz,
    /// VTK XML unstructured grid (`.vtu`)
    Vtu,
    /// VTK collection index (`.pvd`)
    Pvd,
}

impl SurfaceFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .and_then(|ext| match ext.as_str() {
                "ts" => Some(SurfaceFormat::Gocad),
                "ptl" => Some(SurfaceFormat::Petrel),
                "xyz" | "dat" => Some(SurfaceFormat::OpenWorksXyz),
                "vtu" => Some(SurfaceFormat::Vtu),
                "pvd" => Some(SurfaceFormat::Pvd),
                _ => None,
            })
    }

    /// Detect format from file extension, failing for unknown extensions
    pub fn require_from_path(path: &Path) -> Result<Self> {
        Self::from_path(path).ok_or_else(|| Error::UnsupportedFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .map(String::from),
        })
    }

    /// Parse a format name as used in configuration (`gocad`, `petrel`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gocad" | "ts" => Some(SurfaceFormat::Gocad),
            "petrel" | "ptl" => Some(SurfaceFormat::Petrel),
            "openworks" | "openworks-xyz" | "xyz" => Some(SurfaceFormat::OpenWorksXyz),
            "vtu" | "vtk" => Some(SurfaceFormat::Vtu),
            "pvd" => Some(SurfaceFormat::Pvd),
            _ => None,
        }
    }

    /// Canonical configuration name
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceFormat::Gocad => "gocad",
            SurfaceFormat::Petrel => "petrel",
            SurfaceFormat::OpenWorksXyz => "openworks",
            SurfaceFormat::Vtu => "vtu",
            SurfaceFormat::Pvd => "pvd",
        }
    }
}

impl fmt::Display for SurfaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
