// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import Router - dispatch from a file path to the matching importer.
//!
//! Line-based formats go through registered [`SurfaceImporter`]s keyed by
//! format; VTU files use the strict VTK importer directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use geosurf_core::{ProgressObserver, SurfaceFormat};
use geosurf_geometry::{
    GocadImporter, ImportStats, OpenWorksXyzImporter, PetrelImporter, SurfaceImporter,
    TriangleMesh, VtkSurfaceImporter,
};
use rustc_hash::FxHashMap;

use crate::config::ImportConfig;
use crate::error::{Error, Result};

/// A surface imported from one file
#[derive(Debug, Clone)]
pub struct ImportedSurface {
    pub path: PathBuf,
    pub format: SurfaceFormat,
    pub mesh: TriangleMesh,
    /// Line statistics; all zero for VTU files
    pub stats: ImportStats,
}

/// Import router - selects an importer by file format
pub struct ImportRouter {
    importers: FxHashMap<SurfaceFormat, Arc<dyn SurfaceImporter>>,
    vtk: VtkSurfaceImporter,
    default_format: Option<SurfaceFormat>,
}

impl ImportRouter {
    /// Create a router with the default importers configured from `config`
    pub fn new(config: &ImportConfig) -> Self {
        let mut router = Self {
            importers: FxHashMap::default(),
            vtk: VtkSurfaceImporter::new(),
            default_format: config.default_format,
        };
        router.register(Box::new(GocadImporter::new()));
        router.register(Box::new(PetrelImporter::new()));
        router.register(Box::new(OpenWorksXyzImporter::new(config.openworks_options())));
        router
    }

    /// Register an importer, replacing any importer for the same format
    pub fn register(&mut self, importer: Box<dyn SurfaceImporter>) {
        let importer: Arc<dyn SurfaceImporter> = Arc::from(importer);
        self.importers.insert(importer.format(), importer);
    }

    /// Format of `path`, falling back to the configured default format
    pub fn format_for(&self, path: &Path) -> Result<SurfaceFormat> {
        match SurfaceFormat::from_path(path) {
            Some(format) => Ok(format),
            None => match self.default_format {
                Some(format) => Ok(format),
                None => Ok(SurfaceFormat::require_from_path(path)?),
            },
        }
    }

    /// Import a single surface file
    pub fn import(&self, path: &Path, progress: &dyn ProgressObserver) -> Result<ImportedSurface> {
        let format = self.format_for(path)?;
        let (mesh, stats) = match format {
            SurfaceFormat::Vtu => (self.vtk.import_file(path)?, ImportStats::default()),
            SurfaceFormat::Pvd => {
                return Err(Error::Collection {
                    path: path.to_path_buf(),
                })
            }
            line_format => {
                let importer = self
                    .importers
                    .get(&line_format)
                    .ok_or(geosurf_core::Error::UnsupportedFormat {
                        extension: Some(line_format.name().to_string()),
                    })?;
                let imported = importer.read_file(path, progress)?;
                (imported.mesh, imported.stats)
            }
        };

        Ok(ImportedSurface {
            path: path.to_path_buf(),
            format,
            mesh,
            stats,
        })
    }
}

impl Default for ImportRouter {
    fn default() -> Self {
        Self::new(&ImportConfig::default())
    }
}
