// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GeoSurf Processing
//!
//! Format dispatch and parallel import on top of `geosurf-geometry`:
//!
//! - [`ImportRouter`] picks the importer for a file by extension
//! - [`import_batch`] imports many files on a worker pool and collects failures
//! - [`import_time_series`] imports every snapshot of a PVD collection
//! - [`BatchSummary`] serializes the results as JSON
//!
//! Configuration is read from `GEOSURF_*` environment variables, see
//! [`ImportConfig::from_env`].

pub mod batch;
pub mod config;
pub mod error;
pub mod router;
pub mod summary;
pub mod time_series;

pub use batch::{import_batch, BatchReport, FailedImport, ImportOutcome};
pub use config::ImportConfig;
pub use error::{Error, Result};
pub use router::{ImportRouter, ImportedSurface};
pub use summary::{BatchSummary, Bounds, SurfaceSummary};
pub use time_series::import_time_series;

/// Import a single surface file with the default importers for `config`
pub fn import_surface(path: &std::path::Path, config: &ImportConfig) -> Result<ImportedSurface> {
    ImportRouter::new(config).import(path, &geosurf_core::NoProgress)
}
