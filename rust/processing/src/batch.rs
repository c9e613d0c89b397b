// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parallel batch import.
//!
//! Every file is imported independently on a dedicated worker pool. Files
//! that fail or produce no vertices are collected with a reason; the
//! surfaces that did import are kept.

use std::path::{Path, PathBuf};

use geosurf_core::NoProgress;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::ImportConfig;
use crate::error::{Error, Result};
use crate::router::{ImportRouter, ImportedSurface};

/// Outcome of importing one file
#[derive(Debug)]
pub enum ImportOutcome {
    Imported(ImportedSurface),
    /// The file was read but held no usable vertices
    Empty,
    Failed(Error),
}

impl ImportOutcome {
    /// Import one file, classifying empty results separately from errors
    pub fn of(router: &ImportRouter, path: &Path) -> Self {
        match router.import(path, &NoProgress) {
            Ok(surface) if surface.mesh.is_empty() => ImportOutcome::Empty,
            Ok(surface) => ImportOutcome::Imported(surface),
            Err(e) => ImportOutcome::Failed(e),
        }
    }
}

/// A file that did not produce a surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedImport {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a batch import, in input order
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub surfaces: Vec<ImportedSurface>,
    pub failed: Vec<FailedImport>,
}

impl BatchReport {
    /// Check if every file imported
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Names of the files that failed, for a single user-facing report
    pub fn failed_files(&self) -> Vec<String> {
        self.failed
            .iter()
            .map(|f| {
                f.path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| f.path.display().to_string())
            })
            .collect()
    }

    fn push(&mut self, path: &Path, outcome: ImportOutcome) {
        match outcome {
            ImportOutcome::Imported(surface) => self.surfaces.push(surface),
            ImportOutcome::Empty => self.failed.push(FailedImport {
                path: path.to_path_buf(),
                reason: "no valid surface data".to_string(),
            }),
            ImportOutcome::Failed(e) => self.failed.push(FailedImport {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Import files in parallel on a pool of `config.worker_threads` threads
pub fn import_batch<P: AsRef<Path> + Sync>(paths: &[P], config: &ImportConfig) -> Result<BatchReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build()?;
    let router = ImportRouter::new(config);

    tracing::info!(
        files = paths.len(),
        worker_threads = config.worker_threads,
        "Starting batch import"
    );

    let outcomes: Vec<ImportOutcome> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| ImportOutcome::of(&router, path.as_ref()))
            .collect()
    });

    let mut report = BatchReport::default();
    for (path, outcome) in paths.iter().zip(outcomes) {
        report.push(path.as_ref(), outcome);
    }

    if !report.is_complete() {
        tracing::warn!(
            failed = report.failed.len(),
            files = ?report.failed_files(),
            "Some surfaces could not be imported"
        );
    }
    tracing::info!(
        imported = report.surfaces.len(),
        failed = report.failed.len(),
        "Batch import complete"
    );

    Ok(report)
}
