// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoSurf Inspect - import surface files and print JSON summaries.
//!
//! ```text
//! geosurf-inspect <FILE>...
//! ```
//!
//! Surface files (`.ts`, `.ptl`, `.xyz`/`.dat`, `.vtu`) are imported as one
//! batch; a `.pvd` collection is expanded into one summary per timestep.
//! Importer settings come from `GEOSURF_*` environment variables and the
//! log level from `RUST_LOG`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use geosurf_core::SurfaceFormat;
use geosurf_processing::{import_batch, import_time_series, BatchSummary, ImportConfig};
use serde_json::json;

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,geosurf=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        bail!("usage: geosurf-inspect <FILE>...");
    }

    let config = ImportConfig::from_env();
    tracing::info!(
        files = paths.len(),
        point_distance = config.point_distance,
        direction_tolerance = config.direction_tolerance,
        worker_threads = config.worker_threads,
        "Starting GeoSurf Inspect"
    );

    let (collections, surfaces): (Vec<PathBuf>, Vec<PathBuf>) = paths
        .into_iter()
        .partition(|p| SurfaceFormat::from_path(p) == Some(SurfaceFormat::Pvd));

    let report = import_batch(&surfaces, &config).context("batch import failed")?;
    let summary = BatchSummary::from(&report);

    let series: Vec<_> = collections.iter().map(PathBuf::as_path).map(time_series_json).collect();

    let output = json!({
        "surfaces": summary.surfaces,
        "failed": summary.failed,
        "time_series": series,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("failed to serialize summary")?
    );

    if !report.is_complete() {
        std::process::exit(1);
    }
    Ok(())
}

/// Summarize every snapshot of a PVD collection
fn time_series_json(path: &Path) -> serde_json::Value {
    let steps: Vec<_> = import_time_series(path)
        .into_iter()
        .map(|(timestep, mesh)| match mesh {
            Ok(mesh) => json!({
                "timestep": timestep,
                "vertex_count": mesh.vertex_count(),
                "triangle_count": mesh.triangle_count(),
                "properties": mesh.property_names().collect::<Vec<_>>(),
            }),
            Err(e) => json!({ "timestep": timestep, "error": e.to_string() }),
        })
        .collect();
    json!({ "file": path.display().to_string(), "steps": steps })
}
