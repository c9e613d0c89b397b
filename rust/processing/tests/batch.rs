// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch, dispatch and time-series tests against real files

use std::fs;
use std::path::PathBuf;

use geosurf_core::SurfaceFormat;
use geosurf_processing::{
    import_batch, import_surface, import_time_series, BatchSummary, ImportConfig,
};
use tempfile::TempDir;

fn config() -> ImportConfig {
    let mut config = ImportConfig::from_lookup(|_| None);
    config.worker_threads = 2;
    config
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write test file");
    path
}

const PETREL: &str = "0 0 0 0 0\n1 0 0 1 0\n0 1 0 0 1\n1 1 0 1 1\n";
const GOCAD: &str = "TFACE\nVRTX 1 0 0 0\nVRTX 2 1 0 0\nVRTX 3 0 1 0\nTRGL 1 2 3\nEND\n";

fn vtu(cell_value: &str) -> String {
    format!(
        r#"<VTKFile type="UnstructuredGrid"><UnstructuredGrid><Piece>
<Points><DataArray Name="Coordinates" format="ascii">0 0 0 1 0 0 0 1 0</DataArray></Points>
<Cells><DataArray Name="connectivity" format="ascii">0 1 2</DataArray></Cells>
<CellData><DataArray Name="SGAS" format="ascii">{cell_value}</DataArray></CellData>
</Piece></UnstructuredGrid></VTKFile>"#
    )
}

#[test]
fn test_import_surface_dispatches_by_extension() {
    let dir = TempDir::new().unwrap();
    let surface = import_surface(&write(&dir, "top.ts", GOCAD), &config()).unwrap();
    assert_eq!(surface.format, SurfaceFormat::Gocad);
    assert_eq!(surface.mesh.triangle_indices(), &[0, 1, 2]);

    let surface = import_surface(&write(&dir, "grid.vtu", &vtu("0.25")), &config()).unwrap();
    assert_eq!(surface.format, SurfaceFormat::Vtu);
    assert_eq!(surface.mesh.vertex_count(), 3);
}

#[test]
fn test_batch_keeps_successes_and_collects_failures() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write(&dir, "good.ptl", PETREL),
        write(&dir, "empty.ts", "# nothing\n"),
        dir.path().join("missing.ptl"),
        write(&dir, "surface.grd", PETREL),
        write(&dir, "top.ts", GOCAD),
        write(&dir, "broken.vtu", &vtu("bad")),
    ];

    let report = import_batch(&paths, &config()).unwrap();

    assert_eq!(report.surfaces.len(), 2);
    assert_eq!(report.surfaces[0].path, paths[0]);
    assert_eq!(report.surfaces[1].path, paths[4]);
    assert!(!report.is_complete());
    assert_eq!(
        report.failed_files(),
        vec!["empty.ts", "missing.ptl", "surface.grd", "broken.vtu"]
    );
    assert_eq!(report.failed[0].reason, "no valid surface data");
    assert!(report.failed[1].reason.contains("not found"));
}

#[test]
fn test_default_format_applies_to_unknown_extensions() {
    let dir = TempDir::new().unwrap();
    let mut config = config();
    config.default_format = Some(SurfaceFormat::Petrel);
    let report = import_batch(&[write(&dir, "surface.grd", PETREL)], &config).unwrap();
    assert!(report.is_complete());
    assert_eq!(report.surfaces[0].format, SurfaceFormat::Petrel);
}

#[test]
fn test_batch_summary_json() {
    let dir = TempDir::new().unwrap();
    let paths = [write(&dir, "good.ptl", PETREL), dir.path().join("gone.ts")];
    let report = import_batch(&paths, &config()).unwrap();

    let json = BatchSummary::from(&report).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["surfaces"][0]["vertex_count"], 4);
    assert_eq!(value["surfaces"][0]["triangle_count"], 2);
    assert_eq!(value["surfaces"][0]["bounds"]["max"][0], 1.0);
    assert_eq!(value["failed"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_time_series_sorted_by_timestep() {
    let dir = TempDir::new().unwrap();
    write(&dir, "late.vtu", &vtu("0.9"));
    write(&dir, "early.vtu", &vtu("0.1"));
    write(&dir, "broken.vtu", &vtu("x"));
    let pvd = write(
        &dir,
        "run.pvd",
        r#"<VTKFile type="Collection"><Collection>
            <DataSet timestep="20" file="late.vtu"/>
            <DataSet timestep="5" file="broken.vtu"/>
            <DataSet timestep="10" file="early.vtu"/>
        </Collection></VTKFile>"#,
    );

    let series = import_time_series(&pvd);
    let timesteps: Vec<f64> = series.iter().map(|(t, _)| *t).collect();
    assert_eq!(timesteps, vec![5.0, 10.0, 20.0]);
    assert!(series[0].1.is_err());

    let early = series[1].1.as_ref().unwrap();
    assert_eq!(early.property_values("SGAS"), Some(&[0.1f32, 0.1, 0.1][..]));
}

#[test]
fn test_missing_time_series_is_empty() {
    let dir = TempDir::new().unwrap();
    assert!(import_time_series(&dir.path().join("none.pvd")).is_empty());
}
