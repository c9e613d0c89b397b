// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PVD time-series import.

use std::path::Path;

use geosurf_geometry::{import_from_file, parse_pvd_datasets, TriangleMesh};
use rayon::prelude::*;

/// Import every snapshot of a `.pvd` collection in parallel.
///
/// Results are ordered by timestep. A snapshot that fails to import keeps
/// its slot with the error; an unreadable collection yields no entries.
pub fn import_time_series(pvd_path: &Path) -> Vec<(f64, geosurf_geometry::Result<TriangleMesh>)> {
    let mut datasets = parse_pvd_datasets(pvd_path);
    datasets.sort_by(|a, b| a.timestep.total_cmp(&b.timestep));
    tracing::debug!(
        path = %pvd_path.display(),
        snapshots = datasets.len(),
        "Importing PVD time series"
    );

    datasets
        .par_iter()
        .map(|dataset| {
            let mesh = import_from_file(&dataset.file).map_err(geosurf_geometry::Error::from);
            (dataset.timestep, mesh)
        })
        .collect()
}
