// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from format dispatch and batch import
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] geosurf_core::Error),

    #[error(transparent)]
    Import(#[from] geosurf_geometry::Error),

    #[error("{} is a time-series collection, not a single surface", path.display())]
    Collection { path: PathBuf },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<geosurf_geometry::VtkError> for Error {
    fn from(error: geosurf_geometry::VtkError) -> Self {
        Error::Import(error.into())
    }
}
