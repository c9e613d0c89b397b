// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::importers::vtk::VtkError;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while importing or building surfaces
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("Core reader error: {0}")]
    Core(#[from] geosurf_core::Error),

    #[error("VTK import failed: {0}")]
    Vtk(#[from] VtkError),
}
