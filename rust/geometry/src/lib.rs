// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoSurf Geometry
//!
//! Triangle meshes for geoscience surfaces and the importers that build
//! them: GOCAD `.ts`, Petrel point files, OpenWorks XYZ scan lines and
//! VTK `.vtu`/`.pvd`.
//!
//! ```rust,ignore
//! use geosurf_geometry::{read_petrel_file, read_openworks_xyz_file};
//!
//! let horizon = read_petrel_file(Path::new("top_reservoir.ptl"))?;
//! let seabed = read_openworks_xyz_file(Path::new("seabed.dat"), 50.0)?;
//! ```

pub mod axis;
pub mod error;
pub mod importers;
pub mod index_grid;
pub mod mesh;
pub mod reconstruct;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2};

pub use axis::{infer_primary_axis, DirectionCluster, DirectionClusters, DEFAULT_DIRECTION_TOLERANCE};
pub use error::{Error, Result};
pub use importers::{
    import_from_file, parse_pvd_datasets, read_gocad_file, read_openworks_xyz_file,
    read_petrel_file, GocadImporter, ImportStats, OpenWorksOptions, OpenWorksXyzImporter,
    PetrelImporter, PvdDataset, SurfaceImport, SurfaceImporter, VtkError, VtkSurfaceImporter,
};
pub use index_grid::IndexGrid;
pub use mesh::{TriangleMesh, Vertex, VertexProperty, MISSING_PROPERTY_VALUE};
pub use reconstruct::{reconstruct_grid, ReconstructionOptions};
