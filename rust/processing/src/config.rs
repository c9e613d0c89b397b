// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import configuration loaded from environment variables.

use geosurf_core::SurfaceFormat;
use geosurf_geometry::{OpenWorksOptions, ReconstructionOptions};

/// Import configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Preferred OpenWorks output point distance; `0.0` keeps native spacing.
    pub point_distance: f64,
    /// Tolerance for matching OpenWorks step directions.
    pub direction_tolerance: f64,
    /// Largest OpenWorks gap or column offset, in axis steps, that is padded.
    pub max_gap_steps: usize,
    /// Number of worker threads for batch imports.
    pub worker_threads: usize,
    /// Format used for files with an unrecognized extension.
    pub default_format: Option<SurfaceFormat>,
}

impl ImportConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup; absent or unparsable
    /// values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let reconstruction = ReconstructionOptions::default();
        Self {
            point_distance: lookup("GEOSURF_POINT_DISTANCE")
                .and_then(|v| v.trim().parse().ok())
                .filter(|v: &f64| v.is_finite() && *v >= 0.0)
                .unwrap_or(0.0),
            direction_tolerance: lookup("GEOSURF_DIRECTION_TOLERANCE")
                .and_then(|v| v.trim().parse().ok())
                .filter(|v: &f64| v.is_finite() && *v > 0.0)
                .unwrap_or(reconstruction.direction_tolerance),
            max_gap_steps: lookup("GEOSURF_MAX_GAP_STEPS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(reconstruction.max_gap_steps),
            worker_threads: lookup("GEOSURF_WORKER_THREADS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|v: &usize| *v > 0)
                .unwrap_or_else(num_cpus::get),
            default_format: lookup("GEOSURF_DEFAULT_FORMAT")
                .and_then(|v| SurfaceFormat::from_name(&v)),
        }
    }

    /// OpenWorks importer options derived from this configuration.
    pub fn openworks_options(&self) -> OpenWorksOptions {
        OpenWorksOptions {
            preferred_point_distance: self.point_distance,
            direction_tolerance: self.direction_tolerance,
            max_gap_steps: self.max_gap_steps,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
