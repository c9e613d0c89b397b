// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for surface file reading.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading surface files
#[derive(Error, Debug)]
pub enum Error {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid numeric token: '{token}'")]
    InvalidNumber { token: String },

    #[error("Unsupported surface format: {}", extension.as_deref().unwrap_or("<none>"))]
    UnsupportedFormat { extension: Option<String> },
}

impl Error {
    /// Classify an I/O failure for `path`, separating a missing file from other read errors
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Build an invalid-number error from raw token bytes
    pub fn invalid_number(token: &[u8]) -> Self {
        Error::InvalidNumber {
            token: String::from_utf8_lossy(token).into_owned(),
        }
    }
}
