// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GeoSurf Core
//!
//! Low-level reading support shared by the GeoSurf surface importers.
//!
//! ## Overview
//!
//! - **Line Reader**: buffers a whole file and yields lines split into
//!   whitespace-delimited byte tokens ([memchr](https://docs.rs/memchr) line scanning)
//! - **Fast Numbers**: allocation-free token to number conversion using
//!   [fast-float](https://docs.rs/fast-float) and [lexical-core](https://docs.rs/lexical-core)
//! - **Formats**: surface format detection by file extension
//! - **Progress**: optional, rate-limited progress side channel
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geosurf_core::{fast_parse, LineReader};
//!
//! let reader = LineReader::open(path)?;
//! for line in reader.lines() {
//!     let mut tokens = line.tokens();
//!     if let Some(x) = tokens.next().and_then(fast_parse::parse_finite_f64) {
//!         println!("line {}: x = {}", line.number(), x);
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for [`SurfaceFormat`]

pub mod error;
pub mod fast_parse;
pub mod format;
pub mod line_reader;
pub mod progress;

pub use error::{Error, Result};
pub use fast_parse::{
    is_nan_literal, is_numeric_token, parse_f32, parse_f64, parse_f64_into, parse_f64_list,
    parse_f64_or_nan, parse_finite_f64, parse_grid_index, parse_i64, parse_u32, parse_u32_list,
};
pub use format::SurfaceFormat;
pub use line_reader::{split_tokens, Line, LineReader, Lines, Tokens};
pub use progress::{NoProgress, ProgressObserver, ProgressTracker};
