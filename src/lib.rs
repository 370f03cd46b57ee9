// SPDX-License-Identifier: MPL-2.0

//! # EXR frame merging
//!
//! Merge the two half frames of a Fuji EXR high-resolution capture
//! into the diagonal sensor mosaic, saved as a 16-bit TIFF.

pub mod error;
pub mod frame;
pub mod img;
pub mod interop;
pub mod metadata;
pub mod output;
pub mod pipeline;

pub use error::{Error, Result};
