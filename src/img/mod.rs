// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! # Image manipulation
//!
//! This module is a namespace for submodules dealing with image manipulation.
//! The underlying data is always considered to be a 2D nalgebra matrix.

pub mod cfa;
pub mod interleave;
pub mod viz;
