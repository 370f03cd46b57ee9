// SPDX-License-Identifier: MPL-2.0

//! Errors of the merge pipeline.

use std::path::PathBuf;

/// Everything that can abort a merge.
///
/// Each stage depends on the previous one, so none of these is recovered from.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An input frame is missing, unreadable, or not a grayscale image.
    #[error("could not load frame {}", path.display())]
    FrameLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The two frames do not share the same (width, height).
    #[error("frames differ in size: {}x{} and {}x{}", first.0, first.1, second.0, second.1)]
    DimensionMismatch {
        first: (usize, usize),
        second: (usize, usize),
    },

    /// A composite does not have the side expected for the given frame size.
    #[error("composite side is {got}, expected {expected}")]
    CompositeSizeMismatch { expected: usize, got: usize },

    /// The composite could not be written as TIFF.
    #[error("could not write {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The external metadata tool failed, was not found, or timed out.
    #[error("metadata patch with {program} failed: {reason}")]
    MetadataPatch { program: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
