// SPDX-License-Identifier: MPL-2.0

//! Load, merge, save and annotate a pair of EXR half frames.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::frame::Frame;
use crate::img::{cfa, interleave, viz};
use crate::interop::rgb_from_matrix;
use crate::metadata::{self, MetadataPatcher};
use crate::output;

/// Default name of the merged image, next to the input frames.
pub const DEFAULT_OUTPUT_NAME: &str = "raw.tiff";
/// Default metadata tool, looked up in PATH.
pub const DEFAULT_TIFFSET: &str = "tiffset";
pub const DEFAULT_TIFFSET_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters of one merge.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the frames, also receiving the outputs.
    pub home_dir: PathBuf,
    /// Frames are `<basename>_0.pgm` and `<basename>_1.pgm`.
    pub basename: String,
    pub output_name: String,
    pub tiffset_program: PathBuf,
    pub tiffset_timeout: Duration,
    pub patch_metadata: bool,
    /// File name of an optional PNG rendering of the CFA layout.
    pub mask_output: Option<String>,
}

impl Config {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(home_dir: P, basename: S) -> Self {
        Self {
            home_dir: home_dir.into(),
            basename: basename.into(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            tiffset_program: PathBuf::from(DEFAULT_TIFFSET),
            tiffset_timeout: DEFAULT_TIFFSET_TIMEOUT,
            patch_metadata: true,
            mask_output: None,
        }
    }

    /// Path of frame `index` (0 or 1).
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.home_dir.join(format!("{}_{}.pgm", self.basename, index))
    }

    pub fn output_path(&self) -> PathBuf {
        self.home_dir.join(&self.output_name)
    }

    /// The external patcher described by this configuration.
    pub fn tiffset(&self) -> metadata::Tiffset {
        metadata::Tiffset::new(&self.tiffset_program, self.tiffset_timeout)
    }
}

/// What a successful merge produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub frame_width: usize,
    pub frame_height: usize,
    /// Side of the square composite, `frame_width + frame_height`.
    pub side: usize,
    pub written_cells: usize,
    pub output_path: PathBuf,
    pub mask_path: Option<PathBuf>,
}

/// Run the whole merge.
///
/// Both frames are loaded and checked before anything is written,
/// and the first failing stage aborts the run.
pub fn run(config: &Config, patcher: &dyn MetadataPatcher) -> Result<Report> {
    let frame0 = Frame::load(config.frame_path(0))?;
    let frame1 = Frame::load(config.frame_path(1))?;
    log::info!("Loaded frames");
    let (frame_width, frame_height) = frame0.dimensions();

    let composite = interleave::interleave(&frame0, &frame1)?;

    let output_path = config.output_path();
    output::save_tiff(&composite.to_image(), &output_path)?;

    if config.patch_metadata {
        let geometry = metadata::frame_geometry(frame_width, frame_height);
        patcher.patch_tag(&output_path, metadata::IMAGE_DESCRIPTION_TAG, &geometry)?;
    } else {
        log::warn!("Skipping the metadata patch of {}", output_path.display());
    }

    let mask_path = match &config.mask_output {
        None => None,
        Some(name) => {
            let path = config.home_dir.join(name);
            save_mask(&path, composite.side(), frame_width, frame_height)?;
            Some(path)
        }
    };

    Ok(Report {
        frame_width,
        frame_height,
        side: composite.side(),
        written_cells: composite.written_count(),
        output_path,
        mask_path,
    })
}

fn save_mask(path: &Path, side: usize, frame_width: usize, frame_height: usize) -> Result<()> {
    let mask = cfa::exr_cfa_mask(side, side, frame_width, frame_height);
    output::save_png(&rgb_from_matrix(&viz::cfa_colors(&mask)), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths() {
        let config = Config::new("/home/me", "141016_155913");
        assert_eq!(
            config.frame_path(0),
            PathBuf::from("/home/me/141016_155913_0.pgm")
        );
        assert_eq!(
            config.frame_path(1),
            PathBuf::from("/home/me/141016_155913_1.pgm")
        );
        assert_eq!(config.output_path(), PathBuf::from("/home/me/raw.tiff"));
    }
}
