// SPDX-License-Identifier: MPL-2.0

//! Writing results to disk.

use image::{ImageBuffer, ImageFormat, ImageResult, Luma, Rgb};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Run `write` on `<path>.part` then rename the result to `path`.
///
/// A failed encode never leaves a truncated file at `path`.
pub fn save_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> ImageResult<()>,
{
    let part_path = part_path(path);
    let written = write(&part_path)
        .and_then(|_| std::fs::rename(&part_path, path).map_err(image::ImageError::IoError));
    if let Err(source) = written {
        // The encoder may have created the file before failing.
        let _ = std::fs::remove_file(&part_path);
        return Err(Error::Encode {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Save a 16-bit grayscale image as TIFF.
pub fn save_tiff(img: &ImageBuffer<Luma<u16>, Vec<u16>>, path: &Path) -> Result<()> {
    save_atomic(path, |part| img.save_with_format(part, ImageFormat::Tiff))?;
    log::info!(
        "Saved {} ({}x{}, 16-bit gray)",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(())
}

/// Save an RGB visualization as PNG.
pub fn save_png(img: &ImageBuffer<Rgb<u8>, Vec<u8>>, path: &Path) -> Result<()> {
    save_atomic(path, |part| img.save_with_format(part, ImageFormat::Png))?;
    log::info!("Saved {}", path.display());
    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
