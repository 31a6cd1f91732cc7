//! Image file I/O.
//!
//! - `load_rgb`: read a PNG/JPEG/etc. into an 8-bit RGB buffer.
//! - `save_rgb` / `save_gray`: write a buffer, creating the parent directory.

use std::fs;
use std::path::Path;

use image::{GrayImage, RgbImage};

use crate::error::{Result, RoofError};

/// Load an image from disk and convert it to 8-bit RGB.
///
/// Alpha is dropped and grayscale inputs are expanded, so everything
/// downstream can assume three channels.
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|source| RoofError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img.into_rgb8())
}

/// Save an RGB buffer; the format follows the file extension.
pub fn save_rgb(path: &Path, image: &RgbImage) -> Result<()> {
    ensure_parent_dir(path)?;
    image.save(path).map_err(|source| RoofError::Image {
        path: path.to_path_buf(),
        source,
    })
}

/// Save a grayscale buffer; the format follows the file extension.
pub fn save_gray(path: &Path, image: &GrayImage) -> Result<()> {
    ensure_parent_dir(path)?;
    image.save(path).map_err(|source| RoofError::Image {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| RoofError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}
