//! Error type for roofpack.
//!
//! Most geometric edge cases (zero-length lines, samples outside the buffer,
//! footprints with no member pixels) are not errors at all: they are handled
//! by branching and simply produce empty results or rejections. What is left
//! here are the failures a caller can actually do something about.

use std::path::PathBuf;

/// Errors produced by the packing pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RoofError {
    /// Two buffers that must line up pixel for pixel have different sizes.
    #[error("buffer size mismatch: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },

    /// A panel layout or packer option that would make the sweep meaningless.
    #[error("invalid panel layout: {0}")]
    InvalidLayout(String),

    /// Decoding or encoding an image file failed.
    #[error("image error for {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Filesystem error outside of image codecs (creating directories etc).
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RoofError>;
