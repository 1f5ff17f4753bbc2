//! Error types for voxel parsing and mesh generation

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed container: bad magic, truncated stream, impossible sizes.
    /// Parsing aborts for the whole asset.
    #[error("vox format error: {0}")]
    Format(String),

    /// A request referenced state that does not exist (unset asset, frame
    /// index out of range, unknown palette). Only that request fails.
    #[error("missing context: {0}")]
    MissingContext(String),

    /// A mesher failed; caught at the request boundary so one bad frame
    /// cannot take down the rest of the asset.
    #[error("mesh generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
