use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("input directory {path} cannot be listed: {source}")]
    InputNotFound { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to decode {path}: {source}")]
    Decode { path: PathBuf, #[source] source: image::ImageError },
    #[error("failed to write atlas {path}: {source}")]
    Encode { path: PathBuf, #[source] source: image::ImageError },
    #[error("failed to read config {path}: {source}")]
    ConfigIo { path: PathBuf, #[source] source: std::io::Error },
    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error("atlas of {width}x{height} px is too large to allocate")]
    CanvasTooLarge { width: u64, height: u64 },
    #[error("column count must be a positive integer")]
    ZeroColumns,
}

pub type Result<T> = std::result::Result<T, AtlasError>;
