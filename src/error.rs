use thiserror::Error;

use crate::video::AssemblyError;
use crate::wifi::ManifestError;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Pipeline assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("WiFi manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
