use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlicerError {
    #[error("Failed to load image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to decode image data: {0}")]
    ImageDecode(#[source] image::ImageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No valid images found in input")]
    NoImages,

    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Input path does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("'{first}' and '{second}' would both be written to '{path}'")]
    DuplicateOutput {
        path: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
}
