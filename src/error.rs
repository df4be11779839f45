//! Error types for yolo2page library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for yolo2page operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting label files.
///
/// Only conditions that abort a whole document are represented here.
/// Malformed label lines, unmapped classes and invalid polygons are
/// reported through [`crate::parser::LayoutObserver`] instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The label file does not exist.
    #[error("Label file not found: {}", .0.display())]
    LabelNotFound(PathBuf),

    /// The image file does not exist.
    #[error("Image file not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    /// The image exists but its header could not be decoded.
    #[error("Failed to read image {}: {message}", path.display())]
    ImageRead {
        /// Path of the unreadable image
        path: PathBuf,
        /// Decoder message
        message: String,
    },

    /// The image reported a zero dimension.
    #[error("Invalid image size {width}x{height}")]
    InvalidImageSize {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },

    /// The class mapping could not be loaded or failed validation.
    #[error("Invalid class mapping: {0}")]
    Mapping(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error while writing the output markup.
    #[error("Rendering error: {0}")]
    Render(String),

    /// A directory was expected.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Converting a document panicked; the payload message is kept.
    #[error("Conversion aborted: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::LabelNotFound(PathBuf::from("labels/page1.txt"));
        assert_eq!(err.to_string(), "Label file not found: labels/page1.txt");

        let err = Error::InvalidImageSize {
            width: 0,
            height: 10,
        };
        assert_eq!(err.to_string(), "Invalid image size 0x10");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
