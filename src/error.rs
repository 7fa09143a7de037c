//! error types for the optimizer and its persistence adapter

use std::path::PathBuf;

use thiserror::Error;

use crate::geom::Rect;

/// result type alias for fallible operations in this crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// source or resume file could not be read
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// bytes were read but are not a decodable image
    #[error("could not decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// decoded fine, but not one of png/jpeg/gif
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// two images that must share bounds do not
    #[error("the images differ in size: {a:?}, {b:?}")]
    SizeMismatch { a: Rect, b: Rect },

    /// pixel buffer length does not match width * height * 4
    #[error("pixel buffer of {len} bytes does not fit a {width}x{height} rgba image")]
    BufferSize { width: u32, height: u32, len: usize },

    /// target has no pixels to sample colors from
    #[error("image has no pixels")]
    EmptyImage,

    #[error("could not encode output image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// settings out of range
    #[error("invalid configuration: {0}")]
    Config(String),
}
