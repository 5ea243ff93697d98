use std::path::PathBuf;

use thiserror::Error;

use crate::ImageSource;

/// Why bytes could not be obtained for an image source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Response for {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: u64 },

    #[error("No bytes registered for {0}")]
    NotFound(String),

    #[error("Error reading {path}: {src}")]
    LocalFile { path: PathBuf, src: std::io::Error },
}

/// A single candidate could not be turned into pixels. Never fatal: the candidate is skipped.
#[derive(Error, Debug)]
pub enum ImageOpenError {
    #[error("Failed to fetch {image}: {error}")]
    Fetch {
        image: ImageSource,
        #[source]
        error: FetchError,
    },

    #[error("Unrecognized image format: {image}")]
    UnknownFormat { image: ImageSource },

    #[error("Failed to decode {image}: {reason}")]
    Decode { image: ImageSource, reason: String },
}

/// An image whose dimensions cannot be placed in any geometry bucket.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Degenerate image dimensions {width}x{height}")]
    Ambiguous { width: u32, height: u32 },
}

/// Malformed override rules. This is a configuration mistake, so it is reported to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Crop rule \"{0}\" is not of the form LABEL:l|r|c")]
    MalformedCropRule(String),

    #[error("Unknown crop side \"{side}\" in rule \"{rule}\"")]
    UnknownCropSide { rule: String, side: String },

    #[error("Empty label in rule \"{0}\"")]
    EmptyLabel(String),
}

/// A pre-processed poster could not be written to a temporary file.
#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("Error creating temporary poster in {dir}: {src}")]
    Io { dir: PathBuf, src: std::io::Error },

    #[error("Error encoding temporary poster: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Crop does not fit a {width}x{height} image")]
    BadCrop { width: u32, height: u32 },
}

/// Failure delivering one image. Logged, and only that image is omitted from the output.
#[derive(Error, Debug)]
pub enum FinalizeError {
    #[error("Error accessing {path}: {src}")]
    Io { path: PathBuf, src: std::io::Error },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Open(#[from] ImageOpenError),

    #[error("Error re-encoding {image}: {reason}")]
    Encode { image: ImageSource, reason: String },

    #[error("Upload of {file_name} failed: {reason}")]
    Upload { file_name: String, reason: String },

    #[error("Bad proxy base url {url}: {reason}")]
    ProxyUrl { url: String, reason: String },

    #[error("Bad path template \"{template}\": {reason}")]
    PathTemplate { template: String, reason: String },
}

/// Loading or saving a [`ReferenceCache`](crate::ReferenceCache) snapshot.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Error accessing reference cache file {path}: {src}")]
    Io { path: PathBuf, src: std::io::Error },

    #[error("Failed to serialize reference cache to {path}: {src}")]
    Serialization { path: PathBuf, src: String },

    #[error("Failed to deserialize reference cache from {path}: {src}")]
    Deserialization { path: PathBuf, src: String },
}
