use std::path::PathBuf;
use thiserror::Error;

/// The main error type for circlegen operations.
#[derive(Debug, Error)]
pub enum CirclegenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialized example could not be decoded. Fatal for that record only.
    #[error("Malformed feature: {reason}")]
    MalformedFeature { reason: String },

    /// A container failed an integrity check. Nothing after `offset` can be trusted.
    #[error("Corrupt container at byte offset {offset}: {reason}")]
    CorruptContainer { offset: u64, reason: String },

    #[error("Failed to parse VOC XML from {path}: {message}")]
    VocXmlParse { path: PathBuf, message: String },

    #[error("Failed to parse label map from {path}: {message}")]
    LabelMapParse { path: PathBuf, message: String },

    #[error("Failed to parse manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    #[error("Image codec error: {message}")]
    ImageCodec { message: String },

    #[error("Invalid generation parameters: {message}")]
    InvalidGenerateParams { message: String },

    #[error("Invalid split ratio {ratio} (must be within [0.0, 1.0])")]
    InvalidSplitRatio { ratio: f64 },

    #[error("Example is missing required feature '{key}'")]
    ExampleMissingFeature { key: String },

    #[error("Example shape mismatch: {message}")]
    ExampleShapeMismatch { message: String },

    #[error("Failed to serialize report: {source}")]
    ReportSerialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl CirclegenError {
    /// Returns true if the error invalidates the rest of a container stream.
    pub fn is_stream_fatal(&self) -> bool {
        matches!(
            self,
            CirclegenError::CorruptContainer { .. } | CirclegenError::Io(_)
        )
    }
}
