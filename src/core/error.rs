use thiserror::Error;

/// Failures surfaced by probing, conversion and extraction jobs.
///
/// `Display` output is what the user ends up seeing in the error dialog, so
/// tool diagnostics are passed through verbatim.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Could not open video file: {0}")]
    SourceUnavailable(String),

    #[error("{tool} failed: {diagnostics}")]
    ToolFailed { tool: String, diagnostics: String },

    #[error("Could not read video information: {0}")]
    Probe(String),

    #[error("Source resolution is unknown, select a video file first")]
    NoSourceDimensions,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid ffprobe output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not write image: {0}")]
    Image(#[from] image::ImageError),
}

pub type ToolResult<T> = Result<T, ToolError>;
