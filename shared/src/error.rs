//! Error types for the document chat Lambda functions.

use std::fmt;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the document chat Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Chat model invocation error
    #[error("Model error: {0}")]
    Model(String),

    /// Vector store error
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Prompt template error
    #[error("Template error: {0}")]
    Template(String),

    /// Hosted upload service error
    #[error("Upload error: {0}")]
    Upload(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Outbound HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            Error::Upload(_) | Error::Http(_) => 502,
            _ => 500,
        }
    }
}

/// The only error a caller of the message pipeline ever sees.
///
/// The failing step is not exposed; the underlying [`StepError`] goes to the
/// log instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Failed to process your message")]
pub struct ProcessMessageError;

/// Pipeline stages that can fail, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    Reformulate,
    Retrieve,
    Answer,
}

impl PipelineStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::Reformulate => "reformulate",
            PipelineStep::Retrieve => "retrieve",
            PipelineStep::Answer => "answer",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure of a single pipeline step, for the log sink only.
#[derive(Error, Debug)]
#[error("{step} step failed: {source}")]
pub struct StepError {
    pub step: PipelineStep,
    #[source]
    pub source: Error,
}

impl StepError {
    pub fn new(step: PipelineStep, source: Error) -> Self {
        Self { step, source }
    }
}
