//! crates/wordflow_core/src/error.rs
//!
//! Errors returned by the application services.

use crate::codec::CodecError;
use crate::extract::ExtractionError;
use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Only PDF files are allowed.")]
    UnsupportedFileType,

    /// The uploaded file could not be parsed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The file parsed but has no text layer (e.g. a scanned PDF).
    #[error("PDF appears to be empty or contains no readable text.")]
    EmptyDocument,

    /// Stored document data failed to decode.
    #[error("Data integrity error: {0}")]
    Codec(#[from] CodecError),

    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    #[error("Background worker failed: {0}")]
    Worker(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
