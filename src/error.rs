//! Error types for evidence extraction and reconciliation

use thiserror::Error;

/// Errors that can occur at the engine boundary.
///
/// Extraction misses are never errors: every heuristic reports "not found"
/// through an absent optional field instead. The variants here cover the few
/// operations that can genuinely fail.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The external OCR collaborator handed us a payload we cannot decode
    #[error("Failed to decode OCR payload: {0}")]
    OcrPayload(String),

    /// A line-item mutation referenced an id that is not in the draft
    #[error("Unknown line item: {0}")]
    UnknownItem(u64),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ExtractError>;
