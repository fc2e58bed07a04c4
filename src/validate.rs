//! Completeness scoring for extraction results.

use crate::types::{ParsedEmailData, ValidationResult};

/// Minimum confidence for a result to count as valid: vendor plus date or
/// vendor plus total alone is not quite enough, either pair plus one more
/// signal is.
const VALID_THRESHOLD: u8 = 55;

/// Score a [`ParsedEmailData`] for completeness and report which of the
/// load-bearing fields are missing.
#[must_use]
pub fn validate_parsed_email(data: &ParsedEmailData) -> ValidationResult {
    let mut confidence: u8 = 0;
    let mut missing_fields = Vec::new();

    if data.vendor.as_deref().is_some_and(|v| !v.is_empty()) {
        confidence += 30;
    } else {
        missing_fields.push("vendor".to_string());
    }

    if data.date.as_deref().is_some_and(|d| !d.is_empty()) {
        confidence += 25;
    } else {
        missing_fields.push("date".to_string());
    }

    if data.total.is_some_and(|t| t > 0.0) {
        confidence += 30;
    } else {
        missing_fields.push("total".to_string());
    }

    if data.order_number.is_some() {
        confidence += 10;
    }
    if !data.items.is_empty() {
        confidence += 5;
    }

    let confidence = confidence.min(100);
    ValidationResult {
        is_valid: confidence >= VALID_THRESHOLD,
        confidence,
        missing_fields,
    }
}

impl ValidationResult {
    /// The report handed to callers when the parsing pipeline itself failed:
    /// zero confidence and a single synthetic missing field, so orchestration
    /// code always has a result object to surface.
    #[must_use]
    pub fn parse_failure() -> Self {
        Self {
            is_valid: false,
            confidence: 0,
            missing_fields: vec!["parsing failed".to_string()],
        }
    }
}
