// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Purchase Evidence Extraction
//!
//! Turns unstructured evidence of a purchase (OCR output, a pasted
//! confirmation email, or a raw `.eml` file) into a single structured
//! transaction record suitable for tax bookkeeping.
//!
//! # Features
//!
//! - MIME/EML decoding: headers, multipart bodies, attachments
//! - Heuristic field extraction: vendor, date, total + currency, order
//!   number, payment method, line items
//! - Confidence scoring with missing-field reporting
//! - Reconciliation of OCR output, email output, and user edits that never
//!   overwrites a field the user already set
//!
//! Extraction is best-effort by design: a field the heuristics cannot find
//! stays absent and is reported through the validator, never as an error.
//!
//! # Example
//!
//! ```rust
//! use receipt_extract::{parse_email_text, validate_parsed_email};
//!
//! let parsed = parse_email_text(
//!     "Thank you for your purchase at Amazon\n\
//!      Order Date: 01/06/2026\n\
//!      Order Total: $49.99",
//! );
//!
//! assert_eq!(parsed.vendor.as_deref(), Some("Amazon"));
//! assert_eq!(parsed.date.as_deref(), Some("2026-01-06"));
//! assert_eq!(parsed.total, Some(49.99));
//!
//! let report = validate_parsed_email(&parsed);
//! assert!(report.is_valid);
//! ```

mod codec;
mod error;
mod extract;
mod mime;
mod normalize;
mod parser;
mod reconcile;
mod types;
mod validate;

pub use codec::{decode_encoded_words, decode_quoted_printable, decode_transfer};
pub use error::{ExtractError, Result};
pub use extract::normalize_date;
pub use mime::decode_eml;
pub use normalize::{NormalizedText, normalize};
pub use parser::{EmlExtraction, is_eml_upload, parse_email_text, parse_eml_file};
pub use reconcile::{LineItem, TransactionDraft};
pub use types::*;
pub use validate::validate_parsed_email;
