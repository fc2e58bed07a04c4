//! Core types for extracted purchase evidence

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The heuristic extraction result for one piece of purchase evidence.
///
/// Every field except `raw_text` is optional: absence means "not found",
/// never a guessed default. An empty `items` list likewise means no line
/// items were recognized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedEmailData {
    /// Merchant name (canonical brand name when a known vendor matched)
    pub vendor: Option<String>,

    /// Transaction date, normalized to ISO `YYYY-MM-DD`
    pub date: Option<String>,

    /// Grand total of the purchase
    pub total: Option<f64>,

    /// ISO 4217-like currency code attached to the total
    pub currency: Option<String>,

    /// Order / confirmation / invoice number
    pub order_number: Option<String>,

    /// Canonical payment method
    pub payment_method: Option<PaymentMethod>,

    /// Candidate line-item names, deduplicated, capped at 20
    pub items: Vec<String>,

    /// The text the heuristics ran over, as supplied by the caller
    pub raw_text: String,
}

impl ParsedEmailData {
    /// Check whether any field was extracted at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vendor.is_none()
            && self.date.is_none()
            && self.total.is_none()
            && self.order_number.is_none()
            && self.payment_method.is_none()
            && self.items.is_empty()
    }
}

/// Canonical payment methods recognized by the heuristics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Credit,
    Debit,
    Cash,
    Check,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Cash => "cash",
            Self::Check => "check",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decoded EML message. Built once per file; immutable after construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MimeEnvelope {
    /// `From:` header with encoded words decoded
    pub from: Option<String>,

    /// `To:` header, raw
    pub to: Option<String>,

    /// `Subject:` header with encoded words decoded
    pub subject: Option<String>,

    /// `Date:` header, raw
    pub date: Option<String>,

    /// Plain-text body (first `text/plain` part of a multipart message)
    pub body: String,

    /// HTML body, if any part carried one
    pub html: Option<String>,

    /// Decoded attachments
    pub attachments: Vec<Attachment>,
}

impl MimeEnvelope {
    /// Attachments with an `image/*` content type
    pub fn image_attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments
            .iter()
            .filter(|a| a.content_type.starts_with("image/"))
    }

    /// Attachments with an `application/pdf` content type
    pub fn pdf_attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments
            .iter()
            .filter(|a| a.content_type == "application/pdf")
    }
}

/// A decoded attachment: content is raw bytes, not transfer-encoded text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    /// Materialize a standalone file object for handoff to the external
    /// upload/OCR pipeline. Ownership of the byte buffer transfers to the
    /// returned file.
    #[must_use]
    pub fn into_file(self) -> AttachmentFile {
        AttachmentFile {
            name: self.filename,
            media_type: self.content_type,
            bytes: self.content,
        }
    }
}

/// A standalone file object produced from a decoded attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Completeness/confidence report for a [`ParsedEmailData`]. Derived, not
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,

    /// Heuristic completeness measure, 0..=100. Not a probability.
    pub confidence: u8,

    /// Fields that failed their check, in the order vendor, date, total
    pub missing_fields: Vec<String>,
}

/// Best-effort structured guess supplied by the external OCR collaborator.
///
/// The engine consumes this shape but never produces it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OcrResult {
    pub date: Option<String>,
    pub vendor: Option<String>,
    pub amount: Option<f64>,
    pub subtotal: Option<f64>,
    pub tax: Option<f64>,
    pub tip: Option<f64>,
    pub currency: Option<String>,
    pub items: Vec<OcrItem>,
    pub category: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

impl OcrResult {
    /// Deserialize the collaborator's JSON payload.
    pub fn from_json(payload: &str) -> crate::error::Result<Self> {
        serde_json::from_str(payload).map_err(|e| ExtractError::OcrPayload(e.to_string()))
    }
}

/// OCR line items arrive either as bare names or as structured entries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OcrItem {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        qty: Option<f64>,
        #[serde(default, rename = "unitPrice")]
        unit_price: Option<f64>,
        #[serde(default)]
        amount: Option<f64>,
    },
}

impl OcrItem {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(n) | Self::Detailed { name: n, .. } => n,
        }
    }
}
