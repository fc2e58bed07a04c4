//! Orchestration of the extraction pipeline.

use crate::extract;
use crate::mime::decode_eml;
use crate::normalize::normalize;
use crate::types::{MimeEnvelope, ParsedEmailData};
use std::fmt::Write as _;
use tracing::debug;

/// Run the heuristic extractors over pasted email or receipt text.
///
/// Accepts plain text or raw HTML indiscriminately; markup is stripped before
/// extraction. Fields the heuristics cannot find stay `None`; this function
/// never fails.
#[must_use]
pub fn parse_email_text(text: &str) -> ParsedEmailData {
    let view = normalize(text);

    let vendor = extract::extract_vendor(&view);
    let date = extract::extract_date(&view);
    let (total, currency) = match extract::extract_total(&view) {
        Some((total, currency)) => (Some(total), Some(currency)),
        None => (None, None),
    };
    let order_number = extract::extract_order_number(&view);
    let payment_method = extract::extract_payment_method(&view);
    let items = extract::extract_items(&view);

    debug!(
        vendor = vendor.as_deref(),
        date = date.as_deref(),
        total,
        items = items.len(),
        "Extracted purchase evidence"
    );

    ParsedEmailData {
        vendor,
        date,
        total,
        currency,
        order_number,
        payment_method,
        items,
        raw_text: text.to_string(),
    }
}

/// A decoded EML file together with the heuristic extraction over its text.
#[derive(Debug, Clone)]
pub struct EmlExtraction {
    pub envelope: MimeEnvelope,
    pub parsed: ParsedEmailData,
}

/// Decode a raw `.eml` file and extract purchase data from it.
///
/// The extractors see the `From:`/`Subject:`/`Date:` headers followed by the
/// plain body (or the HTML body when no plain part exists), so header-based
/// patterns keep working. When the body text carries no date, the envelope's
/// `Date:` header supplies one.
#[must_use]
pub fn parse_eml_file(raw: &str) -> EmlExtraction {
    let envelope = decode_eml(raw);

    let mut text = String::new();
    if let Some(from) = &envelope.from {
        let _ = writeln!(text, "From: {from}");
    }
    if let Some(subject) = &envelope.subject {
        let _ = writeln!(text, "Subject: {subject}");
    }
    if let Some(date) = &envelope.date {
        let _ = writeln!(text, "Date: {date}");
    }
    text.push('\n');
    if envelope.body.is_empty() {
        if let Some(html) = &envelope.html {
            text.push_str(html);
        }
    } else {
        text.push_str(&envelope.body);
    }

    let mut parsed = parse_email_text(&text);
    if parsed.date.is_none() {
        parsed.date = envelope.date.as_deref().and_then(header_date_to_iso);
    }

    debug!(
        attachments = envelope.attachments.len(),
        has_html = envelope.html.is_some(),
        "Parsed EML file"
    );

    EmlExtraction { envelope, parsed }
}

/// Check whether an upload should be treated as a raw email message.
#[must_use]
pub fn is_eml_upload(filename: &str, content_type: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"))
        || content_type.eq_ignore_ascii_case("message/rfc822")
}

/// Normalize an RFC 2822 `Date:` header to ISO `YYYY-MM-DD` using the
/// header's own offset, independent of the process timezone.
fn header_date_to_iso(raw: &str) -> Option<String> {
    chrono::DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}
