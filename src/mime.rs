//! MIME/EML decoding: header block, multipart bodies, attachments.
//!
//! Structural anomalies never surface as errors. A message whose boundary is
//! missing or broken decodes as a plain-text envelope with the whole body
//! kept verbatim.

use crate::codec::{decode_encoded_words, decode_transfer};
use crate::types::{Attachment, MimeEnvelope};
use tracing::debug;

/// Guard against pathological nested boundaries.
const MAX_MULTIPART_DEPTH: usize = 10;

type HeaderList = Vec<(String, String)>;

/// Decode a raw EML text stream into a [`MimeEnvelope`].
#[must_use]
pub fn decode_eml(raw: &str) -> MimeEnvelope {
    let (header_block, body) = split_header_body(raw);
    let headers = unfold_headers(header_block);

    let mut envelope = MimeEnvelope {
        from: get_header(&headers, "from").map(|v| decode_encoded_words(&v)),
        to: get_header(&headers, "to"),
        subject: get_header(&headers, "subject").map(|v| decode_encoded_words(&v)),
        date: get_header(&headers, "date"),
        ..MimeEnvelope::default()
    };

    let boundary = get_header(&headers, "content-type")
        .as_deref()
        .and_then(extract_boundary);

    if let Some(boundary) = boundary {
        let mut parts = Vec::new();
        collect_parts(body, &boundary, 0, &mut parts);
        if parts.is_empty() {
            // Broken boundary: keep the whole body as plain text.
            envelope.body = body.to_string();
        } else {
            debug!(parts = parts.len(), "Decoded multipart message");
            for part in parts {
                classify_part(&part, &mut envelope);
            }
        }
    } else {
        let text = decode_part_text(body, &headers);
        if content_mimetype(&headers).is_some_and(|t| t == "text/html") {
            envelope.html = Some(text);
        } else {
            envelope.body = text;
        }
    }

    envelope
}

/// One flattened leaf of a (possibly nested) multipart body.
struct MimePart {
    headers: HeaderList,
    body: String,
}

/// Split the header block from the body at the first blank line, honoring
/// whichever of CRLF/LF occurs first. Without a separator the whole content
/// is the body.
fn split_header_body(raw: &str) -> (&str, &str) {
    let crlf = raw.find("\r\n\r\n");
    let lf = raw.find("\n\n");
    match (crlf, lf) {
        (Some(c), Some(l)) if c < l => (&raw[..c], &raw[c + 4..]),
        (_, Some(l)) => (&raw[..l], &raw[l + 2..]),
        (Some(c), None) => (&raw[..c], &raw[c + 4..]),
        (None, None) => ("", raw),
    }
}

/// Unfold continuation lines and return `(lowercase_name, value)` pairs.
fn unfold_headers(block: &str) -> HeaderList {
    let mut headers: HeaderList = Vec::new();
    for line in block.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = headers.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
    }
    headers
}

fn get_header(headers: &HeaderList, name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}

/// The mimetype portion of a `Content-Type` header, lowercased.
fn content_mimetype(headers: &HeaderList) -> Option<String> {
    get_header(headers, "content-type")
        .and_then(|v| v.split(';').next().map(|t| t.trim().to_lowercase()))
}

/// Extract the `boundary` parameter from a `Content-Type` value.
fn extract_boundary(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    let idx = lower.find("boundary=")?;
    let rest = &content_type[idx + "boundary=".len()..];

    let boundary = if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        &quoted[..end]
    } else {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == ';')
            .unwrap_or(rest.len());
        &rest[..end]
    };

    (!boundary.is_empty()).then(|| boundary.to_string())
}

/// Split a multipart body on its boundary and append every leaf part to
/// `out`, recursing into nested multiparts so arbitrary nesting flattens to
/// one list.
fn collect_parts(body: &str, boundary: &str, depth: usize, out: &mut Vec<MimePart>) {
    let delimiter = format!("--{boundary}");

    for segment in body.split(&delimiter).skip(1) {
        let segment = segment.trim_start_matches([' ', '\t']);
        let segment = segment
            .strip_prefix("\r\n")
            .or_else(|| segment.strip_prefix('\n'))
            .unwrap_or(segment);

        // The closing sentinel leaves a segment starting with "--".
        if segment.starts_with("--") {
            break;
        }

        let (part_headers, part_body) = split_header_body(segment);
        let headers = unfold_headers(part_headers);
        let part_body = part_body
            .strip_suffix("\r\n")
            .or_else(|| part_body.strip_suffix('\n'))
            .unwrap_or(part_body);

        let nested = content_mimetype(&headers)
            .filter(|t| t.starts_with("multipart/"))
            .and_then(|_| get_header(&headers, "content-type").as_deref().and_then(extract_boundary));

        match nested {
            Some(inner) if depth + 1 < MAX_MULTIPART_DEPTH => {
                collect_parts(part_body, &inner, depth + 1, out);
            }
            _ => out.push(MimePart {
                headers,
                body: part_body.to_string(),
            }),
        }
    }
}

/// Route one flat part into the envelope: attachments by disposition, then
/// HTML, then the first plain-text body. Later `multipart/alternative`
/// duplicates of an already-filled slot are dropped.
fn classify_part(part: &MimePart, envelope: &mut MimeEnvelope) {
    let disposition = get_header(&part.headers, "content-disposition").unwrap_or_default();

    if disposition.to_lowercase().contains("attachment") {
        let filename = extract_filename(&disposition)
            .map(|f| decode_encoded_words(&f))
            .unwrap_or_else(|| format!("attachment-{}", envelope.attachments.len() + 1));
        envelope.attachments.push(Attachment {
            filename,
            content_type: content_mimetype(&part.headers)
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            content: decode_part_bytes(&part.body, &part.headers),
        });
        return;
    }

    match content_mimetype(&part.headers).as_deref() {
        Some("text/html") => {
            if envelope.html.is_none() {
                envelope.html = Some(decode_part_text(&part.body, &part.headers));
            }
        }
        Some("text/plain") | None => {
            if envelope.body.is_empty() {
                envelope.body = decode_part_text(&part.body, &part.headers);
            }
        }
        Some(other) => debug!(content_type = other, "Dropping unclassified part"),
    }
}

/// Extract the `filename` parameter from a `Content-Disposition` value.
fn extract_filename(disposition: &str) -> Option<String> {
    let lower = disposition.to_lowercase();
    let idx = lower.find("filename=")?;
    let rest = &disposition[idx + "filename=".len()..];

    let name = if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        &quoted[..end]
    } else {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == ';')
            .unwrap_or(rest.len());
        &rest[..end]
    };

    (!name.is_empty()).then(|| name.to_string())
}

fn decode_part_bytes(body: &str, headers: &HeaderList) -> Vec<u8> {
    let encoding = get_header(headers, "content-transfer-encoding");
    decode_transfer(body, encoding.as_deref())
}

/// Decode a text part as UTF-8 bytes (not Latin-1) so non-ASCII vendor names
/// survive base64 transport.
fn decode_part_text(body: &str, headers: &HeaderList) -> String {
    String::from_utf8_lossy(&decode_part_bytes(body, headers)).into_owned()
}
