//! Header and body codecs: RFC 2047 encoded words and the two
//! content-transfer-encodings that matter for real receipts.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::warn;

/// Decode RFC 2047 encoded words embedded in a header value.
///
/// `=?charset?B?...?=` decodes as base64, `=?charset?Q?...?=` as
/// quoted-printable with `_` treated as space. A word that fails to decode is
/// kept as its raw text; this function never fails.
///
/// Whitespace between two adjacent encoded words is dropped (RFC 2047 §6.2).
#[must_use]
pub fn decode_encoded_words(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut remaining = input;
    let mut last_was_encoded = false;

    while let Some(start) = remaining.find("=?") {
        let before = &remaining[..start];
        if !last_was_encoded || !before.trim().is_empty() {
            result.push_str(before);
        }

        let after_start = &remaining[start + 2..];
        if let Some(word) = decode_one_word(after_start) {
            result.push_str(&word.text);
            remaining = &remaining[start + 2 + word.consumed..];
            last_was_encoded = true;
        } else {
            result.push_str("=?");
            remaining = after_start;
            last_was_encoded = false;
        }
    }

    result.push_str(remaining);
    result
}

struct DecodedWord {
    text: String,
    // bytes consumed after the leading "=?"
    consumed: usize,
}

fn decode_one_word(s: &str) -> Option<DecodedWord> {
    // charset?encoding?encoded_text?=
    let first_q = s.find('?')?;
    let charset = &s[..first_q];

    let rest = &s[first_q + 1..];
    let second_q = rest.find('?')?;
    let encoding = &rest[..second_q];

    let payload = &rest[second_q + 1..];
    let end = payload.find("?=")?;
    let encoded_text = &payload[..end];

    let bytes = match encoding {
        "B" | "b" => decode_base64(encoded_text)?,
        "Q" | "q" => decode_q(encoded_text),
        _ => return None,
    };

    Some(DecodedWord {
        text: decode_charset(charset, &bytes),
        consumed: first_q + 1 + second_q + 1 + end + 2,
    })
}

/// Decode base64 text after stripping embedded whitespace and line breaks.
fn decode_base64(input: &str) -> Option<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact.as_bytes()).ok()
}

/// Q-encoding: underscores become spaces, `=XX` becomes the escaped byte.
fn decode_q(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                out.push(b' ');
                i += 1;
            }
            b'=' if i + 2 < bytes.len() && is_hex_pair(&bytes[i + 1..i + 3]) => {
                out.push(hex_byte(&bytes[i + 1..i + 3]));
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

/// Decode bytes using a named charset, UTF-8 first.
fn decode_charset(charset: &str, bytes: &[u8]) -> String {
    if charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8") {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
        let (decoded, _, _) = encoding.decode(bytes);
        decoded.into_owned()
    } else {
        warn!(charset, "Unknown charset, falling back to UTF-8 lossy");
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Decode a body or attachment per its `Content-Transfer-Encoding`.
///
/// `base64` strips embedded whitespace before decoding and falls back to the
/// raw bytes when the data is not valid base64; `quoted-printable` collapses
/// soft line breaks and replaces `=XX` escapes. Any other or absent encoding
/// passes through unchanged.
#[must_use]
pub fn decode_transfer(content: &str, encoding: Option<&str>) -> Vec<u8> {
    match encoding.map(str::trim) {
        Some(e) if e.eq_ignore_ascii_case("base64") => decode_base64(content).unwrap_or_else(|| {
            warn!("Invalid base64 body, keeping raw text");
            content.as_bytes().to_vec()
        }),
        Some(e) if e.eq_ignore_ascii_case("quoted-printable") => decode_quoted_printable(content),
        _ => content.as_bytes().to_vec(),
    }
}

/// Decode a quoted-printable body: soft line breaks (`=` at end of line) are
/// collapsed, then `=XX` hex escapes are replaced. Malformed escapes are kept
/// literally.
#[must_use]
pub fn decode_quoted_printable(input: &str) -> Vec<u8> {
    let unfolded = input.replace("=\r\n", "").replace("=\n", "");
    let bytes = unfolded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'=' && i + 2 < bytes.len() && is_hex_pair(&bytes[i + 1..i + 3]) {
            out.push(hex_byte(&bytes[i + 1..i + 3]));
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

fn is_hex_pair(pair: &[u8]) -> bool {
    pair.len() == 2 && pair.iter().all(u8::is_ascii_hexdigit)
}

fn hex_byte(pair: &[u8]) -> u8 {
    let hi = char::from(pair[0]).to_digit(16).unwrap_or(0);
    let lo = char::from(pair[1]).to_digit(16).unwrap_or(0);
    u8::try_from(hi * 16 + lo).unwrap_or(0)
}
