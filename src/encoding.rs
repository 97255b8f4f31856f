//! Character encoding detection for byte input.
//!
//! Article pages are served as UTF-8, but saved copies occasionally carry a
//! legacy charset (GBK, GB18030). The charset is read from the document's
//! meta tags and the bytes are decoded to UTF-8 before parsing.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Match `<meta charset="...">`.
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>;]+)"#).expect("valid regex")
});

/// Number of leading bytes scanned for a charset declaration.
const SNIFF_LEN: usize = 1024;

/// Detect the character encoding declared in the document head.
///
/// Covers both `<meta charset="...">` and the `http-equiv` form
/// (`content="text/html; charset=..."`). Falls back to UTF-8.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    let head = String::from_utf8_lossy(&html[..html.len().min(SNIFF_LEN)]);

    CHARSET_META_RE
        .captures(&head)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode document bytes to a UTF-8 string.
///
/// Invalid sequences are replaced with U+FFFD rather than failing, and a
/// leading byte order mark is honored over the declared charset.
///
/// # Examples
///
/// ```
/// use wechatmp2markdown::encoding::decode_html;
///
/// let html = b"<html><body>Hello</body></html>";
/// assert!(decode_html(html).contains("Hello"));
/// ```
#[must_use]
pub fn decode_html(html: &[u8]) -> String {
    let encoding = detect_encoding(html);
    let (decoded, _used, _had_errors) = encoding.decode(html);
    decoded.into_owned()
}
