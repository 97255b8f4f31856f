//! Compiled regex patterns used during conversion.
//!
//! All patterns are compiled once at first use via `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Text Cleaning Patterns
// =============================================================================

/// Runs of two or more whitespace characters.
pub static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("WHITESPACE_RUN regex"));

/// Three or more consecutive newlines (possibly with blank padding between).
pub static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("EXCESS_NEWLINES regex"));

// =============================================================================
// Page Structure Patterns
// =============================================================================

/// Publish time assignment embedded in the page scripts: `var ct = "1700000000"`.
pub static PUBLISH_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"var\s+ct\s*=\s*"([0-9]+)""#).expect("PUBLISH_TIME regex")
});

/// Inline style hiding an element.
pub static HIDDEN_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)display\s*:\s*none").expect("HIDDEN_STYLE regex")
});

// =============================================================================
// Image Patterns
// =============================================================================

/// The `wx_fmt` query parameter of image CDN URLs.
pub static WX_FMT_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([?&])wx_fmt=([^&#]*)").expect("WX_FMT_PARAM regex")
});
