//! Metadata extraction: title, byline, publish time and tags.
//!
//! Article pages keep each of these in a container with a fixed id. A
//! missing container simply contributes nothing.

use chrono::{DateTime, FixedOffset, Local};
use dom_query::{Document, NodeRef};

use crate::dom;
use crate::normalize::normalize;
use crate::patterns::PUBLISH_TIME;
use crate::piece::Piece;

/// Wrapper around the title, byline, tags and content.
pub const ARTICLE_SELECTOR: &str = "#img-content";
/// Article title.
pub const TITLE_SELECTOR: &str = "#activity-name";
/// Byline container.
pub const META_SELECTOR: &str = "#meta_content";
/// Tag list.
pub const TAGS_SELECTOR: &str = "#js_tags";
/// Account profile button inside the byline.
pub const PROFILE_ID: &str = "profileBt";
/// Account name inside the profile button.
pub const AUTHOR_SELECTOR: &str = "#js_name";

/// Format of the publish time appended to the metadata.
pub const PUBLISH_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Find `selector` inside the article wrapper when the page has one,
/// otherwise anywhere in the document.
#[must_use]
pub fn locate<'a>(doc: &'a Document, selector: &str) -> Option<NodeRef<'a>> {
    match dom::find_first(doc, ARTICLE_SELECTOR) {
        Some(article) => dom::find_in(&article, selector),
        None => dom::find_first(doc, selector),
    }
}

/// Level-1 heading holding the normalized title, empty when absent.
#[must_use]
pub fn extract_title(doc: &Document) -> Piece {
    let title = locate(doc, TITLE_SELECTOR)
        .map(|node| normalize(&dom::text_content(&node)))
        .unwrap_or_default();
    Piece::heading(1, title)
}

/// Byline entries in document order.
///
/// Each direct child of the byline container contributes its normalized
/// text, except hidden children. The profile button contributes only the
/// account name found inside it.
#[must_use]
pub fn extract_meta(doc: &Document) -> Vec<String> {
    let Some(container) = locate(doc, META_SELECTOR) else {
        return Vec::new();
    };

    dom::element_children(&container)
        .iter()
        .filter_map(|child| {
            if dom::attr(child, "id").as_deref() == Some(PROFILE_ID) {
                dom::find_in(child, AUTHOR_SELECTOR)
                    .map(|name| normalize(&dom::text_content(&name)))
            } else if dom::is_hidden(child) {
                None
            } else {
                Some(normalize(&dom::text_content(child)))
            }
        })
        .filter(|text| !text.is_empty())
        .collect()
}

/// Publish time from the `var ct = "<epoch>"` assignment in page scripts.
///
/// Formatted as `YYYY-MM-DD HH:MM` at `offset`, or in the local time zone
/// when no offset is given.
#[must_use]
pub fn extract_publish_time(doc: &Document, offset: Option<FixedOffset>) -> Option<String> {
    let scripts: String = doc
        .select("script")
        .nodes()
        .iter()
        .map(|script| script.text().to_string())
        .collect();

    let epoch: i64 = PUBLISH_TIME.captures(&scripts)?[1].parse().ok()?;
    let utc = DateTime::from_timestamp(epoch, 0)?;
    let formatted = match offset {
        Some(offset) => utc.with_timezone(&offset).format(PUBLISH_TIME_FORMAT),
        None => utc.with_timezone(&Local).format(PUBLISH_TIME_FORMAT),
    };
    Some(formatted.to_string())
}

/// Normalized tag text, empty when absent.
#[must_use]
pub fn extract_tags(doc: &Document) -> String {
    locate(doc, TAGS_SELECTOR)
        .map(|node| normalize(&dom::text_content(&node)))
        .unwrap_or_default()
}
