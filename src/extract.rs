//! Document assembly.
//!
//! Parses the page, pulls the title, byline, publish time and tags out of
//! their containers, and walks the content container into pieces.

use tracing::debug;

use crate::article::Article;
use crate::dom::{self, Document};
use crate::error::{Error, Result};
use crate::fetch::ImageSource;
use crate::metadata;
use crate::options::Options;
use crate::walker::Walker;

/// Main content container.
pub const CONTENT_SELECTOR: &str = "#js_content";

/// Parse `html` and assemble the article.
///
/// Input without any markup at all (empty or whitespace only) cannot be
/// converted and is an error; anything else is parsed leniently.
pub(crate) fn assemble(html: &str, options: &Options, images: &dyn ImageSource) -> Result<Article> {
    if html.trim().is_empty() {
        return Err(Error::ParseError("document is empty".to_string()));
    }

    debug!(length = html.len(), policy = %options.image_policy, "assembling article");
    let document = dom::parse(html);
    Ok(assemble_document(&document, options, images))
}

/// Assemble the article from an already parsed page.
pub(crate) fn assemble_document(
    document: &Document,
    options: &Options,
    images: &dyn ImageSource,
) -> Article {
    let title = metadata::extract_title(document);

    let mut meta = metadata::extract_meta(document);
    if let Some(published) = metadata::extract_publish_time(document, options.publish_time_offset) {
        meta.push(published);
    }

    let tags = metadata::extract_tags(document);

    let content = match metadata::locate(document, CONTENT_SELECTOR) {
        Some(container) => Walker::new(options.image_policy, images).walk(&container, None),
        None => {
            debug!("no content container");
            Vec::new()
        }
    };

    Article {
        title,
        meta,
        tags,
        content,
    }
}
