//! # wechatmp2markdown
//!
//! Converts WeChat Official Account article pages into a typed document
//! model that can be rendered as Markdown.
//!
//! A page is turned into an [`Article`]: a title, byline entries, tags and
//! an ordered sequence of [`Piece`]s (text, headings, images, lists, code
//! blocks, tables, ...). Images are kept as URLs, downloaded as raw bytes or
//! embedded as base64 depending on the [`ImagePolicy`].
//!
//! ## Quick Start
//!
//! ```rust
//! use wechatmp2markdown::{parse_html, ImagePolicy, Options, PieceKind};
//!
//! let html = r#"<div id="img-content">
//!   <h1 id="activity-name">Hello</h1>
//!   <div id="js_content"><p>A<br>B</p></div>
//! </div>"#;
//!
//! let options = Options::with_image_policy(ImagePolicy::Url);
//! let article = parse_html(html, &options)?;
//! assert_eq!(article.title_text(), "Hello");
//! assert_eq!(article.content[1].kind(), PieceKind::LineBreak);
//!
//! let output = wechatmp2markdown::markdown::format_article(&article);
//! assert!(output.markdown.starts_with("# Hello"));
//! # Ok::<(), wechatmp2markdown::Error>(())
//! ```
//!
//! ## Failure model
//!
//! Only input that is not markup at all, an unreadable file, or a failed
//! page fetch are errors. A failed image download leaves that image without
//! a payload and the conversion carries on.

mod article;
mod error;
mod extract;
mod metadata;
mod options;
mod patterns;

/// DOM adapter over `dom_query`.
pub mod dom;

/// Character encoding detection and transcoding.
pub mod encoding;

/// HTTP retrieval of pages and images.
pub mod fetch;

/// Markdown rendering of articles.
pub mod markdown;

/// Whitespace normalization of extracted text.
pub mod normalize;

/// The piece document model.
pub mod piece;

/// Recursive conversion of DOM subtrees into pieces.
pub mod walker;

use std::path::Path;

use tracing::{debug, warn};

// Public API - re-exports
pub use article::Article;
pub use error::{Error, Result};
pub use options::{ImagePolicy, Options, DEFAULT_USER_AGENT};
pub use piece::{Piece, PieceKind, PieceValue, TableMode};

use fetch::{HttpFetcher, ImageSource};

/// Converts an article page held in memory.
///
/// Images are acquired over HTTP according to `options.image_policy`.
///
/// # Errors
///
/// Returns [`Error::ParseError`] when `html` is empty or whitespace only.
pub fn parse_html(html: &str, options: &Options) -> Result<Article> {
    let fetcher = HttpFetcher::new(options);
    extract::assemble(html, options, &fetcher)
}

/// Converts an article page, taking image bytes from `images`.
///
/// # Example
///
/// ```rust
/// use wechatmp2markdown::fetch::ImageSource;
/// use wechatmp2markdown::{parse_html_with_source, ImagePolicy, Options, PieceKind};
///
/// struct Fixed;
///
/// impl ImageSource for Fixed {
///     fn acquire(&self, _url: &str) -> Option<Vec<u8>> {
///         Some(b"png".to_vec())
///     }
/// }
///
/// let html = r#"<div id="js_content"><img data-src="https://example.com/a.png"></div>"#;
/// let options = Options::with_image_policy(ImagePolicy::Save);
/// let article = parse_html_with_source(html, &options, &Fixed)?;
/// assert_eq!(article.content[0].kind(), PieceKind::ImageBytes);
/// assert_eq!(article.content[0].bytes(), Some(&b"png"[..]));
/// # Ok::<(), wechatmp2markdown::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::ParseError`] when `html` is empty or whitespace only.
pub fn parse_html_with_source(
    html: &str,
    options: &Options,
    images: &dyn ImageSource,
) -> Result<Article> {
    extract::assemble(html, options, images)
}

/// Converts an article page from raw bytes.
///
/// The charset is taken from `<meta charset>` or the `http-equiv` form and
/// defaults to UTF-8. Invalid sequences become U+FFFD.
///
/// # Errors
///
/// Returns [`Error::ParseError`] when the decoded text is empty.
pub fn parse_bytes(html: &[u8], options: &Options) -> Result<Article> {
    parse_html(&encoding::decode_html(html), options)
}

/// Converts a saved article page.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read, and
/// [`Error::ParseError`] when it holds no markup.
pub fn parse_file(path: impl AsRef<Path>, options: &Options) -> Result<Article> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, options)
}

/// Downloads and converts the article at `url`.
///
/// When a proxy is configured and the page cannot be fetched through it,
/// the whole conversion is retried once without the proxy.
///
/// # Errors
///
/// Returns [`Error::Request`] or [`Error::HttpStatus`] when the page cannot
/// be fetched, and [`Error::ParseError`] when the body is empty.
pub fn fetch_article(url: &str, options: &Options) -> Result<Article> {
    match fetch_with(url, options) {
        Err(e) if e.is_network() && options.proxy_url().is_some() => {
            warn!(url, error = %e, "fetch through proxy failed, retrying without proxy");
            fetch_with(url, &options.without_proxy())
        }
        result => result,
    }
}

fn fetch_with(url: &str, options: &Options) -> Result<Article> {
    let fetcher = HttpFetcher::new(options);
    let body = fetcher.fetch(url)?;
    debug!(url, bytes = body.len(), "page fetched");
    extract::assemble(&encoding::decode_html(&body), options, &fetcher)
}

/// Downloads and converts the article at `url`, degrading to an empty
/// article on any failure.
///
/// The failure is logged. Use [`fetch_article`] to tell a failed fetch
/// apart from a page without content, or check [`Article::is_empty`].
#[must_use]
pub fn parse_url(url: &str, options: &Options) -> Article {
    fetch_article(url, options).unwrap_or_else(|e| {
        warn!(url, error = %e, "cannot convert article");
        Article::default()
    })
}
