//! Image nodes: source resolution, CDN format rewrite and policy dispatch.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dom_query::NodeRef;
use tracing::debug;
use url::Url;

use crate::dom;
use crate::fetch::ImageSource;
use crate::options::ImagePolicy;
use crate::patterns::WX_FMT_PARAM;
use crate::piece::{Piece, ATTR_ALT, ATTR_SRC, ATTR_TITLE};

/// Host of the platform image CDN.
pub const IMAGE_CDN_HOST: &str = "mmbiz.qpic.cn";

/// Format requested from the CDN instead of the compressed/watermarked one.
pub const ORIGINAL_FORMAT: &str = "jpeg";

/// Image URL of an `<img>`: the lazy-load `data-src` wins over `src`.
#[must_use]
pub fn resolve_src(node: &NodeRef) -> String {
    dom::attr(node, "data-src")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| dom::attr(node, "src"))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn is_cdn_url(src: &str) -> bool {
    let absolute = if src.starts_with("//") {
        format!("https:{src}")
    } else {
        src.to_string()
    };
    match Url::parse(&absolute) {
        Ok(url) => url
            .host_str()
            .is_some_and(|host| host == IMAGE_CDN_HOST || host.ends_with(&format!(".{IMAGE_CDN_HOST}"))),
        Err(_) => src.contains(IMAGE_CDN_HOST),
    }
}

/// Ask the CDN for the original format.
///
/// Only CDN URLs carrying a `wx_fmt` parameter are touched; the parameter
/// value is replaced in place and every other parameter is kept.
///
/// ```
/// use wechatmp2markdown::walker::images::original_format_url;
///
/// assert_eq!(
///     original_format_url("https://mmbiz.qpic.cn/x?wx_fmt=webp"),
///     "https://mmbiz.qpic.cn/x?wx_fmt=jpeg"
/// );
/// assert_eq!(
///     original_format_url("https://example.com/x?wx_fmt=webp"),
///     "https://example.com/x?wx_fmt=webp"
/// );
/// ```
#[must_use]
pub fn original_format_url(src: &str) -> String {
    if !is_cdn_url(src) || !WX_FMT_PARAM.is_match(src) {
        return src.to_string();
    }
    WX_FMT_PARAM
        .replace(src, format!("${{1}}wx_fmt={ORIGINAL_FORMAT}"))
        .into_owned()
}

/// Image format named by the URL's `wx_fmt` parameter, if any.
#[must_use]
pub fn declared_format(src: &str) -> Option<String> {
    WX_FMT_PARAM
        .captures(src)
        .map(|c| c[2].to_ascii_lowercase())
        .filter(|f| !f.is_empty())
}

/// src / alt / title attributes of the image piece.
fn image_attributes(node: &NodeRef) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    attributes.insert(ATTR_SRC.to_string(), original_format_url(&resolve_src(node)));
    for name in [ATTR_ALT, ATTR_TITLE] {
        if let Some(value) = dom::attr(node, name) {
            attributes.insert(name.to_string(), value);
        }
    }
    attributes
}

/// Turn an `<img>` into an image piece according to the policy.
///
/// Only the save and base64 policies call `images`; a failed download yields
/// a piece whose payload is absent.
pub fn image_piece(node: &NodeRef, policy: ImagePolicy, images: &dyn ImageSource) -> Piece {
    let attributes = image_attributes(node);
    if !policy.fetches() {
        return Piece::image(attributes);
    }

    let src = attributes.get(ATTR_SRC).cloned().unwrap_or_default();
    debug!(src = %src, policy = %policy, "downloading image");
    let payload = acquire(images, &src);
    match policy {
        ImagePolicy::Base64 => {
            Piece::image_base64(attributes, payload.map(|bytes| STANDARD.encode(bytes)))
        }
        _ => Piece::image_bytes(attributes, payload),
    }
}

fn acquire(images: &dyn ImageSource, src: &str) -> Option<Vec<u8>> {
    if src.is_empty() {
        return None;
    }
    images.acquire(src)
}
