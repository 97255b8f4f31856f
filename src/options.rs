//! Configuration options for article conversion.
//!
//! `Options` is built once per conversion and passed down unchanged: the
//! image policy drives the Tree Walker, the network fields configure the
//! HTTP client used for the document and its images.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;

/// Browser user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36 Edg/133.0.0.0";

/// How images discovered in the article are represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ImagePolicy {
    /// Keep the image URL only. No request is made.
    Url,
    /// Download the image and attach the raw bytes.
    Save,
    /// Download the image and attach it as base64 text.
    #[default]
    Base64,
}

impl ImagePolicy {
    /// Map a command-line / query token onto a policy.
    ///
    /// `"url"` and `"save"` select their policies; any other token,
    /// including an empty one, falls back to [`ImagePolicy::Base64`].
    ///
    /// ```
    /// use wechatmp2markdown::ImagePolicy;
    ///
    /// assert_eq!(ImagePolicy::from_arg("url"), ImagePolicy::Url);
    /// assert_eq!(ImagePolicy::from_arg("save"), ImagePolicy::Save);
    /// assert_eq!(ImagePolicy::from_arg("whatever"), ImagePolicy::Base64);
    /// ```
    #[must_use]
    pub fn from_arg(value: &str) -> Self {
        match value {
            "url" => Self::Url,
            "save" => Self::Save,
            _ => Self::Base64,
        }
    }

    /// Whether this policy downloads image bodies.
    #[must_use]
    pub fn fetches(self) -> bool {
        !matches!(self, Self::Url)
    }
}

impl FromStr for ImagePolicy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_arg(s))
    }
}

impl fmt::Display for ImagePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Url => "url",
            Self::Save => "save",
            Self::Base64 => "base64",
        })
    }
}

/// Configuration options for a conversion.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use wechatmp2markdown::{ImagePolicy, Options};
///
/// let options = Options {
///     image_policy: ImagePolicy::Url,
///     proxy: Some("127.0.0.1:8080".to_string()),
///     ..Options::default()
/// };
/// assert!(options.without_proxy().proxy.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Representation of images in the output.
    ///
    /// Default: `ImagePolicy::Base64`
    pub image_policy: ImagePolicy,

    /// HTTP proxy as `host:port` or a full proxy URL.
    ///
    /// Default: `None`
    pub proxy: Option<String>,

    /// Overall request timeout, covering the response body.
    ///
    /// Default: 30 seconds
    pub timeout: Duration,

    /// Bound on establishing the connection (dial and TLS handshake).
    ///
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// How long an idle pooled connection is kept.
    ///
    /// Default: 90 seconds
    pub pool_idle_timeout: Duration,

    /// TCP keep-alive interval.
    ///
    /// Default: 30 seconds
    pub tcp_keepalive: Duration,

    /// User agent header sent with every request.
    ///
    /// Default: [`DEFAULT_USER_AGENT`]
    pub user_agent: String,

    /// Offset used to render the publish timestamp.
    ///
    /// `None` formats in the local time zone.
    ///
    /// Default: `None`
    pub publish_time_offset: Option<FixedOffset>,
}

impl Options {
    /// Options with the given image policy and everything else defaulted.
    #[must_use]
    pub fn with_image_policy(image_policy: ImagePolicy) -> Self {
        Self {
            image_policy,
            ..Self::default()
        }
    }

    /// Copy of these options with the proxy removed.
    #[must_use]
    pub fn without_proxy(&self) -> Self {
        Self {
            proxy: None,
            ..self.clone()
        }
    }

    /// The configured proxy as a URL reqwest accepts.
    ///
    /// A bare `host:port` is taken to be an HTTP proxy. Blank values count
    /// as no proxy.
    #[must_use]
    pub fn proxy_url(&self) -> Option<String> {
        let proxy = self.proxy.as_deref()?.trim();
        if proxy.is_empty() {
            None
        } else if proxy.contains("://") {
            Some(proxy.to_string())
        } else {
            Some(format!("http://{proxy}"))
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            image_policy: ImagePolicy::default(),
            proxy: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            publish_time_offset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();

        assert_eq!(opts.image_policy, ImagePolicy::Base64);
        assert!(opts.proxy.is_none());
        assert_eq!(opts.timeout, Duration::from_secs(30));
        assert_eq!(opts.connect_timeout, Duration::from_secs(30));
        assert_eq!(opts.pool_idle_timeout, Duration::from_secs(90));
        assert_eq!(opts.tcp_keepalive, Duration::from_secs(30));
        assert!(opts.user_agent.starts_with("Mozilla/5.0"));
        assert!(opts.publish_time_offset.is_none());
    }

    #[test]
    fn test_image_policy_tokens() {
        assert_eq!(ImagePolicy::from_arg("url"), ImagePolicy::Url);
        assert_eq!(ImagePolicy::from_arg("save"), ImagePolicy::Save);
        assert_eq!(ImagePolicy::from_arg("base64"), ImagePolicy::Base64);
        assert_eq!(ImagePolicy::from_arg(""), ImagePolicy::Base64);
        assert_eq!(ImagePolicy::from_arg("URL"), ImagePolicy::Base64);
        assert_eq!("save".parse::<ImagePolicy>(), Ok(ImagePolicy::Save));
    }

    #[test]
    fn test_image_policy_display_round_trips_tokens() {
        for policy in [ImagePolicy::Url, ImagePolicy::Save, ImagePolicy::Base64] {
            assert_eq!(ImagePolicy::from_arg(&policy.to_string()), policy);
        }
        assert!(!ImagePolicy::Url.fetches());
        assert!(ImagePolicy::Save.fetches());
    }

    #[test]
    fn test_proxy_url_normalization() {
        let mut opts = Options::default();
        assert_eq!(opts.proxy_url(), None);

        opts.proxy = Some("127.0.0.1:8080".to_string());
        assert_eq!(opts.proxy_url().as_deref(), Some("http://127.0.0.1:8080"));

        opts.proxy = Some("socks5://10.0.0.1:1080".to_string());
        assert_eq!(opts.proxy_url().as_deref(), Some("socks5://10.0.0.1:1080"));

        opts.proxy = Some("   ".to_string());
        assert_eq!(opts.proxy_url(), None);
    }

    #[test]
    fn test_without_proxy_keeps_other_fields() {
        let opts = Options {
            image_policy: ImagePolicy::Save,
            proxy: Some("127.0.0.1:8080".to_string()),
            timeout: Duration::from_secs(5),
            ..Options::default()
        };

        let direct = opts.without_proxy();
        assert!(direct.proxy.is_none());
        assert_eq!(direct.image_policy, ImagePolicy::Save);
        assert_eq!(direct.timeout, Duration::from_secs(5));
    }
}
