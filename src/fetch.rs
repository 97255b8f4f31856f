//! HTTP retrieval of article pages and images.
//!
//! One [`HttpFetcher`] is built per conversion from the caller's
//! [`Options`] and handed down explicitly; there is no global client. Image
//! downloads go through the [`ImageSource`] trait so the walker never sees
//! the transport, and a failed download degrades to `None` instead of
//! aborting the conversion.

use std::sync::OnceLock;

use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::options::Options;

/// Supplies image bytes to the walker.
pub trait ImageSource {
    /// Download the image at `url`.
    ///
    /// Returns `None` on any failure; implementations log the cause.
    fn acquire(&self, url: &str) -> Option<Vec<u8>>;
}

/// Build a blocking client from the options.
///
/// The proxy, when configured, routes every connection; otherwise
/// environment proxies are ignored so routing only depends on `options`.
pub fn build_client(options: &Options) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(options.user_agent.clone())
        .timeout(options.timeout)
        .connect_timeout(options.connect_timeout)
        .pool_idle_timeout(options.pool_idle_timeout)
        .tcp_keepalive(options.tcp_keepalive);

    builder = match options.proxy_url() {
        Some(proxy_url) => {
            let proxy = reqwest::Proxy::all(proxy_url.as_str())
                .map_err(|e| Error::InvalidProxy(format!("{proxy_url}: {e}")))?;
            builder.proxy(proxy)
        }
        None => builder.no_proxy(),
    };

    builder.build().map_err(|e| Error::Request(e.to_string()))
}

/// GET `url` and return the body of a 2xx response.
pub fn get_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    debug!(url, "GET");
    let response = client
        .get(url)
        .send()
        .map_err(|e| Error::Request(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .bytes()
        .map(|body| body.to_vec())
        .map_err(|e| Error::Request(format!("reading body of {url}: {e}")))
}

/// Per-conversion HTTP client.
///
/// The underlying client is created on first use, so a conversion that
/// never downloads anything never builds one. An unusable proxy is logged
/// and the client is built for direct connections instead.
pub struct HttpFetcher {
    options: Options,
    client: OnceLock<Option<Client>>,
}

impl HttpFetcher {
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            options: options.clone(),
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Option<&Client> {
        self.client
            .get_or_init(|| match build_client(&self.options) {
                Ok(client) => Some(client),
                Err(Error::InvalidProxy(proxy)) => {
                    warn!(proxy = %proxy, "invalid proxy, connecting directly");
                    build_client(&self.options.without_proxy())
                        .map_err(|e| warn!(error = %e, "cannot build HTTP client"))
                        .ok()
                }
                Err(e) => {
                    warn!(error = %e, "cannot build HTTP client");
                    None
                }
            })
            .as_ref()
    }

    /// GET `url` and return the body of a 2xx response.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let client = self
            .client()
            .ok_or_else(|| Error::Request("HTTP client unavailable".to_string()))?;
        get_bytes(client, url)
    }
}

impl ImageSource for HttpFetcher {
    fn acquire(&self, url: &str) -> Option<Vec<u8>> {
        match self.fetch(url) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(url, error = %e, "image download failed");
                None
            }
        }
    }
}
