//! HTTP client setup and middleware configuration.
//!
//! Builds the `reqwest` client behind [`HttpTransport`](crate::transport::HttpTransport):
//! request tracing, optional retries of transient failures, optional proxy,
//! default headers and an optional overall timeout.
//!
//! # Examples
//!
//! ```rust
//! use stackload::http::{create_http_client, HttpClientConfig};
//! use reqwest::header::{HeaderMap, USER_AGENT};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut headers = HeaderMap::new();
//! headers.insert(USER_AGENT, "MyApp/1.0".parse()?);
//!
//! let config = HttpClientConfig {
//!     headers: Some(headers),
//!     timeout: Some(Duration::from_secs(30)),
//!     ..HttpClientConfig::default()
//! };
//!
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```

use reqwest::{header::HeaderMap, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::time::Duration;

/// Configuration for HTTP client setup.
#[derive(Debug, Clone, Default)]
pub struct HttpClientConfig {
    /// Number of retries for transient failures. `0` disables the retry
    /// middleware, which is the default: downloads report failures as they
    /// happen.
    pub retries: u32,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
    /// Timeout applied to each request, from connecting until the body has
    /// been read.
    pub timeout: Option<Duration>,
}

/// Creates an HTTP client with middleware configuration.
///
/// The client always traces requests; the retry middleware is only added when
/// `config.retries` is non-zero.
pub fn create_http_client(
    config: HttpClientConfig,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let mut inner_client_builder = reqwest::Client::builder();

    if let Some(proxy) = config.proxy {
        inner_client_builder = inner_client_builder.proxy(proxy);
    }

    if let Some(headers) = config.headers {
        inner_client_builder = inner_client_builder.default_headers(headers);
    }

    if let Some(timeout) = config.timeout {
        inner_client_builder = inner_client_builder.timeout(timeout);
    }

    let inner_client = inner_client_builder.build()?;

    // Trace HTTP requests. See the tracing crate to make use of these traces.
    let mut client = ClientBuilder::new(inner_client).with(TracingMiddleware::default());

    if config.retries > 0 {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.retries);
        client = client.with(RetryTransientMiddleware::new_with_policy(retry_policy));
    }

    Ok(client.build())
}
