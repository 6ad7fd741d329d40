//! Request descriptor handed to the transport.
//!
//! A [`DownloadRequest`] is immutable once it is attached to a
//! [`Download`](super::Download): it is the only piece of state that survives
//! [`Download::fresh_copy`](super::Download::fresh_copy).
//!
//! ```rust
//! use stackload::download::DownloadRequest;
//! use reqwest::{header::USER_AGENT, Method};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = DownloadRequest::try_from("https://example.com/api/items")?
//!     .with_method(Method::POST)
//!     .with_header(USER_AGENT, "stackload/0.1".parse()?)
//!     .with_body("{\"page\": 2}");
//!
//! assert_eq!(request.method(), &Method::POST);
//! assert_eq!(request.url().path(), "/api/items");
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};

use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderValue, IntoHeaderName},
    Method, Url,
};
use std::convert::TryFrom;

/// What to fetch: URL, method, headers and an optional body.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    url: Url,
    method: Method,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl DownloadRequest {
    /// Creates a `GET` request for `url`.
    ///
    /// Fails if the URL is not `http`/`https` or has no host.
    pub fn new(url: Url) -> Result<Self> {
        validate(&url)?;
        Ok(Self {
            url,
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    /// Replaces the request method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds a header, replacing any previous value with the same name.
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merges `headers` into the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

impl TryFrom<&Url> for DownloadRequest {
    type Error = Error;

    fn try_from(value: &Url) -> Result<Self> {
        DownloadRequest::new(value.clone())
    }
}

impl TryFrom<&str> for DownloadRequest {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Url::parse(value)
            .map_err(|e| Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", value, e)))
            .and_then(DownloadRequest::new)
    }
}

fn validate(url: &Url) -> Result<()> {
    match url.scheme() {
        "http" | "https" => (),
        scheme => {
            return Err(Error::InvalidUrl(format!(
                "The url \"{}\" uses the unsupported scheme \"{}\"",
                url, scheme
            )))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::InvalidUrl(format!(
            "The url \"{}\" does not contain a host",
            url
        )));
    }

    Ok(())
}
