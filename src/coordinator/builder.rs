//! Builder pattern implementation for creating DownloadCoordinator instances.
//!
//! # Examples
//!
//! ```rust
//! use stackload::coordinator::CoordinatorBuilder;
//! use reqwest::header::{self, HeaderValue};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), stackload::Error> {
//! let coordinator = CoordinatorBuilder::new()
//!     .header(header::USER_AGENT, HeaderValue::from_static("stackload"))
//!     .timeout(Duration::from_secs(30))
//!     .retries(2)
//!     .build()?;
//! # drop(coordinator);
//! # Ok(())
//! # }
//! ```

use super::{config::CoordinatorConfig, coordinator::DownloadCoordinator};
use crate::error::Result;
use crate::transport::{HttpTransport, Transport};

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::Proxy;
use std::sync::Arc;
use std::time::Duration;

/// A builder used to create a [`DownloadCoordinator`].
#[derive(Debug, Default)]
pub struct CoordinatorBuilder {
    config: CoordinatorConfig,
}

impl CoordinatorBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        CoordinatorBuilder::default()
    }

    /// Fetch with `transport` instead of HTTP.
    ///
    /// The HTTP settings of the builder are ignored when a transport is set.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    /// Set the number of retries of transient HTTP failures.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.http.retries = retries;
        self
    }

    /// Send HTTP requests through `proxy`.
    pub fn proxy(mut self, proxy: Proxy) -> Self {
        self.config.http.proxy = Some(proxy);
        self
    }

    /// Set the timeout of each HTTP request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.http.timeout = Some(timeout);
        self
    }

    /// Helper method to get or create a new HeaderMap.
    fn new_header(&self) -> HeaderMap {
        match self.config.http.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add default http headers.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be
    /// merged into a single one.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.http.headers = Some(new);
        self
    }

    /// Add a default http header.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.http.headers = Some(new);
        self
    }

    /// The configuration collected so far.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Create the [`DownloadCoordinator`] with the specified options.
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn build(self) -> Result<DownloadCoordinator> {
        let transport = match self.config.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.config.http)?),
        };
        Ok(DownloadCoordinator::new(transport))
    }
}
