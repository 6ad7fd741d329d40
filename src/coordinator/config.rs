//! Configuration structures and defaults for the coordinator.

use crate::http::HttpClientConfig;
use crate::transport::Transport;

use std::fmt;
use std::sync::Arc;

/// Configuration structure for the coordinator.
#[derive(Clone, Default)]
pub struct CoordinatorConfig {
    /// Settings of the HTTP client, used when no transport is given.
    pub http: HttpClientConfig,
    /// Transport to use instead of an [`HttpTransport`](crate::transport::HttpTransport).
    pub transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for CoordinatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinatorConfig")
            .field("http", &self.http)
            .field("transport", &self.transport.is_some())
            .finish()
    }
}
