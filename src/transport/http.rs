//! HTTP(S) transport built on `reqwest`.

use super::{EventStream, Transport, TransportEvent};
use crate::download::DownloadRequest;
use crate::error::{Result, TransportError};
use crate::http::{create_http_client, HttpClientConfig};

use futures::{future, stream, StreamExt, TryFutureExt, TryStreamExt};
use reqwest_middleware::ClientWithMiddleware;
use tracing::debug;

/// Fetches downloads with a [`ClientWithMiddleware`].
///
/// The status code is recorded as-is: a `404` is a finished download, not a
/// failed one.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ClientWithMiddleware,
}

impl HttpTransport {
    /// Creates a transport with a client configured by `config`.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        Ok(Self {
            client: create_http_client(config)?,
        })
    }

    /// Creates a transport around an existing client.
    pub fn with_client(client: ClientWithMiddleware) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ClientWithMiddleware {
        &self.client
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, request: DownloadRequest) -> EventStream {
        let client = self.client.clone();

        async move {
            let mut req = client
                .request(request.method().clone(), request.url().clone())
                .headers(request.headers().clone());
            if let Some(body) = request.body() {
                req = req.body(body.clone());
            }

            let res = req.send().await?;
            let status = res.status();
            debug!("{} {} responded with {}", request.method(), request.url(), status);

            let head = stream::once(future::ready(Ok(TransportEvent::Response { status })));
            let body = res
                .bytes_stream()
                .map_ok(TransportEvent::Data)
                .map_err(TransportError::from);
            Ok::<_, TransportError>(head.chain(body))
        }
        .try_flatten_stream()
        .boxed()
    }
}
