//! In-process transport serving scripted responses.
//!
//! Routes are keyed by URL. A route either responds right away, fails right
//! away, or holds the request until [`MemoryTransport::release`] or
//! [`MemoryTransport::release_with_error`] is called, which is how in-flight
//! behaviour (cancellation, ordering) can be exercised without a network.
//!
//! ```rust
//! use stackload::transport::MemoryTransport;
//! use reqwest::StatusCode;
//!
//! let transport = MemoryTransport::new();
//! transport
//!     .respond("https://example.com/ok", StatusCode::OK, "hello")
//!     .fail("https://example.com/broken", "connection reset")
//!     .hold("https://example.com/slow");
//! ```

use super::{EventStream, Transport, TransportEvent};
use crate::download::DownloadRequest;
use crate::error::TransportError;

use bytes::Bytes;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use reqwest::{StatusCode, Url};
use std::collections::HashMap;
use tracing::debug;

type EventSender = UnboundedSender<Result<TransportEvent, TransportError>>;

#[derive(Debug, Clone)]
enum Route {
    Respond { status: StatusCode, chunks: Vec<Bytes> },
    Fail(String),
    Hold,
}

/// A [`Transport`] that never touches the network.
///
/// Requests for URLs without a route fail with a "no route" error.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: Mutex<HashMap<String, Route>>,
    held: Mutex<HashMap<String, Vec<EventSender>>>,
    requests: Mutex<Vec<DownloadRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        MemoryTransport::default()
    }

    /// Answer requests for `url` with `status` and `body`.
    pub fn respond(&self, url: &str, status: StatusCode, body: impl Into<Bytes>) -> &Self {
        self.respond_chunked(url, status, vec![body.into()])
    }

    /// Answer requests for `url` with `status`, delivering the body in `chunks`.
    pub fn respond_chunked(&self, url: &str, status: StatusCode, chunks: Vec<Bytes>) -> &Self {
        self.route(url, Route::Respond { status, chunks })
    }

    /// Fail requests for `url` before any response arrives.
    pub fn fail(&self, url: &str, message: impl Into<String>) -> &Self {
        self.route(url, Route::Fail(message.into()))
    }

    /// Keep requests for `url` pending until they are released.
    pub fn hold(&self, url: &str) -> &Self {
        self.route(url, Route::Hold)
    }

    /// Completes every held request for `url`.
    ///
    /// Returns the number of requests released, including those whose
    /// download was cancelled in the meantime.
    pub fn release(&self, url: &str, status: StatusCode, body: impl Into<Bytes>) -> usize {
        let body = body.into();
        self.drain_held(url, |sender| {
            let _ = sender.unbounded_send(Ok(TransportEvent::Response { status }));
            let _ = sender.unbounded_send(Ok(TransportEvent::Data(body.clone())));
        })
    }

    /// Fails every held request for `url`.
    pub fn release_with_error(&self, url: &str, message: &str) -> usize {
        self.drain_held(url, |sender| {
            let _ = sender.unbounded_send(Err(TransportError::other(message)));
        })
    }

    /// Number of held requests for `url` not yet released.
    pub fn pending(&self, url: &str) -> usize {
        self.held.lock().get(&key(url)).map_or(0, Vec::len)
    }

    /// Every request fetched so far, in order.
    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().clone()
    }

    fn route(&self, url: &str, route: Route) -> &Self {
        self.routes.lock().insert(key(url), route);
        self
    }

    fn drain_held<F: Fn(&EventSender)>(&self, url: &str, send: F) -> usize {
        let senders = self.held.lock().remove(&key(url)).unwrap_or_default();
        for sender in &senders {
            send(sender);
        }
        // Dropping the senders ends the streams.
        senders.len()
    }
}

impl Transport for MemoryTransport {
    fn fetch(&self, request: DownloadRequest) -> EventStream {
        let url = String::from(request.url().as_str());
        let route = self.routes.lock().get(&url).cloned();
        self.requests.lock().push(request);
        debug!("Serving {} from memory: {:?}", url, route);

        match route {
            Some(Route::Respond { status, chunks }) => {
                let events = std::iter::once(TransportEvent::Response { status })
                    .chain(chunks.into_iter().map(TransportEvent::Data))
                    .map(Ok);
                stream::iter(events).boxed()
            }
            Some(Route::Fail(message)) => {
                stream::iter([Err(TransportError::Other(message))]).boxed()
            }
            Some(Route::Hold) => {
                let (sender, receiver) = mpsc::unbounded();
                self.held.lock().entry(url).or_default().push(sender);
                receiver.boxed()
            }
            None => stream::iter([Err(TransportError::Other(format!(
                "No route for {}",
                url
            )))])
            .boxed(),
        }
    }
}

/// Normalises `url` the way [`Url`] serialises it, so that
/// `http://host` and `http://host/` share a route.
fn key(url: &str) -> String {
    Url::parse(url)
        .map(String::from)
        .unwrap_or_else(|_| url.to_string())
}
