//! Transports perform the actual network work.
//!
//! A [`Transport`] turns a [`DownloadRequest`] into a stream of
//! [`TransportEvent`]s: one `Response` carrying the status code, then zero or
//! more `Data` chunks. The end of the stream means the download succeeded; an
//! `Err` item is the terminal failure. Redirects, TLS and timeouts are the
//! transport's business.
//!
//! - [`HttpTransport`] fetches over HTTP(S) with `reqwest`.
//! - [`MemoryTransport`] serves scripted responses from memory.

pub mod http;
pub mod memory;

pub use http::HttpTransport;
pub use memory::MemoryTransport;

use crate::download::DownloadRequest;
use crate::error::TransportError;

use bytes::Bytes;
use futures::stream::BoxStream;
use reqwest::StatusCode;

/// Stream of events produced by a transport for one request.
pub type EventStream = BoxStream<'static, Result<TransportEvent, TransportError>>;

/// Something a transport observed while fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Response metadata arrived.
    Response { status: StatusCode },
    /// A chunk of the response body.
    Data(Bytes),
}

/// Capability to fetch a request.
pub trait Transport: Send + Sync + 'static {
    /// Starts fetching `request`.
    ///
    /// Must not block: the work happens as the returned stream is polled, and
    /// dropping the stream aborts it.
    fn fetch(&self, request: DownloadRequest) -> EventStream;
}
