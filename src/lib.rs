//! Stackload is a small crate for issuing HTTP(S) downloads, alone or in
//! stacks, and being told when each download and each whole stack is done.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stackload::{Callbacks, Download, DownloadCoordinator, Error};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let delegate = Callbacks::new()
//!     .on_finished(|download| println!("{} bytes from {}", download.data().len(), download.url()))
//!     .on_failed(|download, error| println!("{} failed: {}", download.url(), error))
//!     .on_stack_finished(|_, downloads| println!("{} downloads done", downloads.len()))
//!     .build();
//!
//! let downloads = vec![
//!     Download::try_from("https://example.com/a.json")?,
//!     Download::try_from("https://example.com/b.json")?,
//! ];
//! let coordinator = DownloadCoordinator::shared()?;
//! coordinator.perform_downloads(&downloads, &delegate, "startup")?;
//!
//! // Changed our mind.
//! coordinator.cancel_downloads_in_stack("startup");
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`download`] - The `Download` handle, its request descriptor and lifecycle state
//! - [`coordinator`] - The `DownloadCoordinator`, stack tracking and its builder
//! - [`delegate`] - The `DownloadDelegate` callback trait and closure-based `Callbacks`
//! - [`transport`] - The `Transport` capability with HTTP and in-memory implementations
//! - [`http`] - HTTP client configuration
//! - [`error`] - Centralized error handling with the `Error` enum

pub mod coordinator;
pub mod delegate;
pub mod download;
pub mod error;
pub mod http;
pub mod transport;

pub use coordinator::{CoordinatorBuilder, DownloadCoordinator, GroupId};
pub use delegate::{Callbacks, DownloadDelegate};
pub use download::{Download, DownloadId, DownloadRequest, DownloadState};
pub use error::{Error, Result, TransportError};
pub use http::{create_http_client, HttpClientConfig};
pub use transport::{EventStream, HttpTransport, MemoryTransport, Transport, TransportEvent};
