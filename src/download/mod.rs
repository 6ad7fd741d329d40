//! Download module containing download-related functionality.
//!
//! - [`download`] - the [`Download`] handle and its single-use lifecycle
//! - [`request`] - the immutable [`DownloadRequest`] a download performs
//! - [`state`] - the [`DownloadState`] tag
//!
//! # Examples
//!
//! ## Creating a Download
//!
//! ```rust
//! use stackload::download::{Download, DownloadRequest};
//! use reqwest::{Method, Url};
//! use std::convert::TryFrom;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // From a URL string, a URL, or a full request.
//! let a = Download::try_from("https://example.com/file.zip")?;
//! let b = Download::try_from(&Url::parse("https://example.com/other.zip")?)?;
//! let c = Download::from(
//!     DownloadRequest::try_from("https://example.com/search")?.with_method(Method::POST),
//! )
//! .with_context(3usize);
//!
//! assert_eq!(a.url().path(), "/file.zip");
//! assert_eq!(b.request().method(), &Method::GET);
//! assert_eq!(c.context_as::<usize>().as_deref(), Some(&3));
//! # Ok(())
//! # }
//! ```

#[allow(clippy::module_inception)]
pub mod download;
pub mod request;
pub mod state;

pub use download::{Context, Download, DownloadId};
pub use request::DownloadRequest;
pub use state::DownloadState;
