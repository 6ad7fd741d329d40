//! Error handling for the Stackload library.
//!
//! Two error families live here. [`Error`] is returned synchronously to the
//! caller: invalid URLs at construction time, and misuse of the download
//! lifecycle or of stack registration. [`TransportError`] is what a
//! [`Transport`](crate::transport::Transport) reports when a fetch fails; it
//! is delivered through
//! [`DownloadDelegate::on_download_failed`](crate::delegate::DownloadDelegate::on_download_failed)
//! and kept on the download.

use crate::coordinator::GroupId;
use crate::download::DownloadId;

use thiserror::Error;

/// Errors that can happen when using Stackload.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the underlying URL parser or the expected URL format.
    ///
    /// Returned when a URL cannot be parsed, is not `http`/`https`, or has
    /// no host.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The download was already started and is still running.
    #[error("Download {0} has already been started")]
    AlreadyStarted(DownloadId),

    /// The download has finished or was cancelled. Use
    /// [`Download::fresh_copy`](crate::Download::fresh_copy) to issue it again.
    #[error("Download {0} has already finished, make a fresh copy to restart it")]
    AlreadyFinished(DownloadId),

    /// Stacks must be identified by a non-empty id.
    #[error("A stack id must not be empty")]
    EmptyGroupId,

    /// A stack was submitted without any download.
    #[error("Stack \"{0}\" contains no downloads")]
    EmptyGroup(GroupId),

    /// A stack with this id still has outstanding downloads.
    #[error("Stack \"{0}\" still has outstanding downloads")]
    GroupInUse(GroupId),

    /// The same download appears more than once in a stack.
    #[error("Download {0} is listed more than once in the stack")]
    DuplicateDownload(DownloadId),

    /// Starting a download requires a running tokio runtime.
    #[error("No tokio runtime is available to drive the download")]
    NoRuntime,

    /// Error from the Reqwest library.
    ///
    /// Only returned while building the HTTP client.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },
}

/// Result type alias for operations that can fail with a Stackload error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by a transport while fetching a download.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be sent, or the middleware stack gave up on it.
    #[error("Could not make a successful request to the remote server")]
    Request {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// The response body could not be read to the end.
    #[error("Failed to read the response body")]
    Body {
        #[from]
        source: reqwest::Error,
    },

    /// Any other failure reported by a transport.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Creates a [`TransportError::Other`] from a message.
    pub fn other(msg: impl std::fmt::Display) -> Self {
        TransportError::Other(msg.to_string())
    }
}
