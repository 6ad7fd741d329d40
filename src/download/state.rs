//! Lifecycle of a single download.

use std::fmt;

/// Where a [`Download`](super::Download) is in its single-use lifecycle.
///
/// Transitions only move forward: `Fresh → Running → Finished`, or
/// `Fresh → Finished` when a download is cancelled before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadState {
    /// Created, not started yet.
    Fresh,
    /// Handed to a transport, waiting for its outcome.
    Running,
    /// Succeeded, failed or was cancelled. The download is inert.
    Finished,
}

impl DownloadState {
    pub fn is_finished(self) -> bool {
        self == DownloadState::Finished
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DownloadState::Fresh => "fresh",
            DownloadState::Running => "running",
            DownloadState::Finished => "finished",
        };
        f.write_str(s)
    }
}
