//! Completion callbacks.
//!
//! Implement [`DownloadDelegate`] on your own type, or build one from
//! closures with [`Callbacks`]. Every callback is optional.
//!
//! Downloads only hold a weak reference to their delegate, so the caller must
//! keep the `Arc` alive; once it is dropped, pending downloads finish
//! silently.
//!
//! # Examples
//!
//! ```rust
//! use stackload::delegate::Callbacks;
//!
//! let delegate = Callbacks::new()
//!     .on_finished(|download| {
//!         println!("{} -> {:?}", download.url(), download.status_code());
//!     })
//!     .on_failed(|download, error| {
//!         println!("{} failed: {}", download.url(), error);
//!     })
//!     .on_stack_finished(|_coordinator, downloads| {
//!         println!("{} downloads done", downloads.len());
//!     })
//!     .build();
//! # drop(delegate);
//! ```

use crate::coordinator::{DownloadCoordinator, GroupDelegate};
use crate::download::Download;
use crate::error::TransportError;

use std::fmt;
use std::sync::{Arc, Weak};

/// Receives the outcome of downloads.
///
/// Callbacks are invoked from the task driving the download, never while an
/// internal lock is held, so they may start or cancel other downloads.
pub trait DownloadDelegate: Send + Sync + 'static {
    /// A download finished loading. Non-2xx responses land here too; check
    /// [`Download::status_code`].
    fn on_download_finished(&self, _download: &Download) {}

    /// A download failed. `error` is also available from
    /// [`Download::error`].
    fn on_download_failed(&self, _download: &Download, _error: &TransportError) {}

    /// Every download of a stack has finished, whether it succeeded or
    /// failed. `downloads` is the list submitted, in submission order.
    ///
    /// Not called for stacks cancelled with
    /// [`DownloadCoordinator::cancel_downloads_in_stack`].
    fn on_group_finished(&self, _coordinator: &DownloadCoordinator, _downloads: &[Download]) {}
}

/// Callback type for a finished download.
pub type FinishedCallback = Box<dyn Fn(&Download) + Send + Sync>;

/// Callback type for a failed download.
pub type FailedCallback = Box<dyn Fn(&Download, &TransportError) + Send + Sync>;

/// Callback type for a finished stack.
pub type GroupCallback = Box<dyn Fn(&DownloadCoordinator, &[Download]) + Send + Sync>;

/// A [`DownloadDelegate`] made of closures.
#[derive(Default)]
pub struct Callbacks {
    on_finished: Option<FinishedCallback>,
    on_failed: Option<FailedCallback>,
    on_stack_finished: Option<GroupCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Callbacks::default()
    }

    /// Set callback for when a download finishes loading.
    pub fn on_finished<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Download) + Send + Sync + 'static,
    {
        self.on_finished = Some(Box::new(callback));
        self
    }

    /// Set callback for when a download fails.
    pub fn on_failed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Download, &TransportError) + Send + Sync + 'static,
    {
        self.on_failed = Some(Box::new(callback));
        self
    }

    /// Set callback for when every download of a stack has finished.
    pub fn on_stack_finished<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DownloadCoordinator, &[Download]) + Send + Sync + 'static,
    {
        self.on_stack_finished = Some(Box::new(callback));
        self
    }

    /// Wraps the callbacks in the `Arc` downloads expect.
    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl DownloadDelegate for Callbacks {
    fn on_download_finished(&self, download: &Download) {
        if let Some(ref callback) = self.on_finished {
            callback(download);
        }
    }

    fn on_download_failed(&self, download: &Download, error: &TransportError) {
        if let Some(ref callback) = self.on_failed {
            callback(download, error);
        }
    }

    fn on_group_finished(&self, coordinator: &DownloadCoordinator, downloads: &[Download]) {
        if let Some(ref callback) = self.on_stack_finished {
            callback(coordinator, downloads);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_finished", &self.on_finished.is_some())
            .field("on_failed", &self.on_failed.is_some())
            .field("on_stack_finished", &self.on_stack_finished.is_some())
            .finish()
    }
}

/// Who a running download reports to.
pub(crate) enum Listener {
    /// The caller's delegate, for individual downloads.
    Delegate(Weak<dyn DownloadDelegate>),
    /// The bookkeeping of the stack the download belongs to.
    Group(Arc<GroupDelegate>),
}

impl Listener {
    /// Re-resolves the delegate; `None` once a weakly held one is gone.
    pub(crate) fn resolve(&self) -> Option<Arc<dyn DownloadDelegate>> {
        match self {
            Listener::Delegate(delegate) => delegate.upgrade(),
            Listener::Group(group) => Some(group.clone() as Arc<dyn DownloadDelegate>),
        }
    }
}
