//! Core coordinator implementation.
//!
//! The [`DownloadCoordinator`] starts downloads on its transport and keeps
//! the registry of stacks: which downloads of each stack are still
//! outstanding. A stack's entry exists exactly as long as one of its members
//! has not finished.
//!
//! # Examples
//!
//! ```rust
//! use stackload::{Callbacks, Download, DownloadCoordinator, MemoryTransport};
//! use reqwest::StatusCode;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), stackload::Error> {
//! let transport = Arc::new(MemoryTransport::new());
//! transport
//!     .respond("https://example.com/a", StatusCode::OK, "a")
//!     .respond("https://example.com/b", StatusCode::OK, "b");
//!
//! let coordinator = DownloadCoordinator::new(transport);
//! let (tx, rx) = tokio::sync::oneshot::channel();
//! let tx = std::sync::Mutex::new(Some(tx));
//! let delegate = Callbacks::new()
//!     .on_stack_finished(move |_, downloads| {
//!         if let Some(tx) = tx.lock().unwrap().take() {
//!             let _ = tx.send(downloads.len());
//!         }
//!     })
//!     .build();
//!
//! let downloads = vec![
//!     Download::try_from("https://example.com/a")?,
//!     Download::try_from("https://example.com/b")?,
//! ];
//! coordinator.perform_downloads(&downloads, &delegate, "pair")?;
//!
//! assert_eq!(rx.await.ok(), Some(2));
//! assert!(!coordinator.has_group("pair"));
//! # Ok(())
//! # }
//! ```

use super::builder::CoordinatorBuilder;
use super::group::{GroupDelegate, GroupEntry, GroupId};
use crate::delegate::{DownloadDelegate, Listener};
use crate::download::{Download, DownloadId};
use crate::error::{Error, Result};
use crate::transport::Transport;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

/// Registry of stacks with outstanding downloads.
pub(crate) type Groups = HashMap<GroupId, GroupEntry>;

static SHARED: OnceCell<DownloadCoordinator> = OnceCell::new();

/// Starts downloads and tracks stacks of downloads.
///
/// Cloning a coordinator yields a handle to the same registry.
#[derive(Clone)]
pub struct DownloadCoordinator {
    groups: Arc<Mutex<Groups>>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for DownloadCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadCoordinator")
            .field("groups", &self.group_ids())
            .finish()
    }
}

impl DownloadCoordinator {
    /// Creates a coordinator fetching with `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::from_parts(Arc::new(Mutex::new(HashMap::new())), transport)
    }

    pub(crate) fn from_parts(groups: Arc<Mutex<Groups>>, transport: Arc<dyn Transport>) -> Self {
        Self { groups, transport }
    }

    /// Creates a builder for a coordinator.
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    /// The process-wide coordinator, created on first use with the default
    /// HTTP configuration.
    pub fn shared() -> Result<&'static DownloadCoordinator> {
        SHARED.get_or_try_init(|| {
            debug!("Creating the shared download coordinator");
            CoordinatorBuilder::new().build()
        })
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Same as calling [`Download::start_with`] with this coordinator's
    /// transport. The download is not part of any stack.
    pub fn perform_download<D: DownloadDelegate>(
        &self,
        download: &Download,
        delegate: &Arc<D>,
    ) -> Result<()> {
        download.start_with(&self.transport, delegate)
    }

    /// Performs `downloads` as one stack identified by `group_id`.
    ///
    /// Each member's outcome is forwarded to `delegate` as it happens; once
    /// every member has finished, successfully or not,
    /// [`DownloadDelegate::on_group_finished`] is called once with
    /// `downloads` in the order given here.
    ///
    /// Every download must be fresh and listed once, `group_id` must be
    /// non-empty and must not belong to a stack that is still running.
    /// Nothing is started when one of these checks fails.
    pub fn perform_downloads<D: DownloadDelegate>(
        &self,
        downloads: &[Download],
        delegate: &Arc<D>,
        group_id: impl Into<GroupId>,
    ) -> Result<()> {
        let group_id = group_id.into();
        if group_id.is_empty() {
            return Err(Error::EmptyGroupId);
        }
        if downloads.is_empty() {
            return Err(Error::EmptyGroup(group_id));
        }
        Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let mut seen = HashSet::with_capacity(downloads.len());
        for download in downloads {
            download.ensure_fresh()?;
            if !seen.insert(download.id()) {
                return Err(Error::DuplicateDownload(download.id()));
            }
        }

        let delegate = Arc::downgrade(delegate) as Weak<dyn DownloadDelegate>;
        let group = Arc::new(GroupDelegate::new(
            group_id.clone(),
            delegate,
            downloads.to_vec(),
            self.groups.clone(),
            self.transport.clone(),
        ));

        {
            let mut groups = self.groups.lock();
            if groups.contains_key(&group_id) {
                return Err(Error::GroupInUse(group_id));
            }
            let outstanding: HashMap<DownloadId, Download> = downloads
                .iter()
                .map(|download| {
                    download.set_group_id(group_id.clone());
                    (download.id(), download.clone())
                })
                .collect();
            groups.insert(
                group_id.clone(),
                GroupEntry {
                    delegate: Arc::downgrade(&group),
                    outstanding,
                },
            );
        }
        debug!(
            "Registered stack \"{}\" with {} downloads",
            group_id,
            downloads.len()
        );

        for download in downloads {
            match download.begin(&self.transport, Listener::Group(group.clone())) {
                Ok(()) => (),
                // Cancelled since registration, possibly from a callback of
                // an earlier member. It is done as far as the stack goes.
                Err(Error::AlreadyFinished(_)) => {
                    trace!(
                        "Download {} in stack \"{}\" finished before it started",
                        download.id(),
                        group_id
                    );
                    group.remove_member(download);
                }
                Err(e) => {
                    warn!(
                        "Could not start download {} in stack \"{}\": {}",
                        download.id(),
                        group_id,
                        e
                    );
                    self.cancel_downloads_in_stack(&group_id);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Cancels every outstanding download of the stack `group_id`.
    ///
    /// This will NOT call the delegate: neither the member callbacks nor
    /// [`DownloadDelegate::on_group_finished`] fire for a cancelled stack.
    /// Returns the number of downloads cancelled, `0` if there is no such
    /// stack.
    pub fn cancel_downloads_in_stack(&self, group_id: impl AsRef<str>) -> usize {
        let group_id = group_id.as_ref();
        let Some(entry) = self.groups.lock().remove(group_id) else {
            return 0;
        };

        let cancelled = entry.outstanding.len();
        for download in entry.outstanding.values() {
            download.cancel();
        }
        debug!("Cancelled {} downloads in stack \"{}\"", cancelled, group_id);
        cancelled
    }

    /// Whether the stack `group_id` still has outstanding downloads.
    pub fn has_group(&self, group_id: impl AsRef<str>) -> bool {
        self.groups.lock().contains_key(group_id.as_ref())
    }

    /// Number of downloads of `group_id` that have not finished yet.
    pub fn outstanding(&self, group_id: impl AsRef<str>) -> usize {
        self.groups
            .lock()
            .get(group_id.as_ref())
            .map_or(0, |entry| entry.outstanding.len())
    }

    /// Ids of the stacks with outstanding downloads, sorted.
    pub fn group_ids(&self) -> Vec<GroupId> {
        let mut ids: Vec<GroupId> = self.groups.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}
