//! Stack bookkeeping.
//!
//! A stack ("group") is a set of downloads submitted together under one
//! [`GroupId`]. The coordinator keeps one [`GroupEntry`] per stack with
//! outstanding downloads; every member reports to the stack's
//! [`GroupDelegate`], which forwards the member callbacks to the caller and
//! fires the stack callback when the last member is done.

use super::coordinator::{DownloadCoordinator, Groups};
use crate::delegate::DownloadDelegate;
use crate::download::{Download, DownloadId};
use crate::error::TransportError;
use crate::transport::Transport;

use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::ptr;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Identifier of a stack of downloads.
///
/// Must be non-empty when a stack is submitted. An id can be reused once its
/// previous stack is gone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for GroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GroupId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A stack with outstanding downloads.
pub(crate) struct GroupEntry {
    /// Identifies the bookkeeping that owns this entry. The running members
    /// hold the strong references.
    pub(crate) delegate: Weak<GroupDelegate>,
    /// Members that have not finished yet.
    ///
    /// INVARIANT: never empty while the entry is in the map.
    pub(crate) outstanding: HashMap<DownloadId, Download>,
}

/// Receives the callbacks of every member of one stack.
pub(crate) struct GroupDelegate {
    id: GroupId,
    delegate: Weak<dyn DownloadDelegate>,
    /// The submitted list, in submission order.
    downloads: Vec<Download>,
    /// Kept alive by the running members even when every coordinator handle
    /// has been dropped.
    groups: Arc<Mutex<Groups>>,
    transport: Arc<dyn Transport>,
}

impl GroupDelegate {
    pub(crate) fn new(
        id: GroupId,
        delegate: Weak<dyn DownloadDelegate>,
        downloads: Vec<Download>,
        groups: Arc<Mutex<Groups>>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            id,
            delegate,
            downloads,
            groups,
            transport,
        }
    }

    /// Drops `download` from the stack, and reports the stack as finished if
    /// it was the last member.
    ///
    /// Does nothing once the stack has been cancelled, or when the id now
    /// belongs to another stack.
    pub(crate) fn remove_member(&self, download: &Download) {
        let drained = {
            let mut map = self.groups.lock();
            let drained = match map.get_mut(&self.id) {
                Some(entry) if ptr::eq(Weak::as_ptr(&entry.delegate), self) => {
                    entry.outstanding.remove(&download.id());
                    entry.outstanding.is_empty()
                }
                _ => false,
            };
            if drained {
                map.remove(&self.id);
            }
            drained
        };

        if !drained {
            return;
        }

        debug!(
            "All {} downloads in stack \"{}\" have finished",
            self.downloads.len(),
            self.id
        );
        if let Some(delegate) = self.delegate.upgrade() {
            let coordinator = DownloadCoordinator::from_parts(self.groups.clone(), self.transport.clone());
            delegate.on_group_finished(&coordinator, &self.downloads);
        }
    }
}

impl DownloadDelegate for GroupDelegate {
    fn on_download_finished(&self, download: &Download) {
        if let Some(delegate) = self.delegate.upgrade() {
            delegate.on_download_finished(download);
        }
        self.remove_member(download);
    }

    fn on_download_failed(&self, download: &Download, error: &TransportError) {
        if let Some(delegate) = self.delegate.upgrade() {
            delegate.on_download_failed(download, error);
        }
        self.remove_member(download);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_id_display() {
        let id = GroupId::new("thumbnails:42");
        assert_eq!(id.to_string(), "thumbnails:42");
        assert_eq!(id.as_str(), "thumbnails:42");
        assert!(!id.is_empty());
        assert!(GroupId::from("").is_empty());
    }

    #[test]
    fn test_group_id_from() {
        let id1 = GroupId::from("test");
        let id2 = GroupId::from(String::from("test"));
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_group_id_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(GroupId::from("g1"), 1);
        assert_eq!(map.get("g1"), Some(&1));
    }
}
