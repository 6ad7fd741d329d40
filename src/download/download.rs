//! Core download functionality.
//!
//! A [`Download`] represents exactly one fetch. It is a cheap handle: cloning
//! it shares the same underlying download, which is how the caller keeps
//! reading its fields while a coordinator tracks it. A download can only be
//! started once; after it finishes (or is cancelled) it is inert, and
//! [`Download::fresh_copy`] is the way to issue the same request again.
//!
//! # Examples
//!
//! ```rust
//! use stackload::download::{Download, DownloadState};
//! use std::convert::TryFrom;
//!
//! # fn main() -> Result<(), stackload::Error> {
//! let download = Download::try_from("https://example.com/file.zip")?.with_context("avatar");
//! assert_eq!(download.state(), DownloadState::Fresh);
//! assert_eq!(download.status_code(), None);
//! assert_eq!(download.context_as::<&str>().as_deref(), Some(&"avatar"));
//!
//! // Cancelling a download that never started still retires it.
//! download.cancel();
//! assert!(download.is_finished());
//!
//! // A fresh copy can be started again.
//! let again = download.fresh_copy();
//! assert_eq!(again.state(), DownloadState::Fresh);
//! assert_eq!(again.url(), download.url());
//! # Ok(())
//! # }
//! ```

use super::{request::DownloadRequest, state::DownloadState};
use crate::coordinator::{DownloadCoordinator, GroupId};
use crate::delegate::{DownloadDelegate, Listener};
use crate::error::{Error, Result, TransportError};
use crate::transport::{EventStream, Transport, TransportEvent};

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use parking_lot::Mutex;
use reqwest::{StatusCode, Url};
use std::any::Any;
use std::convert::TryFrom;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, trace};

/// Opaque value a caller attaches to a download to recognise it later.
pub type Context = Arc<dyn Any + Send + Sync>;

/// Process-unique identifier of a [`Download`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DownloadId(u64);

impl DownloadId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mutable part of a download, behind the handle's lock.
struct State {
    state: DownloadState,
    data: BytesMut,
    error: Option<Arc<TransportError>>,
    status_code: Option<StatusCode>,
    context: Option<Context>,
    group_id: Option<GroupId>,
    /// Zeroed out when the download finishes.
    listener: Option<Listener>,
    task: Option<AbortHandle>,
}

impl State {
    fn new(context: Option<Context>) -> Self {
        Self {
            state: DownloadState::Fresh,
            data: BytesMut::new(),
            error: None,
            status_code: None,
            context,
            group_id: None,
            listener: None,
            task: None,
        }
    }
}

/// Represents one fetch of a [`DownloadRequest`].
#[derive(Clone)]
pub struct Download {
    id: DownloadId,
    request: Arc<DownloadRequest>,
    inner: Arc<Mutex<State>>,
}

impl Download {
    /// Creates a new [`Download`] for an already validated request.
    ///
    /// [`Download::try_from`] accepts a URL string or a [`Url`] instead.
    pub fn new(request: DownloadRequest) -> Self {
        Self::with_state(Arc::new(request), State::new(None))
    }

    fn with_state(request: Arc<DownloadRequest>, state: State) -> Self {
        Self {
            id: DownloadId::next(),
            request,
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Attaches a context value and returns the download.
    pub fn with_context<C: Any + Send + Sync>(self, context: C) -> Self {
        self.set_context(context);
        self
    }

    pub fn id(&self) -> DownloadId {
        self.id
    }

    /// The request being performed.
    pub fn request(&self) -> &DownloadRequest {
        &self.request
    }

    pub fn url(&self) -> &Url {
        self.request.url()
    }

    /// Response bytes received so far.
    ///
    /// Only complete once the download has finished successfully.
    pub fn data(&self) -> Bytes {
        Bytes::copy_from_slice(&self.inner.lock().data)
    }

    /// Error reported by the transport, only set when the download failed.
    pub fn error(&self) -> Option<Arc<TransportError>> {
        self.inner.lock().error.clone()
    }

    /// Status code of the response, `None` until the transport reports one.
    pub fn status_code(&self) -> Option<StatusCode> {
        self.inner.lock().status_code
    }

    pub fn state(&self) -> DownloadState {
        self.inner.lock().state
    }

    /// Whether the download succeeded, failed or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    /// Id of the stack this download was submitted in, `None` for
    /// individual downloads.
    pub fn group_id(&self) -> Option<GroupId> {
        self.inner.lock().group_id.clone()
    }

    pub fn context(&self) -> Option<Context> {
        self.inner.lock().context.clone()
    }

    /// The context, if it is a `T`.
    pub fn context_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.context().and_then(|context| context.downcast::<T>().ok())
    }

    /// Replaces the context. Allowed at any point of the lifecycle.
    pub fn set_context<C: Any + Send + Sync>(&self, context: C) {
        self.inner.lock().context = Some(Arc::new(context));
    }

    /// Tell the download to begin, using the transport of the shared
    /// [`DownloadCoordinator`].
    ///
    /// The delegate is only referenced weakly: keep it alive for as long as
    /// you want to hear from this download.
    pub fn start<D: DownloadDelegate>(&self, delegate: &Arc<D>) -> Result<()> {
        DownloadCoordinator::shared()?.perform_download(self, delegate)
    }

    /// Tell the download to begin on `transport`.
    pub fn start_with<D: DownloadDelegate>(
        &self,
        transport: &Arc<dyn Transport>,
        delegate: &Arc<D>,
    ) -> Result<()> {
        let delegate = Arc::downgrade(delegate) as Weak<dyn DownloadDelegate>;
        self.begin(transport, Listener::Delegate(delegate))
    }

    /// Cancel the download.
    ///
    /// The download is finished when this returns and neither completion
    /// callback will fire. Cancelling a finished download does nothing.
    pub fn cancel(&self) {
        let (listener, task) = {
            let mut inner = self.inner.lock();
            if inner.state.is_finished() {
                return;
            }
            inner.state = DownloadState::Finished;
            (inner.listener.take(), inner.task.take())
        };

        if let Some(task) = task {
            task.abort();
        }
        debug!("Cancelled download {} of {}", self.id, self.url());

        // Cancelling a member of a stack still counts it as done for the stack.
        if let Some(Listener::Group(group)) = listener {
            group.remove_member(self);
        }
    }

    /// Creates a new, unstarted download for the same request.
    ///
    /// Only the request and the context are carried over.
    pub fn fresh_copy(&self) -> Self {
        Self::with_state(self.request.clone(), State::new(self.context()))
    }

    pub(crate) fn ensure_fresh(&self) -> Result<()> {
        match self.state() {
            DownloadState::Fresh => Ok(()),
            DownloadState::Running => Err(Error::AlreadyStarted(self.id)),
            DownloadState::Finished => Err(Error::AlreadyFinished(self.id)),
        }
    }

    pub(crate) fn set_group_id(&self, group_id: GroupId) {
        self.inner.lock().group_id = Some(group_id);
    }

    /// Moves the download from `Fresh` to `Running` and spawns its driver.
    pub(crate) fn begin(&self, transport: &Arc<dyn Transport>, listener: Listener) -> Result<()> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        {
            let mut inner = self.inner.lock();
            match inner.state {
                DownloadState::Fresh => (),
                DownloadState::Running => return Err(Error::AlreadyStarted(self.id)),
                DownloadState::Finished => return Err(Error::AlreadyFinished(self.id)),
            }
            inner.state = DownloadState::Running;
            inner.listener = Some(listener);
        }

        debug!("Fetching {} as download {}", self.url(), self.id);
        let events = transport.fetch(self.request.as_ref().clone());
        let task = runtime.spawn(self.clone().drive(events)).abort_handle();

        let mut inner = self.inner.lock();
        if inner.state == DownloadState::Running {
            inner.task = Some(task);
        } else {
            // Cancelled while the driver was being spawned.
            task.abort();
        }
        Ok(())
    }

    async fn drive(self, mut events: EventStream) {
        while let Some(event) = events.next().await {
            match event {
                Ok(TransportEvent::Response { status }) => {
                    let mut inner = self.inner.lock();
                    if inner.state != DownloadState::Running {
                        return;
                    }
                    debug!("Download {} received status {}", self.id, status);
                    inner.status_code = Some(status);
                }
                Ok(TransportEvent::Data(chunk)) => {
                    let mut inner = self.inner.lock();
                    if inner.state != DownloadState::Running {
                        return;
                    }
                    trace!("Download {} received {} bytes", self.id, chunk.len());
                    inner.data.extend_from_slice(&chunk);
                }
                Err(e) => {
                    self.finish(Some(e));
                    return;
                }
            }
        }
        self.finish(None);
    }

    /// Performs the `Running → Finished` transition and reports it.
    fn finish(&self, error: Option<TransportError>) {
        let (listener, error) = {
            let mut inner = self.inner.lock();
            if inner.state != DownloadState::Running {
                return;
            }
            inner.state = DownloadState::Finished;
            inner.task = None;
            inner.error = error.map(Arc::new);
            (inner.listener.take(), inner.error.clone())
        };

        let Some(delegate) = listener.and_then(|l| l.resolve()) else {
            debug!("Download {} finished without a live delegate", self.id);
            return;
        };

        match error {
            None => {
                debug!("Download {} finished loading", self.id);
                delegate.on_download_finished(self);
            }
            Some(error) => {
                debug!("Download {} failed: {}", self.id, error);
                delegate.on_download_failed(self, &error);
            }
        }
    }
}

impl From<DownloadRequest> for Download {
    fn from(request: DownloadRequest) -> Self {
        Download::new(request)
    }
}

impl TryFrom<&Url> for Download {
    type Error = Error;

    fn try_from(value: &Url) -> Result<Self> {
        DownloadRequest::try_from(value).map(Download::new)
    }
}

impl TryFrom<&str> for Download {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        DownloadRequest::try_from(value).map(Download::new)
    }
}

impl PartialEq for Download {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Download {}

impl Hash for Download {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Download")
            .field("id", &self.id)
            .field("url", &self.request.url().as_str())
            .field("state", &inner.state)
            .field("status_code", &inner.status_code)
            .field("received", &inner.data.len())
            .field("group_id", &inner.group_id)
            .finish()
    }
}
