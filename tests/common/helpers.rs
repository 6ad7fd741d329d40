#![allow(dead_code)]

use parking_lot::Mutex;
use reqwest::StatusCode;
use stackload::{
    Download, DownloadCoordinator, DownloadDelegate, DownloadId, MemoryTransport, TransportError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

// Common test constants
pub const URL_A: &str = "https://example.com/a.bin";
pub const URL_B: &str = "https://example.com/b.bin";
pub const URL_C: &str = "https://example.com/c.bin";

/// How long to wait for a callback before giving up.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// A callback observed by [`RecordingDelegate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Finished(DownloadId),
    Failed(DownloadId, String),
    StackFinished {
        downloads: Vec<DownloadId>,
        /// Whether the stack was still registered when the callback ran.
        still_registered: bool,
    },
}

/// Delegate recording every callback, in order.
pub struct RecordingDelegate {
    events: Mutex<Vec<Event>>,
    tx: UnboundedSender<Event>,
}

impl RecordingDelegate {
    pub fn new() -> (Arc<Self>, UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let delegate = Arc::new(Self {
            events: Mutex::new(Vec::new()),
            tx,
        });
        (delegate, rx)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    fn record(&self, event: Event) {
        self.events.lock().push(event.clone());
        let _ = self.tx.send(event);
    }
}

impl DownloadDelegate for RecordingDelegate {
    fn on_download_finished(&self, download: &Download) {
        self.record(Event::Finished(download.id()));
    }

    fn on_download_failed(&self, download: &Download, error: &TransportError) {
        self.record(Event::Failed(download.id(), error.to_string()));
    }

    fn on_group_finished(&self, coordinator: &DownloadCoordinator, downloads: &[Download]) {
        let still_registered = downloads
            .first()
            .and_then(Download::group_id)
            .map_or(false, |id| coordinator.has_group(id));
        self.record(Event::StackFinished {
            downloads: downloads.iter().map(Download::id).collect(),
            still_registered,
        });
    }
}

/// Waits for the next callback.
pub async fn next_event(rx: &mut UnboundedReceiver<Event>) -> Event {
    tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("Timed out waiting for a callback")
        .expect("Delegate channel closed")
}

/// Waits for the next `count` callbacks.
pub async fn next_events(rx: &mut UnboundedReceiver<Event>, count: usize) -> Vec<Event> {
    let mut events = Vec::with_capacity(count);
    for _ in 0..count {
        events.push(next_event(rx).await);
    }
    events
}

/// Gives spawned drivers time to run, then asserts no callback arrived.
pub async fn assert_no_event(rx: &mut UnboundedReceiver<Event>) {
    settle().await;
    if let Ok(event) = rx.try_recv() {
        panic!("Unexpected callback: {:?}", event);
    }
}

/// Lets spawned download drivers make progress.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
}

// === Transport and Coordinator Helpers ===

/// Creates an in-memory transport with no routes.
pub fn create_memory_transport() -> Arc<MemoryTransport> {
    Arc::new(MemoryTransport::new())
}

/// Creates a coordinator of its own on top of `transport`.
pub fn create_test_coordinator(transport: &Arc<MemoryTransport>) -> DownloadCoordinator {
    DownloadCoordinator::new(transport.clone())
}

/// Routes `url` to a successful response carrying `body`.
pub fn respond_ok(transport: &MemoryTransport, url: &str, body: &'static str) {
    transport.respond(url, StatusCode::OK, body);
}

// === Download Creation Helpers ===

/// Creates a download for `url`.
pub fn create_test_download(url: &str) -> Download {
    Download::try_from(url).expect("Failed to create test download")
}

/// Creates one download per url, in order.
pub fn create_test_downloads(urls: &[&str]) -> Vec<Download> {
    urls.iter().map(|url| create_test_download(url)).collect()
}

/// `count` distinct URLs under `prefix`.
pub fn numbered_urls(prefix: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://example.com/{}/{}.bin", prefix, i))
        .collect()
}

/// Creates one download per url in `urls`, in order.
pub fn create_downloads_for(urls: &[String]) -> Vec<Download> {
    urls.iter().map(|url| create_test_download(url)).collect()
}

/// Id of the download an individual callback was about.
pub fn event_download(event: &Event) -> Option<DownloadId> {
    match event {
        Event::Finished(id) | Event::Failed(id, _) => Some(*id),
        Event::StackFinished { .. } => None,
    }
}

/// Ids of `downloads`, in order.
pub fn ids(downloads: &[Download]) -> Vec<DownloadId> {
    downloads.iter().map(Download::id).collect()
}

// === Assertion Helpers ===

/// Asserts that a download is in its initial state.
pub fn assert_pristine(download: &Download) {
    assert!(!download.is_finished(), "Download should not be finished");
    assert!(download.data().is_empty(), "Download should have no data");
    assert!(download.error().is_none(), "Download should have no error");
    assert!(
        download.status_code().is_none(),
        "Download should have no status code"
    );
}
