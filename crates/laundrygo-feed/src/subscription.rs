//! Push-based record subscriptions.
//!
//! A [`Subscription`] is a [`Stream`] of [`FeedEvent`]s backed by a reader
//! task. Dropping it, or calling [`Subscription::unsubscribe`], aborts that
//! task and releases whatever it holds (an HTTP stream, a channel receiver).

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use laundrygo_core::ShopRecord;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Buffered events per subscription before the reader task waits.
pub(crate) const EVENT_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// The full, current record list at the subscribed location.
    Snapshot(Vec<ShopRecord>),
    /// A human-readable failure. The stream may keep going (reconnect) or end.
    Error(String),
}

/// Source of live record snapshots.
pub trait RecordFeed: Send + Sync {
    /// Start listening to `path`.
    ///
    /// Must be called from within a Tokio runtime.
    fn subscribe(&self, path: &str) -> Subscription;
}

#[derive(Debug)]
pub struct Subscription {
    events: mpsc::Receiver<FeedEvent>,
    reader: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn new(events: mpsc::Receiver<FeedEvent>, reader: JoinHandle<()>) -> Self {
        Self {
            events,
            reader: Some(reader),
        }
    }

    /// Wait for the next event; `None` once the feed has ended.
    pub async fn next_event(&mut self) -> Option<FeedEvent> {
        self.events.recv().await
    }

    /// Stop listening and release the underlying connection.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Stream for Subscription {
    type Item = FeedEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().events.poll_recv(cx)
    }
}

/// In-process feed for offline use and tests.
///
/// Every subscriber receives the latest published event on subscribe and
/// each later one. The `path` argument is ignored.
#[derive(Debug, Clone)]
pub struct MemoryFeed {
    latest: watch::Sender<Option<FeedEvent>>,
}

impl Default for MemoryFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFeed {
    /// A feed that has not delivered anything yet.
    #[must_use]
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self { latest }
    }

    #[must_use]
    pub fn with_records(records: Vec<ShopRecord>) -> Self {
        let feed = Self::new();
        feed.publish(records);
        feed
    }

    pub fn publish(&self, records: Vec<ShopRecord>) {
        self.latest.send_replace(Some(FeedEvent::Snapshot(records)));
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.latest.send_replace(Some(FeedEvent::Error(message.into())));
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.latest.receiver_count()
    }
}

impl RecordFeed for MemoryFeed {
    fn subscribe(&self, path: &str) -> Subscription {
        tracing::debug!(path, "memory feed subscription opened");
        let mut latest = self.latest.subscribe();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let reader = tokio::spawn(async move {
            loop {
                let current = latest.borrow_and_update().clone();
                if let Some(event) = current {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
                if latest.changed().await.is_err() {
                    return;
                }
            }
        });
        Subscription::new(rx, reader)
    }
}
