//! The task that keeps a [`DiscoveryState`] current.
//!
//! One Tokio task owns the feed subscription, the pending location request
//! and the [`DiscoveryModel`]. It publishes through a `watch` channel, so
//! readers always see the newest state and never a stale intermediate one.

use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use laundrygo_core::{AppConfig, FilterKind};
use laundrygo_feed::{FeedEvent, RecordFeed, Subscription};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::location::LocationProvider;
use crate::view::{DiscoveryModel, DiscoveryState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    pub filter: FilterKind,
    /// Feed location holding the shop records.
    pub path: String,
    /// Upper bound on the location request.
    pub location_timeout: Duration,
}

impl DiscoveryOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig, filter: FilterKind) -> Self {
        Self {
            filter,
            path: config.records_path.clone(),
            location_timeout: Duration::from_secs(config.location_timeout_secs),
        }
    }
}

/// Owner of a running discovery task.
///
/// Dropping the handle, or calling [`DiscoveryHandle::shutdown`], stops the
/// task. That releases the feed subscription and abandons the location
/// request.
#[derive(Debug)]
pub struct DiscoveryHandle {
    state: watch::Receiver<DiscoveryState>,
    task: Option<JoinHandle<()>>,
}

impl DiscoveryHandle {
    /// The latest published state.
    #[must_use]
    pub fn state(&self) -> DiscoveryState {
        self.state.borrow().clone()
    }

    /// A receiver that observes every future state.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<DiscoveryState> {
        self.state.clone()
    }

    /// Wait for the next state change.
    ///
    /// Returns `None` once the task has finished and no further change can
    /// arrive.
    pub async fn changed(&mut self) -> Option<DiscoveryState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Wait until the state is no longer loading and return it.
    ///
    /// If the task finishes first, the last published state is returned.
    pub async fn ready(&mut self) -> DiscoveryState {
        if let Ok(state) = self.state.wait_for(|s| !s.loading).await {
            return state.clone();
        }
        self.state()
    }

    pub fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        tracing::debug!("discovery shut down");
    }
}

impl Drop for DiscoveryHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Activate discovery: subscribe to the feed and request the location
/// concurrently, re-ranking on every change.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_discovery<F, L>(feed: &F, location: L, options: DiscoveryOptions) -> DiscoveryHandle
where
    F: RecordFeed + ?Sized,
    L: LocationProvider + 'static,
{
    tracing::info!(filter = %options.filter, path = %options.path, "starting discovery");
    let subscription = feed.subscribe(&options.path);
    let model = DiscoveryModel::new(options.filter);
    let (tx, rx) = watch::channel(model.state());
    let task = tokio::spawn(drive(
        subscription,
        location,
        options.location_timeout,
        model,
        tx,
    ));
    DiscoveryHandle {
        state: rx,
        task: Some(task),
    }
}

/// Runs until every reader is gone, or until the feed has ended and the
/// location has settled.
async fn drive<L: LocationProvider>(
    mut subscription: Subscription,
    location: L,
    location_timeout: Duration,
    mut model: DiscoveryModel,
    tx: watch::Sender<DiscoveryState>,
) {
    let locate = tokio::time::timeout(location_timeout, location.current_location());
    tokio::pin!(locate);
    let mut location_pending = true;
    let mut feed_open = true;

    loop {
        tokio::select! {
            () = tx.closed() => {
                tracing::debug!("no state readers left, stopping discovery");
                break;
            }
            result = &mut locate, if location_pending => {
                location_pending = false;
                match result {
                    Ok(outcome) => {
                        if let Err(err) = &outcome {
                            tracing::warn!(error = %err, "location request failed");
                        }
                        model.apply_location(outcome);
                    }
                    Err(_) => {
                        tracing::warn!(
                            timeout_secs = location_timeout.as_secs_f64(),
                            "location request timed out"
                        );
                        model.location_timed_out();
                    }
                }
            }
            event = subscription.next(), if feed_open => match event {
                Some(FeedEvent::Snapshot(records)) => {
                    tracing::debug!(count = records.len(), "feed snapshot");
                    model.apply_snapshot(records, Utc::now());
                }
                Some(FeedEvent::Error(message)) => {
                    tracing::warn!(error = %message, "feed error");
                    model.apply_feed_error(&message);
                }
                None => {
                    tracing::info!("feed ended");
                    feed_open = false;
                    if location_pending {
                        continue;
                    }
                    break;
                }
            },
        }
        tx.send_replace(model.state());
        if !feed_open && !location_pending {
            break;
        }
    }
}
