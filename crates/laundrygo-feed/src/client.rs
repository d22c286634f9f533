//! HTTP client for the realtime database REST protocol.
//!
//! Every location is addressed as `{base}/{path}.json`, with the optional
//! auth token passed as the `auth` query parameter. One-shot reads and writes
//! go through [`retry_with_backoff`]; live reads use a server-sent event
//! stream that is mirrored into a [`SnapshotTree`].

use std::time::Duration;

use futures::StreamExt;
use laundrygo_core::{AppConfig, ShopDraft, ShopRecord};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::FeedError;
use crate::retry::{backoff_delay, is_retriable, is_unsent, retry_when, retry_with_backoff};
use crate::snapshot::{decode_records, SnapshotTree};
use crate::sse::{SseParser, StreamMessage};
use crate::subscription::{FeedEvent, RecordFeed, Subscription, EVENT_BUFFER};

const DEFAULT_USER_AGENT: &str = "laundrygo/0.1 (laundry-discovery)";

/// The server sends a keep-alive every 30 s; silence past this means the
/// connection is dead.
const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Characters the database forbids in keys.
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '#', '$', '[', ']', '/'];

/// Client for one realtime database.
///
/// Cheap to clone; clones share the connection pool. Use
/// [`RealtimeClient::from_config`] in binaries or
/// [`RealtimeClient::with_base_url`] to point at a mock server in tests.
#[derive(Clone)]
pub struct RealtimeClient {
    client: Client,
    stream_client: Client,
    base_url: Url,
    auth: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.auth.as_ref().map(|_| "[redacted]"))
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

impl RealtimeClient {
    /// Build a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`FeedError::InvalidUrl`] if the database
    /// URL does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, FeedError> {
        let client = Self::build(
            &config.database_url,
            config.database_auth.as_deref(),
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        Ok(client.with_retry_policy(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`RealtimeClient::from_config`].
    pub fn with_base_url(
        base_url: &str,
        auth: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, FeedError> {
        Self::build(base_url, auth, timeout_secs, DEFAULT_USER_AGENT)
    }

    fn build(
        base_url: &str,
        auth: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        // A total timeout would cut every stream off; idle streams are
        // detected with STREAM_IDLE_TIMEOUT instead.
        let stream_client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| FeedError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FeedError::InvalidUrl {
                url: base_url.to_string(),
                reason: "URL cannot carry a path".to_owned(),
            });
        }

        Ok(Self {
            client,
            stream_client,
            base_url,
            auth: auth.filter(|a| !a.is_empty()).map(str::to_owned),
            max_retries: 3,
            backoff_base_ms: 1_000,
        })
    }

    /// Override the retry budget used by writes, reads and stream reconnects.
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Read every record under `path` once.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Http`] on network failure or non-2xx HTTP status.
    /// - [`FeedError::Deserialize`] if the body is not JSON.
    pub async fn fetch_records(&self, path: &str) -> Result<Vec<ShopRecord>, FeedError> {
        let url = self.build_url(path)?;
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_json(self.client.get(url.clone()), path)
        })
        .await?;
        Ok(decode_records(&body))
    }

    /// Read one record, or `None` if nothing is stored under `id`.
    ///
    /// # Errors
    ///
    /// Same as [`RealtimeClient::fetch_records`], plus
    /// [`FeedError::InvalidKey`] for an unusable `id`.
    pub async fn fetch_record(&self, path: &str, id: &str) -> Result<Option<ShopRecord>, FeedError> {
        let child = child_path(path, id)?;
        let url = self.build_url(&child)?;
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_json(self.client.get(url.clone()), &child)
        })
        .await?;
        Ok(ShopRecord::from_payload(id.trim(), &body))
    }

    /// Append a new record under `path` and return its generated key.
    ///
    /// Only retried when the request never reached the server, so a slow
    /// response cannot produce a duplicate entry.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Http`] on network failure or non-2xx HTTP status.
    /// - [`FeedError::UnexpectedResponse`] if the server does not return the
    ///   generated key.
    pub async fn create_record(&self, path: &str, draft: &ShopDraft) -> Result<String, FeedError> {
        let url = self.build_url(path)?;
        let body = retry_when(is_unsent, self.max_retries, self.backoff_base_ms, || {
            self.send_json(self.client.post(url.clone()).json(draft), path)
        })
        .await?;
        let PushResponse { name } =
            serde_json::from_value(body).map_err(|e| FeedError::UnexpectedResponse {
                context: format!("create under {path}"),
                detail: e.to_string(),
            })?;
        tracing::info!(path, key = %name, "record created");
        Ok(name)
    }

    /// Merge `draft` into the record at `path/id`.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidKey`] for an unusable `id`.
    /// - [`FeedError::Http`] on network failure or non-2xx HTTP status.
    pub async fn update_record(
        &self,
        path: &str,
        id: &str,
        draft: &ShopDraft,
    ) -> Result<(), FeedError> {
        let child = child_path(path, id)?;
        let url = self.build_url(&child)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_json(self.client.patch(url.clone()).json(draft), &child)
        })
        .await?;
        tracing::info!(path, id, "record updated");
        Ok(())
    }

    /// Remove the record at `path/id`. Removing a missing record succeeds.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidKey`] for an unusable `id`.
    /// - [`FeedError::Http`] on network failure or non-2xx HTTP status.
    pub async fn delete_record(&self, path: &str, id: &str) -> Result<(), FeedError> {
        let child = child_path(path, id)?;
        let url = self.build_url(&child)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_json(self.client.delete(url.clone()), &child)
        })
        .await?;
        tracing::info!(path, id, "record deleted");
        Ok(())
    }

    /// Builds `{base}/{path}.json`, appending the auth token when configured.
    fn build_url(&self, path: &str) -> Result<Url, FeedError> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| FeedError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_owned(),
            })?;
            segments.pop_if_empty();
            match parts.split_last() {
                Some((last, init)) => {
                    segments.extend(init);
                    segments.push(&format!("{last}.json"));
                }
                None => {
                    segments.push(".json");
                }
            }
        }
        if let Some(auth) = &self.auth {
            url.query_pairs_mut().append_pair("auth", auth);
        }
        Ok(url)
    }

    /// Sends a request, asserts a 2xx HTTP status, and parses the response
    /// body as JSON.
    async fn send_json(&self, request: RequestBuilder, context: &str) -> Result<Value, FeedError> {
        let response = request.send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FeedError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

impl RecordFeed for RealtimeClient {
    fn subscribe(&self, path: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let path = path.to_owned();
        let reader = match self.build_url(&path) {
            Ok(url) => {
                let stream = EventStream {
                    client: self.stream_client.clone(),
                    url,
                    path,
                    max_retries: self.max_retries,
                    backoff_base_ms: self.backoff_base_ms,
                };
                tokio::spawn(stream.run(tx))
            }
            Err(err) => tokio::spawn(async move {
                let _ = tx.send(FeedEvent::Error(err.to_string())).await;
            }),
        };
        Subscription::new(rx, reader)
    }
}

fn child_path(path: &str, id: &str) -> Result<String, FeedError> {
    let id = id.trim();
    if id.is_empty() || id.contains(FORBIDDEN_KEY_CHARS) {
        return Err(FeedError::InvalidKey(id.to_owned()));
    }
    Ok(format!("{}/{id}", path.trim_end_matches('/')))
}

/// Reader task state for one subscription.
struct EventStream {
    client: Client,
    url: Url,
    path: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl EventStream {
    /// Keep the subscription alive until the receiver goes away or the
    /// failure budget is spent. Every failure is reported as an error event.
    async fn run(self, tx: mpsc::Sender<FeedEvent>) {
        tracing::info!(path = %self.path, "subscription opened");
        let mut tree = SnapshotTree::new();
        let mut failures = 0u32;
        loop {
            let mut delivered = false;
            let err = match self.read(&mut tree, &tx, &mut delivered).await {
                Ok(()) => {
                    tracing::info!(path = %self.path, "subscriber gone, closing stream");
                    return;
                }
                Err(err) => err,
            };
            if delivered {
                failures = 0;
            }
            tracing::warn!(path = %self.path, failures, error = %err, "event stream failed");
            if tx.send(FeedEvent::Error(err.to_string())).await.is_err() {
                return;
            }
            if !is_retriable(&err) || failures >= self.max_retries {
                tracing::info!(path = %self.path, "giving up on event stream");
                return;
            }
            failures += 1;
            tokio::time::sleep(backoff_delay(failures, self.backoff_base_ms)).await;
        }
    }

    /// Read one connection to its end.
    ///
    /// `Ok(())` means the receiver was dropped; every other exit is an error.
    async fn read(
        &self,
        tree: &mut SnapshotTree,
        tx: &mpsc::Sender<FeedEvent>,
        delivered: &mut bool,
    ) -> Result<(), FeedError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?
            .error_for_status()?;
        let mut body = response.bytes_stream();
        let mut parser = SseParser::new();

        loop {
            let chunk = match tokio::time::timeout(STREAM_IDLE_TIMEOUT, body.next()).await {
                Err(_) => {
                    return Err(FeedError::Disconnected(format!(
                        "no data for {}s",
                        STREAM_IDLE_TIMEOUT.as_secs()
                    )))
                }
                Ok(None) => return Err(FeedError::Disconnected("server closed the stream".into())),
                Ok(Some(chunk)) => chunk?,
            };

            for event in parser.push(&chunk) {
                let message = match StreamMessage::from_event(&event) {
                    Ok(message) => message,
                    Err(err) => {
                        tracing::warn!(path = %self.path, error = %err, "skipping malformed event");
                        continue;
                    }
                };
                match message {
                    StreamMessage::Put { path, data } => {
                        tracing::debug!(path = %self.path, at = %path, "put");
                        tree.put(&path, data);
                    }
                    StreamMessage::Patch { path, data } => {
                        tracing::debug!(path = %self.path, at = %path, "patch");
                        tree.patch(&path, data);
                    }
                    StreamMessage::KeepAlive => {
                        tracing::trace!(path = %self.path, "keep-alive");
                        continue;
                    }
                    StreamMessage::Cancel(reason) => return Err(FeedError::Cancelled(reason)),
                    StreamMessage::AuthRevoked => return Err(FeedError::AuthRevoked),
                    StreamMessage::Other(kind) => {
                        tracing::debug!(path = %self.path, kind = %kind, "ignoring unknown event");
                        continue;
                    }
                }
                if tx.send(FeedEvent::Snapshot(tree.records())).await.is_err() {
                    return Ok(());
                }
                *delivered = true;
            }
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
