//! Incremental `text/event-stream` parsing and the database's event vocabulary.
//!
//! [`SseParser`] accepts arbitrary byte chunks (lines and even UTF-8
//! sequences may straddle chunk boundaries) and yields complete events.

use serde::Deserialize;
use serde_json::Value;

use crate::error::FeedError;

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and collect every event it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(event) = self.process_line(&String::from_utf8_lossy(&line)) {
                events.push(event);
            }
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() && event.is_none() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

/// A decoded database stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// Replace the value at `path`; `null` deletes it.
    Put { path: String, data: Value },
    /// Merge the children of `data` into the value at `path`.
    Patch { path: String, data: Value },
    KeepAlive,
    Cancel(String),
    AuthRevoked,
    /// Event types this client does not handle.
    Other(String),
}

#[derive(Deserialize)]
struct PathData {
    path: String,
    #[serde(default)]
    data: Value,
}

impl StreamMessage {
    /// Decode an [`SseEvent`] from the database stream.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Deserialize`] when a `put` or `patch` payload is
    /// not a `{"path", "data"}` object.
    pub fn from_event(event: &SseEvent) -> Result<Self, FeedError> {
        let decode = |kind: &str| {
            serde_json::from_str::<PathData>(&event.data).map_err(|source| FeedError::Deserialize {
                context: format!("stream {kind} event"),
                source,
            })
        };
        Ok(match event.event.as_str() {
            "put" => {
                let PathData { path, data } = decode("put")?;
                Self::Put { path, data }
            }
            "patch" => {
                let PathData { path, data } = decode("patch")?;
                Self::Patch { path, data }
            }
            "keep-alive" => Self::KeepAlive,
            "cancel" => Self::Cancel(cancel_reason(&event.data)),
            "auth_revoked" => Self::AuthRevoked,
            other => Self::Other(other.to_string()),
        })
    }
}

fn cancel_reason(data: &str) -> String {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::String(reason)) => reason,
        Ok(Value::Null) => "no reason given".to_string(),
        _ if data.trim().is_empty() => "no reason given".to_string(),
        _ => data.trim().to_string(),
    }
}
