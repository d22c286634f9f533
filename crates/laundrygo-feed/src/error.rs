use thiserror::Error;

/// Errors returned by the realtime database client and its streams.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network or TLS failure, or a non-2xx status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid database URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A record key the database would reject, or an empty one.
    #[error("invalid record key '{0}'")]
    InvalidKey(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with a body of the wrong shape.
    #[error("unexpected response from {context}: {detail}")]
    UnexpectedResponse { context: String, detail: String },

    /// The event stream dropped or went quiet; a reconnect may succeed.
    #[error("event stream disconnected: {0}")]
    Disconnected(String),

    /// The server cancelled the stream, usually because security rules
    /// no longer allow reading the location.
    #[error("event stream cancelled by server: {0}")]
    Cancelled(String),

    #[error("event stream credential revoked")]
    AuthRevoked,
}
