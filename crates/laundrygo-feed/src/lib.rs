//! Realtime record feed: REST reads and writes against the database plus
//! live subscriptions over server-sent events.

pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod snapshot;
pub mod sse;
pub mod subscription;

pub use client::RealtimeClient;
pub use error::FeedError;
pub use snapshot::{decode_records, SnapshotTree};
pub use subscription::{FeedEvent, MemoryFeed, RecordFeed, Subscription};
