//! Bulk import engine
//!
//! Streams a delimited product file through normalization, deduplication, and
//! batched insert-or-update writes, publishing progress snapshots after every
//! flush and honoring cooperative cancellation at batch boundaries. Terminal
//! states trigger webhook notification.
//!
//! Component layering, leaf first: [`normalizer`] and [`dedup`] are pure and
//! synchronous; [`writer`] owns the bulk SQL; [`progress`] is the process-wide
//! task registry shared with the HTTP surface; [`pipeline`] drives one import
//! end to end; [`worker`] runs pipelines on a bounded background pool;
//! [`notify`] delivers terminal events to registered webhooks.

pub mod dedup;
pub mod normalizer;
pub mod notify;
pub mod pipeline;
pub mod progress;
pub mod types;
pub mod worker;
pub mod writer;

pub use progress::ImportRegistry;
pub use types::{ImportStatus, ImportTask};
