//! Event processor: the per-delivery transaction pipeline.
//!
//! One delivered transaction event runs through a short, sequential
//! pipeline: decode and validate the payload, load the user's saving
//! rules (cache first), apply the rule engine, persist everything through
//! the ledger store's composite operation, then derive and store
//! recommendations from the updated window.
//!
//! The pipeline tolerates at-least-once redelivery: persistence is
//! idempotent on the event's dedup token, so running the same event twice
//! converges on the same stored state. Failure classification
//! (`ProcessError::is_retryable`) tells the delivery adapter whether to
//! acknowledge or let the transport redeliver.

pub mod cache;
pub mod error;
pub mod event;
mod pipeline;

pub use cache::RulesCache;
pub use error::ProcessError;
pub use event::TransactionEvent;
pub use pipeline::{EventProcessor, ProcessedEvent};
