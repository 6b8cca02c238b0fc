//! Durable storage: the raw event log and the projections derived from it.

mod db;
mod projections;
pub mod queries;
mod schema;
mod store;

pub use projections::PLACEHOLDER_PILOT;
pub use store::{IngestOutcome, IngestionStore, StoreError};
