//! Shared types for EDLT: rank tracks, ledger categories and display
//! formatting. Consumed by the ingestion core and by any front end reading
//! the projected tables.

pub mod formatting;
pub mod ledger;
pub mod ranks;

pub use ledger::{MaterialCategory, ProfitCategory};
pub use ranks::{ProgressStyle, RankTrack};
