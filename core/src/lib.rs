pub mod context;
pub mod game_data;
pub mod journal;
pub mod monitor;
pub mod storage;

// Re-exports for convenience
pub use context::{AppConfig, ConfigError};
pub use journal::{JournalEvent, ParseRejection, ProjectionError};
pub use monitor::{MonitorController, MonitorError, MonitorState, StatsSnapshot};
pub use storage::{IngestOutcome, IngestionStore, StoreError};
