//! Background monitoring of the journal directory.

mod controller;
mod pipeline;
mod watcher;

use std::path::PathBuf;

use crate::journal::LocateError;
use crate::storage::StoreError;

pub use controller::{MonitorController, MonitorState};
pub use pipeline::{MonitorShared, MonitorStats, Pipeline, StatsSnapshot, replay_file};
pub use watcher::{WatchMessage, spawn_ticker, watch_directory};

/// Fatal errors that keep the monitor from starting.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("monitor is already running")]
    AlreadyRunning,
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("cannot watch journal directory: {0}")]
    Watch(#[from] notify::Error),
    #[error("cannot read journal {0:?}")]
    Unreadable(PathBuf),
    #[error("monitor setup task failed: {0}")]
    Setup(#[from] tokio::task::JoinError),
}
