//! Lifecycle of the background ingestion worker.
//!
//! `start` does all fallible setup up front so errors surface to the caller
//! while the controller is still idle. Locating, opening the database and
//! attaching all block, so they run on the blocking pool; so does the worker,
//! which is fed by the directory watcher and a poll ticker.

use notify::RecommendedWatcher;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;

use super::MonitorError;
use super::pipeline::{MonitorShared, Pipeline, StatsSnapshot};
use super::watcher::{WatchMessage, spawn_ticker, watch_directory};
use crate::context::AppConfig;
use crate::journal::{AttachPolicy, ReaderState, TailReader, find_latest_journal};
use crate::storage::IngestionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Starting,
    Running,
    Stopping,
}

struct RunningMonitor {
    tx: UnboundedSender<WatchMessage>,
    watcher: RecommendedWatcher,
    ticker: JoinHandle<()>,
    worker: JoinHandle<()>,
}

pub struct MonitorController {
    config: AppConfig,
    state: MonitorState,
    shared: Arc<MonitorShared>,
    running: Option<RunningMonitor>,
}

impl MonitorController {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: MonitorState::Idle,
            shared: Arc::new(MonitorShared::default()),
            running: None,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == MonitorState::Running
    }

    /// Counters of the current (or most recent) run.
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Number of events newly persisted in the current run.
    pub fn ingested_count(&self) -> u64 {
        self.stats().ingested
    }

    pub fn active_file(&self) -> Option<PathBuf> {
        self.shared.active_file()
    }

    /// Begin tailing the newest journal in `directory`.
    pub async fn start(&mut self, directory: &Path) -> Result<(), MonitorError> {
        if self.state != MonitorState::Idle {
            return Err(MonitorError::AlreadyRunning);
        }

        self.state = MonitorState::Starting;
        match self.launch(directory).await {
            Ok(running) => {
                self.running = Some(running);
                self.state = MonitorState::Running;
                tracing::info!(directory = %directory.display(), "Journal monitor started");
                Ok(())
            }
            Err(e) => {
                self.state = MonitorState::Idle;
                tracing::error!(directory = %directory.display(), error = %e, "Journal monitor failed to start");
                Err(e)
            }
        }
    }

    async fn launch(&mut self, directory: &Path) -> Result<RunningMonitor, MonitorError> {
        let policy = AttachPolicy {
            attempts: self.config.attach_retries,
            backoff: self.config.attach_backoff(),
        };
        let (dir, db) = (directory.to_path_buf(), self.config.database_path.clone());
        let (store, reader) =
            tokio::task::spawn_blocking(move || prepare(&dir, &db, policy)).await??;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let watcher = watch_directory(directory, tx.clone())?;

        let shared = Arc::new(MonitorShared::default());
        self.shared = Arc::clone(&shared);
        let dir = directory.to_path_buf();
        let worker = tokio::task::spawn_blocking(move || {
            let mut pipeline = Pipeline::new(dir, reader, store, &shared);
            while let Some(message) = rx.blocking_recv() {
                if pipeline.handle(message).is_break() {
                    break;
                }
            }
            pipeline.finish();
        });
        let ticker = spawn_ticker(self.config.poll_interval(), tx.clone());

        Ok(RunningMonitor {
            tx,
            watcher,
            ticker,
            worker,
        })
    }

    /// Signal the worker and wait (bounded) for it to finish. No-op when idle.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        self.state = MonitorState::Stopping;

        self.shared.cancel.store(true, Ordering::Release);
        let _ = running.tx.send(WatchMessage::Shutdown);
        drop(running.watcher);
        running.ticker.abort();

        match tokio::time::timeout(self.config.stop_timeout(), running.worker).await {
            Ok(Ok(())) => tracing::info!(stats = ?self.stats(), "Journal monitor stopped"),
            Ok(Err(e)) => tracing::error!(error = %e, "Journal worker panicked"),
            Err(_) => tracing::warn!(
                timeout_ms = self.config.stop_timeout_ms,
                "Journal worker did not stop in time"
            ),
        }
        self.state = MonitorState::Idle;
    }
}

/// Open the store and attach to the newest journal in `directory`.
fn prepare(
    directory: &Path,
    db: &Path,
    policy: AttachPolicy,
) -> Result<(IngestionStore, TailReader), MonitorError> {
    let latest = find_latest_journal(directory)?;
    let store = IngestionStore::open(db)?;

    let mut reader = TailReader::new(policy);
    if reader.attach(&latest) == ReaderState::Degraded {
        tracing::warn!(path = %latest.display(), "Starting with degraded reader, will retry on poll");
    }
    Ok((store, reader))
}

impl Drop for MonitorController {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            self.shared.cancel.store(true, Ordering::Release);
            let _ = running.tx.send(WatchMessage::Shutdown);
            running.ticker.abort();
        }
    }
}
