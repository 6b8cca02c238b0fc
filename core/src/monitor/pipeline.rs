//! The ingestion worker body: tail → parse → ingest, one line at a time.
//!
//! Kept free of async so it can be driven directly from tests and from the
//! one-shot replay command.

use serde::Serialize;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use super::MonitorError;
use super::watcher::WatchMessage;
use crate::journal::{
    AttachPolicy, ParseRejection, ReaderState, TailReader, find_latest_journal, is_newer,
    log_rejection, parse_bytes,
};
use crate::storage::{IngestOutcome, IngestionStore};

#[derive(Debug, Default)]
pub struct MonitorStats {
    ingested: AtomicU64,
    duplicates: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
    rotations: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub ingested: u64,
    pub duplicates: u64,
    pub rejected: u64,
    pub failed: u64,
    pub rotations: u64,
}

impl MonitorStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ingested: self.ingested.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// State shared between the worker and its controller.
#[derive(Debug, Default)]
pub struct MonitorShared {
    pub stats: MonitorStats,
    pub cancel: AtomicBool,
    active_file: Mutex<Option<PathBuf>>,
}

impl MonitorShared {
    pub fn active_file(&self) -> Option<PathBuf> {
        self.active_file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_active_file(&self, path: Option<PathBuf>) {
        *self
            .active_file
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = path;
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

pub struct Pipeline<'a> {
    directory: PathBuf,
    reader: TailReader,
    store: IngestionStore,
    shared: &'a MonitorShared,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        directory: PathBuf,
        reader: TailReader,
        store: IngestionStore,
        shared: &'a MonitorShared,
    ) -> Self {
        shared.set_active_file(reader.path().map(Path::to_path_buf));
        Self {
            directory,
            reader,
            store,
            shared,
        }
    }

    /// Process one message. `Break` means the worker should exit.
    pub fn handle(&mut self, message: WatchMessage) -> ControlFlow<()> {
        if self.shared.cancelled() {
            return ControlFlow::Break(());
        }

        match message {
            WatchMessage::Shutdown => return ControlFlow::Break(()),
            WatchMessage::Created(path) => self.consider_rotation(Some(path)),
            WatchMessage::Modified(path) => {
                if self.reader.path() != Some(path.as_path()) {
                    self.consider_rotation(Some(path));
                }
            }
            WatchMessage::Tick => {
                if self.reader.state() == ReaderState::Degraded {
                    self.reader.reattach();
                }
                self.consider_rotation(None);
            }
        }

        self.drain();
        if self.shared.cancelled() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Close the reader once the worker is done.
    pub fn finish(mut self) {
        self.reader.stop();
        tracing::info!(stats = ?self.shared.stats.snapshot(), "Journal worker stopped");
    }

    /// Ingest everything readable right now.
    pub fn drain(&mut self) {
        for line in self.reader.read_lines() {
            if self.shared.cancelled() {
                return;
            }
            self.ingest_line(&line);
        }
    }

    /// Switch to `candidate` (or the newest file in the directory) if it is
    /// newer than the current file. Remaining lines of the old file are
    /// ingested first.
    fn consider_rotation(&mut self, candidate: Option<PathBuf>) {
        let candidate = match candidate {
            Some(path) => path,
            None => match find_latest_journal(&self.directory) {
                Ok(path) => path,
                Err(e) => {
                    tracing::debug!(error = %e, "No rotation candidate");
                    return;
                }
            },
        };

        let newer = match self.reader.path() {
            Some(current) => is_newer(&candidate, current),
            None => true,
        };
        if !newer {
            return;
        }

        self.drain();
        tracing::info!(
            from = ?self.reader.path(),
            to = %candidate.display(),
            "Journal rotated"
        );
        self.reader.rotate(&candidate);
        MonitorStats::bump(&self.shared.stats.rotations);
        self.shared.set_active_file(Some(candidate));
    }

    fn ingest_line(&mut self, line: &[u8]) {
        let stats = &self.shared.stats;
        let event = match parse_bytes(line) {
            Ok(event) => event,
            Err(ParseRejection::Empty) => return,
            Err(reason) => {
                log_rejection(&reason, line);
                MonitorStats::bump(&stats.rejected);
                return;
            }
        };

        match self.store.ingest(&event) {
            Ok(IngestOutcome::Ingested) => MonitorStats::bump(&stats.ingested),
            Ok(IngestOutcome::Duplicate) => {
                tracing::debug!(event = %event.event_type, "Duplicate event skipped");
                MonitorStats::bump(&stats.duplicates);
            }
            Err(e) => {
                tracing::error!(
                    event = %event.event_type,
                    timestamp = %event.timestamp,
                    error = %e,
                    "Failed to ingest event"
                );
                MonitorStats::bump(&stats.failed);
            }
        }
    }
}

/// Ingest a whole journal file from the beginning. Lines already stored are
/// counted as duplicates.
pub fn replay_file(path: &Path, store: IngestionStore) -> Result<StatsSnapshot, MonitorError> {
    let shared = MonitorShared::default();
    let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut reader = TailReader::new(AttachPolicy::default());
    if reader.rotate(path) != ReaderState::Attached {
        return Err(MonitorError::Unreadable(path.to_path_buf()));
    }

    let mut pipeline = Pipeline::new(directory, reader, store, &shared);
    pipeline.drain();
    pipeline.finish();
    Ok(shared.stats.snapshot())
}
