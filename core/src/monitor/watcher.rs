use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::journal::is_journal_file;

/// Work items for the ingestion worker, consumed in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchMessage {
    /// A journal file appeared in the directory.
    Created(PathBuf),
    /// A journal file grew.
    Modified(PathBuf),
    /// Periodic poll; catches changes the watcher missed.
    Tick,
    Shutdown,
}

/// Watch `dir` (non-recursively) and forward journal changes to `tx`.
/// Dropping the returned watcher unsubscribes.
pub fn watch_directory(
    dir: &Path,
    tx: UnboundedSender<WatchMessage>,
) -> notify::Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        match result {
            Ok(event) => {
                for message in classify(&event) {
                    if tx.send(message).is_err() {
                        tracing::debug!("Journal watcher receiver dropped");
                        return;
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "Journal watcher error"),
        }
    })?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    tracing::info!(path = %dir.display(), "Watching journal directory");
    Ok(watcher)
}

fn classify(event: &Event) -> Vec<WatchMessage> {
    let wrap: fn(PathBuf) -> WatchMessage = match event.kind {
        EventKind::Create(_) => WatchMessage::Created,
        EventKind::Modify(_) => WatchMessage::Modified,
        _ => return Vec::new(),
    };
    event
        .paths
        .iter()
        .filter(|p| is_journal_file(p))
        .cloned()
        .map(wrap)
        .collect()
}

/// Send `Tick` every `interval` until aborted or the receiver is gone.
pub fn spawn_ticker(interval: Duration, tx: UnboundedSender<WatchMessage>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if tx.send(WatchMessage::Tick).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn only_journal_creates_and_modifies_are_forwarded() {
        let journal = PathBuf::from("/j/Journal.2024-01-01T000000.01.log");
        let status = PathBuf::from("/j/Status.json");

        let created = Event::new(EventKind::Create(CreateKind::File))
            .add_path(journal.clone())
            .add_path(status.clone());
        assert_eq!(classify(&created), vec![WatchMessage::Created(journal.clone())]);

        let modified = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(journal.clone());
        assert_eq!(classify(&modified), vec![WatchMessage::Modified(journal.clone())]);

        let removed = Event::new(EventKind::Remove(RemoveKind::File)).add_path(journal);
        assert!(classify(&removed).is_empty());
    }
}
