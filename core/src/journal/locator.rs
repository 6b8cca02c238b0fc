//! Finding the active journal file in a directory.
//!
//! The game names files `Journal.<timestamp>.<part>.log`. The newest file by
//! modification time is the one being written. Ties on mtime fall back to the
//! timestamp embedded in the name, then to the name itself.

use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const JOURNAL_PREFIX: &str = "Journal.";
pub const JOURNAL_SUFFIX: &str = ".log";

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("journal directory {path:?} is unavailable: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no journal files in {0:?}")]
    NoJournalFiles(PathBuf),
}

/// Ordering key for journal files; larger is newer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalKey {
    modified: SystemTime,
    session: Option<(NaiveDateTime, u32)>,
    name: OsString,
}

impl PartialOrd for JournalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JournalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.modified
            .cmp(&other.modified)
            .then_with(|| self.session.cmp(&other.session))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// True if the file name follows the journal naming convention.
pub fn is_journal_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(JOURNAL_PREFIX) && n.ends_with(JOURNAL_SUFFIX))
}

/// Extract the session start time and part number from a journal file name.
///
/// Accepts `Journal.2024-01-01T120000.01.log` and the legacy
/// `Journal.240101120000.01.log`.
pub fn parse_journal_filename(name: &str) -> Option<(NaiveDateTime, u32)> {
    let stem = name
        .strip_prefix(JOURNAL_PREFIX)?
        .strip_suffix(JOURNAL_SUFFIX)?;
    let (stamp, part) = stem.rsplit_once('.')?;
    let part = part.parse::<u32>().ok()?;
    let when = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H%M%S")
        .or_else(|_| NaiveDateTime::parse_from_str(stamp, "%y%m%d%H%M%S"))
        .ok()?;
    Some((when, part))
}

/// Sort key for a journal file, or `None` if it cannot be stat'ed.
pub fn journal_key(path: &Path) -> Option<JournalKey> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let name = path.file_name()?.to_os_string();
    let session = name.to_str().and_then(parse_journal_filename);
    Some(JournalKey {
        modified,
        session,
        name,
    })
}

/// True if `candidate` should replace `current` as the active journal.
pub fn is_newer(candidate: &Path, current: &Path) -> bool {
    if candidate == current {
        return false;
    }
    match (journal_key(candidate), journal_key(current)) {
        (Some(c), Some(cur)) => c > cur,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Most recently modified journal file in `dir`.
pub fn find_latest_journal(dir: &Path) -> Result<PathBuf, LocateError> {
    let entries = fs::read_dir(dir).map_err(|e| LocateError::DirectoryUnavailable {
        path: dir.to_path_buf(),
        source: e,
    })?;

    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_journal_file(path))
        .filter_map(|path| journal_key(&path).map(|key| (key, path)))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, path)| path)
        .ok_or_else(|| LocateError::NoJournalFiles(dir.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(dir: &Path, name: &str, modified: SystemTime) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(modified).unwrap();
        path
    }

    #[test]
    fn picks_most_recently_modified() {
        let dir = tempfile::tempdir().unwrap();
        let base = SystemTime::now() - Duration::from_secs(600);
        touch(dir.path(), "Journal.2024-01-01T100000.01.log", base);
        let newest = touch(
            dir.path(),
            "Journal.2023-12-31T100000.01.log",
            base + Duration::from_secs(60),
        );
        touch(dir.path(), "Status.json", base + Duration::from_secs(120));

        assert_eq!(find_latest_journal(dir.path()).unwrap(), newest);
    }

    #[test]
    fn equal_mtime_breaks_on_session_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let when = SystemTime::now() - Duration::from_secs(60);
        touch(dir.path(), "Journal.2024-01-01T100000.01.log", when);
        let later = touch(dir.path(), "Journal.2024-01-01T110000.01.log", when);

        assert_eq!(find_latest_journal(dir.path()).unwrap(), later);
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            find_latest_journal(&missing),
            Err(LocateError::DirectoryUnavailable { .. })
        ));
    }

    #[test]
    fn empty_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Cargo.json", SystemTime::now());
        assert!(matches!(
            find_latest_journal(dir.path()),
            Err(LocateError::NoJournalFiles(_))
        ));
    }

    #[test]
    fn filename_timestamps() {
        let (when, part) = parse_journal_filename("Journal.2024-03-05T214455.02.log").unwrap();
        assert_eq!(when.to_string(), "2024-03-05 21:44:55");
        assert_eq!(part, 2);

        let (legacy, part) = parse_journal_filename("Journal.180101120000.01.log").unwrap();
        assert_eq!(legacy.to_string(), "2018-01-01 12:00:00");
        assert_eq!(part, 1);

        assert!(parse_journal_filename("Journal.garbage.log").is_none());
        assert!(parse_journal_filename("Status.json").is_none());
    }

    #[test]
    fn newer_requires_a_later_key() {
        let dir = tempfile::tempdir().unwrap();
        let base = SystemTime::now() - Duration::from_secs(300);
        let old = touch(dir.path(), "Journal.2024-01-01T100000.01.log", base);
        let new = touch(
            dir.path(),
            "Journal.2024-01-01T120000.01.log",
            base + Duration::from_secs(10),
        );

        assert!(is_newer(&new, &old));
        assert!(!is_newer(&old, &new));
        assert!(!is_newer(&new, &new));
        assert!(is_journal_file(&new));
        assert!(!is_journal_file(Path::new("Journal.txt")));
    }
}
