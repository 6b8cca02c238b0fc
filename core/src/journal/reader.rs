//! Incremental reader for a journal file that is still being written.
//!
//! The reader remembers a byte offset and a buffer of bytes after the last
//! newline. Each `read_lines` call returns only complete lines; a partial
//! line stays buffered until its terminator arrives.

use memchr::memchr_iter;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Unattached,
    Attached,
    Rotating,
    /// Open attempts exhausted; reads return nothing until reattached.
    Degraded,
    Stopped,
}

/// Where a freshly opened file is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAt {
    Beginning,
    End,
}

/// Bounded retry for opening a file the producer may be holding.
#[derive(Debug, Clone, Copy)]
pub struct AttachPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for AttachPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff: Duration::from_millis(100),
        }
    }
}

pub struct TailReader {
    state: ReaderState,
    policy: AttachPolicy,
    path: Option<PathBuf>,
    file: Option<File>,
    offset: u64,
    pending: Vec<u8>,
    /// Start position used when recovering from `Degraded`.
    resume_from: StartAt,
}

impl TailReader {
    pub fn new(policy: AttachPolicy) -> Self {
        Self {
            state: ReaderState::Unattached,
            policy,
            path: None,
            file: None,
            offset: 0,
            pending: Vec::new(),
            resume_from: StartAt::End,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Open `path` and position at end of file, so only lines appended
    /// afterwards are delivered.
    pub fn attach(&mut self, path: &Path) -> ReaderState {
        self.open(path, StartAt::End)
    }

    /// Switch to a newly created file and read it from the beginning.
    pub fn rotate(&mut self, path: &Path) -> ReaderState {
        self.state = ReaderState::Rotating;
        if !self.pending.is_empty() {
            tracing::debug!(
                bytes = self.pending.len(),
                "Discarding unterminated line from previous journal"
            );
        }
        self.close();
        self.open(path, StartAt::Beginning)
    }

    /// Retry a degraded attach. No-op in any other state.
    pub fn reattach(&mut self) -> ReaderState {
        if self.state != ReaderState::Degraded {
            return self.state;
        }
        match self.path.clone() {
            Some(path) => self.open(&path, self.resume_from),
            None => self.state,
        }
    }

    /// Close the file. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.state == ReaderState::Stopped {
            return;
        }
        self.close();
        self.state = ReaderState::Stopped;
    }

    /// All lines completed since the previous call, without terminators.
    pub fn read_lines(&mut self) -> Vec<Vec<u8>> {
        if self.state != ReaderState::Attached {
            return Vec::new();
        }

        match self.read_appended() {
            Ok(chunk) if chunk.is_empty() => Vec::new(),
            Ok(chunk) => {
                self.pending.extend_from_slice(&chunk);
                self.split_complete_lines()
            }
            Err(e) => {
                let path = self.path.clone();
                tracing::warn!(error = %e, "Journal read failed, reattaching from start");
                self.close();
                if let Some(path) = path {
                    self.open(&path, StartAt::Beginning);
                }
                Vec::new()
            }
        }
    }

    fn open(&mut self, path: &Path, start: StartAt) -> ReaderState {
        self.path = Some(path.to_path_buf());
        self.resume_from = start;
        self.pending.clear();

        match open_with_retry(path, start, self.policy) {
            Ok((file, offset)) => {
                tracing::info!(path = %path.display(), offset, "Attached to journal");
                self.file = Some(file);
                self.offset = offset;
                self.state = ReaderState::Attached;
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    attempts = self.policy.attempts,
                    "Could not open journal, reader degraded"
                );
                self.file = None;
                self.offset = 0;
                self.state = ReaderState::Degraded;
            }
        }
        self.state
    }

    fn close(&mut self) {
        self.file = None;
        self.pending.clear();
        self.offset = 0;
    }

    fn read_appended(&mut self) -> io::Result<Vec<u8>> {
        let Some(file) = self.file.as_mut() else {
            return Ok(Vec::new());
        };

        let len = file.metadata()?.len();
        if len < self.offset {
            tracing::warn!(
                previous = self.offset,
                current = len,
                "Journal shrank, restarting from the beginning"
            );
            self.offset = 0;
            self.pending.clear();
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let mut chunk = Vec::with_capacity((len - self.offset) as usize);
        let read = file.read_to_end(&mut chunk)?;
        self.offset += read as u64;
        Ok(chunk)
    }

    fn split_complete_lines(&mut self) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let mut start = 0;
        for end in memchr_iter(b'\n', &self.pending) {
            let line = &self.pending[start..end];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            lines.push(line.to_vec());
            start = end + 1;
        }
        self.pending.drain(..start);
        lines
    }
}

fn open_with_retry(path: &Path, start: StartAt, policy: AttachPolicy) -> io::Result<(File, u64)> {
    let attempts = policy.attempts.max(1);
    let mut delay = policy.backoff;
    let mut attempt = 1;
    loop {
        match open_at(path, start) {
            Ok(opened) => return Ok(opened),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    attempt,
                    error = %e,
                    "Journal open failed, retrying"
                );
                std::thread::sleep(delay);
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
        }
    }
}

fn open_at(path: &Path, start: StartAt) -> io::Result<(File, u64)> {
    let mut file = File::open(path)?;
    let offset = match start {
        StartAt::Beginning => 0,
        StartAt::End => file.seek(SeekFrom::End(0))?,
    };
    Ok((file, offset))
}
