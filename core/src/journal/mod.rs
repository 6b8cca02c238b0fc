//! Journal files: locating, tailing and decoding them.

pub mod event;
pub mod locator;
pub mod parser;
pub mod reader;

pub use event::{JournalEvent, ProjectionError};
pub use locator::{
    LocateError, find_latest_journal, is_journal_file, is_newer, parse_journal_filename,
};
pub use parser::{ParseRejection, log_rejection, parse_bytes, parse_line};
pub use reader::{AttachPolicy, ReaderState, StartAt, TailReader};
