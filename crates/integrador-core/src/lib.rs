//! Foundational filesystem utilities shared across integrador crates.
//!
//! Provides the write-then-rename helper used for mailbox commands, the
//! move-into-directory helper used to archive consumed responses, and the
//! millisecond clock read for exchange records.

pub mod archive;
pub mod atomic_io;
pub mod time_utils;

pub use archive::move_into_dir;
pub use atomic_io::{temp_path_for, write_text_atomic};
pub use time_utils::current_unix_timestamp_ms;
