//! Core copy operations.
//!
//! [`copy_directory`] drives a whole run; [`copy_file`] applies the same
//! conflict rules to a single file. Both write through a [`Sink`].

mod dir;
mod file;
mod sink;
mod utils;

pub use dir::copy_directory;
pub use file::copy_file;
pub use sink::{CopyOutcome, DryRunSink, FsSink, Sink};
