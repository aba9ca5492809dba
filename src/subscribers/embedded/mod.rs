//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders every event through `tracing`.
//! - [`FileLog`]: append-only text file, one line per philosopher state change.

mod file;
mod log;

pub use file::FileLog;
pub use log::LogWriter;
