//! # FileLog: append-only action log
//!
//! Writes one line per philosopher state change, flushing after each line:
//! ```text
//! Philosopher #0: is hungry
//! Philosopher #0: is eating
//! Philosopher #4: is hungry
//! Philosopher #0: is thinking
//! ```
//!
//! Best effort: write errors are logged and the event is skipped; they never
//! reach the philosophers.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Append-only text log of state changes.
pub struct FileLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLog {
    /// Truncates (or creates) `path` and opens it for appending.
    pub async fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        File::create(&path).await?;
        let file = OpenOptions::new().append(true).open(&path).await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(ev: &Event) -> Option<String> {
        match (ev.kind, ev.seat, ev.state) {
            (EventKind::StateChanged, Some(seat), Some(state)) => {
                Some(format!("Philosopher #{seat}: {}\n", state.action()))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl Subscribe for FileLog {
    async fn on_event(&self, ev: &Event) {
        let Some(line) = Self::render(ev) else {
            return;
        };
        let mut file = self.file.lock().await;
        let res = match file.write_all(line.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = res {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to append to log file");
        }
    }

    fn name(&self) -> &'static str {
        "file-log"
    }
}
