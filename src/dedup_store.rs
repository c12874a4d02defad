use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::models::is_valid_item_id;
use crate::utils::error::{AppError, Result};

/// Persistent set of item ids that have already been notified.
///
/// Backed by a line-oriented, append-only text file (one id per line) and
/// mirrored in memory for membership checks. The file is only ever appended
/// to, so the cost of a run is proportional to the new items it records.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    seen: HashSet<String>,
}

impl DedupStore {
    /// Create an empty store backed by `path`. Call [`DedupStore::load`] to
    /// read the existing history.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seen: HashSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read persisted ids into memory and return a snapshot of them.
    ///
    /// A missing file is a first run and yields an empty set. Any other read
    /// failure is [`AppError::StorageUnavailable`].
    pub async fn load(&mut self) -> Result<HashSet<String>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No item history yet, starting empty");
                Vec::new()
            }
            Err(e) => {
                return Err(AppError::StorageUnavailable {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        let mut skipped = 0usize;
        for line in text.lines() {
            let id = line.trim();
            if id.is_empty() {
                continue;
            }
            if is_valid_item_id(id) {
                self.seen.insert(id.to_string());
            } else {
                skipped += 1;
                tracing::debug!(path = %self.path.display(), line = %line, "Skipping unparseable history line");
            }
        }

        if skipped > 0 {
            tracing::warn!(path = %self.path.display(), skipped, "Item history contained unparseable lines");
        }
        tracing::info!(path = %self.path.display(), count = self.seen.len(), "Loaded item history");

        Ok(self.seen.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Append `id` to the log and the in-memory set.
    ///
    /// The in-memory set is updated even when the append fails, so an item
    /// reached through several queries is notified once per run. A failed
    /// append is returned as [`AppError::StorageWrite`]; the item may then be
    /// notified again on the next run.
    ///
    /// Ids that would not read back as a single history line are refused with
    /// [`AppError::Validation`] and leave both the file and the set untouched.
    pub async fn record(&mut self, id: &str) -> Result<()> {
        if !is_valid_item_id(id) {
            return Err(AppError::Validation(format!("refusing to record item id {:?}", id)));
        }
        self.seen.insert(id.to_string());

        self.append(id).await.map_err(|e| AppError::StorageWrite {
            path: self.path.clone(),
            source: e,
        })
    }

    async fn append(&self, id: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", id).as_bytes()).await?;
        file.sync_data().await?;
        Ok(())
    }
}
