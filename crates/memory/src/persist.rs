//! Durable persistence for the memory document.
//!
//! The file is rewritten wholesale on each flush — no incremental format.
//! Crash-safety: the new content goes to a `.tmp` sibling first, then an
//! atomic rename replaces the original.  A crash before the rename leaves
//! the old file untouched; after it, a consistent new file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::io::AsyncWriteExt;

use crate::schema::MemoryFile;

#[derive(Debug, Clone)]
pub struct MemoryFileStore {
    path: PathBuf,
}

impl MemoryFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted document; a missing file is an empty store, and
    /// a corrupt file is treated the same (memory is an assistive cache,
    /// not a system of record) after a warning.
    pub fn load(&self) -> MemoryFile {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return MemoryFile::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "corrupt memory file — starting from an empty store"
                );
                MemoryFile::default()
            }
        }
    }

    /// Write the whole document atomically (tmp file + rename).  The
    /// `.tmp` sibling is cleaned up on any error path.
    pub async fn save(&self, file: &MemoryFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = {
            let filename = self
                .path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "memory.json".to_string());
            self.path.with_file_name(format!("{filename}.tmp"))
        };

        let write_result: Result<()> = async {
            let mut out = tokio::fs::File::create(&tmp_path).await?;
            out.write_all(serde_json::to_string_pretty(file)?.as_bytes())
                .await?;
            out.flush().await?;
            out.sync_all().await?;
            Ok(())
        }
        .await;

        if let Err(err) = write_result {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err);
        }

        if let Err(err) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }

        Ok(())
    }
}
