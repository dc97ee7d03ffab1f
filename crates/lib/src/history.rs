//! # Chat History Store
//!
//! Persists every (question, answer) exchange per user in a single JSON
//! file. Writes go through an async mutex and a temp-file rename, so
//! concurrent per-user appends cannot interleave partial writes; only the
//! most recent turns are ever read back, older ones stay on disk for audit.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

/// The default number of turns read back per user.
pub const DEFAULT_MAX_HISTORY_TURNS: usize = 5;

/// One (question, answer) exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub user: String,
    pub bot: String,
}

/// Errors raised while appending to the history file. Reading never fails:
/// a missing or corrupt store degrades to an empty history.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to write history file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

type HistoryMap = HashMap<String, Vec<HistoryTurn>>;

/// The on-disk chat log, keyed by user identifier.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryStore {
    /// Creates a store backed by `path`. The file is created lazily on the
    /// first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns at most the last `max_turns` turns for `user_id` in
    /// chronological order. A user with no prior history gets an empty vec.
    pub async fn load(&self, user_id: &str, max_turns: usize) -> Vec<HistoryTurn> {
        let _guard = self.lock.lock().await;
        let mut turns = read_map(&self.path)
            .await
            .remove(user_id)
            .unwrap_or_default();
        if turns.len() > max_turns {
            turns.drain(..turns.len() - max_turns);
        }
        turns
    }

    /// Appends one turn for `user_id`, durably, before returning.
    ///
    /// The whole file is read, modified and rewritten under the store lock;
    /// the rename at the end means a failed write leaves the previous file
    /// intact rather than a truncated one.
    pub async fn append(
        &self,
        user_id: &str,
        user_message: &str,
        bot_response: &str,
    ) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().await;

        let mut map = read_map(&self.path).await;
        map.entry(user_id.to_string())
            .or_default()
            .push(HistoryTurn {
                user: user_message.to_string(),
                bot: bot_response.to_string(),
            });

        let serialized = serde_json::to_string_pretty(&map)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, serialized).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

/// Reads the full history map. A missing file is an empty map; an unreadable
/// or corrupt one is reset to empty with a warning instead of failing the
/// whole service.
async fn read_map(path: &Path) -> HistoryMap {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HistoryMap::new(),
        Err(e) => {
            warn!("Failed to read history file {}: {e}", path.display());
            return HistoryMap::new();
        }
    };

    match serde_json::from_slice(&raw) {
        Ok(map) => map,
        Err(e) => {
            warn!(
                "History file {} is malformed ({e}); starting from an empty history.",
                path.display()
            );
            HistoryMap::new()
        }
    }
}
