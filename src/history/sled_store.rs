//! Sled-backed history store
//!
//! Stores conversation summaries as JSON values in a dedicated sled tree,
//! keyed by conversation id, with the active-session scratch copy under a
//! single key in the default tree. This mirrors the logical layout the
//! system needs: one durable collection plus one ephemeral scratch slot.

use std::path::{Path, PathBuf};

use chrono::DateTime;
use directories::ProjectDirs;
use sled::Db;

use super::{ActiveSession, ConversationSummary, HistoryStore};
use crate::error::{ParleyError, Result};

/// Tree holding the durable summary collection
const CONVERSATIONS_TREE: &str = "conversations";

/// Key holding the scratch copy of the active session
const ACTIVE_SESSION_KEY: &str = "active-session";

/// Persistent history store backed by an embedded sled database
pub struct SledHistory {
    db: Db,
}

impl SledHistory {
    /// Opens the store at the default location
    ///
    /// The database lives in the user's data directory. The path can be
    /// overridden with the `PARLEY_HISTORY_DB` environment variable, which
    /// makes it easy to point the binary at a test database without
    /// touching the user's history.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Storage` if the data directory cannot be
    /// determined or the database cannot be opened.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("PARLEY_HISTORY_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "parley-chat", "parley")
            .ok_or_else(|| ParleyError::Storage("Could not determine data directory".into()))?;

        let db_path = proj_dirs.data_dir().join("history");
        Self::new_with_path(db_path)
    }

    /// Opens the store at the specified path
    ///
    /// Primarily useful for tests, where a temporary directory is
    /// preferable to the user's application data directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use parley::history::SledHistory;
    ///
    /// let store = SledHistory::new_with_path("/tmp/parley-history").unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ParleyError::Storage(format!("Failed to create data directory: {}", e))
            })?;
        }

        let db = Self::open_db(&db_path)?;
        Ok(Self { db })
    }

    fn open_db(path: &Path) -> Result<Db> {
        sled::open(path)
            .map_err(|e| ParleyError::Storage(format!("Failed to open database: {}", e)).into())
    }

    fn conversations(&self) -> Result<sled::Tree> {
        self.db
            .open_tree(CONVERSATIONS_TREE)
            .map_err(|e| ParleyError::Storage(format!("Failed to open tree: {}", e)).into())
    }

    /// Resolves a full id or id prefix to the stored key, if unambiguous
    fn resolve_key(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let tree = self.conversations()?;

        if tree
            .contains_key(id.as_bytes())
            .map_err(|e| ParleyError::Storage(format!("Lookup failed: {}", e)))?
        {
            return Ok(Some(id.as_bytes().to_vec()));
        }

        let mut matched = None;
        for entry in tree.scan_prefix(id.as_bytes()) {
            let (key, _) =
                entry.map_err(|e| ParleyError::Storage(format!("Iteration failed: {}", e)))?;
            if matched.is_some() {
                // Ambiguous prefix; caller must disambiguate.
                return Ok(None);
            }
            matched = Some(key.to_vec());
        }
        Ok(matched)
    }
}

impl HistoryStore for SledHistory {
    fn load(&self) -> Result<Vec<ConversationSummary>> {
        let tree = self.conversations()?;
        let mut summaries = Vec::new();

        for entry in tree.iter() {
            let (key, value) =
                entry.map_err(|e| ParleyError::Storage(format!("Iteration failed: {}", e)))?;

            match serde_json::from_slice::<ConversationSummary>(&value) {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    // Malformed content is treated as absent, never raised.
                    tracing::warn!(
                        key = %String::from_utf8_lossy(&key),
                        "Skipping corrupt history record: {}",
                        e
                    );
                }
            }
        }

        // Most recently updated first. Unparseable timestamps sort last.
        summaries.sort_by_key(|s| {
            std::cmp::Reverse(
                DateTime::parse_from_rfc3339(&s.timestamp)
                    .map(|dt| dt.timestamp_millis())
                    .unwrap_or(i64::MIN),
            )
        });

        Ok(summaries)
    }

    fn save(&self, summary: &ConversationSummary) -> Result<()> {
        let tree = self.conversations()?;

        let mut record = summary.clone();
        if record.title.is_empty() {
            // Later turns send an empty title; keep the one set on the
            // conversation's first turn.
            if let Ok(Some(existing)) = tree.get(summary.id.as_bytes()) {
                if let Ok(previous) = serde_json::from_slice::<ConversationSummary>(&existing) {
                    record.title = previous.title;
                }
            }
        }

        let value = serde_json::to_vec(&record)
            .map_err(|e| ParleyError::Storage(format!("Serialization failed: {}", e)))?;

        tree.insert(record.id.as_bytes(), value)
            .map_err(|e| ParleyError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| ParleyError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn find(&self, id: &str) -> Result<Option<ConversationSummary>> {
        let Some(key) = self.resolve_key(id)? else {
            return Ok(None);
        };

        let tree = self.conversations()?;
        match tree
            .get(&key)
            .map_err(|e| ParleyError::Storage(format!("Get failed: {}", e)))?
        {
            Some(value) => match serde_json::from_slice(&value) {
                Ok(summary) => Ok(Some(summary)),
                Err(e) => {
                    tracing::warn!("Stored record for {} is corrupt: {}", id, e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn delete(&self, id: &str) -> Result<()> {
        let Some(key) = self.resolve_key(id)? else {
            return Ok(());
        };

        let tree = self.conversations()?;
        tree.remove(&key)
            .map_err(|e| ParleyError::Storage(format!("Delete failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| ParleyError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }

    fn load_active(&self) -> Result<Option<ActiveSession>> {
        match self
            .db
            .get(ACTIVE_SESSION_KEY)
            .map_err(|e| ParleyError::Storage(format!("Get failed: {}", e)))?
        {
            Some(value) => match serde_json::from_slice(&value) {
                Ok(active) => Ok(Some(active)),
                Err(e) => {
                    tracing::warn!("Scratch copy is corrupt, treating as absent: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn save_active(&self, active: &ActiveSession) -> Result<()> {
        let value = serde_json::to_vec(active)
            .map_err(|e| ParleyError::Storage(format!("Serialization failed: {}", e)))?;
        self.db
            .insert(ACTIVE_SESSION_KEY, value)
            .map_err(|e| ParleyError::Storage(format!("Insert failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| ParleyError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }

    fn clear_active(&self) -> Result<()> {
        self.db
            .remove(ACTIVE_SESSION_KEY)
            .map_err(|e| ParleyError::Storage(format!("Remove failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| ParleyError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}
