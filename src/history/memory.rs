//! In-memory history store
//!
//! A [`HistoryStore`] backed by a mutex-guarded map, used by tests and by
//! front ends that want a session without durable history. Behaves exactly
//! like the sled store with respect to merge and title-preservation rules.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{ActiveSession, ConversationSummary, HistoryStore};
use crate::error::{ParleyError, Result};

/// Volatile history store for tests and history-less front ends
#[derive(Default)]
pub struct MemoryHistory {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    summaries: HashMap<String, ConversationSummary>,
    active: Option<ActiveSession>,
    /// When set, every operation fails. Lets tests exercise the session's
    /// storage-unavailable degradation path.
    fail: bool,
}

impl MemoryHistory {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation return a storage error
    pub fn fail_all(&self) {
        self.inner.lock().expect("history lock poisoned").fail = true;
    }

    fn check(&self, inner: &Inner) -> Result<()> {
        if inner.fail {
            Err(ParleyError::Storage("history unavailable".into()).into())
        } else {
            Ok(())
        }
    }
}

impl HistoryStore for MemoryHistory {
    fn load(&self) -> Result<Vec<ConversationSummary>> {
        let inner = self.inner.lock().expect("history lock poisoned");
        self.check(&inner)?;
        let mut summaries: Vec<_> = inner.summaries.values().cloned().collect();
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(summaries)
    }

    fn save(&self, summary: &ConversationSummary) -> Result<()> {
        let mut inner = self.inner.lock().expect("history lock poisoned");
        self.check(&inner)?;

        let mut record = summary.clone();
        if record.title.is_empty() {
            if let Some(previous) = inner.summaries.get(&record.id) {
                record.title = previous.title.clone();
            }
        }
        inner.summaries.insert(record.id.clone(), record);
        Ok(())
    }

    fn find(&self, id: &str) -> Result<Option<ConversationSummary>> {
        let inner = self.inner.lock().expect("history lock poisoned");
        self.check(&inner)?;

        if let Some(summary) = inner.summaries.get(id) {
            return Ok(Some(summary.clone()));
        }
        let mut matches = inner.summaries.values().filter(|s| s.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(summary), None) => Ok(Some(summary.clone())),
            _ => Ok(None),
        }
    }

    fn delete(&self, id: &str) -> Result<()> {
        let key = self.find(id)?.map(|s| s.id);
        let mut inner = self.inner.lock().expect("history lock poisoned");
        self.check(&inner)?;
        if let Some(key) = key {
            inner.summaries.remove(&key);
        }
        Ok(())
    }

    fn load_active(&self) -> Result<Option<ActiveSession>> {
        let inner = self.inner.lock().expect("history lock poisoned");
        self.check(&inner)?;
        Ok(inner.active.clone())
    }

    fn save_active(&self, active: &ActiveSession) -> Result<()> {
        let mut inner = self.inner.lock().expect("history lock poisoned");
        self.check(&inner)?;
        inner.active = Some(active.clone());
        Ok(())
    }

    fn clear_active(&self) -> Result<()> {
        let mut inner = self.inner.lock().expect("history lock poisoned");
        self.check(&inner)?;
        inner.active = None;
        Ok(())
    }
}
