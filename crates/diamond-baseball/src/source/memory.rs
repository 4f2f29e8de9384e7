// In-memory record source for tests and embedding callers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{RecordSource, SourceError};
use crate::stats::{RawStatRecord, Role};

#[derive(Debug, Clone)]
enum Entry {
    Rows(Vec<RawStatRecord>),
    Failure(String),
}

/// Serves preloaded rows per (season, role). Unknown keys return an empty
/// table; keys registered with [`MemorySource::fail`] return
/// [`SourceError::Unavailable`].
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: HashMap<(i32, Role), Entry>,
    calls: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rows served for `season` and `role`.
    pub fn with_rows(mut self, season: i32, role: Role, rows: Vec<RawStatRecord>) -> Self {
        self.tables.insert((season, role), Entry::Rows(rows));
        self
    }

    /// Make `season`/`role` fail with `reason`.
    pub fn fail(mut self, season: i32, role: Role, reason: impl Into<String>) -> Self {
        self.tables.insert((season, role), Entry::Failure(reason.into()));
        self
    }

    /// Number of `fetch` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn fetch(&self, season: i32, role: Role) -> Result<Vec<RawStatRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.tables.get(&(season, role)) {
            Some(Entry::Rows(rows)) => Ok(rows.clone()),
            Some(Entry::Failure(reason)) => Err(SourceError::Unavailable {
                role,
                season,
                reason: reason.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}
