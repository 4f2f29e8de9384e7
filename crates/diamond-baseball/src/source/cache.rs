// Memoization of fetched tables keyed by (role, season).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use super::{RecordSource, SourceError};
use crate::stats::{RawStatRecord, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub role: Role,
    pub season: i32,
}

impl CacheKey {
    pub fn new(role: Role, season: i32) -> Self {
        Self { role, season }
    }
}

/// Fetched tables held for the life of the process. Entries only leave
/// through [`RecordCache::invalidate`] or [`RecordCache::clear`].
#[derive(Debug, Default)]
pub struct RecordCache {
    entries: Mutex<HashMap<CacheKey, Vec<RawStatRecord>>>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panics if the mutex is poisoned.
    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Vec<RawStatRecord>>> {
        self.entries.lock().expect("record cache mutex poisoned")
    }

    pub fn get(&self, key: CacheKey) -> Option<Vec<RawStatRecord>> {
        self.entries().get(&key).cloned()
    }

    pub fn insert(&self, key: CacheKey, rows: Vec<RawStatRecord>) {
        self.entries().insert(key, rows);
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&self, key: CacheKey) -> bool {
        self.entries().remove(&key).is_some()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn contains(&self, key: CacheKey) -> bool {
        self.entries().contains_key(&key)
    }
}

/// Wraps a source so each (role, season) is fetched at most once until
/// invalidated. Failures are not cached.
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    cache: RecordCache,
}

impl<S: RecordSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RecordCache::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    pub fn invalidate(&self, season: i32, role: Role) -> bool {
        self.cache.invalidate(CacheKey::new(role, season))
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Bypass the cache, then store the fresh result.
    pub async fn fetch_fresh(
        &self,
        season: i32,
        role: Role,
    ) -> Result<Vec<RawStatRecord>, SourceError> {
        let rows = self.inner.fetch(season, role).await?;
        self.cache.insert(CacheKey::new(role, season), rows.clone());
        Ok(rows)
    }
}

#[async_trait]
impl<S: RecordSource> RecordSource for CachedSource<S> {
    async fn fetch(&self, season: i32, role: Role) -> Result<Vec<RawStatRecord>, SourceError> {
        let key = CacheKey::new(role, season);
        if let Some(rows) = self.cache.get(key) {
            debug!("cache hit for {role} {season}");
            return Ok(rows);
        }
        self.fetch_fresh(season, role).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::stats::{RawBatterRecord, RawStatRecord};

    fn row(name: &str, season: i32) -> RawStatRecord {
        RawStatRecord::Batter(RawBatterRecord {
            name: name.into(),
            season,
            hits: Some(1.0),
            ..RawBatterRecord::default()
        })
    }

    fn source() -> CachedSource<MemorySource> {
        CachedSource::new(
            MemorySource::new()
                .with_rows(2023, Role::Batter, vec![row("A", 2023)])
                .with_rows(2024, Role::Batter, vec![row("B", 2024)])
                .fail(2022, Role::Batter, "timeout"),
        )
    }

    #[tokio::test]
    async fn repeated_fetch_hits_cache() {
        let source = source();
        let first = source.fetch(2023, Role::Batter).await.unwrap();
        let second = source.fetch(2023, Role::Batter).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(source.inner().calls(), 1);
        assert!(source.cache().contains(CacheKey::new(Role::Batter, 2023)));
    }

    #[tokio::test]
    async fn keys_are_separate_per_season_and_role() {
        let source = source();
        source.fetch(2023, Role::Batter).await.unwrap();
        source.fetch(2024, Role::Batter).await.unwrap();
        source.fetch(2023, Role::Pitcher).await.unwrap();
        assert_eq!(source.inner().calls(), 3);
        assert_eq!(source.cache().len(), 3);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let source = source();
        source.fetch(2023, Role::Batter).await.unwrap();
        assert!(source.invalidate(2023, Role::Batter));
        assert!(!source.invalidate(2023, Role::Batter));
        source.fetch(2023, Role::Batter).await.unwrap();
        assert_eq!(source.inner().calls(), 2);
    }

    #[tokio::test]
    async fn fetch_fresh_bypasses_and_refreshes() {
        let source = source();
        source.fetch(2024, Role::Batter).await.unwrap();
        source.fetch_fresh(2024, Role::Batter).await.unwrap();
        source.fetch(2024, Role::Batter).await.unwrap();
        assert_eq!(source.inner().calls(), 2);
    }

    #[tokio::test]
    async fn clear_empties_cache() {
        let source = source();
        source.fetch(2023, Role::Batter).await.unwrap();
        source.fetch(2024, Role::Batter).await.unwrap();
        source.clear();
        assert!(source.cache().is_empty());
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let source = source();
        assert!(source.fetch(2022, Role::Batter).await.is_err());
        assert!(source.fetch(2022, Role::Batter).await.is_err());
        assert_eq!(source.inner().calls(), 2);
        assert!(source.cache().is_empty());
    }
}
