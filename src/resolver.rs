//! Persisted city-name to region-code cache with remote fallback.
//!
//! The cache file is the sole durable copy of the mapping; the in-memory map
//! is an exclusively owned working copy loaded once at construction. A hit
//! answers from memory with no remote call. A miss issues exactly one
//! [`RegionLookup`] call, inserts the result, and rewrites the whole file.
//! Failed lookups are never cached, so a later call for the same name
//! retries the remote service.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{error::AmapError, geocode::RegionLookup};

/// City-name to region-code resolver backed by a JSON cache file.
pub struct CityResolver<L> {
    lookup: L,
    cache_path: PathBuf,
    codes: HashMap<String, String>,
}

impl<L: RegionLookup> CityResolver<L> {
    /// Open the resolver, loading the persisted mapping from `cache_path`.
    ///
    /// A missing, unreadable, or corrupt cache file is treated as an empty
    /// mapping; resolution still works for every name, it just starts cold.
    pub fn open(cache_path: impl AsRef<Path>, lookup: L) -> Self {
        let cache_path = cache_path.as_ref().to_path_buf();
        let codes = load_store(&cache_path);

        debug!(path = %cache_path.display(), entries = codes.len(), "city-code cache loaded");

        Self {
            lookup,
            cache_path,
            codes,
        }
    }

    /// Resolve a city name to its region code.
    ///
    /// Names are matched case-sensitively, exactly as supplied.
    ///
    /// # Errors
    ///
    /// Returns [`AmapError::NoMatch`] when the remote service has no
    /// candidate for `name`, or the underlying transport/decoding error when
    /// the lookup attempt itself fails. No outcome is cached on error.
    pub async fn resolve(&mut self, name: &str) -> Result<String, AmapError> {
        if let Some(code) = self.codes.get(name) {
            debug!(name, code = %code, "cache hit");
            return Ok(code.clone());
        }

        debug!(name, "cache miss, querying geocode service");
        let code = self
            .lookup
            .region_code(name)
            .await?
            .ok_or_else(|| AmapError::NoMatch(name.to_string()))?;

        self.codes.insert(name.to_string(), code.clone());
        self.persist();

        Ok(code)
    }

    /// Whether `name` is present in the in-memory mapping.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.codes.contains_key(name)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Rewrite the whole store file. Persistence is best-effort: on failure
    /// the in-memory entry stays and the error is only logged.
    fn persist(&self) {
        let serialized = match serde_json::to_string_pretty(&self.codes) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to serialize city-code cache");
                return;
            }
        };

        if let Err(e) = std::fs::write(&self.cache_path, serialized) {
            warn!(
                path = %self.cache_path.display(),
                error = %e,
                "failed to persist city-code cache"
            );
        }
    }
}

fn load_store(path: &Path) -> HashMap<String, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            if path.exists() {
                warn!(path = %path.display(), error = %e, "city-code cache unreadable, starting empty");
            }
            return HashMap::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(codes) => codes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "city-code cache corrupt, starting empty");
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted lookup that counts remote calls through a shared counter.
    struct ScriptedLookup {
        calls: Arc<AtomicUsize>,
        answers: HashMap<String, Option<String>>,
        fail_with: Option<String>,
    }

    impl ScriptedLookup {
        fn new(answers: &[(&str, Option<&str>)]) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                answers: answers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.map(String::from)))
                    .collect(),
                fail_with: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                answers: HashMap::new(),
                fail_with: Some(message.to_string()),
            }
        }

        fn counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait]
    impl RegionLookup for ScriptedLookup {
        async fn region_code(&self, name: &str) -> Result<Option<String>, AmapError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.fail_with {
                return Err(AmapError::ConnectionError(message.clone()));
            }
            Ok(self.answers.get(name).cloned().flatten())
        }
    }

    fn seeded_store(dir: &tempfile::TempDir, entries: &[(&str, &str)]) -> PathBuf {
        let path = dir.path().join("city_code_cache.json");
        let map: HashMap<&str, &str> = entries.iter().copied().collect();
        std::fs::write(&path, serde_json::to_string_pretty(&map).unwrap()).unwrap();
        path
    }

    fn read_store(path: &Path) -> HashMap<String, String> {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_hit_issues_no_remote_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_store(&dir, &[("Paris", "75056")]);
        let lookup = ScriptedLookup::new(&[]);
        let calls = lookup.counter();

        let mut resolver = CityResolver::open(&path, lookup);
        let code = resolver.resolve("Paris").await.unwrap();

        assert_eq!(code, "75056");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_miss_queries_once_then_caches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("city_code_cache.json");
        let lookup = ScriptedLookup::new(&[("Berlin", Some("BE100"))]);
        let calls = lookup.counter();

        let mut resolver = CityResolver::open(&path, lookup);

        let code = resolver.resolve("Berlin").await.unwrap();
        assert_eq!(code, "BE100");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Second resolution of the same name is served from memory.
        let code = resolver.resolve("Berlin").await.unwrap();
        assert_eq!(code, "BE100");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("city_code_cache.json");

        {
            let lookup = ScriptedLookup::new(&[("Berlin", Some("BE100"))]);
            let mut resolver = CityResolver::open(&path, lookup);
            resolver.resolve("Berlin").await.unwrap();
        }

        // Reopen with a lookup that would fail; the store answers instead.
        let offline = ScriptedLookup::failing("network down");
        let calls = offline.counter();
        let mut resolver = CityResolver::open(&path, offline);
        let code = resolver.resolve("Berlin").await.unwrap();

        assert_eq!(code, "BE100");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_match_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_store(&dir, &[("Paris", "75056")]);
        let lookup = ScriptedLookup::new(&[("Atlantis", None)]);

        let mut resolver = CityResolver::open(&path, lookup);
        let err = resolver.resolve("Atlantis").await.unwrap_err();

        assert!(matches!(err, AmapError::NoMatch(_)));
        assert_eq!(err.to_string(), "no match found for 'Atlantis'");
        assert!(!resolver.contains("Atlantis"));

        // The persisted store is untouched.
        let store = read_store(&path);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("Paris").map(String::as_str), Some("75056"));
    }

    #[tokio::test]
    async fn test_failure_allows_retry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("city_code_cache.json");
        let lookup = ScriptedLookup::new(&[("Atlantis", None)]);
        let calls = lookup.counter();

        let mut resolver = CityResolver::open(&path, lookup);

        // A failure is not cached, so each attempt re-hits the network.
        assert!(resolver.resolve("Atlantis").await.is_err());
        assert!(resolver.resolve("Atlantis").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces_cause() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("city_code_cache.json");
        let lookup = ScriptedLookup::failing("connection refused");

        let mut resolver = CityResolver::open(&path, lookup);
        let err = resolver.resolve("Berlin").await.unwrap_err();

        assert!(matches!(err, AmapError::ConnectionError(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_corrupt_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("city_code_cache.json");
        std::fs::write(&path, "{not valid json").unwrap();

        let lookup = ScriptedLookup::new(&[("Berlin", Some("BE100"))]);
        let mut resolver = CityResolver::open(&path, lookup);

        assert!(resolver.is_empty());
        // Resolution proceeds normally after recovery.
        assert_eq!(resolver.resolve("Berlin").await.unwrap(), "BE100");
    }

    #[tokio::test]
    async fn test_missing_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does_not_exist.json");

        let resolver = CityResolver::open(&path, ScriptedLookup::new(&[]));

        assert!(resolver.is_empty());
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_memory_entry() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the cache path makes every write fail.
        let path = dir.path().join("cache_as_dir");
        std::fs::create_dir(&path).unwrap();

        let lookup = ScriptedLookup::new(&[("Berlin", Some("BE100"))]);
        let calls = lookup.counter();
        let mut resolver = CityResolver::open(&path, lookup);

        // Persistence fails silently; the result is still returned and kept.
        assert_eq!(resolver.resolve("Berlin").await.unwrap(), "BE100");
        assert!(resolver.contains("Berlin"));

        // And the in-memory copy keeps answering without remote calls.
        assert_eq!(resolver.resolve("Berlin").await.unwrap(), "BE100");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_names_are_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_store(&dir, &[("Paris", "75056")]);
        let lookup = ScriptedLookup::new(&[("paris", None)]);
        let calls = lookup.counter();

        let mut resolver = CityResolver::open(&path, lookup);

        assert!(resolver.resolve("paris").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mixed_hits_misses_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_store(&dir, &[("Paris", "75056")]);
        let lookup = ScriptedLookup::new(&[("Atlantis", None), ("Berlin", Some("BE100"))]);
        let calls = lookup.counter();

        let mut resolver = CityResolver::open(&path, lookup);

        assert_eq!(resolver.resolve("Paris").await.unwrap(), "75056");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(resolver.resolve("Atlantis").await.is_err());
        assert_eq!(read_store(&path).len(), 1);

        assert_eq!(resolver.resolve("Berlin").await.unwrap(), "BE100");
        let store = read_store(&path);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("Paris").map(String::as_str), Some("75056"));
        assert_eq!(store.get("Berlin").map(String::as_str), Some("BE100"));
    }
}
