//! Schema context
//!
//! Loads the schema documentation that grounds SQL generation and
//! caches it so the retry loop never re-reads the file per attempt.
//! The cache is bounded (last N distinct paths) and is invalidated
//! only by an explicit `refresh()` — regenerating the docs after a
//! schema change is the external trigger, there is no TTL.

use crate::error::{CopilotError, Result};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

const CACHE_CAPACITY: usize = 8;

struct DocCache {
    entries: HashMap<PathBuf, String>,
    order: VecDeque<PathBuf>,
}

impl DocCache {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn insert(&mut self, path: PathBuf, text: String) {
        if self.entries.insert(path.clone(), text).is_none() {
            self.order.push_back(path);
            while self.order.len() > CACHE_CAPACITY {
                if let Some(evicted) = self.order.pop_front() {
                    self.entries.remove(&evicted);
                }
            }
        }
    }
}

/// Cached view over the schema documentation file.
///
/// Safe for concurrent readers; `refresh()` may race with readers and
/// only affects subsequent `get_schema_text()` calls.
pub struct SchemaContext {
    path: PathBuf,
    cache: RwLock<DocCache>,
}

impl SchemaContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(DocCache::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current schema description text.
    pub fn get_schema_text(&self) -> Result<String> {
        {
            let cache = self.cache.read().expect("schema cache poisoned");
            if let Some(text) = cache.entries.get(&self.path) {
                return Ok(text.clone());
            }
        }

        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            CopilotError::SchemaUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let mut cache = self.cache.write().expect("schema cache poisoned");
        cache.insert(self.path.clone(), text.clone());
        Ok(text)
    }

    /// Drop every cached document. Called when the underlying schema
    /// has changed and the docs were rebuilt.
    pub fn refresh(&self) {
        let mut cache = self.cache.write().expect("schema cache poisoned");
        cache.entries.clear();
        cache.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_is_unavailable() {
        let ctx = SchemaContext::new("/nonexistent/schema_docs.md");
        match ctx.get_schema_text() {
            Err(CopilotError::SchemaUnavailable(_)) => {}
            other => panic!("expected SchemaUnavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_cache_survives_file_change_until_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema_docs.md");
        std::fs::write(&path, "v1").unwrap();

        let ctx = SchemaContext::new(&path);
        assert_eq!(ctx.get_schema_text().unwrap(), "v1");

        let mut f = std::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        f.write_all(b"v2").unwrap();
        drop(f);

        // Still the cached snapshot
        assert_eq!(ctx.get_schema_text().unwrap(), "v1");

        ctx.refresh();
        assert_eq!(ctx.get_schema_text().unwrap(), "v2");
    }

    #[test]
    fn test_cache_is_bounded() {
        let mut cache = DocCache::new();
        for i in 0..CACHE_CAPACITY + 3 {
            cache.insert(PathBuf::from(format!("doc_{}.md", i)), String::new());
        }
        assert_eq!(cache.entries.len(), CACHE_CAPACITY);
        assert!(!cache.entries.contains_key(Path::new("doc_0.md")));
    }
}
