//! Upload cache: the bridge between the upload step and a later
//! generate-response request for the same filename.
//!
//! The cache is an explicit, injectable component rather than ambient
//! global state: callers construct one, clone it cheaply (it is an `Arc`
//! inside), and pass it to the service operations. Tests get per-test
//! isolation for free.
//!
//! It is strictly an optimization. `get` may miss at any time — including
//! right after a `put`, under a concurrent overwrite — and callers must be
//! able to re-derive the artifact from the raw upload.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// The cached, already-derived form of an uploaded document: either the
/// converted/validated PDF byte stream or the normalized text content.
///
/// Artifacts are shared (`Arc`) so a cache hit never copies a multi-megabyte
/// PDF.
#[derive(Debug, Clone)]
pub enum Artifact {
    Pdf(Arc<[u8]>),
    Text(Arc<str>),
}

impl Artifact {
    pub fn pdf(bytes: Vec<u8>) -> Self {
        Artifact::Pdf(Arc::from(bytes.into_boxed_slice()))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Artifact::Text(Arc::from(s.into().into_boxed_str()))
    }

    pub fn as_pdf(&self) -> Option<&[u8]> {
        match self {
            Artifact::Pdf(b) => Some(b),
            Artifact::Text(_) => None,
        }
    }
}

/// Process-wide keyed store mapping an uploaded document's filename to its
/// derived [`Artifact`].
///
/// Entries live for the lifetime of the cache (no automatic eviction);
/// long-running deployments can call [`UploadCache::clear`] or
/// [`UploadCache::remove`] from their own housekeeping.
#[derive(Debug, Clone, Default)]
pub struct UploadCache {
    inner: Arc<RwLock<HashMap<String, Artifact>>>,
}

impl UploadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the artifact for `key`.
    ///
    /// The key is the caller-supplied filename, case- and path-sensitive,
    /// with no normalization: two uploads with the same filename silently
    /// overwrite each other (last writer wins). Single-user scope assumption.
    pub fn put(&self, key: impl Into<String>, artifact: Artifact) {
        let key = key.into();
        tracing::debug!(key = %key, "caching upload artifact");
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, artifact);
    }

    /// Fetch the artifact for `key`, if present. Never mutates.
    pub fn get(&self, key: &str) -> Option<Artifact> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Remove and return the artifact for `key`.
    pub fn remove(&self, key: &str) -> Option<Artifact> {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_hit() {
        let cache = UploadCache::new();
        assert!(cache.get("paper.pdf").is_none());

        cache.put("paper.pdf", Artifact::pdf(b"%PDF-1.4".to_vec()));
        let hit = cache.get("paper.pdf").expect("entry after put");
        assert_eq!(hit.as_pdf().unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn put_overwrites_silently() {
        let cache = UploadCache::new();
        cache.put("paper.pdf", Artifact::pdf(b"%PDF-old".to_vec()));
        cache.put("paper.pdf", Artifact::pdf(b"%PDF-new".to_vec()));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("paper.pdf").unwrap().as_pdf().unwrap(), b"%PDF-new");
    }

    #[test]
    fn keys_are_case_sensitive() {
        let cache = UploadCache::new();
        cache.put("Paper.pdf", Artifact::text("a"));
        assert!(cache.get("paper.pdf").is_none());
    }

    #[test]
    fn clones_share_state() {
        let cache = UploadCache::new();
        let other = cache.clone();
        cache.put("p", Artifact::text("x"));
        assert!(other.get("p").is_some());
        other.remove("p");
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_put_get_does_not_corrupt() {
        let cache = UploadCache::new();
        let writers: Vec<_> = (0..8)
            .map(|i| {
                let c = cache.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        c.put("shared", Artifact::text(format!("writer-{i}")));
                        // Readers may see any writer's value or (briefly) none.
                        if let Some(Artifact::Text(t)) = c.get("shared") {
                            assert!(t.starts_with("writer-"));
                        }
                    }
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap();
        }
        assert_eq!(cache.len(), 1);
    }
}
