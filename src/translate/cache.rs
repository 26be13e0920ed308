//! In-memory translation cache keyed by the exact source text.
//! Unbounded by default; an optional capacity turns it into an LRU.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

pub struct TranslationCache {
    inner: Mutex<LruCache<String, String>>,
}

impl TranslationCache {
    /// `None` (or zero) keeps every entry for the life of the process.
    pub fn new(capacity: Option<usize>) -> Self {
        let cache = match capacity.and_then(NonZeroUsize::new) {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        Self {
            inner: Mutex::new(cache),
        }
    }

    pub fn get(&self, source_text: &str) -> Option<String> {
        self.inner.lock().get(source_text).cloned()
    }

    /// Store a translation. An existing entry for the same text is replaced.
    pub fn insert(&self, source_text: String, translated_text: String) {
        self.inner.lock().put(source_text, translated_text);
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::TranslationCache;

    #[test]
    fn exact_match_only() {
        let cache = TranslationCache::new(None);
        cache.insert("data".into(), "데이터".into());
        assert_eq!(cache.get("data").as_deref(), Some("데이터"));
        assert_eq!(cache.get("Data"), None);
        assert_eq!(cache.get("data "), None);
    }

    #[test]
    fn last_write_wins() {
        let cache = TranslationCache::new(None);
        cache.insert("value".into(), "값".into());
        cache.insert("value".into(), "가치".into());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("value").as_deref(), Some("가치"));
    }

    #[test]
    fn unbounded_keeps_everything() {
        let cache = TranslationCache::new(Some(0));
        for i in 0..1000 {
            cache.insert(format!("word{i}"), format!("단어{i}"));
        }
        assert_eq!(cache.len(), 1000);
        assert_eq!(cache.get("word0").as_deref(), Some("단어0"));
    }

    #[test]
    fn bounded_evicts_least_recently_used() {
        let cache = TranslationCache::new(Some(2));
        cache.insert("a".into(), "1".into());
        cache.insert("b".into(), "2".into());
        assert!(cache.get("a").is_some());
        cache.insert("c".into(), "3".into());
        assert_eq!(cache.get("b"), None);
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn clear_empties() {
        let cache = TranslationCache::new(None);
        cache.insert("a".into(), "1".into());
        cache.clear();
        assert!(cache.is_empty());
    }
}
