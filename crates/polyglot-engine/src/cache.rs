use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use polyglot_core::models::{LanguageCode, TranslationResult};

/// Cache key: whitespace-normalized text, source code (or the literal
/// `auto` when the source is to be detected), and target code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    text: String,
    src: String,
    tgt: String,
}

impl CacheKey {
    pub fn new(text: &str, src: Option<&LanguageCode>, tgt: &LanguageCode) -> Self {
        Self {
            text: collapse_whitespace(text),
            src: src
                .map(|code| code.as_str().to_string())
                .unwrap_or_else(|| "auto".to_string()),
            tgt: tgt.as_str().to_string(),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct CacheSlot {
    result: TranslationResult,
    inserted_at: Instant,
}

/// Short-lived memoization of successful translations.
///
/// LRU with a capacity bound and a per-entry TTL. Only successful results
/// are stored, so a failure never poisons a later success for the same key.
/// A lookup never extends an entry's TTL.
pub struct TranslationCache {
    entries: Mutex<LruCache<CacheKey, CacheSlot>>,
    ttl: Duration,
    hits: Mutex<u64>,
}

impl TranslationCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is non-zero");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            hits: Mutex::new(0),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<TranslationResult> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let fresh = match entries.get(key) {
            None => return None,
            Some(slot) if slot.inserted_at.elapsed() < self.ttl => Some(slot.result.clone()),
            Some(_) => None,
        };
        match fresh {
            Some(result) => {
                *self.hits.lock().expect("cache hits lock poisoned") += 1;
                Some(result)
            }
            None => {
                entries.pop(key);
                None
            }
        }
    }

    /// Stores a successful result; failures are silently ignored. May
    /// overwrite an existing entry with a newer result.
    pub fn put(&self, key: CacheKey, result: &TranslationResult) {
        if !result.succeeded() {
            return;
        }
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .put(
                key,
                CacheSlot {
                    result: result.clone(),
                    inserted_at: Instant::now(),
                },
            );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hit_count(&self) -> u64 {
        *self.hits.lock().expect("cache hits lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyglot_core::models::{FailureReason, ProviderId};

    fn success(tgt: &str) -> TranslationResult {
        TranslationResult::translated(
            "Hola",
            Some(LanguageCode::new("en")),
            LanguageCode::new(tgt),
            ProviderId::Premium,
            None,
        )
    }

    #[test]
    fn stores_and_returns_successes() {
        let cache = TranslationCache::new(10, Duration::from_secs(60));
        let key = CacheKey::new("Hello", None, &LanguageCode::new("es"));
        assert!(cache.get(&key).is_none());

        cache.put(key.clone(), &success("es"));
        let hit = cache.get(&key).unwrap();
        assert_eq!(hit.text.as_deref(), Some("Hola"));
        assert_eq!(cache.hit_count(), 1);
    }

    #[test]
    fn never_stores_failures() {
        let cache = TranslationCache::new(10, Duration::from_secs(60));
        let key = CacheKey::new("Hello", None, &LanguageCode::new("es"));
        cache.put(
            key.clone(),
            &TranslationResult::failed(FailureReason::AllProvidersFailed),
        );
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn expired_entries_are_evicted_on_read() {
        let cache = TranslationCache::new(10, Duration::from_millis(1));
        let key = CacheKey::new("Hello", None, &LanguageCode::new("es"));
        cache.put(key.clone(), &success("es"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_bound_evicts_least_recently_used() {
        let cache = TranslationCache::new(2, Duration::from_secs(60));
        let first = CacheKey::new("one", None, &LanguageCode::new("es"));
        let second = CacheKey::new("two", None, &LanguageCode::new("es"));
        let third = CacheKey::new("three", None, &LanguageCode::new("es"));

        cache.put(first.clone(), &success("es"));
        cache.put(second.clone(), &success("es"));
        cache.put(third.clone(), &success("es"));

        assert!(cache.get(&first).is_none());
        assert!(cache.get(&second).is_some());
        assert!(cache.get(&third).is_some());
    }

    #[test]
    fn key_collapses_repeated_whitespace() {
        let tgt = LanguageCode::new("es");
        assert_eq!(
            CacheKey::new("  Hello   world ", None, &tgt),
            CacheKey::new("Hello world", None, &tgt)
        );
    }

    #[test]
    fn key_distinguishes_source_from_auto() {
        let tgt = LanguageCode::new("es");
        let en = LanguageCode::new("en");
        assert_ne!(
            CacheKey::new("Hello", Some(&en), &tgt),
            CacheKey::new("Hello", None, &tgt)
        );
    }
}
