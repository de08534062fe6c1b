/*!
 * Tests for translation cache functionality
 */

use livetrans::translation::{CacheKey, TranslationCache};
use livetrans::{DomainTag, LanguageTag};

fn key(text: &str) -> CacheKey {
    CacheKey::new(text, LanguageTag::English, LanguageTag::Vietnamese, None)
}

#[test]
fn test_cache_new_withDisabled_shouldNeverStore() {
    let cache = TranslationCache::new(10, false);
    cache.put(key("hello"), "xin chào");
    assert!(cache.get(&key("hello")).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_cache_put_withCapacityReached_shouldEvictFirstInserted() {
    let cache = TranslationCache::new(100, true);
    for i in 0..100 {
        cache.put(key(&format!("text {}", i)), &format!("out {}", i));
    }

    // Reads do not refresh an entry
    assert_eq!(cache.get(&key("text 0")), Some("out 0".to_string()));

    cache.put(key("text 100"), "out 100");

    assert_eq!(cache.len(), 100);
    assert!(!cache.contains(&key("text 0")));
    assert!(cache.contains(&key("text 1")));
    assert!(cache.contains(&key("text 100")));
}

#[test]
fn test_cache_put_withExistingKey_shouldKeepInsertionPosition() {
    let cache = TranslationCache::new(2, true);
    cache.put(key("a"), "1");
    cache.put(key("b"), "2");
    cache.put(key("a"), "3");
    cache.put(key("c"), "4");

    assert!(!cache.contains(&key("a")));
    assert_eq!(cache.get(&key("b")), Some("2".to_string()));
    assert_eq!(cache.get(&key("c")), Some("4".to_string()));
}

#[test]
fn test_cache_get_withDifferentDomain_shouldMiss() {
    let cache = TranslationCache::new(10, true);
    let general = CacheKey::new("love", LanguageTag::English, LanguageTag::Vietnamese, Some(DomainTag::General));
    cache.put(general.clone(), "tình yêu");

    assert!(cache.get(&general).is_some());
    assert!(cache.get(&key("love")).is_none());
    assert!(cache
        .get(&CacheKey::new("love", LanguageTag::English, LanguageTag::Japanese, Some(DomainTag::General)))
        .is_none());
}

#[test]
fn test_cache_stats_shouldCountHitsAndMisses() {
    let cache = TranslationCache::new(10, true);
    cache.put(key("hello"), "xin chào");

    cache.get(&key("hello"));
    cache.get(&key("hello"));
    cache.get(&key("bye"));

    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.stats().hits, 0);
}

#[test]
fn test_cache_clone_shouldShareEntries() {
    let cache = TranslationCache::new(10, true);
    let other = cache.clone();
    other.put(key("hello"), "xin chào");
    assert!(cache.contains(&key("hello")));
}
