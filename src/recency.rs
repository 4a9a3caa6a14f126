//! Recently served question fingerprints, one bounded LRU per (course, topic, difficulty).
//!
//! Owned by whoever runs the pipeline (normally `PracticeEngine`) and passed in by `&mut`,
//! so there is no process-global state. Reads never refresh recency; inserts do.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use crate::domain::{Course, Tier};
use crate::fingerprint::Fingerprint;

pub const DEFAULT_RECENCY_CAPACITY: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
  pub course: Course,
  pub topic: String,
  pub tier: Tier,
}

impl CacheKey {
  pub fn new(course: Course, topic: &str, tier: Tier) -> Self {
    Self { course, topic: topic.trim().to_lowercase(), tier }
  }
}

pub struct RecencyCache {
  capacity: NonZeroUsize,
  entries: HashMap<CacheKey, LruCache<Fingerprint, ()>>,
}

impl RecencyCache {
  pub fn new(capacity: usize) -> Self {
    let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
    Self { capacity, entries: HashMap::new() }
  }

  pub fn capacity(&self) -> usize {
    self.capacity.get()
  }

  pub fn contains(&self, key: &CacheKey, fp: &Fingerprint) -> bool {
    self.entries.get(key).map_or(false, |lru| lru.contains(fp))
  }

  /// Insert (or refresh) a fingerprint. Returns the evicted least-recently-used one, if any.
  pub fn insert(&mut self, key: &CacheKey, fp: Fingerprint) -> Option<Fingerprint> {
    let capacity = self.capacity;
    let lru = self
      .entries
      .entry(key.clone())
      .or_insert_with(|| LruCache::new(capacity));
    match lru.push(fp.clone(), ()) {
      Some((old, ())) if old != fp => {
        debug!(target: "practice", course = %key.course, topic = %key.topic, tier = %key.tier, "Recency cache evicted oldest fingerprint");
        Some(old)
      }
      _ => None,
    }
  }

  pub fn len_for(&self, key: &CacheKey) -> usize {
    self.entries.get(key).map_or(0, LruCache::len)
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }
}

impl Default for RecencyCache {
  fn default() -> Self {
    Self::new(DEFAULT_RECENCY_CAPACITY)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fp(s: &str) -> Fingerprint {
    Fingerprint::from_parts(s, &[])
  }

  #[test]
  fn keys_are_isolated_and_topic_case_insensitive() {
    let mut cache = RecencyCache::new(10);
    let k1 = CacheKey::new(Course::Python, "Loops", Tier::Basic);
    let k2 = CacheKey::new(Course::Python, "loops", Tier::Intermediate);
    cache.insert(&k1, fp("a"));
    assert!(cache.contains(&CacheKey::new(Course::Python, " loops ", Tier::Basic), &fp("a")));
    assert!(!cache.contains(&k2, &fp("a")));
  }

  #[test]
  fn evicts_least_recently_inserted() {
    let mut cache = RecencyCache::new(2);
    let k = CacheKey::new(Course::Java, "oop", Tier::Basic);
    assert_eq!(cache.insert(&k, fp("a")), None);
    assert_eq!(cache.insert(&k, fp("b")), None);
    // Refresh "a" so "b" becomes the oldest.
    assert_eq!(cache.insert(&k, fp("a")), None);
    assert_eq!(cache.insert(&k, fp("c")), Some(fp("b")));
    assert_eq!(cache.len_for(&k), 2);
    assert!(cache.contains(&k, &fp("a")));
    assert!(!cache.contains(&k, &fp("b")));
  }

  #[test]
  fn zero_capacity_is_raised_to_one() {
    let mut cache = RecencyCache::new(0);
    let k = CacheKey::new(Course::Html, "tags", Tier::Basic);
    cache.insert(&k, fp("a"));
    cache.insert(&k, fp("b"));
    assert_eq!(cache.capacity(), 1);
    assert_eq!(cache.len_for(&k), 1);
  }
}
