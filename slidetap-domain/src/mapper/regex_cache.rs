// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! LRU cache of compiled patterns, keyed by expression string (spec §4.C
//! step 3, §9 design note). Capacity is at least 1000 entries; a sharded
//! map is suggested in the design notes but a single `parking_lot::Mutex`
//! around an `lru::LruCache` is sufficient at this scale and matches the
//! teacher's "standard LRU... to avoid global contention" guidance for
//! low-contention shared state.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use regex::Regex;

use crate::error::{CoreError, CoreResult};

const MIN_CAPACITY: usize = 1000;

pub struct RegexCache {
    inner: Mutex<LruCache<String, Arc<Regex>>>,
}

impl RegexCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        Self {
            inner: Mutex::new(LruCache::new(NonZeroUsize::new(capacity).expect("capacity is non-zero"))),
        }
    }

    /// Compiles `expression`, reusing a cached pattern when available.
    pub fn compile(&self, expression: &str) -> CoreResult<Arc<Regex>> {
        let mut cache = self.inner.lock();
        if let Some(pattern) = cache.get(expression) {
            return Ok(Arc::clone(pattern));
        }
        let compiled = Arc::new(
            Regex::new(expression).map_err(|e| CoreError::validation_failure(format!("invalid mapper expression {expression:?}: {e}")))?,
        );
        cache.put(expression.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RegexCache {
    fn default() -> Self {
        Self::new(MIN_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_floored_at_one_thousand() {
        let cache = RegexCache::new(10);
        assert_eq!(cache.inner.lock().cap().get(), MIN_CAPACITY);
    }

    #[test]
    fn reuses_compiled_pattern_for_same_expression() {
        let cache = RegexCache::default();
        let a = cache.compile("^Excision$").unwrap();
        let b = cache.compile("^Excision$").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn rejects_invalid_expression() {
        let cache = RegexCache::default();
        assert!(cache.compile("(unclosed").is_err());
    }
}
