//! Lazy lookahead cache.
//!
//! Predicates compile on first use of a decision point and are never
//! invalidated; the grammar is immutable. Recompiling for the same key
//! yields identical data, so a race between two parses at first use is
//! resolved by letting the last write win.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use scry_grammar::{DslKind, RuleId};

use crate::lookahead::CompiledLookahead;

/// Identity of one decision point in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub rule: RuleId,
    pub kind: DslKind,
    pub occurrence: u32,
}

#[derive(Debug, Default)]
pub struct LookaheadCache {
    inner: RwLock<HashMap<CacheKey, Arc<CompiledLookahead>>>,
}

impl LookaheadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<CompiledLookahead>> {
        self.inner
            .read()
            .expect("lookahead cache lock poisoned")
            .get(key)
            .cloned()
    }

    /// Look up `key`, compiling and storing on miss.
    pub fn get_or_insert_with(
        &self,
        key: CacheKey,
        build: impl FnOnce() -> CompiledLookahead,
    ) -> Arc<CompiledLookahead> {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let compiled = Arc::new(build());
        self.inner
            .write()
            .expect("lookahead cache lock poisoned")
            .insert(key, Arc::clone(&compiled));
        compiled
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("lookahead cache lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod cache_tests {
    use crate::lookahead::EnterPredicate;

    use super::*;

    fn key(occurrence: u32) -> CacheKey {
        CacheKey {
            rule: 0,
            kind: DslKind::Many,
            occurrence,
        }
    }

    fn predicate(paths: Vec<Vec<u16>>) -> CompiledLookahead {
        CompiledLookahead::Enter(EnterPredicate { paths })
    }

    #[test]
    fn first_use_compiles_once() {
        let cache = LookaheadCache::new();
        let mut builds = 0;
        for _ in 0..3 {
            cache.get_or_insert_with(key(0), || {
                builds += 1;
                predicate(vec![vec![1]])
            });
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_are_per_decision_point() {
        let cache = LookaheadCache::new();
        cache.get_or_insert_with(key(0), || predicate(vec![vec![1]]));
        cache.get_or_insert_with(key(1), || predicate(vec![vec![2]]));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key(1)).is_some());
        assert!(
            cache
                .get(&CacheKey {
                    rule: 1,
                    kind: DslKind::Many,
                    occurrence: 0,
                })
                .is_none()
        );
    }
}
