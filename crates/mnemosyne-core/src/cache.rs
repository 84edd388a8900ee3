//! Per-request context cache.
//!
//! The [`ContextCache`] is the request-scoped memo table behind the
//! at-most-once guarantee: it maps strategy names to the completed outcome
//! (value or error) of their first resolution within the request. Entries
//! are written once and never overwritten; the whole cache is dropped with
//! the request, so nothing leaks across requests.

use crate::error::ContextError;
use crate::strategy::ContextValue;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The stored outcome of a strategy resolution.
///
/// Both sides are reference-counted: a cached value is the same allocation
/// on every hit (identity guarantee), and a cached error is returned to
/// every later caller without re-running the failed strategy.
pub type ResolveOutcome = Result<ContextValue, Arc<ContextError>>;

/// Request-scoped cache of strategy outcomes.
///
/// The interior mutex is held only across map operations, never across a
/// strategy invocation, so a strategy may itself resolve another strategy
/// while its own entry is still pending.
#[derive(Default)]
pub struct ContextCache {
    entries: Mutex<HashMap<String, ResolveOutcome>>,
}

impl ContextCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached outcome for a strategy, if one exists.
    #[must_use]
    pub fn get(&self, strategy: &str) -> Option<ResolveOutcome> {
        self.entries.lock().get(strategy).cloned()
    }

    /// Stores the outcome for a strategy and returns the entry now held.
    ///
    /// The first write wins: if an entry already exists it is kept and
    /// returned unchanged, so no caller can observe a second outcome for
    /// the same strategy within one request.
    pub fn insert(&self, strategy: impl Into<String>, outcome: ResolveOutcome) -> ResolveOutcome {
        self.entries
            .lock()
            .entry(strategy.into())
            .or_insert(outcome)
            .clone()
    }

    /// Checks whether an outcome is cached for a strategy.
    #[must_use]
    pub fn contains(&self, strategy: &str) -> bool {
        self.entries.lock().contains_key(strategy)
    }

    /// Returns the number of cached outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl fmt::Debug for ContextCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextCache")
            .field("entries", &self.entries.lock().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{context_value, downcast_context};
    use proptest::prelude::*;

    #[test]
    fn test_miss_then_hit() {
        let cache = ContextCache::new();
        assert!(cache.get("user").is_none());
        assert!(cache.is_empty());

        cache.insert("user", Ok(context_value(42_u32)));
        let hit = cache.get("user").unwrap().unwrap();
        assert_eq!(*downcast_context::<u32>(&hit).unwrap(), 42);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_write_wins() {
        let cache = ContextCache::new();
        cache.insert("user", Ok(context_value("first")));
        let stored = cache.insert("user", Ok(context_value("second"))).unwrap();

        assert_eq!(*downcast_context::<&str>(&stored).unwrap(), "first");
    }

    #[test]
    fn test_hits_return_identical_allocation() {
        let cache = ContextCache::new();
        cache.insert("user", Ok(context_value(String::from("alice"))));

        let a = cache.get("user").unwrap().unwrap();
        let b = cache.get("user").unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_cached_error_is_shared() {
        let cache = ContextCache::new();
        let err = Arc::new(ContextError::unknown_strategy("user"));
        cache.insert("user", Err(Arc::clone(&err)));

        let cached = cache.get("user").unwrap().unwrap_err();
        assert!(Arc::ptr_eq(&cached, &err));
    }

    #[test]
    fn test_entries_are_per_name() {
        let cache = ContextCache::new();
        cache.insert("user", Ok(context_value(1_u8)));
        cache.insert("tenant", Ok(context_value(2_u8)));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("user"));
        assert!(cache.contains("tenant"));
        assert!(!cache.contains("flags"));
    }

    proptest! {
        /// For any interleaving of lookups over a small strategy alphabet,
        /// the value observed for a name is always the one stored first.
        #[test]
        fn prop_first_outcome_is_stable(sequence in proptest::collection::vec(0_usize..4, 1..64)) {
            let names = ["user", "tenant", "flags", "session"];
            let cache = ContextCache::new();
            let mut first_seen: HashMap<&str, usize> = HashMap::new();

            for (attempt, pick) in sequence.into_iter().enumerate() {
                let name = names[pick];
                let stored = cache.insert(name, Ok(context_value(attempt))).unwrap();
                let expected = *first_seen.entry(name).or_insert(attempt);
                prop_assert_eq!(*downcast_context::<usize>(&stored).unwrap(), expected);
            }

            prop_assert_eq!(cache.len(), first_seen.len());
        }
    }
}
