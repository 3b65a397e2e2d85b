//! Condition parsing cache - shared across calls with fast hashing
//!
//! Keys are caller-supplied condition strings, so the map is bounded: once it
//! holds its capacity in ASTs it is emptied before the next insert.

use crate::condition::ast::Expression;
use crate::condition::combo::Combo;
use crate::condition::evaluator::evaluate;
use crate::condition::parser;
use crate::error::Result;
use ahash::AHashMap;
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Capacity of the process-wide cache
pub const MAX_CACHE_ENTRIES: usize = 1024;

/// Bounded map from condition string to parsed AST
pub struct ConditionCache {
    entries: RwLock<AHashMap<String, Expression>>,
    capacity: usize,
}

impl ConditionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(AHashMap::with_capacity(capacity.min(256))),
            capacity: capacity.max(1),
        }
    }

    /// Get or parse a condition string; parse errors are not cached
    pub fn get_or_parse(&self, condition: &str) -> Result<Expression> {
        {
            let entries = self.entries.read();
            if let Some(ast) = entries.get(condition) {
                return Ok(ast.clone());
            }
        }

        let ast = parser::parse(condition)?;

        {
            let mut entries = self.entries.write();
            if entries.len() >= self.capacity && !entries.contains_key(condition) {
                debug!("condition cache full ({} entries), clearing", entries.len());
                entries.clear();
            }
            entries.insert(condition.to_string(), ast.clone());
        }

        Ok(ast)
    }

    pub fn contains(&self, condition: &str) -> bool {
        self.entries.read().contains_key(condition)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Global condition cache with fast hashing (ahash)
static CONDITION_CACHE: Lazy<ConditionCache> = Lazy::new(|| ConditionCache::new(MAX_CACHE_ENTRIES));

/// Get or parse a condition string, using cache for repeated conditions
#[inline]
pub fn get_or_parse(condition: &str) -> Result<Expression> {
    CONDITION_CACHE.get_or_parse(condition)
}

/// Expand a condition into combos, using the cached AST
#[inline]
pub fn expand_cached(condition: &str) -> Result<Vec<Combo>> {
    let ast = get_or_parse(condition)?;
    Ok(evaluate(&ast))
}

/// Whether a condition string is currently cached
pub fn is_cached(condition: &str) -> bool {
    CONDITION_CACHE.contains(condition)
}

/// Clear the condition cache
pub fn clear_cache() {
    CONDITION_CACHE.clear();
}

/// Number of cached conditions
pub fn cache_size() -> usize {
    CONDITION_CACHE.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit() {
        let condition = "cache_test_col in ('x', 'y')";

        let first = expand_cached(condition).unwrap();
        assert!(is_cached(condition));
        assert!(cache_size() >= 1);
        assert!(cache_size() <= MAX_CACHE_ENTRIES);

        let second = expand_cached(condition).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_cache_stays_bounded() {
        let cache = ConditionCache::new(8);
        for i in 0..50 {
            let condition = format!("c = 'v{}'", i);
            let ast = cache.get_or_parse(&condition).unwrap();
            assert_eq!(evaluate(&ast).len(), 1);
            assert!(cache.len() <= cache.capacity());
            assert!(cache.contains(&condition));
        }
        // Last cleared on the 49th insert, so two entries remain
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_repeated_key_does_not_clear() {
        let cache = ConditionCache::new(2);
        cache.get_or_parse("a = 1").unwrap();
        cache.get_or_parse("b = 2").unwrap();
        cache.get_or_parse("a = 1").unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("b = 2"));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_errors_are_not_cached() {
        let condition = "cache_err_col in 'x'";
        assert!(expand_cached(condition).is_err());
        assert!(!is_cached(condition));
    }
}
