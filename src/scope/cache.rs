//! Parsed scope cache

use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::trace;

use crate::error::Result;
use crate::scope::node::Scope;
use crate::scope::parser;

/// Global cache of parsed, unbound scopes
static SCOPE_CACHE: Lazy<RwLock<AHashMap<String, Scope>>> = Lazy::new(|| {
    let map = AHashMap::with_capacity(256);
    RwLock::new(map)
});

/// Get or parse a scope string; every call returns an independent copy
#[inline]
pub fn get_or_parse(condition: &str) -> Result<Scope> {
    // Fast path: check read lock first
    {
        let cache = SCOPE_CACHE.read();
        if let Some(scope) = cache.get(condition) {
            trace!(condition, "scope cache hit");
            return Ok(scope.clone());
        }
    }

    let scope = parser::parse(condition)?;

    {
        let mut cache = SCOPE_CACHE.write();
        cache.insert(condition.to_string(), scope.clone());
    }

    Ok(scope)
}

/// Clear the scope cache
pub fn clear_cache() {
    let mut cache = SCOPE_CACHE.write();
    cache.clear();
}

pub fn cache_size() -> usize {
    let cache = SCOPE_CACHE.read();
    cache.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_cache_hit_and_clear() {
        let text = "cache_probe_age>5 & cache_probe_vip";

        let first = get_or_parse(text).unwrap();
        assert!(cache_size() >= 1);

        let second = get_or_parse(text).unwrap();
        assert_eq!(first, second);
        assert!(logs_contain("scope cache hit"));

        clear_cache();
        assert_eq!(get_or_parse(text).unwrap(), first);
    }

    #[test]
    fn test_copies_are_independent() {
        let text = "cache_probe_copy>5";
        let mut first = get_or_parse(text).unwrap();
        first.negate().unwrap();

        let second = get_or_parse(text).unwrap();
        assert_eq!(second.as_condition().unwrap().operator(), Some(">"));
    }

    #[test]
    fn test_errors_are_not_cached() {
        assert!(get_or_parse("(broken").is_err());
        assert!(get_or_parse("(broken").is_err());
    }
}
