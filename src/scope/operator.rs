//! Operator lookup tables

use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;

/// Operator pairs that negate each other
static OPPOSITES: Lazy<AHashMap<&'static str, &'static str>> = Lazy::new(|| {
    let pairs = [
        ("=", "!="),
        ("<", ">="),
        (">", "<="),
        ("LIKE", "NOT LIKE"),
        ("IN", "NOT IN"),
        ("REGEXP", "NOT REGEXP"),
    ];
    let mut map = AHashMap::with_capacity(pairs.len() * 2);
    for (op, opposite) in pairs {
        map.insert(op, opposite);
        map.insert(opposite, op);
    }
    map
});

/// Human phrases for operators
static DICTIONARY: Lazy<AHashMap<&'static str, &'static str>> = Lazy::new(|| {
    AHashMap::from_iter([
        ("=", "is equal to"),
        ("!=", "is not equal to"),
        ("<", "is smaller than"),
        (">", "is greater than"),
        (">=", "is greater or equal to"),
        ("<=", "is smaller or equal to"),
        ("LIKE", "is like"),
        ("NOT LIKE", "is not like"),
        ("IN", "is equal to any value of"),
        ("NOT IN", "is not equal to any value of"),
        ("REGEXP", "is regular expression"),
        ("NOT REGEXP", "is not regular expression"),
    ])
});

/// Pattern operators whose values are never typecast
static SKIP_TYPECAST: Lazy<AHashSet<&'static str>> =
    Lazy::new(|| AHashSet::from_iter(["LIKE", "NOT LIKE", "REGEXP", "NOT REGEXP"]));

/// Canonical (uppercased, single-spaced) operator text
pub fn normalize(operator: &str) -> String {
    operator
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Opposite operator, if the operator can be negated
pub fn opposite(operator: &str) -> Option<&'static str> {
    OPPOSITES.get(normalize(operator).as_str()).copied()
}

/// Human phrase for the operator
pub fn words(operator: &str) -> Option<&'static str> {
    DICTIONARY.get(normalize(operator).as_str()).copied()
}

/// Whether values compared with this operator skip typecasting
pub fn skips_typecast(operator: &str) -> bool {
    SKIP_TYPECAST.contains(normalize(operator).as_str())
}

/// Every operator known to the dictionary
pub fn known() -> impl Iterator<Item = &'static str> {
    DICTIONARY.keys().copied()
}
