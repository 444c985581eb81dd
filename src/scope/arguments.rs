//! Positional arguments handed to the query compiler

use std::fmt;

use crate::scope::compound::Junction;
use crate::scope::value::{ConditionKey, Value};

/// Resolved form of a scope node
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArguments {
    /// Contributes nothing
    Empty,
    /// Key alone is the predicate
    Predicate(ConditionKey),
    /// Equality or membership, decided by the compiler
    Equals(ConditionKey, Value),
    Compare(ConditionKey, String, Value),
    /// Children joined by a junction
    Junction(Junction, Vec<QueryArguments>),
}

impl QueryArguments {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryArguments::Empty)
    }

    /// Number of positional arguments of a leaf form
    pub fn len(&self) -> usize {
        match self {
            QueryArguments::Empty => 0,
            QueryArguments::Predicate(_) => 1,
            QueryArguments::Equals(..) => 2,
            QueryArguments::Compare(..) => 3,
            QueryArguments::Junction(_, children) => children.len(),
        }
    }

    /// Key of a leaf form
    pub fn key(&self) -> Option<&ConditionKey> {
        match self {
            QueryArguments::Predicate(key)
            | QueryArguments::Equals(key, _)
            | QueryArguments::Compare(key, _, _) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for QueryArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryArguments::Empty => Ok(()),
            QueryArguments::Predicate(key) => write!(f, "{}", key),
            QueryArguments::Equals(key, value @ Value::List(_)) => {
                write!(f, "{} in {}", key, value)
            }
            QueryArguments::Equals(key, value) => write!(f, "{} = {}", key, value),
            QueryArguments::Compare(key, op, value) => write!(f, "{} {} {}", key, op, value),
            QueryArguments::Junction(junction, children) => {
                let parts: Vec<String> = children
                    .iter()
                    .filter(|c| !c.is_empty())
                    .map(|c| c.to_string())
                    .collect();
                let glue = format!(" {} ", junction.as_str().to_lowercase());
                write!(f, "({})", parts.join(&glue))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::value::Expression;

    #[test]
    fn test_leaf_forms() {
        let key = ConditionKey::from("age");
        assert_eq!(QueryArguments::Empty.len(), 0);
        assert_eq!(QueryArguments::Predicate(key.clone()).len(), 1);
        assert_eq!(QueryArguments::Equals(key.clone(), 5.into()).len(), 2);
        assert_eq!(
            QueryArguments::Compare(key.clone(), ">".into(), 5.into()).to_string(),
            "age > 5"
        );
    }

    #[test]
    fn test_junction_text() {
        let args = QueryArguments::Junction(
            Junction::Or,
            vec![
                QueryArguments::Equals("status".into(), "new".into()),
                QueryArguments::Predicate(Expression::raw("is_paid").into()),
            ],
        );
        assert_eq!(args.to_string(), "(status = 'new' or is_paid)");
    }
}
