//! Keys, values and expressions carried by conditions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Field;
use crate::scope::arguments::QueryArguments;

/// Scalar comparison value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Truthiness used for key-only predicates
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Bool(b) => *b,
            Scalar::Int(i) => *i != 0,
            Scalar::Float(f) => *f != 0.0,
            Scalar::Str(s) => !s.is_empty() && s != "0",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// Value slot of a leaf condition
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Scalar(Scalar),
    /// Any of these values
    List(Vec<Value>),
    /// Compare against another field
    Field(Field),
    Expression(Expression),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the scalar if this value is one
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Scalar(Scalar::Str(s)) => write!(f, "'{}'", s),
            Value::Scalar(s) => write!(f, "{}", s),
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "({})", items.join(", "))
            }
            Value::Field(field) => f.write_str(&field.name),
            Value::Expression(expr) => f.write_str(&expr.debug_query()),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Scalar(Scalar::Int(i64::from(i)))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(Scalar::Int(i))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(Scalar::Float(v))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::Str(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::Str(s))
    }
}

impl From<Field> for Value {
    fn from(field: Field) -> Self {
        Value::Field(field)
    }
}

impl From<Expression> for Value {
    fn from(expr: Expression) -> Self {
        Value::Expression(expr)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Left-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKey {
    /// Field name or chained `link/field` path
    Name(String),
    Field(Field),
    Expression(Expression),
}

impl ConditionKey {
    /// Name of a plain (non-chained) field key
    pub fn plain_name(&self) -> Option<&str> {
        match self {
            ConditionKey::Name(name) if !name.contains(PATH_SEPARATOR) => Some(name),
            ConditionKey::Field(field) => Some(&field.name),
            _ => None,
        }
    }
}

/// Separator of chained reference keys
pub const PATH_SEPARATOR: char = '/';

/// Final path segment meaning "referenced records"
pub const COUNT_MARKER: &str = "#";

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionKey::Name(name) => f.write_str(name),
            ConditionKey::Field(field) => f.write_str(&field.name),
            ConditionKey::Expression(expr) => f.write_str(&expr.debug_query()),
        }
    }
}

impl From<&str> for ConditionKey {
    fn from(s: &str) -> Self {
        ConditionKey::Name(s.to_string())
    }
}

impl From<String> for ConditionKey {
    fn from(s: String) -> Self {
        ConditionKey::Name(s)
    }
}

impl From<Field> for ConditionKey {
    fn from(field: Field) -> Self {
        ConditionKey::Field(field)
    }
}

impl From<Expression> for ConditionKey {
    fn from(expr: Expression) -> Self {
        ConditionKey::Expression(expr)
    }
}

/// Sub-query kind built on a related model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Count,
    Exists,
}

/// Expression understood by the query layer
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Raw(String),
    /// Correlated count/exists sub-query over a related model
    Aggregate {
        action: Action,
        table: String,
        correlation: Option<String>,
        scope: Box<QueryArguments>,
    },
}

impl Expression {
    pub fn raw(text: impl Into<String>) -> Self {
        Expression::Raw(text.into())
    }

    /// Expression that never matches
    pub fn always_false() -> Self {
        Expression::Raw("false".to_string())
    }

    /// Human-readable query text
    pub fn debug_query(&self) -> String {
        match self {
            Expression::Raw(text) => text.clone(),
            Expression::Aggregate {
                action,
                table,
                correlation,
                scope,
            } => {
                let mut filters: Vec<String> = correlation.iter().cloned().collect();
                if !scope.is_empty() {
                    filters.push(scope.to_string());
                }
                let filter = if filters.is_empty() {
                    String::new()
                } else {
                    format!(" where {}", filters.join(" and "))
                };
                match action {
                    Action::Count => format!("(select count(*) from {}{})", table, filter),
                    Action::Exists => format!("exists (select * from {}{})", table, filter),
                }
            }
        }
    }
}
