//! In-memory scope evaluator

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};

use crate::error::{Result, ScopeError};
use crate::model::Record;
use crate::scope::compound::Junction;
use crate::scope::condition::Condition;
use crate::scope::node::Scope;
use crate::scope::operator;
use crate::scope::value::{ConditionKey, Expression, Scalar, Value, PATH_SEPARATOR};

/// Evaluate a scope against a record. Empty scopes match everything.
pub fn check(scope: &Scope, record: &Record) -> Result<bool> {
    match scope {
        Scope::Condition(cond) => check_condition(cond, record),
        Scope::Compound(compound) if compound.is_empty() => Ok(true),
        Scope::Compound(compound) => {
            // Short-circuit once the junction's outcome is known
            let decisive = compound.junction() == Junction::Or;
            for element in compound.elements() {
                if check(element, record)? == decisive {
                    return Ok(decisive);
                }
            }
            Ok(!decisive)
        }
    }
}

fn check_condition(cond: &Condition, record: &Record) -> Result<bool> {
    let Some(key) = cond.key() else {
        return Ok(true);
    };

    let actual = match key {
        ConditionKey::Name(name) if name.contains(PATH_SEPARATOR) => {
            return Err(ScopeError::UnsupportedEvaluation(format!(
                "chained key {}",
                name
            )))
        }
        ConditionKey::Name(name) => record.get(name).cloned(),
        ConditionKey::Field(field) => record.get(&field.name).cloned(),
        ConditionKey::Expression(expr) => Some(raw_constant(expr)?),
    };

    let Some(op) = cond.operator() else {
        return Ok(actual.as_ref().is_some_and(Scalar::is_truthy));
    };
    let expected = comparand(cond.value(), record)?;

    match operator::normalize(op).as_str() {
        "=" => Ok(equals(actual.as_ref(), &expected)),
        "!=" => Ok(!equals(actual.as_ref(), &expected)),
        "IN" => Ok(equals(actual.as_ref(), &expected)),
        "NOT IN" => Ok(!equals(actual.as_ref(), &expected)),
        "<" => Ok(ordering(actual.as_ref(), &expected) == Some(Ordering::Less)),
        ">" => Ok(ordering(actual.as_ref(), &expected) == Some(Ordering::Greater)),
        "<=" => Ok(matches!(
            ordering(actual.as_ref(), &expected),
            Some(Ordering::Less | Ordering::Equal)
        )),
        ">=" => Ok(matches!(
            ordering(actual.as_ref(), &expected),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        "LIKE" => pattern_match(actual.as_ref(), &expected, like_regex),
        "NOT LIKE" => pattern_match(actual.as_ref(), &expected, like_regex).map(|m| !m),
        "REGEXP" => pattern_match(actual.as_ref(), &expected, plain_regex),
        "NOT REGEXP" => pattern_match(actual.as_ref(), &expected, plain_regex).map(|m| !m),
        other => Err(ScopeError::UnsupportedOperator(other.to_string())),
    }
}

/// Right-hand side after resolving field references
#[derive(Debug)]
enum Comparand {
    Null,
    One(Scalar),
    Any(Vec<Option<Scalar>>),
}

fn comparand(value: &Value, record: &Record) -> Result<Comparand> {
    Ok(match value {
        Value::Null => Comparand::Null,
        Value::Scalar(s) => Comparand::One(s.clone()),
        Value::Field(field) => match record.get(&field.name) {
            Some(s) => Comparand::One(s.clone()),
            None => Comparand::Null,
        },
        Value::List(items) => Comparand::Any(
            items
                .iter()
                .map(|item| {
                    Ok(match comparand(item, record)? {
                        Comparand::One(s) => Some(s),
                        _ => None,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Expression(expr) => Comparand::One(raw_constant(expr)?),
    })
}

fn raw_constant(expr: &Expression) -> Result<Scalar> {
    match expr {
        Expression::Raw(text) => match text.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(Scalar::Bool(true)),
            "false" | "0" => Ok(Scalar::Bool(false)),
            _ => Err(ScopeError::UnsupportedEvaluation(format!(
                "expression '{}'",
                text
            ))),
        },
        other => Err(ScopeError::UnsupportedEvaluation(format!(
            "expression '{}'",
            other.debug_query()
        ))),
    }
}

fn equals(actual: Option<&Scalar>, expected: &Comparand) -> bool {
    match (actual, expected) {
        (None, Comparand::Null) => true,
        (Some(_), Comparand::Null) | (None, _) => false,
        (Some(a), Comparand::One(e)) => compare(a, e) == Some(Ordering::Equal),
        (Some(a), Comparand::Any(items)) => items
            .iter()
            .flatten()
            .any(|e| compare(a, e) == Some(Ordering::Equal)),
    }
}

fn ordering(actual: Option<&Scalar>, expected: &Comparand) -> Option<Ordering> {
    match (actual, expected) {
        (Some(a), Comparand::One(e)) => compare(a, e),
        _ => None,
    }
}

fn as_number(s: &Scalar) -> Option<f64> {
    match s {
        Scalar::Int(i) => Some(*i as f64),
        Scalar::Float(f) => Some(*f),
        Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Scalar::Str(s) => s.trim().parse().ok(),
    }
}

fn compare(a: &Scalar, b: &Scalar) -> Option<Ordering> {
    match (a, b) {
        (Scalar::Str(x), Scalar::Str(y)) => Some(x.cmp(y)),
        (Scalar::Int(x), Scalar::Int(y)) => Some(x.cmp(y)),
        _ => as_number(a)?.partial_cmp(&as_number(b)?),
    }
}

/// SQL `LIKE` pattern (`%`, `_`) as a case-insensitive anchored regex
fn like_regex(pattern: &str) -> Result<Regex> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    translated.push('^');
    for c in pattern.chars() {
        match c {
            '%' => translated.push_str(".*"),
            '_' => translated.push('.'),
            c => translated.push_str(&regex::escape(&c.to_string())),
        }
    }
    translated.push('$');
    build_regex(&translated)
}

fn plain_regex(pattern: &str) -> Result<Regex> {
    build_regex(pattern)
}

fn build_regex(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| ScopeError::InvalidCondition(e.to_string()))
}

fn pattern_match(
    actual: Option<&Scalar>,
    expected: &Comparand,
    compile: fn(&str) -> Result<Regex>,
) -> Result<bool> {
    let (Some(actual), Comparand::One(pattern)) = (actual, expected) else {
        return Ok(false);
    };
    let regex = compile(&pattern.to_string())?;
    Ok(regex.is_match(&actual.to_string()))
}
