//! Property tests for the scope module
//!
//! Negation, simplification and construction invariants checked over
//! generated trees.

use proptest::prelude::*;

use crate::model::Record;
use crate::scope::compound::{CompoundCondition, Junction, ScopeItem};
use crate::scope::condition::Condition;
use crate::scope::evaluator::check;
use crate::scope::node::Scope;
use crate::scope::operator;
use crate::scope::parser::parse;
use crate::scope::value::{ConditionKey, Scalar, Value};

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators for property tests
// ═══════════════════════════════════════════════════════════════════════════

/// Generate numeric field names
fn field_name_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("age"), Just("score"), Just("rank"),]
}

/// Generate every operator that has an opposite
fn negatable_operator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("="),
        Just("!="),
        Just("<"),
        Just(">"),
        Just(">="),
        Just("<="),
        Just("LIKE"),
        Just("NOT LIKE"),
        Just("IN"),
        Just("NOT IN"),
        Just("REGEXP"),
        Just("NOT REGEXP"),
    ]
}

/// Generate comparison operators
fn comparison_operator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("="),
        Just("!="),
        Just("<"),
        Just(">"),
        Just(">="),
        Just("<="),
    ]
}

fn junction_strategy() -> impl Strategy<Value = Junction> {
    prop_oneof![Just(Junction::And), Just(Junction::Or)]
}

/// Generate a leaf with any negatable operator
fn leaf_strategy() -> impl Strategy<Value = Condition> {
    (field_name_strategy(), negatable_operator_strategy(), -100..=100i64)
        .prop_map(|(field, op, value)| Condition::new(field, op, value))
}

/// Generate a leaf with a numeric comparison
fn comparison_leaf_strategy() -> impl Strategy<Value = Condition> {
    (field_name_strategy(), comparison_operator_strategy(), -100..=100i64)
        .prop_map(|(field, op, value)| Condition::new(field, op, value))
}

/// Generate a nested tree over the given leaves
fn scope_strategy(leaf: BoxedStrategy<Condition>) -> impl Strategy<Value = Scope> {
    leaf.prop_map(Scope::from).prop_recursive(3, 24, 4, |inner| {
        (prop::collection::vec(inner, 1..=4), junction_strategy())
            .prop_map(|(nodes, junction)| Scope::from(CompoundCondition::new(nodes, junction)))
    })
}

/// Generate a record holding every numeric field
fn record_strategy() -> impl Strategy<Value = Record> {
    (-100..=100i64, -100..=100i64, -100..=100i64).prop_map(|(age, score, rank)| {
        Record::from_iter([
            ("age".to_string(), Scalar::Int(age)),
            ("score".to_string(), Scalar::Int(score)),
            ("rank".to_string(), Scalar::Int(rank)),
        ])
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Double negation restores a leaf's operator
    #[test]
    fn prop_leaf_double_negation(leaf in leaf_strategy()) {
        let mut negated = leaf.clone();
        negated.negate().unwrap();
        prop_assert_ne!(negated.operator(), leaf.operator());

        negated.negate().unwrap();
        prop_assert_eq!(
            operator::normalize(negated.operator().unwrap()),
            operator::normalize(leaf.operator().unwrap())
        );
        prop_assert_eq!(negated, leaf);
    }

    /// Double negation restores every junction and operator of a tree
    #[test]
    fn prop_tree_double_negation(scope in scope_strategy(leaf_strategy().boxed())) {
        let mut negated = scope.clone();
        negated.negate().unwrap();
        negated.negate().unwrap();
        prop_assert_eq!(negated, scope);
    }

    /// Negating a tree inverts its outcome on any complete record
    #[test]
    fn prop_negation_inverts_evaluation(
        scope in scope_strategy(comparison_leaf_strategy().boxed()),
        record in record_strategy()
    ) {
        let before = check(&scope, &record).unwrap();
        let mut negated = scope.clone();
        negated.negate().unwrap();
        prop_assert_eq!(check(&negated, &record).unwrap(), !before);
    }

    /// A compound with one leaf is not compound and simplifies to that leaf
    #[test]
    fn prop_single_child_simplifies(leaf in leaf_strategy(), junction in junction_strategy()) {
        let compound = CompoundCondition::new([leaf.clone()], junction);
        prop_assert!(!compound.is_compound());
        prop_assert_eq!(compound.simplify(), Scope::from(leaf));
    }

    /// Always-true items never enter a compound
    #[test]
    fn prop_empty_items_dropped(count in 0..8usize, junction in junction_strategy()) {
        let items = (0..count).map(|_| ScopeItem::from(true));
        let compound = CompoundCondition::new(items, junction);
        prop_assert!(compound.is_empty());
        prop_assert!(compound.to_query_arguments().unwrap().is_empty());
    }

    /// Shorthand text parses into the same leaf
    #[test]
    fn prop_parsed_condition_structure(
        field in field_name_strategy(),
        op in comparison_operator_strategy(),
        value in -100..=100i64
    ) {
        let scope = parse(&format!("{}{}{}", field, op, value)).unwrap();
        let leaf = scope.as_condition().unwrap();
        prop_assert_eq!(leaf.key(), Some(&ConditionKey::from(field)));
        prop_assert_eq!(leaf.operator(), Some(op));
        prop_assert_eq!(leaf.value(), &Value::from(value));
    }
}
