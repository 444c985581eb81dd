//! Compound condition: children joined by AND/OR

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use tracing::debug;

use crate::error::{Result, ScopeError};
use crate::model::{Model, ModelRef};
use crate::scope::arguments::QueryArguments;
use crate::scope::condition::{Condition, ConditionArgs};
use crate::scope::node::Scope;
use crate::scope::value::{ConditionKey, Value};

/// Boolean combinator of a compound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Junction {
    #[default]
    And,
    Or,
}

impl Junction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Junction::And => "AND",
            Junction::Or => "OR",
        }
    }

    /// De Morgan counterpart
    pub fn flip(self) -> Self {
        match self {
            Junction::And => Junction::Or,
            Junction::Or => Junction::And,
        }
    }
}

impl FromStr for Junction {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "AND" => Ok(Junction::And),
            "OR" => Ok(Junction::Or),
            _ => Err(ScopeError::InvalidJunction(s.to_string())),
        }
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item of a compound's construction list
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeItem {
    Node(Scope),
    /// Arguments for a new leaf
    Args(ConditionArgs),
    /// Bare field name, a key-only leaf
    Field(String),
    /// Any of these, built as a nested OR compound
    AnyOf(Vec<ScopeItem>),
}

impl ScopeItem {
    pub fn any_of<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ScopeItem>,
    {
        ScopeItem::AnyOf(items.into_iter().map(Into::into).collect())
    }

    fn into_scope(self) -> Scope {
        match self {
            ScopeItem::Node(node) => node,
            ScopeItem::Args(args) => Condition::from_args(args).into(),
            ScopeItem::Field(name) => Condition::predicate(name).into(),
            ScopeItem::AnyOf(items) => CompoundCondition::new(items, Junction::Or).into(),
        }
    }
}

impl From<Scope> for ScopeItem {
    fn from(node: Scope) -> Self {
        ScopeItem::Node(node)
    }
}

impl From<&Scope> for ScopeItem {
    fn from(node: &Scope) -> Self {
        ScopeItem::Node(node.clone())
    }
}

impl From<Condition> for ScopeItem {
    fn from(cond: Condition) -> Self {
        ScopeItem::Node(cond.into())
    }
}

impl From<&Condition> for ScopeItem {
    fn from(cond: &Condition) -> Self {
        ScopeItem::Node(cond.clone().into())
    }
}

impl From<CompoundCondition> for ScopeItem {
    fn from(compound: CompoundCondition) -> Self {
        ScopeItem::Node(compound.into())
    }
}

impl From<&CompoundCondition> for ScopeItem {
    fn from(compound: &CompoundCondition) -> Self {
        ScopeItem::Node(compound.clone().into())
    }
}

impl From<ConditionArgs> for ScopeItem {
    fn from(args: ConditionArgs) -> Self {
        ScopeItem::Args(args)
    }
}

impl From<&str> for ScopeItem {
    fn from(name: &str) -> Self {
        ScopeItem::Field(name.to_string())
    }
}

impl From<bool> for ScopeItem {
    fn from(b: bool) -> Self {
        ScopeItem::Args(ConditionArgs::Bool(b))
    }
}

impl<K: Into<ConditionKey>, V: Into<Value>> From<(K, V)> for ScopeItem {
    fn from(args: (K, V)) -> Self {
        ScopeItem::Args(args.into())
    }
}

impl<K: Into<ConditionKey>, V: Into<Value>> From<(K, &str, V)> for ScopeItem {
    fn from(args: (K, &str, V)) -> Self {
        ScopeItem::Args(args.into())
    }
}

/// Ordered children combined under one junction
#[derive(Debug, Clone, Default)]
pub struct CompoundCondition {
    junction: Junction,
    elements: Vec<Scope>,
    model: Option<Weak<dyn Model>>,
}

impl PartialEq for CompoundCondition {
    fn eq(&self, other: &Self) -> bool {
        self.junction == other.junction && self.elements == other.elements
    }
}

impl CompoundCondition {
    /// Build from items; empty items are dropped
    pub fn new<I, T>(items: I, junction: Junction) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ScopeItem>,
    {
        let elements = items
            .into_iter()
            .map(|item| item.into().into_scope())
            .filter(|node| !node.is_empty())
            .collect();

        Self {
            junction,
            elements,
            model: None,
        }
    }

    /// Build with a junction given as text (`AND` / `OR`)
    pub fn with_junction<I, T>(items: I, junction: &str) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<ScopeItem>,
    {
        Ok(Self::new(items, junction.parse()?))
    }

    pub fn create_and<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ScopeItem>,
    {
        Self::new(items, Junction::And)
    }

    pub fn create_or<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ScopeItem>,
    {
        Self::new(items, Junction::Or)
    }

    pub fn junction(&self) -> Junction {
        self.junction
    }

    pub fn elements(&self) -> &[Scope] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// More than one child
    pub fn is_compound(&self) -> bool {
        self.elements.len() > 1
    }

    pub fn model(&self) -> Option<ModelRef> {
        self.model.as_ref().and_then(Weak::upgrade)
    }

    /// Append a child, binding it to this compound's model
    pub fn add(&mut self, node: impl Into<ScopeItem>) -> Result<&mut Self> {
        let mut node = node.into().into_scope();
        if node.is_empty() {
            return Ok(self);
        }
        if let Some(model) = self.model() {
            node.bind(&model)?;
        }
        self.elements.push(node);
        Ok(self)
    }

    /// Append a new leaf built from one, two or three arguments
    pub fn add_condition(&mut self, args: impl Into<ConditionArgs>) -> Result<&mut Self> {
        self.add(Condition::from_args(args))
    }

    /// Bind this compound and every descendant to a model. On failure the
    /// tree keeps its previous binding.
    pub fn bind(&mut self, model: &ModelRef) -> Result<()> {
        debug!(
            table = model.table(),
            junction = %self.junction,
            children = self.elements.len(),
            "binding compound condition"
        );
        let mut elements = self.elements.clone();
        for element in &mut elements {
            element.bind(model)?;
        }
        self.elements = elements;
        self.model = Some(Arc::downgrade(model));
        Ok(())
    }

    /// Sole child's simplification, or self
    pub fn simplify(mut self) -> Scope {
        if self.elements.len() == 1 {
            if let Some(only) = self.elements.pop() {
                return only.simplify();
            }
        }
        Scope::Compound(self)
    }

    /// De Morgan: flip the junction and negate every child. Nothing changes
    /// unless every leaf can be negated.
    pub fn negate(&mut self) -> Result<&mut Self> {
        let mut negated = self.clone();
        negated.negate_in_place()?;
        *self = negated;
        Ok(self)
    }

    fn negate_in_place(&mut self) -> Result<()> {
        self.junction = self.junction.flip();
        for element in &mut self.elements {
            match element {
                Scope::Condition(cond) => {
                    cond.negate()?;
                }
                Scope::Compound(compound) => compound.negate_in_place()?,
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) -> &mut Self {
        self.elements.clear();
        self
    }

    pub fn to_query_arguments(&self) -> Result<QueryArguments> {
        match self.elements.as_slice() {
            [] => Ok(QueryArguments::Empty),
            [only] => only.to_query_arguments(),
            elements => {
                let children = elements
                    .iter()
                    .map(Scope::to_query_arguments)
                    .collect::<Result<Vec<_>>>()?;
                Ok(QueryArguments::Junction(self.junction, children))
            }
        }
    }

    /// Render children joined by `and`/`or`; nested compounds are parenthesized
    pub fn to_words(&self) -> Result<String> {
        self.model().ok_or(ScopeError::MissingModel)?;
        let glue = format!(" {} ", self.junction.as_str().to_lowercase());
        let mut words = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            let phrase = element.to_words()?;
            if self.is_compound() && element.is_compound() {
                words.push(format!("({})", phrase));
            } else {
                words.push(phrase);
            }
        }
        Ok(words.join(&glue))
    }
}
