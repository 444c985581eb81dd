//! Leaf condition: `key operator value`

use std::sync::Weak;

use smallvec::SmallVec;
use tracing::debug;

use crate::error::{Result, ScopeError};
use crate::model::{readable_caption, Model, ModelRef};
use crate::scope::arguments::QueryArguments;
use crate::scope::operator;
use crate::scope::value::{
    Action, ConditionKey, Expression, Scalar, Value, COUNT_MARKER, PATH_SEPARATOR,
};

/// Links of a chained key followed by its final segment
type PathSegments<'a> = (SmallVec<[&'a str; 4]>, &'a str);

fn split_path(path: &str) -> PathSegments<'_> {
    let mut links: SmallVec<[&str; 4]> = path.split(PATH_SEPARATOR).collect();
    let field = links.pop().unwrap_or_default();
    (links, field)
}

/// Leaf condition arguments, mirroring the one/two/three argument forms
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionArgs {
    /// `true` is always-true (empty), `false` never matches
    Bool(bool),
    /// Key alone is a boolean/expression predicate
    Key(ConditionKey),
    /// Implicit `=`
    KeyValue(ConditionKey, Value),
    Full(ConditionKey, String, Value),
}

impl From<bool> for ConditionArgs {
    fn from(b: bool) -> Self {
        ConditionArgs::Bool(b)
    }
}

impl From<&str> for ConditionArgs {
    fn from(key: &str) -> Self {
        ConditionArgs::Key(key.into())
    }
}

impl From<ConditionKey> for ConditionArgs {
    fn from(key: ConditionKey) -> Self {
        ConditionArgs::Key(key)
    }
}

impl<K: Into<ConditionKey>, V: Into<Value>> From<(K, V)> for ConditionArgs {
    fn from((key, value): (K, V)) -> Self {
        ConditionArgs::KeyValue(key.into(), value.into())
    }
}

impl<K: Into<ConditionKey>, V: Into<Value>> From<(K, &str, V)> for ConditionArgs {
    fn from((key, operator, value): (K, &str, V)) -> Self {
        ConditionArgs::Full(key.into(), operator.to_string(), value.into())
    }
}

/// Single `key operator value` predicate
#[derive(Debug, Clone, Default)]
pub struct Condition {
    key: Option<ConditionKey>,
    operator: Option<String>,
    value: Value,
    model: Option<Weak<dyn Model>>,
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.operator == other.operator && self.value == other.value
    }
}

impl From<bool> for Condition {
    fn from(b: bool) -> Self {
        Self::from_args(ConditionArgs::Bool(b))
    }
}

impl Condition {
    /// Three argument form
    pub fn new(
        key: impl Into<ConditionKey>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::from_parts(Some(key.into()), Some(operator.into()), value.into())
    }

    /// Two argument form; the operator is `=`
    pub fn equals(key: impl Into<ConditionKey>, value: impl Into<Value>) -> Self {
        Self::from_parts(Some(key.into()), Some("=".to_string()), value.into())
    }

    /// Key-only form: the key itself is the predicate
    pub fn predicate(key: impl Into<ConditionKey>) -> Self {
        Self::from_parts(Some(key.into()), None, Value::Null)
    }

    pub fn from_args(args: impl Into<ConditionArgs>) -> Self {
        match args.into() {
            ConditionArgs::Bool(true) => Self::default(),
            ConditionArgs::Bool(false) => Self::predicate(Expression::always_false()),
            ConditionArgs::Key(key) => Self::predicate(key),
            ConditionArgs::KeyValue(key, value) => Self::equals(key, value),
            ConditionArgs::Full(key, operator, value) => Self::new(key, operator, value),
        }
    }

    pub(crate) fn from_parts(
        key: Option<ConditionKey>,
        operator: Option<String>,
        value: Value,
    ) -> Self {
        Self {
            key,
            operator,
            value,
            model: None,
        }
    }

    pub fn key(&self) -> Option<&ConditionKey> {
        self.key.as_ref()
    }

    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Bound model, if it is still alive
    pub fn model(&self) -> Option<ModelRef> {
        self.model.as_ref().and_then(Weak::upgrade)
    }

    /// `None` when never bound; a binding whose model was dropped is an error
    fn bound_model(&self) -> Result<Option<ModelRef>> {
        match &self.model {
            None => Ok(None),
            Some(weak) => weak.upgrade().map(Some).ok_or(ScopeError::MissingModel),
        }
    }

    /// Carries no constraint. A zero or empty-string value still counts as set.
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.operator.is_none() && self.value.is_null()
    }

    /// Reset key, operator and value
    pub fn clear(&mut self) -> &mut Self {
        self.key = None;
        self.operator = None;
        self.value = Value::Null;
        self
    }

    /// Bind to a model and apply the attachment hook
    pub fn bind(&mut self, model: &ModelRef) -> Result<()> {
        self.on_change_model(model)?;
        self.model = Some(std::sync::Arc::downgrade(model));
        Ok(())
    }

    /// A definitive scalar equality on a plain field becomes that field's locked
    /// default, so new records created under the model receive it.
    fn on_change_model(&self, model: &ModelRef) -> Result<()> {
        if self.operator.as_deref() != Some("=") {
            return Ok(());
        }
        let Value::Scalar(value) = &self.value else {
            return Ok(());
        };
        let Some(field) = self.key.as_ref().and_then(ConditionKey::plain_name) else {
            return Ok(());
        };

        model.lock_field_default(field, value)?;
        debug!(table = model.table(), field, %value, "locked field default");
        Ok(())
    }

    /// Replace the operator with its opposite
    pub fn negate(&mut self) -> Result<&mut Self> {
        let operator = self.operator.as_deref().unwrap_or_default();
        match operator::opposite(operator) {
            Some(opposite) => {
                self.operator = Some(opposite.to_string());
                Ok(self)
            }
            None => Err(ScopeError::UnsupportedNegation(operator.to_string())),
        }
    }

    /// Resolve into arguments the query compiler understands
    pub fn to_query_arguments(&self) -> Result<QueryArguments> {
        let Some(mut key) = self.key.clone() else {
            return Ok(QueryArguments::Empty);
        };
        let mut operator = self.operator.clone();
        let mut value = self.value.clone();

        let model = self.bound_model()?;
        let chained = matches!(&key, ConditionKey::Name(name) if name.contains(PATH_SEPARATOR));
        if chained && model.is_none() {
            return Err(ScopeError::MissingModel);
        }

        if let Some(model) = model {
            if let ConditionKey::Name(name) = &key {
                let name = name.clone();
                if name.contains(PATH_SEPARATOR) {
                    (key, operator, value) = resolve_chain(&model, &name, operator, value)?;
                } else {
                    key = ConditionKey::Field(model.field(&name)?);
                }
            }

            if let ConditionKey::Field(field) = &key {
                let skip = operator.as_deref().is_some_and(operator::skips_typecast);
                if !skip {
                    value = model.typecast_save_field(field, &value)?;
                }
            }
        }

        Ok(match operator {
            None => QueryArguments::Predicate(key),
            Some(op) if op == "=" => QueryArguments::Equals(key, value),
            Some(op) => QueryArguments::Compare(key, op, value),
        })
    }

    /// Render as a sentence, e.g. `Age is greater than '18'`
    pub fn to_words(&self) -> Result<String> {
        let model = self.model().ok_or(ScopeError::MissingModel)?;

        let key = self.key_to_words(&model)?;
        let operator = self.operator_to_words()?;
        let value = self.value_to_words(&model, &self.value)?;

        let words: Vec<&str> = [key.as_str(), operator, value.as_str()]
            .into_iter()
            .filter(|w| !w.is_empty())
            .collect();
        Ok(words.join(" ").trim().to_string())
    }

    fn key_to_words(&self, model: &ModelRef) -> Result<String> {
        let name = match &self.key {
            None => return Ok(String::new()),
            Some(ConditionKey::Field(field)) => return Ok(field.caption.clone()),
            Some(ConditionKey::Expression(expr)) => {
                return Ok(format!("expression '{}'", expr.debug_query()))
            }
            Some(ConditionKey::Name(name)) => name,
        };

        let mut words = Vec::new();
        let mut model = model.clone();
        let (links, field) = split_path(name);
        if !links.is_empty() {
            words.push(model.caption());
            for link in links {
                words.push(format!("that has reference {}", readable_caption(link)));
                model = model.ref_link(link)?;
            }
            words.push("where".to_string());

            if field == COUNT_MARKER {
                words.push(if self.operator.is_some() {
                    "number of records".to_string()
                } else {
                    "any referenced record exists".to_string()
                });
                return Ok(words.join(" "));
            }
        }

        if model.has_field(field) {
            words.push(model.field(field)?.caption);
        } else {
            words.push(readable_caption(field));
        }
        Ok(words.join(" "))
    }

    fn operator_to_words(&self) -> Result<&'static str> {
        match self.operator.as_deref() {
            None => Ok(""),
            Some(op) => {
                operator::words(op).ok_or_else(|| ScopeError::UnsupportedOperator(op.to_string()))
            }
        }
    }

    fn value_to_words(&self, model: &ModelRef, value: &Value) -> Result<String> {
        match value {
            Value::Null if self.operator.is_some() => Ok("empty".to_string()),
            Value::Null => Ok(String::new()),
            Value::List(items) => {
                let words = items
                    .iter()
                    .map(|item| self.value_to_words(model, item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(words.join(" or "))
            }
            Value::Field(field) => Ok(format!("{} {}", field.model_caption, field.caption)),
            Value::Expression(expr) => Ok(format!("expression '{}'", expr.debug_query())),
            Value::Scalar(scalar) => {
                if let Some(title) = self.reference_title(model, scalar)? {
                    return Ok(format!("'{}'", title));
                }
                Ok(format!("'{}'", scalar))
            }
        }
    }

    /// Title of the referenced record when the key's field is a reference
    fn reference_title(&self, model: &ModelRef, value: &Scalar) -> Result<Option<String>> {
        let (target, field) = match &self.key {
            Some(ConditionKey::Field(field)) => (model.clone(), field.clone()),
            Some(ConditionKey::Name(name)) => {
                let (links, field) = split_path(name);
                let mut target = model.clone();
                for link in links {
                    target = target.ref_link(link)?;
                }
                if !target.has_field(field) {
                    return Ok(None);
                }
                let field = target.field(field)?;
                (target, field)
            }
            _ => return Ok(None),
        };

        if field.reference.is_none() {
            return Ok(None);
        }
        target.reference_title(&field, value)
    }
}

/// Rewrite a chained key into existence/count sub-queries on related models,
/// innermost first. Returns the outermost key with its remaining operator and value.
fn resolve_chain(
    model: &ModelRef,
    path: &str,
    mut operator: Option<String>,
    mut value: Value,
) -> Result<(ConditionKey, Option<String>, Value)> {
    let (links, field) = split_path(path);

    let mut related: SmallVec<[ModelRef; 4]> = SmallVec::with_capacity(links.len());
    let mut current = model.clone();
    for link in &links {
        current = current.ref_link(link)?;
        related.push(current.clone());
    }

    let mut key = ConditionKey::Name(field.to_string());
    for target in related.iter().rev() {
        let is_marker = matches!(&key, ConditionKey::Name(name) if name == COUNT_MARKER);
        if is_marker {
            let action = if value.is_null() {
                Action::Exists
            } else {
                Action::Count
            };
            key = ConditionKey::Expression(target.action(action)?);
        } else {
            let condition =
                Condition::from_parts(Some(key), operator.take(), std::mem::take(&mut value));
            target.add_condition(condition)?;
            key = ConditionKey::Expression(target.action(Action::Exists)?);
        }
    }

    debug!(table = model.table(), path, "resolved chained key");
    Ok((key, operator, value))
}
