//! Data-model collaborator consumed by the scope tree
//!
//! Conditions never own a model. They hold a weak binding and ask the model
//! for field metadata, related models and sub-query expressions on demand.

pub mod memory;
mod schema;

#[cfg(test)]
pub(crate) mod fixtures;

pub use memory::*;
pub use schema::*;

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use serde::Deserialize;

use crate::error::Result;
use crate::scope::{Action, Condition, Expression, Scalar, Value};

/// Shared handle to a model
pub type ModelRef = Arc<dyn Model>;

/// Flat record of field values; a missing field is null
pub type Record = AHashMap<String, Scalar>;

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    String,
    Integer,
    Float,
    Boolean,
}

/// Snapshot of a model field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub caption: String,
    /// Caption of the model owning this field
    pub model_caption: String,
    pub kind: FieldKind,
    /// Model referenced by this field's values
    pub reference: Option<String>,
    /// Managed by a condition, not by the user
    pub system: bool,
    pub default: Option<Scalar>,
}

/// Data collection a scope filters
pub trait Model: Send + Sync + fmt::Debug {
    /// Table (collection) name
    fn table(&self) -> &str;

    /// Display caption of the model
    fn caption(&self) -> String;

    fn has_field(&self, name: &str) -> bool;

    /// Resolve a field by name
    fn field(&self, name: &str) -> Result<Field>;

    /// Traverse a named reference, returning a fresh related model scoped to this one
    fn ref_link(&self, link: &str) -> Result<ModelRef>;

    /// Build a count/exists sub-query over this model's own scope
    fn action(&self, action: Action) -> Result<Expression>;

    /// Push a condition onto this model's own scope
    fn add_condition(&self, condition: Condition) -> Result<()>;

    /// Adapt a value for storage-side comparison against `field`
    fn typecast_save_field(&self, field: &Field, value: &Value) -> Result<Value>;

    /// Mark the field system-managed and default new records to `value`
    fn lock_field_default(&self, field: &str, value: &Scalar) -> Result<()>;

    /// Display title of the record `field` references by `value`
    fn reference_title(&self, field: &Field, value: &Scalar) -> Result<Option<String>>;
}

/// Turn an identifier like `client_orders` into `Client Orders`
pub fn readable_caption(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
