//! Scope Tree - logical condition trees for data-model filters
//!
//! This crate builds filter expressions (`field operator value`), combines
//! them with AND/OR, negates them via De Morgan's laws, resolves chained
//! `link/field` keys into existence/count sub-queries, and renders trees both
//! as query-compiler arguments and as human-readable sentences.
//!
//! ```no_run
//! use scope_tree::{Catalog, CompoundCondition, ScopeItem};
//!
//! # fn main() -> scope_tree::Result<()> {
//! let catalog = Catalog::from_json(r#"{"models": [{"table": "customer",
//!     "fields": [{"name": "age", "type": "integer"}, {"name": "status"}]}]}"#)?;
//! let customer = catalog.model("customer")?;
//!
//! let mut scope = CompoundCondition::create_and([
//!     ScopeItem::from(("age", ">", 18)),
//!     ScopeItem::from(("status", "active")),
//! ]);
//! scope.bind(&customer)?;
//! assert_eq!(
//!     scope.to_words()?,
//!     "Age is greater than '18' and Status is equal to 'active'"
//! );
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod model;
pub mod scope;

pub use error::{Result, ScopeError};
pub use model::{Catalog, Field, FieldKind, MemoryModel, Model, ModelRef, Record};
pub use scope::{
    check, get_or_parse, parse, Action, CompoundCondition, Condition, ConditionArgs,
    ConditionKey, Expression, Junction, QueryArguments, Scalar, Scope, ScopeItem, Value,
};
