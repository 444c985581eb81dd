//! Scope (condition tree) module
//!
//! A scope is a tree of leaf conditions (`field operator value`) joined by
//! AND/OR compounds. Trees can be negated, simplified, rendered to words and
//! resolved into query arguments once bound to a model.

mod arguments;
pub mod cache;
mod compound;
mod condition;
pub mod evaluator;
mod node;
pub mod operator;
pub mod parser;
mod value;

#[cfg(test)]
mod property_tests;

pub use arguments::*;
pub use cache::*;
pub use compound::*;
pub use condition::*;
pub use evaluator::*;
pub use node::*;
pub use parser::*;
pub use value::*;
