//! Scope node: leaf or compound

use crate::error::Result;
use crate::model::ModelRef;
use crate::scope::arguments::QueryArguments;
use crate::scope::compound::CompoundCondition;
use crate::scope::condition::Condition;

/// Any node of a scope tree
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    Condition(Condition),
    Compound(CompoundCondition),
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Compound(CompoundCondition::default())
    }
}

impl From<Condition> for Scope {
    fn from(cond: Condition) -> Self {
        Scope::Condition(cond)
    }
}

impl From<CompoundCondition> for Scope {
    fn from(compound: CompoundCondition) -> Self {
        Scope::Compound(compound)
    }
}

impl Scope {
    pub fn is_empty(&self) -> bool {
        match self {
            Scope::Condition(cond) => cond.is_empty(),
            Scope::Compound(compound) => compound.is_empty(),
        }
    }

    /// Whether rendering this node inside a compound needs parentheses
    pub fn is_compound(&self) -> bool {
        match self {
            Scope::Condition(_) => false,
            Scope::Compound(compound) => compound.is_compound(),
        }
    }

    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            Scope::Condition(cond) => Some(cond),
            Scope::Compound(_) => None,
        }
    }

    pub fn as_compound(&self) -> Option<&CompoundCondition> {
        match self {
            Scope::Condition(_) => None,
            Scope::Compound(compound) => Some(compound),
        }
    }

    pub fn model(&self) -> Option<ModelRef> {
        match self {
            Scope::Condition(cond) => cond.model(),
            Scope::Compound(compound) => compound.model(),
        }
    }

    pub fn bind(&mut self, model: &ModelRef) -> Result<()> {
        match self {
            Scope::Condition(cond) => cond.bind(model),
            Scope::Compound(compound) => compound.bind(model),
        }
    }

    pub fn negate(&mut self) -> Result<&mut Self> {
        match self {
            Scope::Condition(cond) => {
                cond.negate()?;
            }
            Scope::Compound(compound) => {
                compound.negate()?;
            }
        }
        Ok(self)
    }

    /// Unwrap single-child compounds down to the innermost meaningful node
    pub fn simplify(self) -> Scope {
        match self {
            Scope::Condition(_) => self,
            Scope::Compound(compound) => compound.simplify(),
        }
    }

    pub fn clear(&mut self) -> &mut Self {
        match self {
            Scope::Condition(cond) => {
                cond.clear();
            }
            Scope::Compound(compound) => {
                compound.clear();
            }
        }
        self
    }

    pub fn to_query_arguments(&self) -> Result<QueryArguments> {
        match self {
            Scope::Condition(cond) => cond.to_query_arguments(),
            Scope::Compound(compound) => compound.to_query_arguments(),
        }
    }

    pub fn to_words(&self) -> Result<String> {
        match self {
            Scope::Condition(cond) => cond.to_words(),
            Scope::Compound(compound) => compound.to_words(),
        }
    }
}
