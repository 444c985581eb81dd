//! Declarative model schemas

use serde::Deserialize;

use crate::model::{FieldKind, Record};
use crate::scope::Scalar;

/// Catalog file: every model known to the application
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSchema {
    pub models: Vec<ModelSchema>,
}

/// Model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSchema {
    pub table: String,
    pub caption: Option<String>,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default = "default_title_field")]
    pub title_field: String,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
    /// Has-many references traversable with chained keys
    #[serde(default)]
    pub references: Vec<ReferenceSchema>,
    /// Records, used to resolve reference titles
    #[serde(default)]
    pub rows: Vec<Record>,
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_title_field() -> String {
    "name".to_string()
}

/// Field configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub caption: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
    /// Table this field references (has-one)
    pub reference: Option<String>,
    pub default: Option<Scalar>,
}

/// Reference configuration: `link` leads to `model` where
/// `model.their_field = this.our_field`
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceSchema {
    pub link: String,
    pub model: String,
    pub their_field: String,
    #[serde(default = "default_id_field")]
    pub our_field: String,
}
