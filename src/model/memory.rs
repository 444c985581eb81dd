//! In-memory model catalog
//!
//! A `Catalog` is loaded from a JSON schema and hands out `MemoryModel`
//! instances. Every model keeps its own scope, field metadata and the
//! records needed to resolve reference titles.

use std::sync::{Arc, Weak};

use ahash::AHashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::{Result, ScopeError};
use crate::model::{
    readable_caption, CatalogSchema, Field, FieldKind, Model, ModelRef, ModelSchema,
    ReferenceSchema,
};
use crate::scope::{Action, CompoundCondition, Condition, Expression, Scalar, Value};

/// Registry of model schemas
#[derive(Debug)]
pub struct Catalog {
    schemas: AHashMap<String, Arc<ModelSchema>>,
}

impl Catalog {
    pub fn from_schema(schema: CatalogSchema) -> Arc<Self> {
        let schemas = schema
            .models
            .into_iter()
            .map(|model| (model.table.clone(), Arc::new(model)))
            .collect();
        Arc::new(Self { schemas })
    }

    /// Load a catalog from its JSON form
    pub fn from_json(json: &str) -> Result<Arc<Self>> {
        let schema: CatalogSchema = serde_json::from_str(json)
            .map_err(|e| ScopeError::Deserialization(e.to_string()))?;
        debug!(models = schema.models.len(), "loaded model catalog");
        Ok(Self::from_schema(schema))
    }

    pub fn schema(&self, table: &str) -> Result<&Arc<ModelSchema>> {
        self.schemas
            .get(table)
            .ok_or_else(|| ScopeError::ModelNotFound(table.to_string()))
    }

    /// Create a fresh model over `table`
    pub fn model(self: &Arc<Self>, table: &str) -> Result<ModelRef> {
        let schema = self.schema(table)?.clone();
        let model: ModelRef = MemoryModel::create(self.clone(), schema, None);
        Ok(model)
    }
}

/// Model instance backed by a catalog schema
#[derive(Debug)]
pub struct MemoryModel {
    catalog: Arc<Catalog>,
    schema: Arc<ModelSchema>,
    fields: RwLock<AHashMap<String, Field>>,
    scope: RwLock<CompoundCondition>,
    /// `their.field = our.field` tying this model to the one it was reached from
    correlation: Option<String>,
    this: Weak<MemoryModel>,
}

impl MemoryModel {
    fn create(
        catalog: Arc<Catalog>,
        schema: Arc<ModelSchema>,
        correlation: Option<String>,
    ) -> Arc<Self> {
        let model_caption = schema_caption(&schema);
        let fields = schema
            .fields
            .iter()
            .map(|f| {
                let field = Field {
                    name: f.name.clone(),
                    caption: f.caption.clone().unwrap_or_else(|| readable_caption(&f.name)),
                    model_caption: model_caption.clone(),
                    kind: f.kind,
                    reference: f.reference.clone(),
                    system: false,
                    default: f.default.clone(),
                };
                (f.name.clone(), field)
            })
            .collect();

        Arc::new_cyclic(|this| Self {
            catalog,
            schema,
            fields: RwLock::new(fields),
            scope: RwLock::new(CompoundCondition::default()),
            correlation,
            this: this.clone(),
        })
    }

    fn this(&self) -> Result<ModelRef> {
        let this: ModelRef = self.this.upgrade().ok_or(ScopeError::MissingModel)?;
        Ok(this)
    }

    fn reference(&self, link: &str) -> Result<&ReferenceSchema> {
        self.schema
            .references
            .iter()
            .find(|r| r.link == link)
            .ok_or_else(|| ScopeError::ReferenceNotFound {
                model: self.schema.table.clone(),
                link: link.to_string(),
            })
    }

    /// Snapshot of this model's own scope
    pub fn scope(&self) -> CompoundCondition {
        self.scope.read().clone()
    }
}

fn schema_caption(schema: &ModelSchema) -> String {
    schema
        .caption
        .clone()
        .unwrap_or_else(|| readable_caption(&schema.table))
}

impl Model for MemoryModel {
    fn table(&self) -> &str {
        &self.schema.table
    }

    fn caption(&self) -> String {
        schema_caption(&self.schema)
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.read().contains_key(name)
    }

    fn field(&self, name: &str) -> Result<Field> {
        self.fields
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ScopeError::FieldNotFound {
                model: self.schema.table.clone(),
                field: name.to_string(),
            })
    }

    fn ref_link(&self, link: &str) -> Result<ModelRef> {
        let reference = self.reference(link)?;
        let schema = self.catalog.schema(&reference.model)?.clone();
        let correlation = format!(
            "{}.{} = {}.{}",
            schema.table, reference.their_field, self.schema.table, reference.our_field
        );
        trace!(table = self.table(), link, related = %schema.table, "traversing reference");

        let model: ModelRef = Self::create(self.catalog.clone(), schema, Some(correlation));
        Ok(model)
    }

    fn action(&self, action: Action) -> Result<Expression> {
        let scope = self.scope.read().to_query_arguments()?;
        Ok(Expression::Aggregate {
            action,
            table: self.schema.table.clone(),
            correlation: self.correlation.clone(),
            scope: Box::new(scope),
        })
    }

    fn add_condition(&self, mut condition: Condition) -> Result<()> {
        let this = self.this()?;
        condition.bind(&this)?;
        self.scope.write().add(condition)?;
        Ok(())
    }

    fn typecast_save_field(&self, field: &Field, value: &Value) -> Result<Value> {
        match value {
            Value::Scalar(scalar) => Ok(Value::Scalar(typecast(field, scalar)?)),
            Value::List(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.typecast_save_field(field, item))
                    .collect::<Result<Vec<_>>>()?,
            )),
            other => Ok(other.clone()),
        }
    }

    fn lock_field_default(&self, field: &str, value: &Scalar) -> Result<()> {
        let mut fields = self.fields.write();
        let field = fields
            .get_mut(field)
            .ok_or_else(|| ScopeError::FieldNotFound {
                model: self.schema.table.clone(),
                field: field.to_string(),
            })?;
        field.system = true;
        field.default = Some(value.clone());
        Ok(())
    }

    fn reference_title(&self, field: &Field, value: &Scalar) -> Result<Option<String>> {
        let Some(table) = field.reference.as_deref() else {
            return Ok(None);
        };
        let referenced = self.catalog.schema(table)?;
        let id = typecast_kind(FieldKind::Integer, value).unwrap_or_else(|| value.clone());

        let title = referenced
            .rows
            .iter()
            .find(|row| row.get(&referenced.id_field) == Some(&id))
            .and_then(|row| row.get(&referenced.title_field))
            .map(|title| title.to_string());
        Ok(title)
    }
}

fn typecast(field: &Field, value: &Scalar) -> Result<Scalar> {
    typecast_kind(field.kind, value).ok_or_else(|| ScopeError::Typecast {
        field: field.name.clone(),
        value: value.to_string(),
    })
}

/// Coerce a scalar to the storage type, `None` if it does not fit
fn typecast_kind(kind: FieldKind, value: &Scalar) -> Option<Scalar> {
    match (kind, value) {
        (FieldKind::String, Scalar::Str(_)) => Some(value.clone()),
        (FieldKind::String, other) => Some(Scalar::Str(other.to_string())),

        (FieldKind::Integer, Scalar::Int(_)) => Some(value.clone()),
        (FieldKind::Integer, Scalar::Bool(b)) => Some(Scalar::Int(i64::from(*b))),
        (FieldKind::Integer, Scalar::Float(f)) if f.fract() == 0.0 && fits_i64(*f) => {
            Some(Scalar::Int(*f as i64))
        }
        (FieldKind::Integer, Scalar::Str(s)) => s.trim().parse().ok().map(Scalar::Int),
        (FieldKind::Integer, Scalar::Float(_)) => None,

        (FieldKind::Float, Scalar::Float(_)) => Some(value.clone()),
        (FieldKind::Float, Scalar::Int(i)) => Some(Scalar::Float(*i as f64)),
        (FieldKind::Float, Scalar::Str(s)) => s.trim().parse().ok().map(Scalar::Float),
        (FieldKind::Float, Scalar::Bool(_)) => None,

        (FieldKind::Boolean, Scalar::Bool(_)) => Some(value.clone()),
        (FieldKind::Boolean, Scalar::Int(i)) => Some(Scalar::Bool(*i != 0)),
        (FieldKind::Boolean, Scalar::Str(s)) => match s.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => Some(Scalar::Bool(true)),
            "0" | "false" | "no" | "" => Some(Scalar::Bool(false)),
            _ => None,
        },
        (FieldKind::Boolean, Scalar::Float(_)) => None,
    }
}

/// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive
fn fits_i64(f: f64) -> bool {
    f >= i64::MIN as f64 && f < i64::MAX as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    #[test]
    fn test_catalog_from_json() {
        let catalog = fixtures::catalog();
        let customer = catalog.model("customer").unwrap();
        assert_eq!(customer.caption(), "Customer");
        assert!(customer.has_field("age"));
        assert!(!customer.has_field("shoe_size"));

        let age = customer.field("age").unwrap();
        assert_eq!(age.caption, "Age");
        assert_eq!(age.kind, FieldKind::Integer);
        assert_eq!(age.model_caption, "Customer");
    }

    #[test]
    fn test_unknown_model() {
        let catalog = fixtures::catalog();
        assert_eq!(
            catalog.model("invoice").unwrap_err(),
            ScopeError::ModelNotFound("invoice".to_string())
        );
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Catalog::from_json("{\"models\": 5}"),
            Err(ScopeError::Deserialization(_))
        ));
    }

    #[test]
    fn test_ref_link_is_fresh() {
        let customer = fixtures::customer();
        let first = customer.ref_link("orders").unwrap();
        first.add_condition(Condition::equals("status", "shipped")).unwrap();

        let second = customer.ref_link("orders").unwrap();
        let expr = second.action(Action::Exists).unwrap();
        assert_eq!(
            expr.debug_query(),
            "exists (select * from order where order.customer_id = customer.id)"
        );

        let expr = first.action(Action::Count).unwrap();
        assert_eq!(
            expr.debug_query(),
            "(select count(*) from order where order.customer_id = customer.id and status = 'shipped')"
        );
    }

    #[test]
    fn test_add_condition_locks_related_default() {
        let customer = fixtures::customer();
        let orders = customer.ref_link("orders").unwrap();
        orders.add_condition(Condition::equals("status", "shipped")).unwrap();

        let status = orders.field("status").unwrap();
        assert!(status.system);
        assert_eq!(status.default, Some(Scalar::Str("shipped".to_string())));
    }

    #[test]
    fn test_typecast_kinds() {
        assert_eq!(
            typecast_kind(FieldKind::Integer, &Scalar::Str(" 42 ".into())),
            Some(Scalar::Int(42))
        );
        assert_eq!(typecast_kind(FieldKind::Integer, &Scalar::Float(1.5)), None);
        assert_eq!(
            typecast_kind(FieldKind::Integer, &Scalar::Float(-3.0)),
            Some(Scalar::Int(-3))
        );
        assert_eq!(
            typecast_kind(FieldKind::Float, &Scalar::Int(2)),
            Some(Scalar::Float(2.0))
        );
        assert_eq!(
            typecast_kind(FieldKind::Boolean, &Scalar::Str("yes".into())),
            Some(Scalar::Bool(true))
        );
        assert_eq!(
            typecast_kind(FieldKind::String, &Scalar::Int(7)),
            Some(Scalar::Str("7".into()))
        );
    }

    #[test]
    fn test_out_of_range_float_is_rejected() {
        assert_eq!(typecast_kind(FieldKind::Integer, &Scalar::Float(1e20)), None);
        assert_eq!(typecast_kind(FieldKind::Integer, &Scalar::Float(-1e20)), None);
        assert_eq!(
            typecast_kind(FieldKind::Integer, &Scalar::Float(9.223372036854775807e18)),
            None
        );

        let customer = fixtures::customer();
        let age = customer.field("age").unwrap();
        assert!(matches!(
            customer.typecast_save_field(&age, &Value::from(1e20)),
            Err(ScopeError::Typecast { .. })
        ));
    }

    #[test]
    fn test_reference_title() {
        let customer = fixtures::customer();
        let country = customer.field("country_id").unwrap();
        assert_eq!(
            customer.reference_title(&country, &Scalar::Str("1".into())).unwrap(),
            Some("Latvia".to_string())
        );
        assert_eq!(customer.reference_title(&country, &Scalar::Int(5)).unwrap(), None);

        let name = customer.field("name").unwrap();
        assert_eq!(customer.reference_title(&name, &Scalar::Int(1)).unwrap(), None);
    }
}
