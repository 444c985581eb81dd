//! Shop catalog shared by unit tests

use std::sync::Arc;

use crate::model::{Catalog, ModelRef};

pub(crate) const SHOP: &str = r#"{
  "models": [
    {
      "table": "customer",
      "fields": [
        { "name": "id", "type": "integer" },
        { "name": "name" },
        { "name": "age", "type": "integer" },
        { "name": "status" },
        { "name": "is_vip", "type": "boolean" },
        { "name": "country_id", "caption": "Country", "type": "integer", "reference": "country" }
      ],
      "references": [
        { "link": "orders", "model": "order", "their_field": "customer_id" }
      ]
    },
    {
      "table": "order",
      "fields": [
        { "name": "id", "type": "integer" },
        { "name": "customer_id", "type": "integer" },
        { "name": "status" },
        { "name": "total", "type": "float" }
      ],
      "references": [
        { "link": "lines", "model": "order_line", "their_field": "order_id" }
      ]
    },
    {
      "table": "order_line",
      "caption": "Order Line",
      "fields": [
        { "name": "id", "type": "integer" },
        { "name": "order_id", "type": "integer" },
        { "name": "product" },
        { "name": "qty", "caption": "Quantity", "type": "integer" }
      ]
    },
    {
      "table": "country",
      "fields": [
        { "name": "id", "type": "integer" },
        { "name": "name" }
      ],
      "rows": [
        { "id": 1, "name": "Latvia" },
        { "id": 2, "name": "Estonia" }
      ]
    }
  ]
}"#;

pub(crate) fn catalog() -> Arc<Catalog> {
    Catalog::from_json(SHOP).unwrap()
}

pub(crate) fn customer() -> ModelRef {
    catalog().model("customer").unwrap()
}
