// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Bidirectional conversion between the internal [`super::Attribute`] and
//! the reduced external form mandated by spec §6:
//! `{ attribute_value_type, value, display_value }`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::schema::{AttributeSchema, AttributeSchemaVariant};

use super::engine::AttributeEngine;
use super::value::{AttributeValue, CodeValue, MeasurementValue, UnionValue};
use super::Attribute;

/// The schema-defined external attribute form (spec §6). No ambient
/// identity (uid, locked, mapping_item_uid) travels across this boundary -
/// only the raw values and schema tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalAttribute {
    pub attribute_value_type: String,
    pub value: Value,
    pub display_value: Option<String>,
}

pub(super) fn to_external(schema: &AttributeSchema, attribute: &Attribute) -> ExternalAttribute {
    let value = attribute
        .effective_value()
        .map(|v| value_to_json(schema, v))
        .unwrap_or(Value::Null);
    ExternalAttribute {
        attribute_value_type: schema.variant.variant_name().to_string(),
        value,
        display_value: attribute.display_value.clone(),
    }
}

fn value_to_json(schema: &AttributeSchema, value: &AttributeValue) -> Value {
    match value {
        AttributeValue::String(s) => Value::String(s.clone()),
        AttributeValue::Enum(s) => Value::String(s.clone()),
        AttributeValue::Datetime(dt) => Value::String(dt.to_rfc3339()),
        AttributeValue::Numeric(n) => serde_json::Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
        AttributeValue::Measurement(m) => serde_json::json!({ "value": m.value, "unit": m.unit }),
        AttributeValue::Code(c) => serde_json::json!({ "scheme": c.scheme, "code": c.code, "meaning": c.meaning }),
        AttributeValue::Boolean(b) => Value::Bool(*b),
        AttributeValue::Object(m) => {
            let child_schemas = match &schema.variant {
                AttributeSchemaVariant::Object { attributes, .. } => Some(attributes),
                _ => None,
            };
            let mut out = Map::new();
            for (tag, attr) in m {
                let child_schema = child_schemas.and_then(|a| a.get(tag));
                let external = child_schema
                    .map(|s| to_external(s, attr))
                    .unwrap_or_else(|| ExternalAttribute {
                        attribute_value_type: "unknown".to_string(),
                        value: Value::Null,
                        display_value: attr.display_value.clone(),
                    });
                out.insert(tag.clone(), serde_json::to_value(external).unwrap_or(Value::Null));
            }
            Value::Object(out)
        }
        AttributeValue::List(items) => {
            let item_schema = match &schema.variant {
                AttributeSchemaVariant::List { attribute, .. } => Some(attribute.as_ref()),
                _ => None,
            };
            Value::Array(
                items
                    .iter()
                    .map(|item| {
                        let external = item_schema
                            .map(|s| to_external(s, item))
                            .unwrap_or_else(|| ExternalAttribute {
                                attribute_value_type: "unknown".to_string(),
                                value: Value::Null,
                                display_value: item.display_value.clone(),
                            });
                        serde_json::to_value(external).unwrap_or(Value::Null)
                    })
                    .collect(),
            )
        }
        AttributeValue::Union(UnionValue { chosen_schema_uid, inner }) => {
            let candidates = match &schema.variant {
                AttributeSchemaVariant::Union { attributes } => attributes,
                _ => return Value::Null,
            };
            let inner_schema = candidates.iter().find(|s| &s.uid == chosen_schema_uid);
            let external = inner_schema
                .map(|s| to_external(s, inner))
                .unwrap_or_else(|| ExternalAttribute {
                    attribute_value_type: "unknown".to_string(),
                    value: Value::Null,
                    display_value: inner.display_value.clone(),
                });
            serde_json::json!({
                "attribute_name": inner_schema.map(|s| s.tag.clone()).unwrap_or_default(),
                "value": external,
            })
        }
    }
}

pub(super) fn from_external(engine: &AttributeEngine, schema: &AttributeSchema, external: &ExternalAttribute) -> CoreResult<Attribute> {
    if external.value.is_null() {
        return engine.build(schema, None);
    }
    let value = json_to_value(engine, schema, &external.value)?;
    engine.build(schema, Some(value))
}

fn json_to_value(engine: &AttributeEngine, schema: &AttributeSchema, json: &Value) -> CoreResult<AttributeValue> {
    match &schema.variant {
        AttributeSchemaVariant::String => Ok(AttributeValue::String(json_as_string(json)?)),
        AttributeSchemaVariant::Enum { .. } => Ok(AttributeValue::Enum(json_as_string(json)?)),
        AttributeSchemaVariant::Datetime { .. } => {
            let s = json_as_string(json)?;
            let dt: DateTime<Utc> = DateTime::parse_from_rfc3339(&s)
                .map_err(|e| CoreError::validation_failure(format!("invalid datetime: {e}")))?
                .with_timezone(&Utc);
            Ok(AttributeValue::Datetime(dt))
        }
        AttributeSchemaVariant::Numeric { .. } => {
            let n = json.as_f64().ok_or_else(|| CoreError::validation_failure("expected a number"))?;
            Ok(AttributeValue::Numeric(n))
        }
        AttributeSchemaVariant::Measurement { .. } => {
            let value = json
                .get("value")
                .and_then(Value::as_f64)
                .ok_or_else(|| CoreError::validation_failure("measurement missing value"))?;
            let unit = json
                .get("unit")
                .and_then(Value::as_str)
                .ok_or_else(|| CoreError::validation_failure("measurement missing unit"))?
                .to_string();
            Ok(AttributeValue::Measurement(MeasurementValue { value, unit }))
        }
        AttributeSchemaVariant::Code { .. } => {
            let scheme = json.get("scheme").and_then(Value::as_str).unwrap_or_default().to_string();
            let code = json.get("code").and_then(Value::as_str).unwrap_or_default().to_string();
            let meaning = json.get("meaning").and_then(Value::as_str).unwrap_or_default().to_string();
            Ok(AttributeValue::Code(CodeValue { scheme, code, meaning }))
        }
        AttributeSchemaVariant::Boolean { .. } => {
            let b = json.as_bool().ok_or_else(|| CoreError::validation_failure("expected a boolean"))?;
            Ok(AttributeValue::Boolean(b))
        }
        AttributeSchemaVariant::Object { attributes, .. } => {
            let obj = json.as_object().ok_or_else(|| CoreError::validation_failure("expected an object"))?;
            let mut out = BTreeMap::new();
            for (tag, child_schema) in attributes {
                if let Some(raw) = obj.get(tag) {
                    let external: ExternalAttribute = serde_json::from_value(raw.clone())
                        .map_err(|e| CoreError::validation_failure(format!("malformed child {tag}: {e}")))?;
                    out.insert(tag.clone(), from_external(engine, child_schema, &external)?);
                }
            }
            Ok(AttributeValue::Object(out))
        }
        AttributeSchemaVariant::List { attribute, .. } => {
            let arr = json.as_array().ok_or_else(|| CoreError::validation_failure("expected an array"))?;
            let mut items = Vec::with_capacity(arr.len());
            for raw in arr {
                let external: ExternalAttribute =
                    serde_json::from_value(raw.clone()).map_err(|e| CoreError::validation_failure(format!("malformed list item: {e}")))?;
                items.push(from_external(engine, attribute, &external)?);
            }
            Ok(AttributeValue::List(items))
        }
        AttributeSchemaVariant::Union { attributes } => {
            let name = json
                .get("attribute_name")
                .and_then(Value::as_str)
                .ok_or_else(|| CoreError::validation_failure("union missing attribute_name"))?;
            let inner_schema = attributes
                .iter()
                .find(|s| s.tag == name)
                .ok_or_else(|| CoreError::validation_failure(format!("unknown union member {name}")))?;
            let raw = json
                .get("value")
                .ok_or_else(|| CoreError::validation_failure("union missing value"))?;
            let external: ExternalAttribute =
                serde_json::from_value(raw.clone()).map_err(|e| CoreError::validation_failure(format!("malformed union value: {e}")))?;
            let inner = from_external(engine, inner_schema, &external)?;
            Ok(AttributeValue::Union(UnionValue {
                chosen_schema_uid: inner_schema.uid.clone(),
                inner: Box::new(inner),
            }))
        }
    }
}

fn json_as_string(json: &Value) -> CoreResult<String> {
    json.as_str()
        .map(str::to_string)
        .ok_or_else(|| CoreError::validation_failure("expected a string"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::AttributeSchemaUid;

    #[test]
    fn round_trips_a_string_attribute() {
        // Testable property 8 (round-trip).
        let schema = AttributeSchema::new(AttributeSchemaUid::new(), "name", false, AttributeSchemaVariant::String);
        let engine = AttributeEngine::new();
        let attr = engine.build(&schema, Some(AttributeValue::String("ABC-1".into()))).unwrap();
        let external = engine.to_external(&schema, &attr);
        let restored = engine.from_external(&schema, &external).unwrap();
        assert_eq!(restored.effective_value(), attr.effective_value());
        assert_eq!(restored.display_value, attr.display_value);
    }

    #[test]
    fn round_trips_a_code_attribute() {
        let schema = AttributeSchema::new(
            AttributeSchemaUid::new(),
            "collection",
            false,
            AttributeSchemaVariant::Code { allowed_schemas: vec!["CUSTOM".into()] },
        );
        let engine = AttributeEngine::new();
        let attr = engine
            .build(
                &schema,
                Some(AttributeValue::Code(CodeValue {
                    scheme: "CUSTOM".into(),
                    code: "Excision".into(),
                    meaning: "Excision".into(),
                })),
            )
            .unwrap();
        let external = engine.to_external(&schema, &attr);
        let restored = engine.from_external(&schema, &external).unwrap();
        assert_eq!(restored.effective_value(), attr.effective_value());
    }
}
