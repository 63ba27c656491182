// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Per-attribute validity predicate (spec §4.E table). Terminates and
//! returns a bool for every `(AttributeSchema, payload)` pair the schema
//! grammar permits (testable property 5).

use crate::attribute::{Attribute, AttributeValue};
use crate::schema::{AttributeSchema, AttributeSchemaVariant};

/// Returns whether `attribute` satisfies `schema`'s predicate. Does not
/// mutate either argument; callers (the Attribute Engine / Item Store)
/// write the result back into `Attribute::valid`.
pub fn validate_attribute(schema: &AttributeSchema, attribute: &Attribute) -> bool {
    let optional = schema.optional;
    match attribute.effective_value() {
        None => optional,
        Some(value) => validate_value(schema, value, optional),
    }
}

fn validate_value(schema: &AttributeSchema, value: &AttributeValue, optional: bool) -> bool {
    match (&schema.variant, value) {
        (AttributeSchemaVariant::String, AttributeValue::String(s)) => !s.is_empty() || optional,
        (AttributeSchemaVariant::Enum { allowed_values }, AttributeValue::Enum(s)) => allowed_values.iter().any(|v| v == s),
        (AttributeSchemaVariant::Datetime { .. }, AttributeValue::Datetime(_)) => true,
        (AttributeSchemaVariant::Numeric { is_integer, min, max }, AttributeValue::Numeric(n)) => {
            let in_range = min.is_none_or(|m| *n >= m) && max.is_none_or(|m| *n <= m);
            let integer_ok = !is_integer || n.fract() == 0.0;
            in_range && integer_ok
        }
        (AttributeSchemaVariant::Measurement { allowed_units, min, max }, AttributeValue::Measurement(m)) => {
            let unit_ok = allowed_units.is_empty() || allowed_units.iter().any(|u| u == &m.unit);
            let in_range = min.is_none_or(|lo| m.value >= lo) && max.is_none_or(|hi| m.value <= hi);
            unit_ok && in_range
        }
        (AttributeSchemaVariant::Code { allowed_schemas }, AttributeValue::Code(c)) => {
            allowed_schemas.is_empty() || allowed_schemas.iter().any(|s| s == &c.scheme)
        }
        (AttributeSchemaVariant::Boolean { .. }, AttributeValue::Boolean(_)) => true,
        (AttributeSchemaVariant::Object { attributes, .. }, AttributeValue::Object(values)) => {
            attributes.iter().all(|(tag, child_schema)| match values.get(tag) {
                Some(child) => validate_attribute(child_schema, child),
                None => child_schema.optional,
            })
        }
        (AttributeSchemaVariant::List { attribute, min_items, max_items, .. }, AttributeValue::List(items)) => {
            let count_ok = items.len() >= *min_items && max_items.is_none_or(|max| items.len() <= max);
            let empty_ok = !items.is_empty() || optional;
            count_ok && empty_ok && items.iter().all(|item| validate_attribute(attribute, item))
        }
        (AttributeSchemaVariant::Union { attributes }, AttributeValue::Union(u)) => attributes
            .iter()
            .find(|candidate| candidate.uid == u.chosen_schema_uid)
            .map(|candidate| validate_attribute(candidate, &u.inner))
            .unwrap_or(false),
        // Payload shape mismatched with schema variant: not a validation
        // failure, an invariant violation elsewhere catches this. Here
        // the predicate must still terminate, so it reports non-valid.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeEngine, CodeValue};
    use crate::value_objects::AttributeSchemaUid;

    #[test]
    fn required_code_with_no_value_is_invalid() {
        // Scenario S3.
        let schema = AttributeSchema::new(
            AttributeSchemaUid::new(),
            "fixation",
            false,
            AttributeSchemaVariant::Code { allowed_schemas: vec!["CUSTOM".into()] },
        );
        let engine = AttributeEngine::new();
        let attr = engine.build(&schema, None).unwrap();
        assert!(!validate_attribute(&schema, &attr));
    }

    #[test]
    fn optional_attribute_with_no_value_is_valid() {
        let schema = AttributeSchema::new(AttributeSchemaUid::new(), "notes", true, AttributeSchemaVariant::String);
        let engine = AttributeEngine::new();
        let attr = engine.build(&schema, None).unwrap();
        assert!(validate_attribute(&schema, &attr));
    }

    #[test]
    fn numeric_out_of_range_is_invalid() {
        let schema = AttributeSchema::new(
            AttributeSchemaUid::new(),
            "age",
            false,
            AttributeSchemaVariant::Numeric { is_integer: true, min: Some(0.0), max: Some(120.0) },
        );
        let engine = AttributeEngine::new();
        let attr = engine.build(&schema, Some(crate::attribute::AttributeValue::Numeric(200.0))).unwrap();
        assert!(!validate_attribute(&schema, &attr));
    }

    #[test]
    fn code_with_disallowed_scheme_is_invalid() {
        let schema = AttributeSchema::new(
            AttributeSchemaUid::new(),
            "collection",
            false,
            AttributeSchemaVariant::Code { allowed_schemas: vec!["SNOMED".into()] },
        );
        let engine = AttributeEngine::new();
        let attr = engine
            .build(
                &schema,
                Some(AttributeValue::Code(CodeValue {
                    scheme: "CUSTOM".into(),
                    code: "x".into(),
                    meaning: "x".into(),
                })),
            )
            .unwrap();
        assert!(!validate_attribute(&schema, &attr));
    }
}
