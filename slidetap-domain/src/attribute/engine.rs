// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Attribute construction, update, and display-value rendering
//! (`create_display_value` in spec §4.B).

use crate::error::{CoreError, CoreResult};
use crate::schema::{AttributeSchema, AttributeSchemaVariant};
use crate::value_objects::AttributeUid;

use super::value::{AttributeValue, UnionValue};
use super::Attribute;

/// Stateless entry point for building and updating [`Attribute`]s. Holds no
/// data of its own - every operation takes the relevant schema explicitly,
/// matching the Schema Registry's read-only, shared-by-reference model.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributeEngine;

impl AttributeEngine {
    pub fn new() -> Self {
        Self
    }

    /// Builds a fresh attribute from an already-shaped value tree, validating
    /// that the value's variant matches the schema's, assigning a uid, and
    /// computing the initial display value.
    pub fn build(&self, schema: &AttributeSchema, original: Option<AttributeValue>) -> CoreResult<Attribute> {
        if let Some(value) = &original {
            ensure_variant_matches(schema, value)?;
        }
        let display_value = original.as_ref().and_then(|v| self.display_value_of(schema, v));
        Ok(Attribute {
            uid: AttributeUid::new(),
            schema_uid: schema.uid.clone(),
            original_value: original,
            updated_value: None,
            mapped_value: None,
            mappable_value: None,
            display_value,
            valid: false,
            mapping_item_uid: None,
            locked: false,
        })
    }

    /// Builds an attribute carrying only a `mappable_value`, awaiting the
    /// Mapper Engine. Used when metadata import yields a raw string that
    /// must be resolved through a mapper rather than a typed value.
    pub fn build_mappable(&self, schema: &AttributeSchema, mappable_value: impl Into<String>) -> Attribute {
        Attribute {
            uid: AttributeUid::new(),
            schema_uid: schema.uid.clone(),
            original_value: None,
            updated_value: None,
            mapped_value: None,
            mappable_value: Some(mappable_value.into()),
            display_value: None,
            valid: false,
            mapping_item_uid: None,
            locked: false,
        }
    }

    /// Replaces `updated_value`, recomputing the display value and marking
    /// the attribute dirty for re-validation. Fails on a locked attribute
    /// (invariant iv: a locked attribute cannot be mutated).
    pub fn update(&self, attribute: &mut Attribute, schema: &AttributeSchema, updated: AttributeValue) -> CoreResult<()> {
        if attribute.locked {
            return Err(CoreError::not_allowed(format!("attribute {} is locked", attribute.uid)));
        }
        ensure_variant_matches(schema, &updated)?;
        attribute.display_value = self.display_value_of(schema, &updated);
        attribute.updated_value = Some(updated);
        attribute.valid = false;
        Ok(())
    }

    /// Replaces `mappable_value` only; does not touch `mapped_value` (that
    /// belongs to the Mapper Engine) or `original_value`.
    pub fn update_mappable(&self, attribute: &mut Attribute, mappable_value: impl Into<String>) -> CoreResult<()> {
        if attribute.locked {
            return Err(CoreError::not_allowed(format!("attribute {} is locked", attribute.uid)));
        }
        attribute.mappable_value = Some(mappable_value.into());
        attribute.valid = false;
        Ok(())
    }

    /// Updates or creates a child of an Object attribute by tag, recursing
    /// one level. A missing child attribute is created on the fly per
    /// spec §4.B ("a sub-attribute may be created on the fly if it does not
    /// exist").
    pub fn update_object_child(
        &self,
        attribute: &mut Attribute,
        object_schema: &AttributeSchema,
        tag: &str,
        child_schema: &AttributeSchema,
        child_value: AttributeValue,
    ) -> CoreResult<()> {
        if attribute.locked {
            return Err(CoreError::not_allowed(format!("attribute {} is locked", attribute.uid)));
        }
        let slot = attribute
            .updated_value
            .get_or_insert_with(|| AttributeValue::Object(Default::default()));
        let map = slot
            .as_object_mut()
            .ok_or_else(|| CoreError::invariant_violation("updated_value is not an Object"))?;
        match map.get_mut(tag) {
            Some(child) => self.update(child, child_schema, child_value)?,
            None => {
                let built = self.build(child_schema, Some(child_value))?;
                map.insert(tag.to_string(), built);
            }
        }
        attribute.display_value = self.display_value_of(object_schema, attribute.updated_value.as_ref().unwrap());
        attribute.valid = false;
        Ok(())
    }

    /// Renders the display value of a value tree under its schema
    /// (spec §4.B's per-variant rendering table).
    pub fn display_value_of(&self, schema: &AttributeSchema, value: &AttributeValue) -> Option<String> {
        match (&schema.variant, value) {
            (AttributeSchemaVariant::String, AttributeValue::String(s)) => Some(s.clone()),
            (AttributeSchemaVariant::Enum { .. }, AttributeValue::Enum(s)) => Some(s.clone()),
            (AttributeSchemaVariant::Datetime { .. }, AttributeValue::Datetime(dt)) => Some(dt.to_rfc3339()),
            (AttributeSchemaVariant::Numeric { is_integer, .. }, AttributeValue::Numeric(n)) => {
                if *is_integer {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            (AttributeSchemaVariant::Measurement { .. }, AttributeValue::Measurement(m)) => {
                Some(format!("{} {}", m.value, m.unit))
            }
            (AttributeSchemaVariant::Code { .. }, AttributeValue::Code(c)) => Some(c.meaning.clone()),
            (AttributeSchemaVariant::Boolean { true_display, false_display }, AttributeValue::Boolean(b)) => {
                Some(if *b { true_display.clone() } else { false_display.clone() })
            }
            (AttributeSchemaVariant::Object { display_value_tags, display_value_tags_joiner, .. }, AttributeValue::Object(m)) => {
                let parts: Vec<String> = display_value_tags
                    .iter()
                    .filter_map(|tag| m.get(tag))
                    .filter_map(|attr| attr.display_value.clone())
                    .collect();
                Some(parts.join(display_value_tags_joiner))
            }
            (AttributeSchemaVariant::List { .. }, AttributeValue::List(items)) => {
                let parts: Vec<String> = items.iter().map(|a| a.display_value.clone().unwrap_or_default()).collect();
                Some(format!("[{}]", parts.join(", ")))
            }
            (AttributeSchemaVariant::Union { .. }, AttributeValue::Union(UnionValue { inner, .. })) => inner.display_value.clone(),
            _ => None,
        }
    }

    /// Converts the internal attribute into the reduced external form used
    /// by import/export (spec §6), carrying only raw values and the schema
    /// tag - no ambient identity.
    pub fn to_external(&self, schema: &AttributeSchema, attribute: &Attribute) -> super::ExternalAttribute {
        super::external::to_external(schema, attribute)
    }

    /// Builds an attribute from the reduced external form.
    pub fn from_external(&self, schema: &AttributeSchema, external: &super::ExternalAttribute) -> CoreResult<Attribute> {
        super::external::from_external(self, schema, external)
    }
}

fn ensure_variant_matches(schema: &AttributeSchema, value: &AttributeValue) -> CoreResult<()> {
    let matches = matches!(
        (&schema.variant, value),
        (AttributeSchemaVariant::String, AttributeValue::String(_))
            | (AttributeSchemaVariant::Enum { .. }, AttributeValue::Enum(_))
            | (AttributeSchemaVariant::Datetime { .. }, AttributeValue::Datetime(_))
            | (AttributeSchemaVariant::Numeric { .. }, AttributeValue::Numeric(_))
            | (AttributeSchemaVariant::Measurement { .. }, AttributeValue::Measurement(_))
            | (AttributeSchemaVariant::Code { .. }, AttributeValue::Code(_))
            | (AttributeSchemaVariant::Boolean { .. }, AttributeValue::Boolean(_))
            | (AttributeSchemaVariant::Object { .. }, AttributeValue::Object(_))
            | (AttributeSchemaVariant::List { .. }, AttributeValue::List(_))
            | (AttributeSchemaVariant::Union { .. }, AttributeValue::Union(_))
    );
    if matches {
        Ok(())
    } else {
        Err(CoreError::invariant_violation(format!(
            "attribute value variant {} does not match schema variant {}",
            value.variant_name(),
            schema.variant.variant_name()
        )))
    }
}
