// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Variant-specific payloads carried by an [`super::Attribute`].
//!
//! One [`AttributeValue`] case per [`crate::schema::AttributeSchemaVariant`];
//! the Attribute Engine keeps the two in lockstep (see
//! [`super::engine::AttributeEngine::build`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::AttributeSchemaUid;

use super::Attribute;

/// A measurement's numeric value plus its unit string (schema constrains
/// which units are allowed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementValue {
    pub value: f64,
    pub unit: String,
}

/// A coded value: scheme identifier, code within that scheme, and a
/// human-readable meaning. Display value is always the `meaning`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeValue {
    pub scheme: String,
    pub code: String,
    pub meaning: String,
}

/// The inner attribute selected by a Union, plus the schema identity that
/// was chosen (a Union's schema lists several candidate inner schemas;
/// this records which one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionValue {
    pub chosen_schema_uid: AttributeSchemaUid,
    pub inner: Box<Attribute>,
}

/// The payload carried by one of `original_value` / `updated_value` /
/// `mapped_value` on an [`Attribute`]. Shape mirrors
/// [`crate::schema::AttributeSchemaVariant`] one-for-one (invariant i in
/// spec §3: the payload shape must match the attribute's schema variant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    String(String),
    Enum(String),
    Datetime(DateTime<Utc>),
    Numeric(f64),
    Measurement(MeasurementValue),
    Code(CodeValue),
    Boolean(bool),
    Object(std::collections::BTreeMap<String, Attribute>),
    List(Vec<Attribute>),
    Union(UnionValue),
}

impl AttributeValue {
    pub fn variant_name(&self) -> &'static str {
        match self {
            AttributeValue::String(_) => "string",
            AttributeValue::Enum(_) => "enum",
            AttributeValue::Datetime(_) => "datetime",
            AttributeValue::Numeric(_) => "numeric",
            AttributeValue::Measurement(_) => "measurement",
            AttributeValue::Code(_) => "code",
            AttributeValue::Boolean(_) => "boolean",
            AttributeValue::Object(_) => "object",
            AttributeValue::List(_) => "list",
            AttributeValue::Union(_) => "union",
        }
    }

    pub fn as_object(&self) -> Option<&std::collections::BTreeMap<String, Attribute>> {
        match self {
            AttributeValue::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut std::collections::BTreeMap<String, Attribute>> {
        match self {
            AttributeValue::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Attribute>> {
        match self {
            AttributeValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Attribute>> {
        match self {
            AttributeValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionValue> {
        match self {
            AttributeValue::Union(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_union_mut(&mut self) -> Option<&mut UnionValue> {
        match self {
            AttributeValue::Union(u) => Some(u),
            _ => None,
        }
    }
}
