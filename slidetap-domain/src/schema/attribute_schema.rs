// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Attribute schema definitions.
//!
//! An [`AttributeSchema`] is a tagged variant over the ten attribute shapes
//! the engine supports. Schemas are immutable and shared by reference once
//! loaded into a [`super::RootSchema`] - see that module's docs for the
//! registry's lifetime rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::AttributeSchemaUid;

/// The three datetime granularities the engine distinguishes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum DatetimeType {
    Date,
    Time,
    Datetime,
}

/// Default joiner used to render an Object attribute's display value when
/// the schema does not override it.
pub const DEFAULT_DISPLAY_VALUE_JOINER: &str = ", ";

/// Variant-specific payload of an [`AttributeSchema`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AttributeSchemaVariant {
    String,
    Enum {
        allowed_values: Vec<String>,
    },
    Datetime {
        datetime_type: DatetimeType,
    },
    Numeric {
        is_integer: bool,
        min: Option<f64>,
        max: Option<f64>,
    },
    Measurement {
        allowed_units: Vec<String>,
        min: Option<f64>,
        max: Option<f64>,
    },
    Code {
        allowed_schemas: Vec<String>,
    },
    Boolean {
        true_display: String,
        false_display: String,
    },
    Object {
        /// Declared child attributes, keyed by tag.
        attributes: BTreeMap<String, AttributeSchema>,
        /// Tags whose display values are joined to form the object's own
        /// display value.
        display_value_tags: Vec<String>,
        display_value_tags_joiner: String,
    },
    List {
        attribute: Box<AttributeSchema>,
        min_items: usize,
        max_items: Option<usize>,
        /// Whether the parent item's display should inline this list's
        /// elements rather than showing it as a single field.
        display_attributes_in_parent: bool,
    },
    Union {
        /// Ordered set of candidate inner schemas; order is the
        /// preference order shown to a user picking a variant, and ties
        /// in mapping/validation resolve in this order.
        attributes: Vec<AttributeSchema>,
    },
}

impl AttributeSchemaVariant {
    /// Stable name of the variant, used in the external attribute form's
    /// `attribute_value_type` field (see spec §6).
    pub fn variant_name(&self) -> &'static str {
        match self {
            AttributeSchemaVariant::String => "string",
            AttributeSchemaVariant::Enum { .. } => "enum",
            AttributeSchemaVariant::Datetime { .. } => "datetime",
            AttributeSchemaVariant::Numeric { .. } => "numeric",
            AttributeSchemaVariant::Measurement { .. } => "measurement",
            AttributeSchemaVariant::Code { .. } => "code",
            AttributeSchemaVariant::Boolean { .. } => "boolean",
            AttributeSchemaVariant::Object { .. } => "object",
            AttributeSchemaVariant::List { .. } => "list",
            AttributeSchemaVariant::Union { .. } => "union",
        }
    }
}

/// Immutable definition of one attribute's shape and constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSchema {
    pub uid: AttributeSchemaUid,
    /// The tag this attribute is keyed by within its parent holder.
    pub tag: String,
    /// Whether a missing/null value is still a valid attribute.
    pub optional: bool,
    pub variant: AttributeSchemaVariant,
}

impl AttributeSchema {
    pub fn new(uid: AttributeSchemaUid, tag: impl Into<String>, optional: bool, variant: AttributeSchemaVariant) -> Self {
        Self {
            uid,
            tag: tag.into(),
            optional,
            variant,
        }
    }

    pub fn object(
        uid: AttributeSchemaUid,
        tag: impl Into<String>,
        optional: bool,
        attributes: BTreeMap<String, AttributeSchema>,
        display_value_tags: Vec<String>,
    ) -> Self {
        Self::new(
            uid,
            tag,
            optional,
            AttributeSchemaVariant::Object {
                attributes,
                display_value_tags,
                display_value_tags_joiner: DEFAULT_DISPLAY_VALUE_JOINER.to_string(),
            },
        )
    }
}
