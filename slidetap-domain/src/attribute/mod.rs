// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Attribute Engine (component B): construction, update, display-value
//! rendering, and round-trip conversion of typed attributes.

mod engine;
mod external;
mod value;

pub use engine::AttributeEngine;
pub use external::ExternalAttribute;
pub use value::{AttributeValue, CodeValue, MeasurementValue, UnionValue};

use serde::{Deserialize, Serialize};

use crate::value_objects::{AttributeSchemaUid, AttributeUid, MappingItemUid};

/// A typed metadata field. One identity per usage site: an Attribute
/// belongs to exactly one parent holder (an Item, a Project, a Dataset, or
/// a parent Attribute for Object members / List elements / Union inners) -
/// see spec §3's "ownership is exclusive" rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub uid: AttributeUid,
    pub schema_uid: AttributeSchemaUid,
    pub original_value: Option<AttributeValue>,
    pub updated_value: Option<AttributeValue>,
    pub mapped_value: Option<AttributeValue>,
    /// Raw string awaiting mapping; never touched by the Attribute Engine
    /// once set, only read by the Mapper Engine.
    pub mappable_value: Option<String>,
    pub display_value: Option<String>,
    pub valid: bool,
    pub mapping_item_uid: Option<MappingItemUid>,
    pub locked: bool,
}

impl Attribute {
    /// Effective value per spec §3: `updated_value`, else `mapped_value`,
    /// else `original_value`.
    pub fn effective_value(&self) -> Option<&AttributeValue> {
        self.updated_value
            .as_ref()
            .or(self.mapped_value.as_ref())
            .or(self.original_value.as_ref())
    }

    pub fn effective_value_mut(&mut self) -> Option<&mut AttributeValue> {
        if self.updated_value.is_some() {
            self.updated_value.as_mut()
        } else if self.mapped_value.is_some() {
            self.mapped_value.as_mut()
        } else {
            self.original_value.as_mut()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effective_value().is_none() && self.mappable_value.is_none()
    }
}
