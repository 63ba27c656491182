// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Validation report structs surfaced to the external interfaces (spec
//! §4.E, §6's `get_validation_for_{project,batch,dataset}`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::schema::AttributeSchema;
use crate::value_objects::{DatasetUid, ItemUid, ProjectUid};

use super::item::non_valid_attribute_tags;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectValidation {
    pub valid: bool,
    pub uid: ProjectUid,
    pub non_valid_attributes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetValidation {
    pub valid: bool,
    pub uid: DatasetUid,
    pub non_valid_attributes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchValidation {
    pub valid: bool,
    pub uid: crate::value_objects::BatchUid,
    pub non_valid_items: Vec<ItemUid>,
}

impl ProjectValidation {
    /// Evaluates `attributes` against `schema_attributes` (spec §4.E,
    /// §6's `get_validation_for_project`).
    pub fn evaluate(uid: ProjectUid, schema_attributes: &BTreeMap<String, AttributeSchema>, attributes: &BTreeMap<String, Attribute>) -> Self {
        let non_valid_attributes = non_valid_attribute_tags(schema_attributes, attributes);
        Self {
            valid: non_valid_attributes.is_empty(),
            uid,
            non_valid_attributes,
        }
    }
}

impl DatasetValidation {
    /// Evaluates `attributes` against `schema_attributes` (spec §4.E,
    /// §6's `get_validation_for_dataset`).
    pub fn evaluate(uid: DatasetUid, schema_attributes: &BTreeMap<String, AttributeSchema>, attributes: &BTreeMap<String, Attribute>) -> Self {
        let non_valid_attributes = non_valid_attribute_tags(schema_attributes, attributes);
        Self {
            valid: non_valid_attributes.is_empty(),
            uid,
            non_valid_attributes,
        }
    }
}

impl BatchValidation {
    pub fn from_non_valid_items(uid: crate::value_objects::BatchUid, non_valid_items: Vec<ItemUid>) -> Self {
        Self {
            valid: non_valid_items.is_empty(),
            uid,
            non_valid_items,
        }
    }
}
