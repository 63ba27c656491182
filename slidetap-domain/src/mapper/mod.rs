// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Mapper Engine (component C): pattern -> attribute rules that populate
//! `mapped_value` from `mappable_value`.

mod engine;
mod regex_cache;

pub use engine::MapperEngine;
pub use regex_cache::RegexCache;

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::value_objects::{AttributeSchemaUid, MapperGroupUid, MapperUid, MappingItemUid};

/// One rule within a [`Mapper`]: a regular expression and the replacement
/// attribute it substitutes on a match, plus a hit counter used to order
/// re-application (spec §4.C step 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingItem {
    pub uid: MappingItemUid,
    pub expression: String,
    pub attribute: Attribute,
    pub hits: u64,
}

impl MappingItem {
    pub fn new(expression: impl Into<String>, attribute: Attribute) -> Self {
        Self {
            uid: MappingItemUid::new(),
            expression: expression.into(),
            attribute,
            hits: 0,
        }
    }
}

/// A named, ordered collection of mapping items that substitute
/// `mapped_value` for attributes matching `attribute_schema_uid`, scanning
/// the `mappable_value` of attributes under `root_attribute_schema_uid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapper {
    pub uid: MapperUid,
    pub name: String,
    pub attribute_schema_uid: AttributeSchemaUid,
    pub root_attribute_schema_uid: AttributeSchemaUid,
    pub mapping_items: Vec<MappingItem>,
}

impl Mapper {
    pub fn new(name: impl Into<String>, attribute_schema_uid: AttributeSchemaUid, root_attribute_schema_uid: AttributeSchemaUid) -> Self {
        Self {
            uid: MapperUid::new(),
            name: name.into(),
            attribute_schema_uid,
            root_attribute_schema_uid,
            mapping_items: Vec::new(),
        }
    }

    pub fn add_mapping_item(&mut self, item: MappingItem) {
        self.mapping_items.push(item);
    }

    /// Replaces an existing item's expression and replacement attribute in
    /// place. `hits` is left untouched - editing a rule's content doesn't
    /// erase the popularity it already earned.
    pub fn update_mapping_item(&mut self, uid: &MappingItemUid, expression: impl Into<String>, attribute: Attribute) -> bool {
        let Some(item) = self.mapping_items.iter_mut().find(|m| &m.uid == uid) else {
            return false;
        };
        item.expression = expression.into();
        item.attribute = attribute;
        true
    }

    pub fn remove_mapping_item(&mut self, uid: &MappingItemUid) -> Option<MappingItem> {
        let idx = self.mapping_items.iter().position(|m| &m.uid == uid)?;
        Some(self.mapping_items.remove(idx))
    }
}

/// Collects mappers and attaches them to projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperGroup {
    pub uid: MapperGroupUid,
    pub name: String,
    pub mapper_uids: Vec<MapperUid>,
}

impl MapperGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uid: MapperGroupUid::new(),
            name: name.into(),
            mapper_uids: Vec::new(),
        }
    }
}
