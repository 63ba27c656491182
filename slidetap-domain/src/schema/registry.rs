// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Schema Registry (component A): an immutable, in-memory lookup facade
//! over a loaded [`RootSchema`].
//!
//! The registry is built once from a user-supplied `RootSchema` and never
//! mutated afterwards - readers may share it lock-free (see the
//! concurrency model's "Schema Registry is read-only after load" rule).
//! Index maps are built at construction time so lookups are O(1) rather
//! than walking the tree on every call.

use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::attribute_schema::AttributeSchema;
use crate::schema::item_schema::ItemSchema;
use crate::schema::root_schema::RootSchema;
use crate::value_objects::{AttributeSchemaUid, ItemSchemaUid};

/// Read-only facade over a [`RootSchema`], with precomputed lookup indices.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    root: Arc<RootSchema>,
    items_by_uid: HashMap<ItemSchemaUid, ItemSchema>,
    attributes_by_uid: HashMap<AttributeSchemaUid, AttributeSchema>,
}

impl SchemaRegistry {
    /// Builds the registry, indexing every item schema and every attribute
    /// schema reachable from it (including nested Object/List/Union
    /// members) by uid.
    pub fn new(root: RootSchema) -> Self {
        let mut items_by_uid = HashMap::new();
        let mut attributes_by_uid = HashMap::new();

        for item in root.iter_items() {
            for attr in item.common().attributes.values() {
                index_attribute_schema(attr, &mut attributes_by_uid);
            }
            items_by_uid.insert(item.uid(), item);
        }
        for attr in root.project_schema.attributes.values() {
            index_attribute_schema(attr, &mut attributes_by_uid);
        }
        for attr in root.dataset_schema.attributes.values() {
            index_attribute_schema(attr, &mut attributes_by_uid);
        }

        Self {
            root: Arc::new(root),
            items_by_uid,
            attributes_by_uid,
        }
    }

    pub fn root(&self) -> &RootSchema {
        &self.root
    }

    pub fn get_item_schema(&self, uid: &ItemSchemaUid) -> Option<&ItemSchema> {
        self.items_by_uid.get(uid)
    }

    pub fn get_attribute_schema(&self, uid: &AttributeSchemaUid) -> Option<&AttributeSchema> {
        self.attributes_by_uid.get(uid)
    }

    pub fn iter_items(&self) -> impl Iterator<Item = &ItemSchema> {
        self.items_by_uid.values()
    }

    /// Looks up the first indexed attribute schema whose tag equals `name`.
    /// Scans in arbitrary (hash-map) order; callers that need a specific
    /// item's attribute should go through that item's schema directly
    /// instead.
    pub fn get_attribute_by_name(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes_by_uid.values().find(|a| a.tag == name)
    }
}

fn index_attribute_schema(attr: &AttributeSchema, index: &mut HashMap<AttributeSchemaUid, AttributeSchema>) {
    use crate::schema::attribute_schema::AttributeSchemaVariant::*;
    index.insert(attr.uid.clone(), attr.clone());
    match &attr.variant {
        Object { attributes, .. } => {
            for child in attributes.values() {
                index_attribute_schema(child, index);
            }
        }
        List { attribute, .. } => index_attribute_schema(attribute, index),
        Union { attributes } => {
            for candidate in attributes {
                index_attribute_schema(candidate, index);
            }
        }
        _ => {}
    }
}
