// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Item schema definitions: samples, images, annotations, observations, and
//! the relation edges between them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::attribute_schema::AttributeSchema;
use crate::value_objects::ItemSchemaUid;

/// A directed sample-to-sample relation edge, carrying cardinality bounds
/// for both ends. Stored once on [`super::RootSchema`] - never duplicated
/// as independent truth on both schemas (see design note in spec §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRelationSchema {
    pub parent_schema_uid: ItemSchemaUid,
    pub child_schema_uid: ItemSchemaUid,
    pub min_parents: usize,
    pub max_parents: Option<usize>,
    pub min_children: usize,
    pub max_children: Option<usize>,
}

/// A sample-to-image attachment edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleImageRelationSchema {
    pub sample_schema_uid: ItemSchemaUid,
    pub image_schema_uid: ItemSchemaUid,
    pub min_images: usize,
    pub max_images: Option<usize>,
}

/// Common fields shared by every item schema kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSchemaCommon {
    pub uid: ItemSchemaUid,
    pub name: String,
    /// Ordering hint for UI/export listing; not an identifier.
    pub display_position: i32,
    pub attributes: BTreeMap<String, AttributeSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSchema {
    pub common: ItemSchemaCommon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSchema {
    pub common: ItemSchemaCommon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationSchema {
    pub common: ItemSchemaCommon,
    pub image_schema_uid: ItemSchemaUid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationSchema {
    pub common: ItemSchemaCommon,
    /// Sample/image/annotation schemas this observation's single
    /// counterpart reference may point at. An observation is valid only
    /// when its actual counterpart's schema uid appears in the matching
    /// set (see the Validator's Observation rule).
    pub valid_sample_schema_uids: Vec<ItemSchemaUid>,
    pub valid_image_schema_uids: Vec<ItemSchemaUid>,
    pub valid_annotation_schema_uids: Vec<ItemSchemaUid>,
}

/// Union over the four item schema kinds, for uniform iteration via
/// [`super::SchemaRegistry::iter_items`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ItemSchema {
    Sample(SampleSchema),
    Image(ImageSchema),
    Annotation(AnnotationSchema),
    Observation(ObservationSchema),
}

impl ItemSchema {
    pub fn common(&self) -> &ItemSchemaCommon {
        match self {
            ItemSchema::Sample(s) => &s.common,
            ItemSchema::Image(s) => &s.common,
            ItemSchema::Annotation(s) => &s.common,
            ItemSchema::Observation(s) => &s.common,
        }
    }

    pub fn uid(&self) -> ItemSchemaUid {
        self.common().uid.clone()
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ItemSchema::Sample(_) => "sample",
            ItemSchema::Image(_) => "image",
            ItemSchema::Annotation(_) => "annotation",
            ItemSchema::Observation(_) => "observation",
        }
    }
}
