// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! The root schema aggregate: one project schema, one dataset schema, and
//! the keyed collections of sample/image/annotation/observation schemas
//! plus their relation edges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::attribute_schema::AttributeSchema;
use crate::schema::item_schema::{
    AnnotationSchema, ImageSchema, ItemSchema, ObservationSchema, SampleImageRelationSchema, SampleRelationSchema,
    SampleSchema,
};
use crate::value_objects::{ItemSchemaUid, RootSchemaUid};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSchema {
    pub uid: RootSchemaUid,
    pub attributes: BTreeMap<String, AttributeSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub uid: RootSchemaUid,
    pub attributes: BTreeMap<String, AttributeSchema>,
}

/// Immutable definition of item types, attribute types, and inter-item
/// relations, identified by a stable uid.
///
/// Constructed once from user-supplied definitions and held in memory for
/// the lifetime of the program; see [`super::SchemaRegistry`] for the
/// read-only lookup facade built on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootSchema {
    pub uid: RootSchemaUid,
    pub project_schema: ProjectSchema,
    pub dataset_schema: DatasetSchema,
    pub samples: BTreeMap<ItemSchemaUid, SampleSchema>,
    pub images: BTreeMap<ItemSchemaUid, ImageSchema>,
    pub annotations: BTreeMap<ItemSchemaUid, AnnotationSchema>,
    pub observations: BTreeMap<ItemSchemaUid, ObservationSchema>,
    pub sample_relations: Vec<SampleRelationSchema>,
    pub sample_image_relations: Vec<SampleImageRelationSchema>,
}

impl RootSchema {
    /// Iterates over every item schema regardless of kind, ordered by
    /// `display_position` then name for a deterministic listing.
    pub fn iter_items(&self) -> impl Iterator<Item = ItemSchema> + '_ {
        let samples = self.samples.values().cloned().map(ItemSchema::Sample);
        let images = self.images.values().cloned().map(ItemSchema::Image);
        let annotations = self.annotations.values().cloned().map(ItemSchema::Annotation);
        let observations = self.observations.values().cloned().map(ItemSchema::Observation);
        let mut all: Vec<ItemSchema> = samples.chain(images).chain(annotations).chain(observations).collect();
        all.sort_by_key(|item| (item.common().display_position, item.common().name.clone()));
        all.into_iter()
    }

    pub fn sample_relations_for_parent(&self, parent_schema_uid: &ItemSchemaUid) -> Vec<&SampleRelationSchema> {
        self.sample_relations
            .iter()
            .filter(|r| &r.parent_schema_uid == parent_schema_uid)
            .collect()
    }

    pub fn sample_relations_for_child(&self, child_schema_uid: &ItemSchemaUid) -> Vec<&SampleRelationSchema> {
        self.sample_relations
            .iter()
            .filter(|r| &r.child_schema_uid == child_schema_uid)
            .collect()
    }

    pub fn image_relations_for_sample(&self, sample_schema_uid: &ItemSchemaUid) -> Vec<&SampleImageRelationSchema> {
        self.sample_image_relations
            .iter()
            .filter(|r| &r.sample_schema_uid == sample_schema_uid)
            .collect()
    }
}
