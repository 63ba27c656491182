// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Item-level validation: the attribute-set predicate (`valid_attributes`)
//! and the relation-set predicate (`valid_relations`), per spec §4.E.

use std::collections::BTreeMap;

use crate::attribute::Attribute;
use crate::item::{Item, ObservationTarget};
use crate::schema::{AttributeSchema, ItemSchema, SchemaRegistry};
use crate::store::ItemStore;
use crate::value_objects::ItemUid;

use super::attribute::validate_attribute;

/// `valid_attributes := all declared attributes valid` - a missing
/// optional attribute counts as valid.
pub fn validate_item_attributes(item_schema: &ItemSchema, item: &Item) -> bool {
    non_valid_attribute_tags(&item_schema.common().attributes, &item.common().attributes).is_empty()
}

/// Tags of every schema-declared attribute that fails validation against
/// `attributes` - a missing optional attribute is not reported. Shared by
/// item, project, and dataset validation (spec §4.E, §6's
/// `get_validation_for_{project,batch,dataset}`) so the three reports agree
/// on what "non-valid" means.
pub fn non_valid_attribute_tags(schema_attributes: &BTreeMap<String, AttributeSchema>, attributes: &BTreeMap<String, Attribute>) -> Vec<String> {
    schema_attributes
        .iter()
        .filter(|(tag, schema)| match attributes.get(*tag) {
            Some(attr) => !validate_attribute(schema, attr),
            None => !schema.optional,
        })
        .map(|(tag, _)| tag.clone())
        .collect()
}

/// Relation validity per item kind (spec §4.E).
pub fn validate_relations(registry: &SchemaRegistry, store: &ItemStore, item: &Item) -> bool {
    match item {
        Item::Sample(sample) => {
            let schema_uid = &sample.common.schema_uid;
            let children_ok = registry.root().sample_relations_for_parent(schema_uid).iter().all(|relation| {
                let selected = store
                    .children(&sample.common.uid, &relation.child_schema_uid)
                    .iter()
                    .filter(|c| c.common().selected)
                    .count();
                selected >= relation.min_children && relation.max_children.is_none_or(|max| selected <= max)
            });
            let parents_ok = registry.root().sample_relations_for_child(schema_uid).iter().all(|relation| {
                let selected = store
                    .parents(&sample.common.uid, &relation.parent_schema_uid)
                    .iter()
                    .filter(|p| p.common().selected)
                    .count();
                selected >= relation.min_parents && relation.max_parents.is_none_or(|max| selected <= max)
            });
            let images_ok = registry.root().image_relations_for_sample(schema_uid).iter().all(|relation| {
                let selected = store
                    .images(&sample.common.uid, &relation.image_schema_uid)
                    .iter()
                    .filter(|i| i.common().selected)
                    .count();
                selected >= relation.min_images.max(1)
            });
            children_ok && parents_ok && images_ok
        }
        Item::Image(image) => image
            .samples
            .iter()
            .filter_map(|uid| store.get(uid))
            .any(|sample| sample.common().selected),
        Item::Annotation(annotation) => annotation
            .image
            .as_ref()
            .and_then(|uid| store.get(uid))
            .is_some_and(|image| image.common().selected),
        Item::Observation(observation) => match &observation.target {
            None => false,
            Some(target) => validate_observation_target(registry, store, &observation.common.schema_uid, target),
        },
    }
}

fn validate_observation_target(
    registry: &SchemaRegistry,
    store: &ItemStore,
    observation_schema_uid: &crate::value_objects::ItemSchemaUid,
    target: &ObservationTarget,
) -> bool {
    let Some(ItemSchema::Observation(schema)) = registry.get_item_schema(observation_schema_uid) else {
        return false;
    };
    let (uid, allowed): (&ItemUid, &[crate::value_objects::ItemSchemaUid]) = match target {
        ObservationTarget::Image(uid) => (uid, &schema.valid_image_schema_uids),
        ObservationTarget::Sample(uid) => (uid, &schema.valid_sample_schema_uids),
        ObservationTarget::Annotation(uid) => (uid, &schema.valid_annotation_schema_uids),
    };
    let Some(counterpart) = store.get(uid) else {
        return false;
    };
    counterpart.common().selected && allowed.contains(&counterpart.common().schema_uid)
}

/// One-hop propagation: for a sample whose relations were just
/// (in)validated, recomputes relation validity for its immediate
/// neighbors (parents, children, images) without cascading further -
/// spec §4.E's "bounded to one hop per call to avoid infinite cascades".
/// Callers write the returned values back onto the neighbor items.
pub fn propagate_relation_validation_one_hop(registry: &SchemaRegistry, store: &ItemStore, item: &Item) -> Vec<(ItemUid, bool)> {
    let Item::Sample(sample) = item else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for uid in sample.parents.iter().chain(sample.children.iter()).chain(sample.images.iter()) {
        if let Some(neighbor) = store.get(uid) {
            let valid = validate_relations(registry, store, &neighbor);
            out.push((uid.clone(), valid));
        }
    }
    out
}
