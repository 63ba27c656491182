// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Item Store (component D): a content-addressable, in-memory persistent
//! graph of items with relation helpers, cycle-safe sample edges, and
//! cascading deletion.
//!
//! Guarded by a single `parking_lot::RwLock`: readers run lock-free under
//! snapshot semantics relative to each other, writers take the exclusive
//! lock for the duration of one logical mutation - matching the
//! concurrency model's "per-row locks... readers may run lock-free" rule
//! at the granularity this in-memory reference implementation supports.

mod mapper_store;
mod project_store;
mod query;

pub use mapper_store::MapperStore;
pub use project_store::ProjectStore;
pub use query::{ItemQuery, ItemQueryBuilder, Page, SortOrder};

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::item::{Item, ItemCommon};
use crate::value_objects::{BatchUid, DatasetUid, ItemSchemaUid, ItemUid};

#[derive(Debug, Default)]
struct Inner {
    items: HashMap<ItemUid, Item>,
    by_identifier: HashMap<(DatasetUid, ItemSchemaUid, String), ItemUid>,
}

/// Reference Item Store implementation: a single process-local graph
/// guarded by a read-write lock. `slidetap-app` may swap this for a
/// database-backed store behind the same public surface.
#[derive(Debug, Default)]
pub struct ItemStore {
    inner: RwLock<Inner>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item`, keyed by `(dataset_uid, schema_uid, identifier)`. On
    /// a collision returns the existing item unchanged (re-ingest
    /// idempotency, spec §3 identity invariant).
    pub fn add(&self, item: Item) -> CoreResult<Item> {
        let common = item.common();
        let key = (common.dataset_uid.clone(), common.schema_uid.clone(), common.identifier.clone());
        let mut inner = self.inner.write();
        if let Some(existing_uid) = inner.by_identifier.get(&key) {
            return Ok(inner.items.get(existing_uid).expect("indexed item must exist").clone());
        }
        let uid = common.uid.clone();
        inner.by_identifier.insert(key, uid.clone());
        inner.items.insert(uid, item.clone());
        Ok(item)
    }

    pub fn get(&self, uid: &ItemUid) -> Option<Item> {
        self.inner.read().items.get(uid).cloned()
    }

    pub fn get_by_identifier(&self, dataset_uid: &DatasetUid, schema_uid: &ItemSchemaUid, identifier: &str) -> Option<Item> {
        let inner = self.inner.read();
        let uid = inner
            .by_identifier
            .get(&(dataset_uid.clone(), schema_uid.clone(), identifier.to_string()))?;
        inner.items.get(uid).cloned()
    }

    /// Replaces an already-inserted item wholesale. Fails if the item (or
    /// its containing batch) is locked - callers that need to bypass a
    /// lock should not use this path.
    pub fn update(&self, item: Item) -> CoreResult<()> {
        let mut inner = self.inner.write();
        let uid = item.common().uid.clone();
        if !inner.items.contains_key(&uid) {
            return Err(CoreError::not_found(format!("item {uid} not found")));
        }
        if inner.items.get(&uid).unwrap().common().locked {
            return Err(CoreError::not_allowed(format!("item {uid} is locked")));
        }
        inner.items.insert(uid, item);
        Ok(())
    }

    /// Adds a parent/child sample relation, rejecting it if it would create
    /// a cycle (samples form a DAG; spec §4.D, §9 "Cycles").
    pub fn add_sample_relation(&self, parent_uid: &ItemUid, child_uid: &ItemUid) -> CoreResult<()> {
        let mut inner = self.inner.write();
        if reachable(&inner, child_uid, parent_uid) {
            return Err(CoreError::invariant_violation(format!(
                "adding {parent_uid} -> {child_uid} would create a sample cycle"
            )));
        }
        {
            let parent = inner
                .items
                .get_mut(parent_uid)
                .and_then(Item::as_sample_mut)
                .ok_or_else(|| CoreError::not_found(format!("sample {parent_uid} not found")))?;
            parent.children.insert(child_uid.clone());
        }
        {
            let child = inner
                .items
                .get_mut(child_uid)
                .and_then(Item::as_sample_mut)
                .ok_or_else(|| CoreError::not_found(format!("sample {child_uid} not found")))?;
            child.parents.insert(parent_uid.clone());
        }
        Ok(())
    }

    pub fn children(&self, sample_uid: &ItemUid, child_schema_uid: &ItemSchemaUid) -> Vec<Item> {
        let inner = self.inner.read();
        let Some(sample) = inner.items.get(sample_uid).and_then(Item::as_sample) else {
            return Vec::new();
        };
        sample
            .children
            .iter()
            .filter_map(|uid| inner.items.get(uid))
            .filter(|item| &item.common().schema_uid == child_schema_uid)
            .cloned()
            .collect()
    }

    pub fn parents(&self, sample_uid: &ItemUid, parent_schema_uid: &ItemSchemaUid) -> Vec<Item> {
        let inner = self.inner.read();
        let Some(sample) = inner.items.get(sample_uid).and_then(Item::as_sample) else {
            return Vec::new();
        };
        sample
            .parents
            .iter()
            .filter_map(|uid| inner.items.get(uid))
            .filter(|item| &item.common().schema_uid == parent_schema_uid)
            .cloned()
            .collect()
    }

    pub fn images(&self, sample_uid: &ItemUid, image_schema_uid: &ItemSchemaUid) -> Vec<Item> {
        let inner = self.inner.read();
        let Some(sample) = inner.items.get(sample_uid).and_then(Item::as_sample) else {
            return Vec::new();
        };
        sample
            .images
            .iter()
            .filter_map(|uid| inner.items.get(uid))
            .filter(|item| &item.common().schema_uid == image_schema_uid)
            .cloned()
            .collect()
    }

    /// Every [`crate::item::Image`] item belonging to `batch_uid`,
    /// regardless of its image schema. Used by batch aggregation (spec
    /// §4.F/§5), which must see every selected image in a batch, not just
    /// those of one schema.
    pub fn images_in_batch(&self, batch_uid: &BatchUid) -> Vec<crate::item::Image> {
        self.inner
            .read()
            .items
            .values()
            .filter(|item| &item.common().batch_uid == batch_uid)
            .filter_map(Item::as_image)
            .cloned()
            .collect()
    }

    /// Every item belonging to `batch_uid`, regardless of schema or kind.
    /// Used for batch-level validation reports (spec §4.E).
    pub fn items_in_batch(&self, batch_uid: &BatchUid) -> Vec<Item> {
        self.inner.read().items.values().filter(|item| &item.common().batch_uid == batch_uid).cloned().collect()
    }

    /// All transitive descendants of a sample, cycle-safe via a visited
    /// set even though the graph is guaranteed acyclic by construction.
    pub fn transitive_children(&self, sample_uid: &ItemUid) -> Vec<ItemUid> {
        let inner = self.inner.read();
        let mut visited = HashSet::new();
        let mut stack = vec![sample_uid.clone()];
        let mut out = Vec::new();
        while let Some(uid) = stack.pop() {
            if !visited.insert(uid.clone()) {
                continue;
            }
            if let Some(sample) = inner.items.get(&uid).and_then(Item::as_sample) {
                for child in &sample.children {
                    out.push(child.clone());
                    stack.push(child.clone());
                }
            }
        }
        out
    }

    /// Deletes items of `schema_uid` within `batch_uid`, cascading through
    /// observations and images. A sample whose child lives in another
    /// batch is reassigned to `default_batch_uid` instead of deleted, to
    /// keep the sample DAG intact (spec §4.D, testable property 7).
    pub fn delete_items(
        &self,
        batch_uid: &BatchUid,
        schema_uid: &ItemSchemaUid,
        only_non_selected: bool,
        default_batch_uid: &BatchUid,
    ) -> CoreResult<usize> {
        let mut inner = self.inner.write();
        let victims: Vec<ItemUid> = inner
            .items
            .values()
            .filter(|item| &item.common().schema_uid == schema_uid && &item.common().batch_uid == batch_uid)
            .filter(|item| !only_non_selected || !item.common().selected)
            .map(|item| item.common().uid.clone())
            .collect();

        let mut deleted = 0;
        for uid in victims {
            cascade_delete(&mut inner, &uid, default_batch_uid);
            deleted += 1;
        }
        Ok(deleted)
    }

    /// Paged, filtered listing, used by external read paths (spec §4.D).
    pub fn query(&self, schema_uid: &ItemSchemaUid, query: &ItemQuery) -> Page<Item> {
        let inner = self.inner.read();
        let mut matches: Vec<&Item> = inner
            .items
            .values()
            .filter(|item| &item.common().schema_uid == schema_uid)
            .filter(|item| query.dataset_uid.as_ref().is_none_or(|d| &item.common().dataset_uid == d))
            .filter(|item| query.batch_uid.as_ref().is_none_or(|b| &item.common().batch_uid == b))
            .filter(|item| {
                query
                    .identifier_filter
                    .as_deref()
                    .is_none_or(|f| item.common().identifier.contains(f))
            })
            .filter(|item| query.selected.is_none_or(|s| item.common().selected == s))
            .filter(|item| query.valid.is_none_or(|v| item.common().valid() == v))
            .filter(|item| query.status.is_none_or(|s| item.as_image().map(|i| i.status == s).unwrap_or(false)))
            .filter(|item| {
                query
                    .attribute_filters
                    .iter()
                    .all(|(tag, value)| item.common().attributes.get(tag).and_then(|a| a.display_value.as_deref()) == Some(value.as_str()))
            })
            .collect();
        matches.sort_by(|a, b| a.common().identifier.cmp(&b.common().identifier));
        if query.sort_order == Some(SortOrder::Descending) {
            matches.reverse();
        }
        let total = matches.len();
        let items = matches
            .into_iter()
            .skip(query.offset)
            .take(query.size.max(1))
            .cloned()
            .collect();
        Page { items, total }
    }

    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// True if `to` is reachable from `from` by following sample children
/// edges. Used to reject an edge that would close a cycle.
fn reachable(inner: &Inner, from: &ItemUid, to: &ItemUid) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![from.clone()];
    while let Some(uid) = stack.pop() {
        if &uid == to {
            return true;
        }
        if !visited.insert(uid.clone()) {
            continue;
        }
        if let Some(sample) = inner.items.get(&uid).and_then(Item::as_sample) {
            stack.extend(sample.children.iter().cloned());
        }
    }
    false
}

fn cascade_delete(inner: &mut Inner, uid: &ItemUid, default_batch_uid: &BatchUid) {
    let Some(item) = inner.items.get(uid).cloned() else {
        return;
    };
    match item {
        Item::Sample(sample) => {
            // Images and observations attached to this sample go with it.
            for image_uid in sample.images.clone() {
                cascade_delete(inner, &image_uid, default_batch_uid);
            }
            for obs_uid in sample.observations.clone() {
                cascade_delete(inner, &obs_uid, default_batch_uid);
            }
            // Children living in a different batch are reassigned, not
            // deleted, to preserve the DAG (testable property 7).
            for child_uid in sample.children.clone() {
                if let Some(Item::Sample(child)) = inner.items.get_mut(&child_uid) {
                    if child.common.batch_uid != sample.common.batch_uid {
                        child.common.batch_uid = default_batch_uid.clone();
                    } else {
                        cascade_delete(inner, &child_uid, default_batch_uid);
                    }
                }
            }
            remove_item(inner, uid);
        }
        Item::Image(_) => {
            remove_item(inner, uid);
        }
        Item::Annotation(annotation) => {
            for obs_uid in annotation.observations.clone() {
                cascade_delete(inner, &obs_uid, default_batch_uid);
            }
            remove_item(inner, uid);
        }
        Item::Observation(_) => {
            remove_item(inner, uid);
        }
    }
}

fn remove_item(inner: &mut Inner, uid: &ItemUid) {
    if let Some(item) = inner.items.remove(uid) {
        let common: &ItemCommon = item.common();
        inner
            .by_identifier
            .remove(&(common.dataset_uid.clone(), common.schema_uid.clone(), common.identifier.clone()));
    }
}
