// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Page/filter query shape used by the external read paths (spec §4.D).

use crate::value_objects::{BatchUid, DatasetUid, ImageStatus, ItemSchemaUid};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Filter + paging parameters for listing items of one schema.
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    pub dataset_uid: Option<DatasetUid>,
    pub batch_uid: Option<BatchUid>,
    pub identifier_filter: Option<String>,
    /// Exact-match filters on an attribute's display value, keyed by tag.
    pub attribute_filters: Vec<(String, String)>,
    pub selected: Option<bool>,
    pub valid: Option<bool>,
    pub status: Option<ImageStatus>,
    pub offset: usize,
    pub size: usize,
    pub sort_order: Option<SortOrder>,
}

impl ItemQuery {
    pub fn for_schema(schema_uid: ItemSchemaUid) -> ItemQueryBuilder {
        ItemQueryBuilder {
            schema_uid,
            query: ItemQuery {
                size: 50,
                ..Default::default()
            },
        }
    }
}

/// Page of results plus the total matching count (for UI pagination).
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

pub struct ItemQueryBuilder {
    pub(super) schema_uid: ItemSchemaUid,
    pub(super) query: ItemQuery,
}

impl ItemQueryBuilder {
    pub fn dataset(mut self, dataset_uid: DatasetUid) -> Self {
        self.query.dataset_uid = Some(dataset_uid);
        self
    }

    pub fn batch(mut self, batch_uid: BatchUid) -> Self {
        self.query.batch_uid = Some(batch_uid);
        self
    }

    pub fn identifier_filter(mut self, filter: impl Into<String>) -> Self {
        self.query.identifier_filter = Some(filter.into());
        self
    }

    pub fn attribute_filter(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.attribute_filters.push((tag.into(), value.into()));
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.query.selected = Some(selected);
        self
    }

    pub fn valid(mut self, valid: bool) -> Self {
        self.query.valid = Some(valid);
        self
    }

    pub fn status(mut self, status: ImageStatus) -> Self {
        self.query.status = Some(status);
        self
    }

    pub fn page(mut self, offset: usize, size: usize) -> Self {
        self.query.offset = offset;
        self.query.size = size;
        self
    }

    pub fn build(self) -> (ItemSchemaUid, ItemQuery) {
        (self.schema_uid, self.query)
    }
}
