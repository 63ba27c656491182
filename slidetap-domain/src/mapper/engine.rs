// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Mapping algorithm (spec §4.C): resolves `mapped_value` from
//! `mappable_value` for an attribute, recursing through Object/List/Union
//! structure to reach nested leaves.

use crate::attribute::Attribute;
use crate::error::{CoreError, CoreResult};
use crate::value_objects::MapperGroupUid;

use super::regex_cache::RegexCache;
use super::{Mapper, MapperGroup};

/// Stateful only in the regex cache it owns; mappers and attributes are
/// passed in by the caller (typically the Item Store / project service).
pub struct MapperEngine {
    regex_cache: RegexCache,
}

impl MapperEngine {
    pub fn new() -> Self {
        Self {
            regex_cache: RegexCache::default(),
        }
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            regex_cache: RegexCache::new(capacity),
        }
    }

    /// Applies `mapper` to `attribute`, recursing into Object/List/Union
    /// children when the attribute itself isn't of the mapper's target
    /// schema. Returns whether any substitution happened anywhere in the
    /// subtree.
    pub fn apply_mapper(&self, mapper: &mut Mapper, attribute: &mut Attribute) -> CoreResult<bool> {
        if attribute.schema_uid == mapper.attribute_schema_uid {
            return self.apply_leaf(mapper, attribute);
        }
        self.recurse_into(mapper, attribute)
    }

    fn apply_leaf(&self, mapper: &mut Mapper, attribute: &mut Attribute) -> CoreResult<bool> {
        let Some(mappable) = attribute.mappable_value.clone() else {
            return Ok(false);
        };
        let Some(idx) = self.best_match(mapper, &mappable)? else {
            return Ok(false);
        };
        let item = &mut mapper.mapping_items[idx];
        let value = item
            .attribute
            .effective_value()
            .cloned()
            .ok_or_else(|| CoreError::invariant_violation(format!("mapping item {} carries no value", item.uid)))?;
        attribute.mapped_value = Some(value);
        attribute.mapping_item_uid = Some(item.uid.clone());
        attribute.display_value = item.attribute.display_value.clone();
        attribute.valid = false;
        item.hits += 1;
        Ok(true)
    }

    /// Finds the index of the first (by decreasing `hits`, ties broken by
    /// insertion order) mapping item whose pattern matches `mappable_value`.
    fn best_match(&self, mapper: &Mapper, mappable_value: &str) -> CoreResult<Option<usize>> {
        let mut order: Vec<usize> = (0..mapper.mapping_items.len()).collect();
        // Stable sort: equal-hit items keep their relative (insertion) order.
        order.sort_by(|&a, &b| mapper.mapping_items[b].hits.cmp(&mapper.mapping_items[a].hits));
        for idx in order {
            let pattern = self.regex_cache.compile(&mapper.mapping_items[idx].expression)?;
            if pattern.is_match(mappable_value) {
                return Ok(Some(idx));
            }
        }
        Ok(None)
    }

    fn recurse_into(&self, mapper: &mut Mapper, attribute: &mut Attribute) -> CoreResult<bool> {
        use crate::attribute::AttributeValue;
        let mut applied = false;
        for slot in [
            attribute.original_value.as_mut(),
            attribute.mapped_value.as_mut(),
            attribute.updated_value.as_mut(),
        ] {
            match slot {
                Some(AttributeValue::Object(map)) => {
                    for child in map.values_mut() {
                        applied |= self.apply_mapper(mapper, child)?;
                    }
                }
                Some(AttributeValue::List(items)) => {
                    for item in items.iter_mut() {
                        applied |= self.apply_mapper(mapper, item)?;
                    }
                }
                Some(AttributeValue::Union(union)) => {
                    applied |= self.apply_mapper(mapper, &mut union.inner)?;
                }
                _ => {}
            }
        }
        Ok(applied)
    }

    /// Re-applies `mapper` to every attribute in `attributes` whose schema
    /// is the mapper's `root_attribute_schema_uid` - the write-amplification
    /// path triggered when a mapping item is created, updated, or deleted
    /// (spec §4.C step 5).
    pub fn reapply_for_root_schema<'a>(
        &self,
        mapper: &mut Mapper,
        attributes: impl Iterator<Item = &'a mut Attribute>,
    ) -> CoreResult<usize> {
        let mut applied = 0;
        for attribute in attributes {
            if attribute.schema_uid == mapper.root_attribute_schema_uid && self.apply_mapper(mapper, attribute)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Attaches a project's default mapper groups at startup time (the
    /// original `mapper_injector.py`'s role): idempotently appends any
    /// group uid not already attached.
    pub fn install_default_groups(&self, attached: &mut Vec<MapperGroupUid>, groups: &[MapperGroup]) {
        for group in groups {
            if !attached.contains(&group.uid) {
                attached.push(group.uid.clone());
            }
        }
    }
}

impl Default for MapperEngine {
    fn default() -> Self {
        Self::new()
    }
}
