// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Persistent store for [`Mapper`] and [`MapperGroup`] entities - the
//! object graph the Mapper Engine (component C) operates on, kept
//! alongside [`super::ProjectStore`] since mapper groups attach to
//! projects (`Project::mapper_group_uids`) the same way batches do.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::mapper::{Mapper, MapperGroup};
use crate::value_objects::{MapperGroupUid, MapperUid};

#[derive(Debug, Default)]
struct Inner {
    mappers: HashMap<MapperUid, Mapper>,
    groups: HashMap<MapperGroupUid, MapperGroup>,
}

#[derive(Debug, Default)]
pub struct MapperStore {
    inner: RwLock<Inner>,
}

impl MapperStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mapper(&self, mapper: Mapper) -> Mapper {
        let mut inner = self.inner.write();
        inner.mappers.insert(mapper.uid.clone(), mapper.clone());
        mapper
    }

    pub fn get_mapper(&self, uid: &MapperUid) -> CoreResult<Mapper> {
        self.inner.read().mappers.get(uid).cloned().ok_or_else(|| CoreError::not_found(format!("mapper {uid}")))
    }

    pub fn update_mapper(&self, mapper: Mapper) -> CoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.mappers.contains_key(&mapper.uid) {
            return Err(CoreError::not_found(format!("mapper {}", mapper.uid)));
        }
        inner.mappers.insert(mapper.uid.clone(), mapper);
        Ok(())
    }

    pub fn add_group(&self, group: MapperGroup) -> MapperGroup {
        let mut inner = self.inner.write();
        inner.groups.insert(group.uid.clone(), group.clone());
        group
    }

    pub fn get_group(&self, uid: &MapperGroupUid) -> CoreResult<MapperGroup> {
        self.inner.read().groups.get(uid).cloned().ok_or_else(|| CoreError::not_found(format!("mapper group {uid}")))
    }

    pub fn update_group(&self, group: MapperGroup) -> CoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.groups.contains_key(&group.uid) {
            return Err(CoreError::not_found(format!("mapper group {}", group.uid)));
        }
        inner.groups.insert(group.uid.clone(), group);
        Ok(())
    }

    /// Every mapper belonging to `group_uid`, in the group's declared order.
    pub fn mappers_for_group(&self, group_uid: &MapperGroupUid) -> CoreResult<Vec<Mapper>> {
        let inner = self.inner.read();
        let group = inner.groups.get(group_uid).ok_or_else(|| CoreError::not_found(format!("mapper group {group_uid}")))?;
        Ok(group.mapper_uids.iter().filter_map(|uid| inner.mappers.get(uid).cloned()).collect())
    }
}
