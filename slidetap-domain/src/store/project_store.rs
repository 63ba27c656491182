// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Persistent store for [`Project`] and [`Batch`] entities - the
//! counterpart to [`super::ItemStore`] for the two entities that sit above
//! the item graph. Same guard discipline: one `parking_lot::RwLock`,
//! readers lock-free relative to each other, writers exclusive for one
//! logical mutation.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::entities::{Batch, Project};
use crate::error::{CoreError, CoreResult};
use crate::value_objects::{BatchUid, ProjectUid};

#[derive(Debug, Default)]
struct Inner {
    projects: HashMap<ProjectUid, Project>,
    batches: HashMap<BatchUid, Batch>,
}

#[derive(Debug, Default)]
pub struct ProjectStore {
    inner: RwLock<Inner>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&self, project: Project) -> Project {
        let mut inner = self.inner.write();
        inner.projects.insert(project.uid.clone(), project.clone());
        project
    }

    pub fn get_project(&self, uid: &ProjectUid) -> CoreResult<Project> {
        self.inner.read().projects.get(uid).cloned().ok_or_else(|| CoreError::not_found(format!("project {uid}")))
    }

    pub fn update_project(&self, project: Project) -> CoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.projects.contains_key(&project.uid) {
            return Err(CoreError::not_found(format!("project {}", project.uid)));
        }
        inner.projects.insert(project.uid.clone(), project);
        Ok(())
    }

    /// Mutates the project identified by `uid` in place via `f`, holding
    /// the write lock for the whole read-modify-write - the project-level
    /// counterpart to [`Self::with_batch_mut`], used to re-apply a mapper
    /// to a project's own attributes (spec §4.C "Applying mappers to a
    /// project ... applies to the project/dataset attributes").
    pub fn with_project_mut<R>(&self, uid: &ProjectUid, f: impl FnOnce(&mut Project) -> R) -> CoreResult<R> {
        let mut inner = self.inner.write();
        let project = inner.projects.get_mut(uid).ok_or_else(|| CoreError::not_found(format!("project {uid}")))?;
        Ok(f(project))
    }

    pub fn add_batch(&self, batch: Batch) -> Batch {
        let mut inner = self.inner.write();
        inner.batches.insert(batch.uid.clone(), batch.clone());
        batch
    }

    pub fn get_batch(&self, uid: &BatchUid) -> CoreResult<Batch> {
        self.inner.read().batches.get(uid).cloned().ok_or_else(|| CoreError::not_found(format!("batch {uid}")))
    }

    pub fn update_batch(&self, batch: Batch) -> CoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.batches.contains_key(&batch.uid) {
            return Err(CoreError::not_found(format!("batch {}", batch.uid)));
        }
        inner.batches.insert(batch.uid.clone(), batch);
        Ok(())
    }

    /// Mutates the batch identified by `uid` in place via `f`, holding the
    /// write lock for the whole read-modify-write. This is the store-level
    /// half of spec §5's "conditional update" - the compare in
    /// [`crate::lifecycle::batch::try_aggregate`] and the write here
    /// execute under one critical section, so concurrent aggregation
    /// attempts serialize instead of racing a separate get+put.
    pub fn with_batch_mut<R>(&self, uid: &BatchUid, f: impl FnOnce(&mut Batch) -> R) -> CoreResult<R> {
        let mut inner = self.inner.write();
        let batch = inner.batches.get_mut(uid).ok_or_else(|| CoreError::not_found(format!("batch {uid}")))?;
        Ok(f(batch))
    }

    pub fn batches_for_project(&self, project_uid: &ProjectUid) -> Vec<Batch> {
        self.inner.read().batches.values().filter(|b| &b.project_uid == project_uid).cloned().collect()
    }

    pub fn default_batch(&self, project_uid: &ProjectUid) -> Option<Batch> {
        self.inner.read().batches.values().find(|b| &b.project_uid == project_uid && b.is_default).cloned()
    }
}
