// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! The project entity: a long-lived container owning batches, a dataset,
//! attached mapper groups, and top-level attributes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::value_objects::{BatchUid, DatasetUid, MapperGroupUid, ProjectStatus, ProjectUid, RootSchemaUid};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub uid: ProjectUid,
    pub name: String,
    pub status: ProjectStatus,
    pub root_schema_uid: RootSchemaUid,
    pub schema_uid: RootSchemaUid,
    pub dataset_uid: DatasetUid,
    pub default_batch_uid: BatchUid,
    pub attributes: BTreeMap<String, Attribute>,
    pub mapper_group_uids: Vec<MapperGroupUid>,
    pub locked: bool,
    pub created: DateTime<Utc>,
}

impl Project {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        root_schema_uid: RootSchemaUid,
        schema_uid: RootSchemaUid,
        dataset_uid: DatasetUid,
        default_batch_uid: BatchUid,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: ProjectUid::new(),
            name: name.into(),
            status: ProjectStatus::InProgress,
            root_schema_uid,
            schema_uid,
            dataset_uid,
            default_batch_uid,
            attributes: BTreeMap::new(),
            mapper_group_uids: Vec::new(),
            locked: false,
            created,
        }
    }
}
