// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! The batch entity. Status is mutated exclusively by
//! [`crate::lifecycle::batch`] - see that module for the transition table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{BatchStatus, BatchUid, ProjectUid};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub uid: BatchUid,
    pub name: String,
    pub project_uid: ProjectUid,
    pub status: BatchStatus,
    pub created: DateTime<Utc>,
    /// One batch per project is marked default; undeletable (spec §3).
    pub is_default: bool,
}

impl Batch {
    pub fn new(name: impl Into<String>, project_uid: ProjectUid, created: DateTime<Utc>, is_default: bool) -> Self {
        Self {
            uid: BatchUid::new(),
            name: name.into(),
            project_uid,
            status: BatchStatus::Initialized,
            created,
            is_default,
        }
    }
}
