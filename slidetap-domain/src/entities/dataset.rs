// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! The dataset entity: the finalized, exported product of a project.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::value_objects::{DatasetUid, RootSchemaUid};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub uid: DatasetUid,
    pub name: String,
    pub schema_uid: RootSchemaUid,
    pub attributes: BTreeMap<String, Attribute>,
    pub valid_attributes: Option<bool>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, schema_uid: RootSchemaUid) -> Self {
        Self {
            uid: DatasetUid::new(),
            name: name.into(),
            schema_uid,
            attributes: BTreeMap::new(),
            valid_attributes: None,
        }
    }

    pub fn valid(&self) -> bool {
        self.valid_attributes.unwrap_or(false)
    }
}
