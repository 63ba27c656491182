// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Item model: the four node kinds (Sample, Image, Annotation, Observation)
//! that make up the curated graph held by the Item Store (component D).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::value_objects::{BatchUid, DatasetUid, ImageStatus, ItemSchemaUid, ItemUid};

/// An image file belonging to an [`Image`] item, as emitted by the
/// Dicomize step (spec §4.G).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFile {
    pub uid: ItemUid,
    pub filename: String,
}

/// Fields shared by every item variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCommon {
    pub uid: ItemUid,
    /// Stable string within a dataset+schema scope (identity invariant,
    /// spec §3).
    pub identifier: String,
    pub name: String,
    pub pseudonym: Option<String>,
    pub selected: bool,
    pub valid_attributes: Option<bool>,
    pub valid_relations: Option<bool>,
    pub locked: bool,
    pub schema_uid: ItemSchemaUid,
    pub dataset_uid: DatasetUid,
    pub batch_uid: BatchUid,
    pub attributes: BTreeMap<String, Attribute>,
    /// Not exposed through public read paths (spec §3).
    pub private_attributes: BTreeMap<String, Attribute>,
}

impl ItemCommon {
    /// Invariant v: `valid == valid_attributes && valid_relations`.
    pub fn valid(&self) -> bool {
        self.valid_attributes.unwrap_or(false) && self.valid_relations.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub common: ItemCommon,
    pub parents: BTreeSet<ItemUid>,
    pub children: BTreeSet<ItemUid>,
    pub images: BTreeSet<ItemUid>,
    pub observations: BTreeSet<ItemUid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub common: ItemCommon,
    pub status: ImageStatus,
    pub status_message: String,
    pub folder_path: Option<String>,
    pub files: Vec<ImageFile>,
    pub thumbnail_path: Option<String>,
    pub format: Option<String>,
    pub samples: BTreeSet<ItemUid>,
}

impl Image {
    pub fn new(common: ItemCommon) -> Self {
        Self {
            common,
            status: ImageStatus::NotStarted,
            status_message: String::new(),
            folder_path: None,
            files: Vec::new(),
            thumbnail_path: None,
            format: None,
            samples: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub common: ItemCommon,
    pub image: Option<ItemUid>,
    pub observations: BTreeSet<ItemUid>,
}

/// An observation's single counterpart reference: exactly one of these is
/// set (spec §3, validated per spec §4.E).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationTarget {
    Image(ItemUid),
    Sample(ItemUid),
    Annotation(ItemUid),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub common: ItemCommon,
    pub target: Option<ObservationTarget>,
}

/// Union over the four item kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Item {
    Sample(Sample),
    Image(Image),
    Annotation(Annotation),
    Observation(Observation),
}

impl Item {
    pub fn common(&self) -> &ItemCommon {
        match self {
            Item::Sample(s) => &s.common,
            Item::Image(i) => &i.common,
            Item::Annotation(a) => &a.common,
            Item::Observation(o) => &o.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut ItemCommon {
        match self {
            Item::Sample(s) => &mut s.common,
            Item::Image(i) => &mut i.common,
            Item::Annotation(a) => &mut a.common,
            Item::Observation(o) => &mut o.common,
        }
    }

    pub fn uid(&self) -> ItemUid {
        self.common().uid.clone()
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Item::Sample(_) => "sample",
            Item::Image(_) => "image",
            Item::Annotation(_) => "annotation",
            Item::Observation(_) => "observation",
        }
    }

    pub fn as_sample(&self) -> Option<&Sample> {
        match self {
            Item::Sample(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sample_mut(&mut self) -> Option<&mut Sample> {
        match self {
            Item::Sample(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Item::Image(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut Image> {
        match self {
            Item::Image(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&Annotation> {
        match self {
            Item::Annotation(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_observation(&self) -> Option<&Observation> {
        match self {
            Item::Observation(o) => Some(o),
            _ => None,
        }
    }
}
