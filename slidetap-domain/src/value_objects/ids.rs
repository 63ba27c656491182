// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Concrete entity identifiers.
//!
//! Each type is a distinct instantiation of [`super::generic_id::Uid`] so
//! that, for instance, a function expecting a [`BatchUid`] cannot
//! accidentally be called with a [`ProjectUid`] - the compiler rejects it.

use super::generic_id::{IdCategory, Uid};

macro_rules! entity_id {
    ($marker:ident, $alias:ident, $name:expr) => {
        #[doc = concat!("Marker for [`", stringify!($alias), "`].")]
        #[derive(Debug, Clone, Eq, PartialEq)]
        pub struct $marker;

        impl IdCategory for $marker {
            fn category_name() -> &'static str {
                $name
            }
        }

        #[doc = concat!("Type-safe identifier for a ", $name, ".")]
        pub type $alias = Uid<$marker>;
    };
}

entity_id!(RootSchemaMarker, RootSchemaUid, "root_schema");
entity_id!(ItemSchemaMarker, ItemSchemaUid, "item_schema");
entity_id!(AttributeSchemaMarker, AttributeSchemaUid, "attribute_schema");

entity_id!(AttributeMarker, AttributeUid, "attribute");
entity_id!(ItemMarker, ItemUid, "item");
entity_id!(BatchMarker, BatchUid, "batch");
entity_id!(ProjectMarker, ProjectUid, "project");
entity_id!(DatasetMarker, DatasetUid, "dataset");
entity_id!(MapperMarker, MapperUid, "mapper");
entity_id!(MapperGroupMarker, MapperGroupUid, "mapper_group");
entity_id!(MappingItemMarker, MappingItemUid, "mapping_item");
