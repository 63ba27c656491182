//! Value objects: immutable, identity-free domain concepts.
//!
//! Mirrors the teacher's `value_objects` module - self-validating,
//! side-effect-free types with no persistent identity of their own (entity
//! identifiers are the one exception, and are identity by construction).

mod generic_id;
mod ids;
mod statuses;

pub use generic_id::{IdCategory, Uid};
pub use ids::{
    AttributeMarker, AttributeSchemaMarker, AttributeSchemaUid, AttributeUid, BatchMarker, BatchUid, DatasetMarker,
    DatasetUid, ItemMarker, ItemSchemaMarker, ItemSchemaUid, ItemUid, MapperGroupMarker, MapperGroupUid, MapperMarker,
    MapperUid, MappingItemMarker, MappingItemUid, ProjectMarker, ProjectUid, RootSchemaMarker, RootSchemaUid,
};
pub use statuses::{BatchStatus, ImageStatus, ProcessingPhase, ProjectStatus};
