//! Schema Registry (component A of the design): the immutable definition
//! of item types, attribute types, and inter-item relations.

pub mod attribute_schema;
pub mod item_schema;
pub mod registry;
pub mod root_schema;

pub use attribute_schema::{AttributeSchema, AttributeSchemaVariant, DatetimeType, DEFAULT_DISPLAY_VALUE_JOINER};
pub use item_schema::{
    AnnotationSchema, ImageSchema, ItemSchema, ItemSchemaCommon, ObservationSchema, SampleImageRelationSchema,
    SampleRelationSchema, SampleSchema,
};
pub use registry::SchemaRegistry;
pub use root_schema::{DatasetSchema, ProjectSchema, RootSchema};
