// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Concrete implementations of the domain's I/O-bound ports
//! (`slidetap_domain::pipeline::{Storage, ImageCodec, MetadataImporter,
//! ImageImporter}`). Per spec §1's non-goals, no real WSI codec or vendor
//! metadata parser ships here - `PassthroughCodec` and `NoopImporter` are
//! deliberately inert stand-ins a deployment replaces with a real binding.

mod filesystem_storage;
mod noop_importer;
mod passthrough_codec;

pub use filesystem_storage::FilesystemStorage;
pub use noop_importer::NoopImporter;
pub use passthrough_codec::PassthroughCodec;
