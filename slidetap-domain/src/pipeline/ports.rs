// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! I/O-bound infrastructure ports (spec §6): storage, image codec, and the
//! metadata/image import interfaces. The domain defines the contract only
//! - `slidetap-app` supplies concrete adapters (filesystem storage, a real
//! WSI codec binding, a file-format-specific metadata parser).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::entities::Project;
use crate::error::CoreResult;
use crate::item::{Image, ImageFile};

use super::config::DicomizeConfig;

/// Abstract outbound storage (spec §6's "Storage interface"). Implementors
/// may back this with a filesystem, object store, etc.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn project_outbox(&self, project: &Project) -> CoreResult<PathBuf>;

    /// Idempotent move-or-copy; target name is `pseudonym` when requested
    /// and available, else `identifier`.
    async fn store_image(&self, project: &Project, image: &Image, source: &Path, use_pseudonym: bool) -> CoreResult<PathBuf>;

    async fn store_thumbnail(&self, project: &Project, image: &Image, bytes: Vec<u8>, use_pseudonym: bool) -> CoreResult<PathBuf>;

    /// Returns `None` if no thumbnail is present; resizes on read.
    async fn get_thumbnail(&self, image: &Image, size: u32) -> CoreResult<Option<Vec<u8>>>;

    async fn store_metadata(&self, project: &Project, entries: HashMap<String, Vec<u8>>) -> CoreResult<()>;

    async fn store_pseudonyms(&self, project: &Project, pseudonyms: HashMap<String, String>) -> CoreResult<()>;

    async fn create_download_image_path(&self, project: &Project, image: &Image) -> CoreResult<PathBuf>;

    async fn cleanup_scratch(&self, path: &Path) -> CoreResult<()>;
}

/// Abstract image codec, invoked by the Dicomize/Thumbnail steps. The core
/// never encodes images itself (spec §1 non-goals).
#[async_trait]
pub trait ImageCodec: Send + Sync {
    /// Converts `source` into the target binary WSI format under
    /// `target_dir`, returning the files written.
    async fn dicomize(&self, source: &Path, target_dir: &Path, config: &DicomizeConfig, metadata: Value) -> CoreResult<Vec<ImageFile>>;

    /// Reads a small-resolution rendering of `source`, capped at `max_size`.
    async fn thumbnail(&self, source: &Path, max_size: u32) -> CoreResult<Vec<u8>>;
}

/// Opaque parameters produced by parsing an uploaded metadata file,
/// consumed by [`MetadataImporter::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchParameters(pub Value);

/// Metadata import interface (spec §6).
#[async_trait]
pub trait MetadataImporter: Send + Sync {
    async fn parse_file(&self, bytes: &[u8]) -> CoreResult<SearchParameters>;

    async fn import_image_metadata(&self, image: &mut Image) -> CoreResult<()>;
}

/// Image import interface (spec §6). Failure raises - the caller (the
/// download step) turns it into a `DOWNLOADING_FAILED` status.
#[async_trait]
pub trait ImageImporter: Send + Sync {
    async fn download(&self, image: &Image, project: &Project) -> CoreResult<(PathBuf, Vec<String>)>;
}
