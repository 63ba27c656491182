// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Filesystem-backed [`Storage`] adapter. Lays out each project's outbox,
//! image files, and metadata under a configured root directory. Grounded on
//! the teacher's `infrastructure/adapters/file_io_service_adapter.rs`
//! (async `tokio::fs` operations, errors folded into the domain's error
//! type) but without memory mapping or chunked transfer - WSI files here
//! are handed to the codec port whole, not streamed by the storage layer
//! itself (spec §1 non-goals).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use slidetap_domain::entities::Project;
use slidetap_domain::error::{CoreError, CoreResult};
use slidetap_domain::item::Image;
use slidetap_domain::pipeline::Storage;

pub struct FilesystemStorage {
    root: PathBuf,
}

impl FilesystemStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn project_dir(&self, project: &Project) -> PathBuf {
        self.root.join(project.uid.to_string())
    }

    fn image_dir(&self, project: &Project, image: &Image) -> PathBuf {
        self.project_dir(project).join("images").join(image.common.uid.to_string())
    }

    fn target_name(image: &Image, use_pseudonym: bool) -> &str {
        if use_pseudonym {
            image.common.pseudonym.as_deref().unwrap_or(&image.common.identifier)
        } else {
            &image.common.identifier
        }
    }
}

#[async_trait]
impl Storage for FilesystemStorage {
    async fn project_outbox(&self, project: &Project) -> CoreResult<PathBuf> {
        let path = self.project_dir(project).join("outbox");
        tokio::fs::create_dir_all(&path).await?;
        Ok(path)
    }

    async fn store_image(&self, project: &Project, image: &Image, source: &Path, use_pseudonym: bool) -> CoreResult<PathBuf> {
        let dir = self.image_dir(project, image);
        tokio::fs::create_dir_all(&dir).await?;
        let extension = source.extension().and_then(|e| e.to_str()).unwrap_or("bin");
        let target = dir.join(format!("{}.{}", Self::target_name(image, use_pseudonym), extension));
        if source != target {
            tokio::fs::copy(source, &target).await?;
        }
        Ok(target)
    }

    async fn store_thumbnail(&self, project: &Project, image: &Image, bytes: Vec<u8>, use_pseudonym: bool) -> CoreResult<PathBuf> {
        let dir = self.image_dir(project, image);
        tokio::fs::create_dir_all(&dir).await?;
        let target = dir.join(format!("{}.thumbnail.jpg", Self::target_name(image, use_pseudonym)));
        tokio::fs::write(&target, bytes).await?;
        Ok(target)
    }

    async fn get_thumbnail(&self, image: &Image, _size: u32) -> CoreResult<Option<Vec<u8>>> {
        let Some(path) = &image.thumbnail_path else {
            return Ok(None);
        };
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn store_metadata(&self, project: &Project, entries: HashMap<String, Vec<u8>>) -> CoreResult<()> {
        let dir = self.project_dir(project).join("metadata");
        tokio::fs::create_dir_all(&dir).await?;
        for (name, bytes) in entries {
            tokio::fs::write(dir.join(name), bytes).await?;
        }
        Ok(())
    }

    async fn store_pseudonyms(&self, project: &Project, pseudonyms: HashMap<String, String>) -> CoreResult<()> {
        let dir = self.project_dir(project);
        tokio::fs::create_dir_all(&dir).await?;
        let encoded = serde_json::to_vec_pretty(&pseudonyms)?;
        tokio::fs::write(dir.join("pseudonyms.json"), encoded).await?;
        Ok(())
    }

    async fn create_download_image_path(&self, project: &Project, image: &Image) -> CoreResult<PathBuf> {
        let dir = self.project_dir(project).join("scratch").join(image.common.uid.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    async fn cleanup_scratch(&self, path: &Path) -> CoreResult<()> {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CoreError::from(err)),
        }
    }
}
