// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! The four built-in pipeline steps (spec §4.G): Dicomize, Thumbnail,
//! Store, Finish. Each is a thin adapter over the domain's `ImageCodec` /
//! `Storage` ports plus its built-in config struct - the steps themselves
//! hold no business logic beyond sequencing those calls and updating the
//! image record, matching the domain's "steps are ordered and composable"
//! contract (`slidetap_domain::pipeline::step`).

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use slidetap_domain::error::CoreResult;
use slidetap_domain::pipeline::{DicomizeConfig, FinishConfig, ImageCodec, PipelineStep, StepContext, StepOutcome, Storage, StoreConfig, ThumbnailConfig};

pub struct DicomizeStep {
    pub codec: Arc<dyn ImageCodec>,
    pub storage: Arc<dyn Storage>,
    pub config: DicomizeConfig,
}

#[async_trait]
impl PipelineStep for DicomizeStep {
    fn name(&self) -> &'static str {
        "dicomize"
    }

    async fn run(&self, ctx: StepContext) -> CoreResult<StepOutcome> {
        let target_dir = self.storage.create_download_image_path(&ctx.project, &ctx.image).await?;
        let files = self.codec.dicomize(&ctx.path, &target_dir, &self.config, Value::Null).await?;
        // `path` stays a file throughout the pipeline (spec §4.G's per-step
        // contract), so the next phase gets the primary dicomized file
        // rather than the scratch directory it lives in.
        let primary = files.first().map(|f| target_dir.join(&f.filename)).unwrap_or_else(|| target_dir.clone());
        let mut image = ctx.image;
        image.files = files;
        image.format = Some("dicom".to_string());
        image.folder_path = Some(primary.display().to_string());
        Ok(StepOutcome {
            new_path: primary,
            image,
        })
    }

    async fn cleanup(&self, ctx: &StepContext) {
        if let Ok(target_dir) = self.storage.create_download_image_path(&ctx.project, &ctx.image).await {
            let _ = self.storage.cleanup_scratch(&target_dir).await;
        }
    }
}

pub struct ThumbnailStep {
    pub codec: Arc<dyn ImageCodec>,
    pub storage: Arc<dyn Storage>,
    pub config: ThumbnailConfig,
    pub use_pseudonyms: bool,
}

#[async_trait]
impl PipelineStep for ThumbnailStep {
    fn name(&self) -> &'static str {
        "thumbnail"
    }

    async fn run(&self, ctx: StepContext) -> CoreResult<StepOutcome> {
        let bytes = self.codec.thumbnail(&ctx.path, self.config.max_size).await?;
        let mut image = ctx.image;
        let thumbnail_path = self
            .storage
            .store_thumbnail(&ctx.project, &image, bytes, self.use_pseudonyms)
            .await?;
        image.thumbnail_path = Some(thumbnail_path.display().to_string());
        Ok(StepOutcome {
            new_path: ctx.path,
            image,
        })
    }

    async fn cleanup(&self, _ctx: &StepContext) {}
}

pub struct StoreStep {
    pub storage: Arc<dyn Storage>,
    pub config: StoreConfig,
}

#[async_trait]
impl PipelineStep for StoreStep {
    fn name(&self) -> &'static str {
        "store"
    }

    async fn run(&self, ctx: StepContext) -> CoreResult<StepOutcome> {
        let mut image = ctx.image;
        let stored = self
            .storage
            .store_image(&ctx.project, &image, &ctx.path, self.config.use_pseudonyms)
            .await?;
        image.folder_path = stored.parent().map(|p| p.display().to_string());
        Ok(StepOutcome {
            new_path: stored,
            image,
        })
    }

    async fn cleanup(&self, ctx: &StepContext) {
        let _ = self.storage.cleanup_scratch(&ctx.path).await;
    }
}

pub struct FinishStep {
    pub storage: Arc<dyn Storage>,
    pub config: FinishConfig,
}

#[async_trait]
impl PipelineStep for FinishStep {
    fn name(&self) -> &'static str {
        "finish"
    }

    async fn run(&self, ctx: StepContext) -> CoreResult<StepOutcome> {
        let mut image = ctx.image;
        if self.config.delete_source_folder {
            // Dicomize's scratch directory is addressed the same way
            // regardless of how far `path` has since moved through Store,
            // so this reaches the right place to delete.
            let scratch_dir = self.storage.create_download_image_path(&ctx.project, &image).await?;
            self.storage.cleanup_scratch(&scratch_dir).await?;
            image.folder_path = None;
        }
        Ok(StepOutcome {
            new_path: ctx.path.clone(),
            image,
        })
    }

    async fn cleanup(&self, _ctx: &StepContext) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidetap_domain::entities::Project;
    use slidetap_domain::item::{Image, ImageFile, ItemCommon};
    use slidetap_domain::schema::{DatasetSchema, ProjectSchema, RootSchema, SchemaRegistry};
    use slidetap_domain::value_objects::{BatchUid, DatasetUid, ItemSchemaUid, ItemUid, RootSchemaUid};
    use std::collections::BTreeMap;
    use std::path::Path;

    struct FakeCodec;

    #[async_trait]
    impl ImageCodec for FakeCodec {
        async fn dicomize(&self, _source: &Path, _target_dir: &Path, _config: &DicomizeConfig, _metadata: Value) -> CoreResult<Vec<ImageFile>> {
            Ok(vec![ImageFile {
                uid: ItemUid::new(),
                filename: "level-0.dcm".to_string(),
            }])
        }

        async fn thumbnail(&self, _source: &Path, _max_size: u32) -> CoreResult<Vec<u8>> {
            Ok(vec![1, 2, 3])
        }
    }

    struct FakeStorage;

    #[async_trait]
    impl Storage for FakeStorage {
        async fn project_outbox(&self, _project: &Project) -> CoreResult<PathBuf> {
            Ok(PathBuf::from("/tmp/outbox"))
        }

        async fn store_image(&self, _project: &Project, _image: &Image, source: &Path, _use_pseudonym: bool) -> CoreResult<PathBuf> {
            Ok(source.to_path_buf())
        }

        async fn store_thumbnail(&self, _project: &Project, _image: &Image, _bytes: Vec<u8>, _use_pseudonym: bool) -> CoreResult<PathBuf> {
            Ok(PathBuf::from("/tmp/thumb.jpg"))
        }

        async fn get_thumbnail(&self, _image: &Image, _size: u32) -> CoreResult<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn store_metadata(&self, _project: &Project, _entries: std::collections::HashMap<String, Vec<u8>>) -> CoreResult<()> {
            Ok(())
        }

        async fn store_pseudonyms(&self, _project: &Project, _pseudonyms: std::collections::HashMap<String, String>) -> CoreResult<()> {
            Ok(())
        }

        async fn create_download_image_path(&self, _project: &Project, _image: &Image) -> CoreResult<PathBuf> {
            Ok(PathBuf::from("/tmp/scratch"))
        }

        async fn cleanup_scratch(&self, _path: &Path) -> CoreResult<()> {
            Ok(())
        }
    }

    fn context() -> StepContext {
        let root = RootSchema {
            uid: RootSchemaUid::new(),
            project_schema: ProjectSchema {
                uid: RootSchemaUid::new(),
                attributes: BTreeMap::new(),
            },
            dataset_schema: DatasetSchema {
                uid: RootSchemaUid::new(),
                attributes: BTreeMap::new(),
            },
            samples: BTreeMap::new(),
            images: BTreeMap::new(),
            annotations: BTreeMap::new(),
            observations: BTreeMap::new(),
            sample_relations: Vec::new(),
            sample_image_relations: Vec::new(),
        };
        StepContext {
            registry: Arc::new(SchemaRegistry::new(root)),
            project: Project::new(
                "demo",
                RootSchemaUid::new(),
                RootSchemaUid::new(),
                DatasetUid::new(),
                BatchUid::new(),
                chrono::Utc::now(),
            ),
            image: Image::new(ItemCommon {
                uid: ItemUid::new(),
                identifier: "slide-1".to_string(),
                name: "slide-1".to_string(),
                pseudonym: None,
                selected: true,
                valid_attributes: None,
                valid_relations: None,
                locked: false,
                schema_uid: ItemSchemaUid::new(),
                dataset_uid: DatasetUid::new(),
                batch_uid: BatchUid::new(),
                attributes: BTreeMap::new(),
                private_attributes: BTreeMap::new(),
            }),
            path: PathBuf::from("/tmp/slide-1.svs"),
            cancellation: slidetap_domain::pipeline::CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn dicomize_step_populates_files_and_format() {
        let step = DicomizeStep {
            codec: Arc::new(FakeCodec),
            storage: Arc::new(FakeStorage),
            config: DicomizeConfig::default(),
        };
        let outcome = step.run(context()).await.unwrap();
        assert_eq!(outcome.image.files.len(), 1);
        assert_eq!(outcome.image.format.as_deref(), Some("dicom"));
        assert_eq!(outcome.image.folder_path.as_deref(), Some("/tmp/scratch/level-0.dcm"));
    }

    #[tokio::test]
    async fn thumbnail_step_records_thumbnail_path() {
        let step = ThumbnailStep {
            codec: Arc::new(FakeCodec),
            storage: Arc::new(FakeStorage),
            config: ThumbnailConfig::default(),
            use_pseudonyms: false,
        };
        let outcome = step.run(context()).await.unwrap();
        assert_eq!(outcome.image.thumbnail_path.as_deref(), Some("/tmp/thumb.jpg"));
    }

    #[tokio::test]
    async fn finish_step_is_a_noop_when_delete_source_folder_is_unset() {
        let step = FinishStep {
            storage: Arc::new(FakeStorage),
            config: FinishConfig::default(),
        };
        let ctx = context();
        let original_path = ctx.path.clone();
        let outcome = step.run(ctx).await.unwrap();
        assert_eq!(outcome.new_path, original_path);
    }
}
