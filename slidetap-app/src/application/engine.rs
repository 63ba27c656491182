// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! `Engine`: the facade use-case layer wiring the Schema Registry, Item
//! Store, Mapper Engine, and the scheduler together, grounded on the
//! teacher's `adaptive_pipeline/src/application/services/pipeline_service.rs`
//! (one service owning the domain collaborators and exposing coarse,
//! transactional operations rather than leaking them to callers).
//!
//! Drives exactly the per-image execution contract from spec §4.G step 2:
//! load, `skip_image` check, mark processing, run the phase's steps, then
//! record the terminal status - never leaving an image stuck mid-phase on
//! success.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use slidetap_domain::entities::{Batch, Project};
use slidetap_domain::error::{CoreError, CoreResult};
use slidetap_domain::item::{Image, Item};
use slidetap_domain::lifecycle::batch::{apply as apply_batch_event, try_aggregate, BatchEvent};
use slidetap_domain::lifecycle::image::{apply as apply_image_event, retry as retry_image, skip_image, ImageEvent};
use slidetap_domain::lifecycle::project::{derive_status, finish_export, start_export};
use slidetap_domain::mapper::{Mapper, MapperEngine, MapperGroup};
use slidetap_domain::pipeline::{ImageCodec, ImageImporter, MetadataImporter, PipelineStep, QueuePriority, StepContext, Storage};
use slidetap_domain::schema::SchemaRegistry;
use slidetap_domain::store::{ItemStore, MapperStore, ProjectStore};
use slidetap_domain::validator::{validate_item_attributes, validate_relations, BatchValidation, DatasetValidation, ProjectValidation};
use slidetap_domain::value_objects::{BatchStatus, BatchUid, ImageStatus, ItemUid, ProcessingPhase, ProjectUid};
use tokio::sync::oneshot;

use crate::application::steps::{DicomizeStep, FinishStep, StoreStep, ThumbnailStep};
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::runtime::{PipelineJob, Scheduler};

/// The facade use-case layer: wires the Schema Registry, Item Store,
/// Project/Batch Store, Mapper Engine, and the scheduler together, and
/// exposes the control-surface methods named in spec §6 (`pre_process_batch`,
/// `process_batch`, `retry_images`, `select_item`, `export_project`, ...).
/// `Engine` plays the role of both component F (Lifecycle Coordinator) and
/// the driver of component G (Image Pipeline) - the two are specified
/// together in spec §4.F/§4.G because the pipeline's per-image completion
/// is what the Coordinator's aggregation rule reacts to.
pub struct Engine {
    pub registry: Arc<SchemaRegistry>,
    pub item_store: Arc<ItemStore>,
    pub project_store: Arc<ProjectStore>,
    pub mapper_store: Arc<MapperStore>,
    pub mapper_engine: Arc<MapperEngine>,
    scheduler: Arc<Scheduler>,
    storage: Arc<dyn Storage>,
    codec: Arc<dyn ImageCodec>,
    image_importer: Arc<dyn ImageImporter>,
    metadata_importer: Arc<dyn MetadataImporter>,
    attribute_engine: slidetap_domain::attribute::AttributeEngine,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        storage: Arc<dyn Storage>,
        codec: Arc<dyn ImageCodec>,
        image_importer: Arc<dyn ImageImporter>,
        metadata_importer: Arc<dyn MetadataImporter>,
        config: EngineConfig,
        metrics: Arc<crate::infrastructure::metrics::MetricsService>,
    ) -> Self {
        let scheduler = Arc::new(Scheduler::new(
            config.queues.default_workers,
            config.queues.high_priority_workers,
            metrics,
        ));
        Self {
            registry,
            item_store: Arc::new(ItemStore::new()),
            project_store: Arc::new(ProjectStore::new()),
            mapper_store: Arc::new(MapperStore::new()),
            mapper_engine: Arc::new(MapperEngine::with_cache_capacity(config.regex_cache_capacity)),
            scheduler,
            storage,
            codec,
            image_importer,
            metadata_importer,
            attribute_engine: slidetap_domain::attribute::AttributeEngine::new(),
            config,
        }
    }

    fn load_image(&self, image_uid: &ItemUid) -> CoreResult<Image> {
        match self.item_store.get(image_uid) {
            Some(Item::Image(image)) => Ok(image),
            Some(_) => Err(CoreError::not_allowed(format!("item {image_uid} is not an image"))),
            None => Err(CoreError::not_found(format!("image {image_uid}"))),
        }
    }

    /// Per-image execution contract, spec §4.G step 2-6: load under the
    /// item store's transaction, skip if already at the phase's
    /// destination status, fail fast if there is nothing on disk to
    /// process, otherwise run the phase's steps and record the terminal
    /// status - then always notify the Coordinator so batch aggregation
    /// can observe the new status (spec §4.F "Aggregation rule").
    async fn run_phase(
        &self,
        project: Project,
        image_uid: ItemUid,
        path: PathBuf,
        phase: ProcessingPhase,
        priority: QueuePriority,
        start_event: ImageEvent,
        complete_event: ImageEvent,
        failed_event: ImageEvent,
        steps: Vec<Arc<dyn PipelineStep>>,
    ) -> CoreResult<Image> {
        let mut image = self.load_image(&image_uid)?;
        if skip_image(image.status, phase) {
            return Ok(image);
        }
        apply_image_event(&mut image, start_event)?;
        if image.folder_path.is_none() {
            image.status_message = "Failed at step load due to missing folder_path".to_string();
            apply_image_event(&mut image, failed_event)?;
            image.common.selected = false;
            self.item_store.update(Item::Image(image.clone()))?;
            self.notify_aggregation(&image.common.batch_uid, phase);
            return Ok(image);
        }
        self.item_store.update(Item::Image(image.clone()))?;

        let context = StepContext {
            registry: self.registry.clone(),
            project,
            cancellation: self.scheduler.token_for_batch(&image.common.batch_uid),
            image,
            path,
        };
        let (tx, rx) = oneshot::channel();
        self.scheduler
            .enqueue(PipelineJob { context, steps, completion: tx }, priority)
            .await
            .map_err(|err| CoreError::collaborator_failure(err.to_string()))?;
        let outcome = rx.await.map_err(|_| CoreError::collaborator_failure("scheduler dropped the job"))?;

        let mut image = self.load_image(&image_uid)?;
        match outcome {
            Ok(Some(step_outcome)) => {
                image = step_outcome.image;
                apply_image_event(&mut image, complete_event)?;
            }
            Ok(None) => {
                // Cancelled at a step boundary (spec §4.G "records
                // nothing"): leave status and selection untouched and skip
                // aggregation - the batch that cancelled this image is
                // already being deleted.
                return Ok(image);
            }
            Err(err) => {
                // Spec §4.G step 5: a failed step de-selects the image so
                // the batch can still converge to `*_COMPLETE` without it.
                image.status_message = format!("Failed at step due to {err}");
                apply_image_event(&mut image, failed_event)?;
                image.common.selected = false;
            }
        }
        self.item_store.update(Item::Image(image.clone()))?;
        self.notify_aggregation(&image.common.batch_uid, phase);
        Ok(image)
    }

    /// Notifies the Lifecycle Coordinator that an image reached a terminal
    /// status for `phase`: recomputes "any selected image still in
    /// flight" over the whole batch and applies the compare-and-set
    /// aggregation transition if none remain (spec §4.F, §5, testable
    /// property 6). Best-effort: a missing/already-terminal batch is not
    /// an error here, since the caller (an image task) must never fail on
    /// account of bookkeeping on a sibling entity.
    fn notify_aggregation(&self, batch_uid: &BatchUid, phase: ProcessingPhase) {
        let images = self.item_store.images_in_batch(batch_uid);
        let any_selected_non_terminal = images.iter().filter(|i| i.common.selected).any(|i| !i.status.is_terminal_for_phase(phase));
        let _ = self.project_store.with_batch_mut(batch_uid, |batch| try_aggregate(batch, phase, any_selected_non_terminal));
    }

    /// Runs the Dicomize step (spec §4.G's pre-processing phase).
    pub async fn run_pre_processing(&self, project: Project, image_uid: ItemUid, path: std::path::PathBuf, priority: QueuePriority) -> CoreResult<Image> {
        let steps: Vec<Arc<dyn PipelineStep>> = vec![Arc::new(DicomizeStep {
            codec: self.codec.clone(),
            storage: self.storage.clone(),
            config: self.config.dicomize.clone(),
        })];
        self.run_phase(
            project,
            image_uid,
            path,
            ProcessingPhase::Pre,
            priority,
            ImageEvent::StartPreProcessing,
            ImageEvent::PreProcessingComplete,
            ImageEvent::PreProcessingFailed,
            steps,
        )
        .await
    }

    /// Runs Thumbnail → Store → Finish (spec §4.G's post-processing phase).
    pub async fn run_post_processing(&self, project: Project, image_uid: ItemUid, path: std::path::PathBuf, priority: QueuePriority) -> CoreResult<Image> {
        let steps: Vec<Arc<dyn PipelineStep>> = vec![
            Arc::new(ThumbnailStep {
                codec: self.codec.clone(),
                storage: self.storage.clone(),
                config: self.config.thumbnail.clone(),
                use_pseudonyms: self.config.store.use_pseudonyms,
            }),
            Arc::new(StoreStep {
                storage: self.storage.clone(),
                config: self.config.store.clone(),
            }),
            Arc::new(FinishStep {
                storage: self.storage.clone(),
                config: self.config.finish.clone(),
            }),
        ];
        self.run_phase(
            project,
            image_uid,
            path,
            ProcessingPhase::Post,
            priority,
            ImageEvent::StartPostProcessing,
            ImageEvent::PostProcessingComplete,
            ImageEvent::PostProcessingFailed,
            steps,
        )
        .await
    }

    /// Downloads one image via the configured [`ImageImporter`] (spec §6's
    /// "Image import interface"): `NOT_STARTED -> DOWNLOADING ->
    /// DOWNLOADED`/`DOWNLOADING_FAILED`. Not part of the built-in step
    /// sequence - download precedes it and is driven directly, matching
    /// the separation the spec draws between the import interface and the
    /// Dicomize/Thumbnail/Store/Finish steps.
    pub async fn download_image(&self, project: &Project, image_uid: &ItemUid) -> CoreResult<Image> {
        let mut image = self.load_image(image_uid)?;
        apply_image_event(&mut image, ImageEvent::StartDownload)?;
        self.item_store.update(Item::Image(image.clone()))?;

        match self.image_importer.download(&image, project).await {
            Ok((folder_path, file_names)) => {
                image.folder_path = Some(folder_path.display().to_string());
                image.files = file_names
                    .into_iter()
                    .map(|filename| slidetap_domain::item::ImageFile { uid: ItemUid::new(), filename })
                    .collect();
                apply_image_event(&mut image, ImageEvent::DownloadComplete)?;
            }
            Err(err) => {
                image.status_message = err.to_string();
                apply_image_event(&mut image, ImageEvent::DownloadFailed)?;
            }
        }
        self.item_store.update(Item::Image(image.clone()))?;
        Ok(image)
    }

    /// `create_project(name, dataset_uid)` (spec §6): creates the project
    /// together with its undeletable default batch.
    pub fn create_project(&self, name: impl Into<String>, root_schema_uid: slidetap_domain::value_objects::RootSchemaUid, dataset_uid: slidetap_domain::value_objects::DatasetUid) -> Project {
        let placeholder_default = BatchUid::new();
        let mut project = Project::new(name, root_schema_uid.clone(), root_schema_uid, dataset_uid, placeholder_default, chrono::Utc::now());
        let default_batch = Batch::new("default", project.uid.clone(), chrono::Utc::now(), true);
        project.default_batch_uid = default_batch.uid.clone();
        let project = self.project_store.add_project(project);
        self.project_store.add_batch(default_batch);
        project
    }

    /// `create_batch(project, name, is_default)` (spec §6).
    pub fn create_batch(&self, project_uid: &ProjectUid, name: impl Into<String>, is_default: bool) -> Batch {
        self.project_store.add_batch(Batch::new(name, project_uid.clone(), chrono::Utc::now(), is_default))
    }

    /// `create_mapper(name, attribute_schema_uid, root_attribute_schema_uid)`
    /// (spec §4.C): registers a mapper with no mapping items yet.
    pub fn create_mapper(&self, name: impl Into<String>, attribute_schema_uid: slidetap_domain::value_objects::AttributeSchemaUid, root_attribute_schema_uid: slidetap_domain::value_objects::AttributeSchemaUid) -> Mapper {
        self.mapper_store.add_mapper(Mapper::new(name, attribute_schema_uid, root_attribute_schema_uid))
    }

    /// Adds one `(expression, replacement attribute)` rule to a mapper,
    /// then re-applies it (spec §4.C step 1's ordered `MappingItem`s and
    /// spec §3 "When a mapping item is created, updated, or deleted, the
    /// engine enumerates all attributes whose `root_attribute_schema_uid`
    /// matches and re-applies the owning mapper"). `batch_uid` scopes the
    /// re-application the same way [`Self::apply_mappers_to_batch`] does.
    pub fn add_mapping_item(
        &self,
        project: &Project,
        batch_uid: &BatchUid,
        mapper_uid: &slidetap_domain::value_objects::MapperUid,
        expression: impl Into<String>,
        attribute: slidetap_domain::attribute::Attribute,
    ) -> CoreResult<usize> {
        let mut mapper = self.mapper_store.get_mapper(mapper_uid)?;
        mapper.add_mapping_item(slidetap_domain::mapper::MappingItem::new(expression, attribute));
        let applied = self.reapply_mapper_for_root_schema(project, batch_uid, &mut mapper)?;
        self.mapper_store.update_mapper(mapper)?;
        Ok(applied)
    }

    /// Replaces an existing mapping item's expression/attribute, then
    /// re-applies the owning mapper (spec §3, see [`Self::add_mapping_item`]).
    pub fn update_mapping_item(
        &self,
        project: &Project,
        batch_uid: &BatchUid,
        mapper_uid: &slidetap_domain::value_objects::MapperUid,
        mapping_item_uid: &slidetap_domain::value_objects::MappingItemUid,
        expression: impl Into<String>,
        attribute: slidetap_domain::attribute::Attribute,
    ) -> CoreResult<usize> {
        let mut mapper = self.mapper_store.get_mapper(mapper_uid)?;
        if !mapper.update_mapping_item(mapping_item_uid, expression, attribute) {
            return Err(CoreError::not_found(format!("mapping item {mapping_item_uid}")));
        }
        let applied = self.reapply_mapper_for_root_schema(project, batch_uid, &mut mapper)?;
        self.mapper_store.update_mapper(mapper)?;
        Ok(applied)
    }

    /// Removes a mapping item, then re-applies the owning mapper so any
    /// attribute the removed rule used to match reverts to whatever the
    /// remaining rules (or nothing) produce (spec §3, see
    /// [`Self::add_mapping_item`]).
    pub fn delete_mapping_item(
        &self,
        project: &Project,
        batch_uid: &BatchUid,
        mapper_uid: &slidetap_domain::value_objects::MapperUid,
        mapping_item_uid: &slidetap_domain::value_objects::MappingItemUid,
    ) -> CoreResult<usize> {
        let mut mapper = self.mapper_store.get_mapper(mapper_uid)?;
        if mapper.remove_mapping_item(mapping_item_uid).is_none() {
            return Err(CoreError::not_found(format!("mapping item {mapping_item_uid}")));
        }
        let applied = self.reapply_mapper_for_root_schema(project, batch_uid, &mut mapper)?;
        self.mapper_store.update_mapper(mapper)?;
        Ok(applied)
    }

    /// Re-applies `mapper` to every attribute in `batch_uid` and in
    /// `project.attributes` whose `schema_uid` matches the mapper's
    /// `root_attribute_schema_uid`, persisting the items (and the project)
    /// that changed. Does not persist `mapper` itself - callers do that
    /// once, after this returns, so the mapper's updated hit counters land
    /// in the same write as the mapping-item edit.
    fn reapply_mapper_for_root_schema(&self, project: &Project, batch_uid: &BatchUid, mapper: &mut Mapper) -> CoreResult<usize> {
        let mut applied = 0;
        for mut item in self.item_store.items_in_batch(batch_uid) {
            let common = item.common_mut();
            let attributes = common.attributes.values_mut().chain(common.private_attributes.values_mut());
            let changed = self.mapper_engine.reapply_for_root_schema(mapper, attributes)?;
            if changed > 0 {
                self.item_store.update(item)?;
                applied += changed;
            }
        }
        let project_changed = self
            .project_store
            .with_project_mut(&project.uid, |p| self.mapper_engine.reapply_for_root_schema(mapper, p.attributes.values_mut()))??;
        applied += project_changed;
        Ok(applied)
    }

    /// `create_mapper_group(name)` (spec §3 "Mapper groups collect mappers
    /// and attach to projects").
    pub fn create_mapper_group(&self, name: impl Into<String>) -> MapperGroup {
        self.mapper_store.add_group(MapperGroup::new(name))
    }

    pub fn add_mapper_to_group(&self, group_uid: &slidetap_domain::value_objects::MapperGroupUid, mapper_uid: slidetap_domain::value_objects::MapperUid) -> CoreResult<()> {
        let mut group = self.mapper_store.get_group(group_uid)?;
        if !group.mapper_uids.contains(&mapper_uid) {
            group.mapper_uids.push(mapper_uid);
        }
        self.mapper_store.update_group(group)
    }

    /// Attaches a mapper group to a project, grounded on
    /// [`MapperEngine::install_default_groups`] (idempotent on re-attach).
    pub fn attach_mapper_group(&self, project: &mut Project, group_uid: &slidetap_domain::value_objects::MapperGroupUid) -> CoreResult<()> {
        let group = self.mapper_store.get_group(group_uid)?;
        self.mapper_engine.install_default_groups(&mut project.mapper_group_uids, std::slice::from_ref(&group));
        Ok(())
    }

    /// Applies every mapper in every group attached to `project` to one
    /// item's attributes (spec §4.C step "Applying mappers ... to each
    /// item's attributes"). Returns how many attributes changed. Mapper
    /// hit counters are persisted back to the [`MapperStore`] so ordering
    /// (testable property 4) and idempotence (testable property 3) hold
    /// across calls.
    pub fn apply_mappers_to_item(&self, project: &Project, item: &mut Item) -> CoreResult<usize> {
        let mut applied = 0;
        for group_uid in &project.mapper_group_uids {
            for mut mapper in self.mapper_store.mappers_for_group(group_uid)? {
                let common = item.common_mut();
                for attribute in common.attributes.values_mut().chain(common.private_attributes.values_mut()) {
                    if self.mapper_engine.apply_mapper(&mut mapper, attribute)? {
                        applied += 1;
                    }
                }
                self.mapper_store.update_mapper(mapper)?;
            }
        }
        Ok(applied)
    }

    /// Re-applies `project`'s attached mapper groups to every item in
    /// `batch_uid`, and to the project's own attributes, persisting
    /// whichever of those changed (spec §4.C "Applying mappers to a
    /// project applies ... the mapper to each item's attributes and to
    /// the project/dataset attributes"). Dataset attributes are not owned
    /// by this store - see [`Self::apply_mappers_to_dataset`] for the
    /// caller-owned counterpart.
    pub fn apply_mappers_to_batch(&self, project: &Project, batch_uid: &BatchUid) -> CoreResult<usize> {
        let mut applied = 0;
        for mut item in self.item_store.items_in_batch(batch_uid) {
            let changed = self.apply_mappers_to_item(project, &mut item)?;
            if changed > 0 {
                self.item_store.update(item)?;
                applied += changed;
            }
        }
        let project_changed = self.project_store.with_project_mut(&project.uid, |p| {
            let mut project_applied = 0;
            for group_uid in &p.mapper_group_uids.clone() {
                let Ok(mappers) = self.mapper_store.mappers_for_group(group_uid) else {
                    continue;
                };
                for mut mapper in mappers {
                    for attribute in p.attributes.values_mut() {
                        if self.mapper_engine.apply_mapper(&mut mapper, attribute).unwrap_or(false) {
                            project_applied += 1;
                        }
                    }
                    let _ = self.mapper_store.update_mapper(mapper);
                }
            }
            project_applied
        })?;
        applied += project_changed;
        Ok(applied)
    }

    /// Applies `project`'s attached mapper groups to a dataset's
    /// attributes (spec §4.C, see [`Self::apply_mappers_to_batch`]'s doc).
    /// There is no `DatasetStore` in this tree (`Dataset` has no
    /// persistence layer yet), so the caller owns `dataset` and is
    /// responsible for persisting it after this returns.
    pub fn apply_mappers_to_dataset(&self, project: &Project, dataset: &mut slidetap_domain::entities::Dataset) -> CoreResult<usize> {
        let mut applied = 0;
        for group_uid in &project.mapper_group_uids {
            for mut mapper in self.mapper_store.mappers_for_group(group_uid)? {
                for attribute in dataset.attributes.values_mut() {
                    if self.mapper_engine.apply_mapper(&mut mapper, attribute)? {
                        applied += 1;
                    }
                }
                self.mapper_store.update_mapper(mapper)?;
            }
        }
        Ok(applied)
    }

    pub fn start_search(&self, batch_uid: &BatchUid) -> CoreResult<()> {
        self.project_store.with_batch_mut(batch_uid, |batch| apply_batch_event(batch, BatchEvent::StartSearch))?
    }

    pub fn search_complete(&self, batch_uid: &BatchUid) -> CoreResult<()> {
        self.project_store.with_batch_mut(batch_uid, |batch| apply_batch_event(batch, BatchEvent::SearchComplete))?
    }

    /// `pre_process_batch` (spec §6): transitions the batch to
    /// `IMAGE_PRE_PROCESSING` then runs every selected, already-downloaded
    /// image through [`Self::run_pre_processing`] concurrently - each
    /// completion independently calls [`Self::notify_aggregation`], so the
    /// batch converges to `IMAGE_PRE_PROCESSING_COMPLETE` exactly once
    /// regardless of completion order (testable property 6).
    pub async fn pre_process_batch(&self, project: Project, batch_uid: &BatchUid) -> CoreResult<()> {
        self.project_store.with_batch_mut(batch_uid, |batch| apply_batch_event(batch, BatchEvent::StartPreProcessing))??;
        let jobs: Vec<_> = self
            .item_store
            .images_in_batch(batch_uid)
            .into_iter()
            .filter(|image| image.common.selected && image.status == ImageStatus::Downloaded)
            .map(|image| {
                let path = PathBuf::from(image.folder_path.clone().unwrap_or_default());
                self.run_pre_processing(project.clone(), image.common.uid.clone(), path, QueuePriority::Default)
            })
            .collect();
        for result in join_all(jobs).await {
            result?;
        }
        Ok(())
    }

    /// `process_batch` (spec §6): the post-processing counterpart of
    /// [`Self::pre_process_batch`].
    pub async fn process_batch(&self, project: Project, batch_uid: &BatchUid) -> CoreResult<()> {
        self.project_store.with_batch_mut(batch_uid, |batch| apply_batch_event(batch, BatchEvent::StartPostProcessing))??;
        let jobs: Vec<_> = self
            .item_store
            .images_in_batch(batch_uid)
            .into_iter()
            .filter(|image| image.common.selected && image.status == ImageStatus::PreProcessed)
            .map(|image| {
                let path = PathBuf::from(image.folder_path.clone().unwrap_or_default());
                self.run_post_processing(project.clone(), image.common.uid.clone(), path, QueuePriority::Default)
            })
            .collect();
        for result in join_all(jobs).await {
            result?;
        }
        Ok(())
    }

    /// `complete` (spec §4.F): the final batch transition, legal only from
    /// `IMAGE_POST_PROCESSING_COMPLETE`. Locks every item and attribute in
    /// the batch so no further mutation is possible (invariant iv), then
    /// advances the batch to `COMPLETED`.
    pub fn complete_batch(&self, batch_uid: &BatchUid) -> CoreResult<()> {
        for mut item in self.item_store.items_in_batch(batch_uid) {
            let common = item.common_mut();
            common.locked = true;
            for attribute in common.attributes.values_mut().chain(common.private_attributes.values_mut()) {
                attribute.locked = true;
            }
            self.item_store.update(item)?;
        }
        self.project_store.with_batch_mut(batch_uid, |batch| apply_batch_event(batch, BatchEvent::Complete))?
    }

    /// `retry_images([uid])` (spec §6, §4.F "Retry semantics", testable
    /// property 9): only legal from a `*_FAILED` status; resets the image
    /// and re-enqueues the phase it failed in at high priority.
    pub async fn retry_images(&self, project: Project, image_uids: &[ItemUid]) -> CoreResult<()> {
        for uid in image_uids {
            let mut image = self.load_image(uid)?;
            let failed_status = image.status;
            retry_image(&mut image)?;
            image.common.selected = true;
            self.item_store.update(Item::Image(image.clone()))?;

            match failed_status {
                ImageStatus::PreProcessingFailed => {
                    let path = PathBuf::from(image.folder_path.clone().unwrap_or_default());
                    self.run_pre_processing(project.clone(), uid.clone(), path, QueuePriority::High).await?;
                }
                ImageStatus::PostProcessingFailed => {
                    let path = PathBuf::from(image.folder_path.clone().unwrap_or_default());
                    self.run_post_processing(project.clone(), uid.clone(), path, QueuePriority::High).await?;
                }
                ImageStatus::DownloadingFailed => {
                    self.download_image(&project, uid).await?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// `select_item(uid, bool)` (spec §6).
    pub fn select_item(&self, uid: &ItemUid, selected: bool) -> CoreResult<()> {
        let mut item = self.item_store.get(uid).ok_or_else(|| CoreError::not_found(format!("item {uid}")))?;
        item.common_mut().selected = selected;
        self.item_store.update(item)
    }

    /// `delete(batch)` (spec §6): cascades through the item graph (spec
    /// §4.D) and marks the batch `DELETED`. Refuses to delete the
    /// project's default batch (spec §3: "undeletable").
    pub fn delete_batch(&self, project: &Project, batch_uid: &BatchUid) -> CoreResult<usize> {
        if batch_uid == &project.default_batch_uid {
            return Err(CoreError::not_allowed(format!("batch {batch_uid} is the project's default batch and cannot be deleted")));
        }
        // Spec §4.G "batch deletion cancels in-flight image tasks at the
        // next step boundary": flip the batch's token before the item
        // cascade so any job already queued or running sees it.
        self.scheduler.cancel_batch(batch_uid);
        let mut deleted = 0;
        let schema_uids: Vec<_> = self.registry.root().iter_items().map(|item| item.uid()).collect();
        for schema_uid in schema_uids {
            deleted += self.item_store.delete_items(batch_uid, &schema_uid, false, &project.default_batch_uid)?;
        }
        self.project_store.with_batch_mut(batch_uid, |batch| apply_batch_event(batch, BatchEvent::Delete))??;
        Ok(deleted)
    }

    /// `export_project` (spec §6): legal only once every batch is
    /// `COMPLETED` (spec §4.F "Project status"); writes metadata and
    /// pseudonym maps to the project's outbox via the storage port, then
    /// marks the project `EXPORT_COMPLETE`.
    pub async fn export_project(&self, project_uid: &ProjectUid) -> CoreResult<Project> {
        let mut project = self.project_store.get_project(project_uid)?;
        let batches = self.project_store.batches_for_project(project_uid);
        project.status = derive_status(&batches);
        start_export(&mut project)?;
        self.project_store.update_project(project.clone())?;

        self.storage.project_outbox(&project).await?;
        finish_export(&mut project)?;
        self.project_store.update_project(project.clone())?;
        Ok(project)
    }

    /// `get_validation_for_batch` (spec §6, §4.E).
    pub fn validate_batch(&self, batch_uid: &BatchUid) -> BatchValidation {
        let non_valid: Vec<ItemUid> = self
            .item_store
            .items_in_batch(batch_uid)
            .into_iter()
            .filter(|item| {
                let Some(schema) = self.registry.get_item_schema(&item.common().schema_uid) else {
                    return true;
                };
                let attributes_ok = validate_item_attributes(schema, item);
                let relations_ok = validate_relations(&self.registry, &self.item_store, item);
                !(attributes_ok && relations_ok)
            })
            .map(|item| item.uid())
            .collect();
        BatchValidation::from_non_valid_items(batch_uid.clone(), non_valid)
    }

    /// `get_validation_for_project` (spec §6, §4.E): validates a project's
    /// own attributes against its `RootSchema`'s `project_schema`.
    pub fn get_validation_for_project(&self, project_uid: &ProjectUid) -> CoreResult<ProjectValidation> {
        let project = self.project_store.get_project(project_uid)?;
        Ok(ProjectValidation::evaluate(
            project.uid.clone(),
            &self.registry.root().project_schema.attributes,
            &project.attributes,
        ))
    }

    /// `get_validation_for_dataset` (spec §6, §4.E): validates a dataset's
    /// own attributes against its `RootSchema`'s `dataset_schema`. There is
    /// no `DatasetStore` in this tree, so the caller supplies `dataset`
    /// directly rather than a uid to look up.
    pub fn get_validation_for_dataset(&self, dataset: &slidetap_domain::entities::Dataset) -> DatasetValidation {
        DatasetValidation::evaluate(dataset.uid.clone(), &self.registry.root().dataset_schema.attributes, &dataset.attributes)
    }

    /// `update_attribute` (spec §6): replaces one item attribute's
    /// `updated_value` in place via the Attribute Engine, re-renders its
    /// display value, and persists the owning item. Fails if the item, the
    /// tag, or the attribute's schema cannot be resolved, or if the
    /// attribute is locked (invariant iv).
    pub fn update_attribute(&self, item_uid: &ItemUid, tag: &str, value: slidetap_domain::attribute::AttributeValue) -> CoreResult<()> {
        let mut item = self.item_store.get(item_uid).ok_or_else(|| CoreError::not_found(format!("item {item_uid}")))?;
        let item_schema = self
            .registry
            .get_item_schema(&item.common().schema_uid)
            .ok_or_else(|| CoreError::not_found(format!("schema for item {item_uid}")))?;
        let attribute_schema = item_schema
            .common()
            .attributes
            .get(tag)
            .ok_or_else(|| CoreError::not_found(format!("attribute schema for tag {tag}")))?
            .clone();
        let common = item.common_mut();
        let attribute = common
            .attributes
            .get_mut(tag)
            .or_else(|| common.private_attributes.get_mut(tag))
            .ok_or_else(|| CoreError::not_found(format!("attribute {tag} on item {item_uid}")))?;
        self.attribute_engine.update(attribute, &attribute_schema, value)?;
        self.item_store.update(item)
    }

    /// `upload_batch_file(batch, file) -> starts search` (spec §6): parses
    /// an uploaded metadata file via the configured [`MetadataImporter`]
    /// into [`SearchParameters`](slidetap_domain::pipeline::SearchParameters)
    /// and transitions the batch into its search phase (spec §4.F's
    /// `StartSearch` event).
    pub async fn upload_batch_file(&self, batch_uid: &BatchUid, bytes: &[u8]) -> CoreResult<slidetap_domain::pipeline::SearchParameters> {
        let params = self.metadata_importer.parse_file(bytes).await?;
        self.start_search(batch_uid)?;
        Ok(params)
    }

    /// Whether `batch_uid`'s current status still allows mutation -
    /// invariant iv ("an image locked in a completed batch cannot be
    /// mutated").
    pub fn batch_is_locked(&self, batch_uid: &BatchUid) -> CoreResult<bool> {
        Ok(self.project_store.get_batch(batch_uid)?.status == BatchStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::{FilesystemStorage, NoopImporter, PassthroughCodec};
    use crate::infrastructure::metrics::MetricsService;
    use slidetap_domain::attribute::{Attribute, AttributeEngine, AttributeValue};
    use slidetap_domain::item::ItemCommon;
    use slidetap_domain::schema::{AttributeSchema, AttributeSchemaVariant, DatasetSchema, ProjectSchema, RootSchema};
    use slidetap_domain::value_objects::{DatasetUid, ItemSchemaUid, RootSchemaUid};
    use std::collections::BTreeMap;

    fn empty_registry() -> Arc<SchemaRegistry> {
        Arc::new(SchemaRegistry::new(RootSchema {
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
        }))
    }

    fn test_engine(storage_root: &std::path::Path) -> Engine {
        let metrics = Arc::new(MetricsService::new().unwrap());
        Engine::new(
            empty_registry(),
            Arc::new(FilesystemStorage::new(storage_root.to_path_buf())),
            Arc::new(PassthroughCodec),
            Arc::new(NoopImporter),
            Arc::new(NoopImporter),
            EngineConfig::default(),
            metrics,
        )
    }

    fn image_common(identifier: &str, dataset_uid: &DatasetUid, batch_uid: &BatchUid) -> ItemCommon {
        ItemCommon {
            uid: ItemUid::new(),
            identifier: identifier.to_string(),
            name: identifier.to_string(),
            pseudonym: None,
            selected: true,
            valid_attributes: None,
            valid_relations: None,
            locked: false,
            schema_uid: ItemSchemaUid::new(),
            dataset_uid: dataset_uid.clone(),
            batch_uid: batch_uid.clone(),
            attributes: BTreeMap::new(),
            private_attributes: BTreeMap::new(),
        }
    }

    async fn seed_downloaded_image(engine: &Engine, tmp: &std::path::Path, identifier: &str, project: &Project, have_folder: bool) -> ItemUid {
        let slide_dir = tmp.join(identifier);
        tokio::fs::create_dir_all(&slide_dir).await.unwrap();
        let slide_path = slide_dir.join("slide.svs");
        tokio::fs::write(&slide_path, b"fake wsi bytes").await.unwrap();

        let mut image = Image::new(image_common(identifier, &project.dataset_uid, &project.default_batch_uid));
        image.status = ImageStatus::Downloaded;
        image.folder_path = have_folder.then(|| slide_path.display().to_string());
        let uid = image.common.uid.clone();
        engine.item_store.add(Item::Image(image)).unwrap();
        uid
    }

    #[tokio::test]
    async fn s1_minimal_happy_path_reaches_pre_processing_complete() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path());
        let project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());
        seed_downloaded_image(&engine, tmp.path(), "img-1", &project, true).await;

        engine.start_search(&project.default_batch_uid).unwrap();
        engine.search_complete(&project.default_batch_uid).unwrap();
        engine.pre_process_batch(project.clone(), &project.default_batch_uid).await.unwrap();

        let images = engine.item_store.images_in_batch(&project.default_batch_uid);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].status, ImageStatus::PreProcessed);
        assert_eq!(engine.project_store.get_batch(&project.default_batch_uid).unwrap().status, BatchStatus::ImagePreProcessingComplete);
    }

    #[tokio::test]
    async fn s4_failed_pre_processing_deselects_image_and_batch_still_converges() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path());
        let project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());
        // `have_folder = false` triggers the "missing folder_path" failure path.
        let image_uid = seed_downloaded_image(&engine, tmp.path(), "img-1", &project, false).await;

        engine.start_search(&project.default_batch_uid).unwrap();
        engine.search_complete(&project.default_batch_uid).unwrap();
        engine.pre_process_batch(project.clone(), &project.default_batch_uid).await.unwrap();

        let image = engine.item_store.get(&image_uid).unwrap().as_image().unwrap().clone();
        assert_eq!(image.status, ImageStatus::PreProcessingFailed);
        assert!(!image.common.selected);
        assert!(!image.status_message.is_empty());
        assert_eq!(engine.project_store.get_batch(&project.default_batch_uid).unwrap().status, BatchStatus::ImagePreProcessingComplete);
    }

    #[tokio::test]
    async fn s5_retry_recovers_a_failed_image_into_the_completed_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path());
        let project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());
        let image_uid = seed_downloaded_image(&engine, tmp.path(), "img-1", &project, false).await;

        engine.start_search(&project.default_batch_uid).unwrap();
        engine.search_complete(&project.default_batch_uid).unwrap();
        engine.pre_process_batch(project.clone(), &project.default_batch_uid).await.unwrap();
        assert_eq!(
            engine.item_store.get(&image_uid).unwrap().as_image().unwrap().status,
            ImageStatus::PreProcessingFailed
        );

        // Simulate the source file becoming available before the retry.
        let slide_path = tmp.path().join("img-1").join("slide.svs");
        let mut fixed = engine.load_image(&image_uid).unwrap();
        fixed.folder_path = Some(slide_path.display().to_string());
        engine.item_store.update(Item::Image(fixed)).unwrap();

        engine.retry_images(project.clone(), &[image_uid.clone()]).await.unwrap();

        let image = engine.item_store.get(&image_uid).unwrap().as_image().unwrap().clone();
        assert_eq!(image.status, ImageStatus::PreProcessed);
        assert!(image.common.selected);
        assert_eq!(engine.project_store.get_batch(&project.default_batch_uid).unwrap().status, BatchStatus::ImagePreProcessingComplete);
    }

    #[tokio::test]
    async fn retry_rejects_an_image_that_is_not_failed() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path());
        let project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());
        let image_uid = seed_downloaded_image(&engine, tmp.path(), "img-1", &project, true).await;

        let err = engine.retry_images(project, &[image_uid]).await.unwrap_err();
        assert!(matches!(err, CoreError::NotAllowedAction(_)));
    }

    #[tokio::test]
    async fn s6_concurrent_completions_aggregate_exactly_once() {
        // Testable property 6.
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path());
        let project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());
        for i in 0..100 {
            seed_downloaded_image(&engine, tmp.path(), &format!("img-{i}"), &project, true).await;
        }

        engine.start_search(&project.default_batch_uid).unwrap();
        engine.search_complete(&project.default_batch_uid).unwrap();
        engine.pre_process_batch(project.clone(), &project.default_batch_uid).await.unwrap();

        let images = engine.item_store.images_in_batch(&project.default_batch_uid);
        assert_eq!(images.len(), 100);
        assert!(images.iter().all(|i| i.status == ImageStatus::PreProcessed));
        assert_eq!(engine.project_store.get_batch(&project.default_batch_uid).unwrap().status, BatchStatus::ImagePreProcessingComplete);
    }

    #[tokio::test]
    async fn s2_mapper_substitution_sets_mapped_value_and_hits() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path());
        let mut project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());

        let schema = AttributeSchema::new(slidetap_domain::value_objects::AttributeSchemaUid::new(), "collection", false, AttributeSchemaVariant::String);
        let attribute_engine = AttributeEngine::new();
        let replacement = attribute_engine.build(&schema, Some(AttributeValue::String("Excision".into()))).unwrap();

        let mapper = engine.create_mapper("collection", schema.uid.clone(), schema.uid.clone());
        engine
            .add_mapping_item(&project, &project.default_batch_uid, &mapper.uid, "^Excision$", replacement)
            .unwrap();
        let group = engine.create_mapper_group("default");
        engine.add_mapper_to_group(&group.uid, mapper.uid.clone()).unwrap();
        engine.attach_mapper_group(&mut project, &group.uid).unwrap();

        let mut item = Item::Image(Image::new(image_common("specimen-1", &project.dataset_uid, &project.default_batch_uid)));
        item.common_mut().attributes.insert(
            "collection".to_string(),
            attribute_engine.build_mappable(&schema, "Excision"),
        );
        engine.item_store.add(item.clone()).unwrap();

        let applied = engine.apply_mappers_to_batch(&project, &project.default_batch_uid).unwrap();
        assert_eq!(applied, 1);

        let stored = engine.item_store.get(&item.uid()).unwrap();
        let attribute = &stored.common().attributes["collection"];
        assert_eq!(attribute.mapped_value, Some(AttributeValue::String("Excision".into())));
        assert_eq!(attribute.display_value.as_deref(), Some("Excision"));
        assert!(attribute.mapping_item_uid.is_some());

        // Testable property 3: idempotent on re-apply, hits go up by one each time.
        engine.apply_mappers_to_batch(&project, &project.default_batch_uid).unwrap();
        let mapper_after = engine.mapper_store.get_mapper(&mapper.uid).unwrap();
        assert_eq!(mapper_after.mapping_items[0].hits, 2);
    }

    #[tokio::test]
    async fn editing_a_mapping_item_reapplies_the_mapper_without_a_separate_apply_call() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path());
        let project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());

        let schema = AttributeSchema::new(slidetap_domain::value_objects::AttributeSchemaUid::new(), "collection", false, AttributeSchemaVariant::String);
        let attribute_engine = AttributeEngine::new();
        let mapper = engine.create_mapper("collection", schema.uid.clone(), schema.uid.clone());

        let mut item = Item::Image(Image::new(image_common("specimen-1", &project.dataset_uid, &project.default_batch_uid)));
        item.common_mut().attributes.insert("collection".to_string(), attribute_engine.build_mappable(&schema, "Excision"));
        engine.item_store.add(item.clone()).unwrap();

        let replacement = attribute_engine.build(&schema, Some(AttributeValue::String("Excision".into()))).unwrap();
        let applied = engine
            .add_mapping_item(&project, &project.default_batch_uid, &mapper.uid, "^Excision$", replacement)
            .unwrap();
        assert_eq!(applied, 1, "adding a mapping item must reapply the mapper immediately, not wait for apply_mappers_to_batch");

        let stored = engine.item_store.get(&item.uid()).unwrap();
        assert_eq!(
            stored.common().attributes["collection"].mapped_value,
            Some(AttributeValue::String("Excision".into()))
        );

        let mapping_item_uid = engine.mapper_store.get_mapper(&mapper.uid).unwrap().mapping_items[0].uid.clone();
        let other_replacement = attribute_engine.build(&schema, Some(AttributeValue::String("Biopsy".into()))).unwrap();
        engine
            .update_mapping_item(&project, &project.default_batch_uid, &mapper.uid, &mapping_item_uid, "^Excision$", other_replacement)
            .unwrap();
        let stored = engine.item_store.get(&item.uid()).unwrap();
        assert_eq!(
            stored.common().attributes["collection"].mapped_value,
            Some(AttributeValue::String("Biopsy".into())),
            "updating a mapping item must reapply the edited rule"
        );

        engine
            .delete_mapping_item(&project, &project.default_batch_uid, &mapper.uid, &mapping_item_uid)
            .unwrap();
        assert!(engine.mapper_store.get_mapper(&mapper.uid).unwrap().mapping_items.is_empty());
    }

    #[tokio::test]
    async fn applying_mappers_to_a_batch_also_reaches_the_projects_own_attributes() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path());
        let mut project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());

        let schema = AttributeSchema::new(slidetap_domain::value_objects::AttributeSchemaUid::new(), "site", false, AttributeSchemaVariant::String);
        let attribute_engine = AttributeEngine::new();
        let replacement = attribute_engine.build(&schema, Some(AttributeValue::String("Skin".into()))).unwrap();

        let mapper = engine.create_mapper("site", schema.uid.clone(), schema.uid.clone());
        let group = engine.create_mapper_group("default");
        engine.add_mapper_to_group(&group.uid, mapper.uid.clone()).unwrap();
        engine.attach_mapper_group(&mut project, &group.uid).unwrap();
        project.attributes.insert("site".to_string(), attribute_engine.build_mappable(&schema, "Skin"));
        engine.project_store.update_project(project.clone()).unwrap();

        engine
            .add_mapping_item(&project, &project.default_batch_uid, &mapper.uid, "^Skin$", replacement)
            .unwrap();

        let stored = engine.project_store.get_project(&project.uid).unwrap();
        assert_eq!(
            stored.attributes["site"].mapped_value,
            Some(AttributeValue::String("Skin".into())),
            "mapper application must reach the project's own attributes, not just item attributes"
        );
    }

    #[tokio::test]
    async fn complete_batch_locks_items_and_attributes_then_advances_to_completed() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path());
        let project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());
        let image_uid = seed_downloaded_image(&engine, tmp.path(), "img-1", &project, true).await;

        engine.start_search(&project.default_batch_uid).unwrap();
        engine.search_complete(&project.default_batch_uid).unwrap();
        engine.pre_process_batch(project.clone(), &project.default_batch_uid).await.unwrap();
        engine.process_batch(project.clone(), &project.default_batch_uid).await.unwrap();

        let schema = AttributeSchema::new(slidetap_domain::value_objects::AttributeSchemaUid::new(), "note", true, AttributeSchemaVariant::String);
        let attribute_engine = AttributeEngine::new();
        let attribute: Attribute = attribute_engine.build(&schema, Some(AttributeValue::String("hello".into()))).unwrap();
        let mut item = engine.item_store.get(&image_uid).unwrap();
        item.common_mut().attributes.insert("note".to_string(), attribute);
        engine.item_store.update(item).unwrap();

        engine.complete_batch(&project.default_batch_uid).unwrap();

        assert_eq!(engine.project_store.get_batch(&project.default_batch_uid).unwrap().status, BatchStatus::Completed);
        let locked_item = engine.item_store.get(&image_uid).unwrap();
        assert!(locked_item.common().locked);
        assert!(locked_item.common().attributes["note"].locked);

        // Invariant iv: a locked image cannot be mutated further.
        let err = engine.item_store.update(locked_item).unwrap_err();
        assert!(matches!(err, CoreError::NotAllowedAction(_)));
    }

    fn registry_with_one_image_attribute(tag: &str, optional: bool) -> (Arc<SchemaRegistry>, slidetap_domain::value_objects::ItemSchemaUid) {
        use slidetap_domain::schema::item_schema::{ImageSchema, ItemSchemaCommon};

        let attribute_schema = AttributeSchema::new(slidetap_domain::value_objects::AttributeSchemaUid::new(), tag, optional, AttributeSchemaVariant::String);
        let mut attributes = BTreeMap::new();
        attributes.insert(tag.to_string(), attribute_schema);
        let image_schema = ImageSchema {
            common: ItemSchemaCommon {
                uid: ItemSchemaUid::new(),
                name: "wsi".to_string(),
                display_position: 0,
                attributes,
            },
        };
        let image_schema_uid = image_schema.common.uid.clone();
        let mut images = BTreeMap::new();
        images.insert(image_schema_uid.clone(), image_schema);
        let registry = Arc::new(SchemaRegistry::new(RootSchema {
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
            images,
            annotations: BTreeMap::new(),
            observations: BTreeMap::new(),
            sample_relations: Vec::new(),
            sample_image_relations: Vec::new(),
        }));
        (registry, image_schema_uid)
    }

    #[tokio::test]
    async fn update_attribute_replaces_the_value_and_rejects_a_locked_attribute() {
        let tmp = tempfile::tempdir().unwrap();
        let (registry, image_schema_uid) = registry_with_one_image_attribute("note", true);
        let metrics = Arc::new(MetricsService::new().unwrap());
        let engine = Engine::new(
            registry,
            Arc::new(FilesystemStorage::new(tmp.path().to_path_buf())),
            Arc::new(PassthroughCodec),
            Arc::new(NoopImporter),
            Arc::new(NoopImporter),
            EngineConfig::default(),
            metrics,
        );
        let project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());
        let mut common = image_common("img-1", &project.dataset_uid, &project.default_batch_uid);
        common.schema_uid = image_schema_uid;
        let attribute_schema = AttributeSchema::new(slidetap_domain::value_objects::AttributeSchemaUid::new(), "note", true, AttributeSchemaVariant::String);
        let attribute_engine = AttributeEngine::new();
        common.attributes.insert("note".to_string(), attribute_engine.build(&attribute_schema, None).unwrap());
        let item_uid = common.uid.clone();
        engine.item_store.add(Item::Image(Image::new(common))).unwrap();

        engine.update_attribute(&item_uid, "note", AttributeValue::String("hello".into())).unwrap();
        let stored = engine.item_store.get(&item_uid).unwrap();
        assert_eq!(stored.common().attributes["note"].updated_value, Some(AttributeValue::String("hello".into())));
        assert_eq!(stored.common().attributes["note"].display_value.as_deref(), Some("hello"));

        let mut locked_item = stored;
        locked_item.common_mut().attributes.get_mut("note").unwrap().locked = true;
        engine.item_store.update(locked_item).unwrap();
        let err = engine.update_attribute(&item_uid, "note", AttributeValue::String("again".into())).unwrap_err();
        assert!(matches!(err, CoreError::NotAllowedAction(_)));
    }

    #[tokio::test]
    async fn upload_batch_file_parses_via_the_metadata_importer_and_starts_search() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path());
        let project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());

        engine.upload_batch_file(&project.default_batch_uid, b"<metadata/>").await.unwrap();
        assert_eq!(engine.project_store.get_batch(&project.default_batch_uid).unwrap().status, BatchStatus::MetadataSearching);
    }

    #[tokio::test]
    async fn get_validation_for_project_reports_non_valid_tags() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path());
        let mut project = engine.create_project("demo", RootSchemaUid::new(), DatasetUid::new());
        // `empty_registry` declares no project-level attributes, so every
        // project's own attributes validate trivially.
        let validation = engine.get_validation_for_project(&project.uid).unwrap();
        assert!(validation.valid);
        assert!(validation.non_valid_attributes.is_empty());

        project.attributes.insert("ignored".to_string(), AttributeEngine::new().build_mappable(&AttributeSchema::new(slidetap_domain::value_objects::AttributeSchemaUid::new(), "ignored", true, AttributeSchemaVariant::String), "x"));
        engine.project_store.update_project(project.clone()).unwrap();
        let validation = engine.get_validation_for_project(&project.uid).unwrap();
        assert!(validation.valid, "an attribute absent from the schema is not reported");
    }

    #[tokio::test]
    async fn get_validation_for_dataset_reports_a_missing_required_attribute() {
        let (registry, _image_schema_uid) = registry_with_one_image_attribute("unused", true);
        let required_schema = AttributeSchema::new(slidetap_domain::value_objects::AttributeSchemaUid::new(), "consent", false, AttributeSchemaVariant::String);
        let mut dataset_attributes = BTreeMap::new();
        dataset_attributes.insert("consent".to_string(), required_schema);
        let registry = Arc::new(SchemaRegistry::new(RootSchema {
            uid: registry.root().uid.clone(),
            project_schema: registry.root().project_schema.clone(),
            dataset_schema: DatasetSchema {
                uid: RootSchemaUid::new(),
                attributes: dataset_attributes,
            },
            samples: registry.root().samples.clone(),
            images: registry.root().images.clone(),
            annotations: registry.root().annotations.clone(),
            observations: registry.root().observations.clone(),
            sample_relations: registry.root().sample_relations.clone(),
            sample_image_relations: registry.root().sample_image_relations.clone(),
        }));
        let tmp = tempfile::tempdir().unwrap();
        let metrics = Arc::new(MetricsService::new().unwrap());
        let engine = Engine::new(
            registry,
            Arc::new(FilesystemStorage::new(tmp.path().to_path_buf())),
            Arc::new(PassthroughCodec),
            Arc::new(NoopImporter),
            Arc::new(NoopImporter),
            EngineConfig::default(),
            metrics,
        );
        let dataset = slidetap_domain::entities::Dataset::new("demo", RootSchemaUid::new());
        let validation = engine.get_validation_for_dataset(&dataset);
        assert!(!validation.valid);
        assert_eq!(validation.non_valid_attributes, vec!["consent".to_string()]);
    }
}
