// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! The `run` subcommand's body: drives `Engine`'s control surface (spec
//! §6) end-to-end over synthetic data seeded from a directory of source
//! files, since no metadata/image importer ships with this engine (spec
//! §1 non-goals). One run = one project, one (default) batch, one image
//! per file under `slides_dir`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Serialize;
use slidetap_app::Engine;
use slidetap_domain::entities::{Dataset, Project};
use slidetap_domain::item::{Image, Item, ItemCommon};
use slidetap_domain::value_objects::{BatchUid, DatasetUid, ImageStatus, ItemUid};

#[derive(Serialize)]
pub struct ImageSummary {
    pub identifier: String,
    pub status: String,
    pub selected: bool,
}

#[derive(Serialize)]
pub struct RunSummary {
    pub project_uid: String,
    pub project_status: String,
    pub batch_uid: String,
    pub images: Vec<ImageSummary>,
    pub batch_valid: bool,
    pub non_valid_items: usize,
}

/// Seeds `slides_dir`'s files as selected, already-downloaded image items
/// in `project`'s default batch, then runs the project through search,
/// pre-processing, processing, validation, and export.
pub async fn run(engine: &Arc<Engine>, project: Project, dataset: Dataset, slides_dir: &Path) -> anyhow::Result<RunSummary> {
    let image_schema = engine
        .registry
        .root()
        .images
        .values()
        .next()
        .context("the supplied schema defines no image item type")?
        .common
        .uid
        .clone();

    let batch_uid = project.default_batch_uid.clone();
    let dataset_uid = dataset.uid.clone();

    let mut entries = tokio::fs::read_dir(slides_dir).await.with_context(|| format!("reading slides directory {}", slides_dir.display()))?;
    let mut seeded = 0usize;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        let identifier = path.file_name().and_then(|n| n.to_str()).unwrap_or("slide").to_string();
        let mut image = Image::new(seed_common(&identifier, &dataset_uid, &image_schema, &batch_uid));
        image.status = ImageStatus::Downloaded;
        image.folder_path = Some(path.display().to_string());
        engine.item_store.add(Item::Image(image))?;
        seeded += 1;
    }
    if seeded == 0 {
        bail!("no files found under {}", slides_dir.display());
    }

    engine.start_search(&batch_uid)?;
    engine.search_complete(&batch_uid)?;
    engine.pre_process_batch(project.clone(), &batch_uid).await?;
    engine.process_batch(project.clone(), &batch_uid).await?;
    engine.complete_batch(&batch_uid)?;

    let validation = engine.validate_batch(&batch_uid);
    let exported = engine.export_project(&project.uid).await?;

    let images = engine
        .item_store
        .images_in_batch(&batch_uid)
        .into_iter()
        .map(|image| ImageSummary {
            identifier: image.common.identifier,
            status: format!("{:?}", image.status),
            selected: image.common.selected,
        })
        .collect();

    Ok(RunSummary {
        project_uid: exported.uid.to_string(),
        project_status: format!("{:?}", exported.status),
        batch_uid: batch_uid.to_string(),
        images,
        batch_valid: validation.valid,
        non_valid_items: validation.non_valid_items.len(),
    })
}

fn seed_common(identifier: &str, dataset_uid: &DatasetUid, schema_uid: &slidetap_domain::value_objects::ItemSchemaUid, batch_uid: &BatchUid) -> ItemCommon {
    ItemCommon {
        uid: ItemUid::new(),
        identifier: identifier.to_string(),
        name: identifier.to_string(),
        pseudonym: None,
        selected: true,
        valid_attributes: None,
        valid_relations: None,
        locked: false,
        schema_uid: schema_uid.clone(),
        dataset_uid: dataset_uid.clone(),
        batch_uid: batch_uid.clone(),
        attributes: Default::default(),
        private_attributes: Default::default(),
    }
}
