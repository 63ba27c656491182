// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Composition root: the one place that picks concrete adapters for the
//! domain's ports and wires them into an [`Engine`], grounded on the
//! teacher bootstrap's planned `composition_root` module and on how
//! `pipeline/src/main.rs` assembles its services before dispatching a
//! command.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use slidetap_app::infrastructure::adapters::{FilesystemStorage, NoopImporter, PassthroughCodec};
use slidetap_app::{Engine, EngineConfig, MetricsService};
use slidetap_domain::schema::{RootSchema, SchemaRegistry};

pub fn load_schema(path: &Path) -> anyhow::Result<RootSchema> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading schema file {}", path.display()))?;
    let schema: RootSchema = serde_json::from_str(&raw).with_context(|| format!("parsing schema file {}", path.display()))?;
    Ok(schema)
}

/// Builds one [`Engine`] from a loaded schema, a storage root directory,
/// and a layered [`EngineConfig`] - the sole construction site for the
/// facade the rest of the process drives.
pub fn build_engine(schema: RootSchema, storage_root: &Path, config_path: Option<&Path>) -> anyhow::Result<(Arc<Engine>, Arc<MetricsService>)> {
    let registry = Arc::new(SchemaRegistry::new(schema));
    let storage = Arc::new(FilesystemStorage::new(storage_root.to_path_buf()));
    let codec = Arc::new(PassthroughCodec);
    let importer = Arc::new(NoopImporter);
    let config = match config_path {
        Some(path) => EngineConfig::from_sources(path)?,
        None => EngineConfig::from_sources("slidetap.toml")?,
    };
    let metrics = Arc::new(MetricsService::new().context("initializing metrics service")?);

    let engine = Arc::new(Engine::new(registry, storage, codec, importer.clone(), importer, config, metrics.clone()));
    Ok((engine, metrics))
}
