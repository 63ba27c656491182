// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Layered engine configuration (SPEC_FULL.md §10.4, §11's `ConfigParser`
//! supplement): defaults, an optional TOML file, then environment
//! variables (prefix `SLIDETAP_`), in that order of precedence - the
//! teacher's `config` + `toml` + `serde` combination.

use std::path::Path;

use serde::{Deserialize, Serialize};
use slidetap_domain::pipeline::{DicomizeConfig, FinishConfig, StoreConfig, ThumbnailConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub default_workers: usize,
    pub high_priority_workers: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            default_workers: 4,
            high_priority_workers: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub queues: QueueConfig,
    pub storage: StorageConfig,
    pub dicomize: DicomizeConfig,
    pub thumbnail: ThumbnailConfig,
    pub store: StoreConfig,
    pub finish: FinishConfig,
    pub regex_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queues: QueueConfig::default(),
            storage: StorageConfig::default(),
            dicomize: DicomizeConfig::default(),
            thumbnail: ThumbnailConfig::default(),
            store: StoreConfig::default(),
            finish: FinishConfig::default(),
            // Floor enforced again by RegexCache itself; kept here so a
            // deployment's intent is visible in the resolved config dump.
            regex_cache_capacity: 1000,
        }
    }
}

impl EngineConfig {
    /// Loads defaults, then `path` (if it exists), then `SLIDETAP_*`
    /// environment overrides (e.g. `SLIDETAP_QUEUES__DEFAULT_WORKERS=8`).
    pub fn from_sources(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let defaults = config::Config::try_from(&EngineConfig::default())?;
        let builder = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("SLIDETAP").separator("__"));
        let settings = builder.build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_the_config_crate() {
        let loaded = EngineConfig::from_sources("does-not-exist.toml").unwrap();
        assert_eq!(loaded.queues.default_workers, 4);
        assert_eq!(loaded.regex_cache_capacity, 1000);
    }

    #[test]
    fn env_override_takes_precedence_over_defaults() {
        std::env::set_var("SLIDETAP_QUEUES__DEFAULT_WORKERS", "9");
        let loaded = EngineConfig::from_sources("does-not-exist.toml").unwrap();
        assert_eq!(loaded.queues.default_workers, 9);
        std::env::remove_var("SLIDETAP_QUEUES__DEFAULT_WORKERS");
    }
}
