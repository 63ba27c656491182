// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Built-in step configuration (spec §4.G; defaults follow the original
//! `DicomizationConfig` per SPEC_FULL.md §11).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DicomizeConfig {
    /// Pyramid levels to include; empty means "all levels".
    pub levels: Vec<u32>,
    pub include_labels: bool,
    pub include_overviews: bool,
    pub worker_threads: usize,
}

impl Default for DicomizeConfig {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            include_labels: false,
            include_overviews: false,
            worker_threads: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ThumbnailFormat {
    Jpeg,
    Png,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    pub max_size: u32,
    pub format: ThumbnailFormat,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_size: 512,
            format: ThumbnailFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub use_pseudonyms: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinishConfig {
    pub delete_source_folder: bool,
}
