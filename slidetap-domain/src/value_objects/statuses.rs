// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Status enumerations for images, batches, and projects.
//!
//! These are plain value objects; the only authorized mutator of the
//! fields they appear in is the [`crate::lifecycle`] coordinator - see its
//! module docs for the transition tables.

use serde::{Deserialize, Serialize};

/// Per-image processing status.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ImageStatus {
    NotStarted,
    Downloading,
    DownloadingFailed,
    Downloaded,
    PreProcessing,
    PreProcessingFailed,
    PreProcessed,
    PostProcessing,
    PostProcessingFailed,
    PostProcessed,
}

impl ImageStatus {
    /// Terminal states reached after a pre- or post-processing attempt,
    /// whether it succeeded or failed. Used by batch aggregation to decide
    /// whether any selected image is still "in flight".
    pub fn is_terminal_for_phase(self, phase: ProcessingPhase) -> bool {
        use ImageStatus::*;
        match phase {
            ProcessingPhase::Pre => matches!(self, PreProcessed | PreProcessingFailed),
            ProcessingPhase::Post => matches!(self, PostProcessed | PostProcessingFailed),
        }
    }

    pub fn is_failed(self) -> bool {
        matches!(
            self,
            ImageStatus::DownloadingFailed | ImageStatus::PreProcessingFailed | ImageStatus::PostProcessingFailed
        )
    }

    /// The pre-failure state a `*_FAILED` status resets to on retry.
    pub fn retry_reset_target(self) -> Option<ImageStatus> {
        match self {
            ImageStatus::DownloadingFailed => Some(ImageStatus::NotStarted),
            ImageStatus::PreProcessingFailed => Some(ImageStatus::Downloaded),
            ImageStatus::PostProcessingFailed => Some(ImageStatus::PreProcessed),
            _ => None,
        }
    }
}

/// Which processing phase a batch aggregation check is evaluating.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ProcessingPhase {
    Pre,
    Post,
}

/// Batch lifecycle status. See [`crate::lifecycle::batch`] for the
/// authoritative transition table.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BatchStatus {
    Initialized,
    MetadataSearching,
    MetadataSearchComplete,
    ImagePreProcessing,
    ImagePreProcessingComplete,
    ImagePostProcessing,
    ImagePostProcessingComplete,
    Completed,
    Failed,
    Deleted,
}

/// Project lifecycle status, derived from its batches (see
/// [`crate::lifecycle::project`]).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    InProgress,
    Completed,
    Exporting,
    ExportComplete,
    Failed,
    Deleted,
}
