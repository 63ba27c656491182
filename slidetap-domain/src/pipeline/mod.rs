// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Image Pipeline (component G): the built-in step configuration, the I/O
//! ports steps run against, and the step/context contract itself. The
//! queue scheduler that drives these steps over two priority lanes (spec
//! §4.G "two queues: default and high priority") lives in `slidetap-app`,
//! since it is infrastructure (tokio), not domain logic.

pub mod cancellation;
pub mod config;
pub mod ports;
pub mod step;

pub use cancellation::CancellationToken;
pub use config::{DicomizeConfig, FinishConfig, StoreConfig, ThumbnailConfig, ThumbnailFormat};
pub use ports::{ImageCodec, ImageImporter, MetadataImporter, SearchParameters, Storage};
pub use step::{PipelineStep, StepContext, StepOutcome, StepPipeline};

/// Which of the two execution lanes a queued image belongs to (spec §4.G).
/// High-priority images jump ahead of default-priority ones within the
/// same processing phase.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum QueuePriority {
    Default,
    High,
}

impl Default for QueuePriority {
    fn default() -> Self {
        QueuePriority::Default
    }
}
