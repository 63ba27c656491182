// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Application layer: the concrete `PipelineStep` implementations that
//! drive an image through Dicomize → Thumbnail → Store → Finish (spec
//! §4.G), and the `Engine` facade that wires the domain components
//! (schema, item store, mapper engine) to the scheduler.

mod engine;
mod steps;

pub use engine::Engine;
pub use steps::{DicomizeStep, FinishStep, StoreStep, ThumbnailStep};
