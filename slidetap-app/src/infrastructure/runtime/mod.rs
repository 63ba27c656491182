// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Tokio-based execution for the Image Pipeline (spec §5, §4.G): two
//! priority lanes feeding a bounded worker pool each, grounded on the
//! teacher's `infrastructure/runtime/resource_manager.rs` two-level
//! resource-governance pattern (global semaphore-gated worker counts rather
//! than unbounded `tokio::spawn`).

mod scheduler;

pub use scheduler::{PipelineJob, Scheduler, SchedulerError};
