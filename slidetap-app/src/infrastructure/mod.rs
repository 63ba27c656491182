// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure layer (SPEC_FULL.md §10.2): concrete adapters for the
//! domain's async-trait ports, the tokio-based scheduler, and the ambient
//! stack (config, logging, metrics).

pub mod adapters;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod runtime;

pub use config::EngineConfig;
pub use metrics::MetricsService;
