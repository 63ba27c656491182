// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! `slidetap-app` — the infrastructure/application layer of the SlideTap
//! curation engine: concrete `Storage`/`ImageCodec`/importer adapters, the
//! tokio-based two-lane scheduler, the `Engine` use-case facade, and the
//! ambient stack (layered config, structured logging, Prometheus metrics).

pub mod application;
pub mod infrastructure;

pub use application::Engine;
pub use infrastructure::{EngineConfig, MetricsService};
