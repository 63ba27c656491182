// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Structured logging (SPEC_FULL.md §10.3), grounded on the teacher's
//! `infrastructure/logging.rs` / `logging/observability.rs`: a `tracing` +
//! `tracing-subscriber` subscriber driven by `RUST_LOG`, emitting one span
//! per batch task and per image task so every log line below it carries
//! `batch_id`/`image_id` fields for free.
//!
//! Scaled down from the teacher's `ObservabilityService` (which also tracks
//! alert thresholds and system health snapshots): SlideTap's curation
//! engine has no SLA-driven alerting requirement, so this module stops at
//! subscriber initialization and span helpers.

use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Initializes the global `tracing` subscriber. Call once, at process
/// start, before any other logging occurs. `json` selects the teacher's
/// structured JSON format for production deployments; plain text is easier
/// to read during local development.
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_target(true);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Opens a span for one batch's processing run. All image spans nested
/// under it inherit `batch_id` in their log output.
pub fn batch_span(batch_id: Uuid) -> tracing::Span {
    tracing::info_span!("batch", batch_id = %batch_id)
}

/// Opens a span for one image moving through the pipeline.
pub fn image_span(batch_id: Uuid, image_id: Uuid) -> tracing::Span {
    tracing::info_span!("image", batch_id = %batch_id, image_id = %image_id)
}
