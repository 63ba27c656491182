// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus metrics (SPEC_FULL.md §10.3), grounded on the teacher's
//! `infrastructure/metrics/service.rs`: a small set of counters and gauges
//! registered against one `prometheus::Registry`, with a method per
//! observation point rather than exposing the raw metric handles.

use std::time::Duration;

use anyhow::Context;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

pub struct MetricsService {
    registry: Registry,
    images_processed_total: IntCounter,
    images_failed_total: IntCounter,
    image_step_duration: Histogram,
    steps_failed_total: IntCounterVec,
    queue_depth: IntGauge,
}

impl MetricsService {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let images_processed_total = IntCounter::with_opts(Opts::new(
            "slidetap_images_processed_total",
            "Total images that completed the pipeline successfully",
        ))?;
        let images_failed_total = IntCounter::with_opts(Opts::new(
            "slidetap_images_failed_total",
            "Total images that failed the pipeline",
        ))?;
        let image_step_duration = Histogram::with_opts(HistogramOpts::new(
            "slidetap_image_step_duration_seconds",
            "Duration of a single pipeline step for one image",
        ))?;
        let steps_failed_total = IntCounterVec::new(
            Opts::new(
                "slidetap_steps_failed_total",
                "Total step failures, labeled by step name",
            ),
            &["step"],
        )?;
        let queue_depth = IntGauge::with_opts(Opts::new(
            "slidetap_queue_depth",
            "Number of images currently queued, labeled implicitly by scheduler lane at call site",
        ))?;

        registry
            .register(Box::new(images_processed_total.clone()))
            .context("registering slidetap_images_processed_total")?;
        registry
            .register(Box::new(images_failed_total.clone()))
            .context("registering slidetap_images_failed_total")?;
        registry
            .register(Box::new(image_step_duration.clone()))
            .context("registering slidetap_image_step_duration_seconds")?;
        registry
            .register(Box::new(steps_failed_total.clone()))
            .context("registering slidetap_steps_failed_total")?;
        registry
            .register(Box::new(queue_depth.clone()))
            .context("registering slidetap_queue_depth")?;

        Ok(Self {
            registry,
            images_processed_total,
            images_failed_total,
            image_step_duration,
            steps_failed_total,
            queue_depth,
        })
    }

    pub fn record_image_succeeded(&self) {
        self.images_processed_total.inc();
    }

    pub fn record_image_failed(&self) {
        self.images_failed_total.inc();
    }

    pub fn record_step_duration(&self, duration: Duration) {
        self.image_step_duration.observe(duration.as_secs_f64());
    }

    pub fn record_step_failure(&self, step_name: &str) {
        self.steps_failed_total.with_label_values(&[step_name]).inc();
    }

    pub fn set_queue_depth(&self, depth: i64) {
        self.queue_depth.set(depth);
    }

    /// Renders the registry in Prometheus text exposition format, for a
    /// `/metrics` scrape endpoint.
    pub fn gather_as_text(&self) -> anyhow::Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_without_duplicate_metric_names() {
        let service = MetricsService::new().unwrap();
        assert!(service.gather_as_text().unwrap().contains("slidetap_images_processed_total"));
    }

    #[test]
    fn counters_and_gauges_reflect_recorded_observations() {
        let service = MetricsService::new().unwrap();
        service.record_image_succeeded();
        service.record_image_failed();
        service.record_step_failure("dicomize");
        service.set_queue_depth(3);
        let text = service.gather_as_text().unwrap();
        assert!(text.contains("slidetap_images_processed_total 1"));
        assert!(text.contains("slidetap_images_failed_total 1"));
        assert!(text.contains("slidetap_queue_depth 3"));
    }
}
