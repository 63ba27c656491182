// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Graceful shutdown on SIGTERM/SIGINT, grounded on the teacher bootstrap's
//! `signals.rs`: a trait so the command race in `main` can be swapped for
//! a no-op in tests, with a real `tokio::signal` handler for production.

use async_trait::async_trait;

#[async_trait]
pub trait SystemSignals: Send + Sync {
    async fn wait_for_shutdown(&self);
}

#[cfg(unix)]
pub struct UnixSignalHandler;

#[cfg(unix)]
#[async_trait]
impl SystemSignals for UnixSignalHandler {
    async fn wait_for_shutdown(&self) {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => return,
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(_) => return,
        };

        tokio::select! {
            _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => tracing::info!("received SIGINT, shutting down"),
        }
    }
}

/// Never resolves; used for commands that run to completion and exit on
/// their own rather than serving until interrupted.
pub struct NoOpSignalHandler;

#[async_trait]
impl SystemSignals for NoOpSignalHandler {
    async fn wait_for_shutdown(&self) {
        std::future::pending().await
    }
}

pub fn create_signal_handler() -> Box<dyn SystemSignals> {
    #[cfg(unix)]
    {
        Box::new(UnixSignalHandler)
    }
    #[cfg(not(unix))]
    {
        Box::new(NoOpSignalHandler)
    }
}
