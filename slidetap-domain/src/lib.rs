// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! `slidetap-domain` — the pure business logic of the SlideTap whole-slide
//! image curation engine: the typed metadata model and schema (A), the
//! Attribute Engine (B), the Mapper Engine (C), the Item Store (D), the
//! Validator (E), the Lifecycle Coordinator (F), and the Image Pipeline's
//! step/port contracts (G).
//!
//! No `tokio`, no logging crate, no `anyhow` - this crate depends only on
//! what its algorithms need (`serde`, `uuid`, `thiserror`, `chrono`,
//! `regex`, `serde_json`, `async-trait` for I/O-bound port traits only,
//! `lru`/`parking_lot` for the mapper cache and item store). Infrastructure
//! concerns live in `slidetap-app`.

pub mod attribute;
pub mod entities;
pub mod error;
pub mod events;
pub mod item;
pub mod lifecycle;
pub mod mapper;
pub mod pipeline;
pub mod schema;
pub mod store;
pub mod validator;
pub mod value_objects;

pub use error::{CoreError, CoreResult};
