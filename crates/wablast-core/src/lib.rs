//! # wablast-core
//!
//! Core types for the wablast bulk-messaging pipeline: the contact and
//! progress data model, the error taxonomy, run configuration, contact-file
//! ingestion, the template store, and failed-contact export.
//!
//! Everything browser-shaped lives in `wablast-browser`; everything that
//! sequences deliveries lives in `wablast-pipeline`. This crate is plain
//! data and filesystem glue.

mod error;
mod types;

pub mod config;
pub mod contacts;
pub mod export;
pub mod templates;

pub use error::{DeliveryError, IngestionError, Result, SessionError, StoreError, WablastError};
pub use types::*;
