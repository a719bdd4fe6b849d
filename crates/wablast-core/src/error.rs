//! Error taxonomy for wablast
//!
//! Split by propagation policy rather than by crate:
//! - `SessionError` is fatal to a run and surfaces before any delivery.
//! - `DeliveryError` is recovered per contact; the pipeline folds it into a
//!   failure outcome and keeps going.
//! - `IngestionError` is fatal at file level, recovered at record level.
//! - `StoreError` covers the template store and the failed-contact export.

use std::path::PathBuf;
use thiserror::Error;

/// Errors establishing or holding the authenticated browser session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("login not detected within {0} seconds")]
    LoginTimeout(u64),
}

/// Errors delivering a single message; never escapes the delivery engine
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("element not interactive: {0}")]
    ElementTimeout(String),

    #[error("attachment flow failed: {0}")]
    AttachmentFailed(String),
}

/// Errors reading and validating contact files
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("contact file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("contact file must be .csv or .txt: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("CSV must have columns: {0}")]
    MissingColumns(String),

    #[error("invalid phone number: {0}")]
    InvalidPhoneFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors from the template store and failed-contact export
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Umbrella error for callers that cross component boundaries
#[derive(Error, Debug)]
pub enum WablastError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using WablastError
pub type Result<T> = std::result::Result<T, WablastError>;
