//! Browser-side of the send pipeline
//!
//! This crate owns the one persistent, authenticated WhatsApp Web session a
//! run delivers through, and exposes the narrow [`surface::ComposeSurface`]
//! interface the pipeline drives. Chrome/Chromium is controlled over the
//! Chrome DevTools Protocol via `headless_chrome`.
//!
//! # Requirements
//!
//! - Chrome or Chromium installed
//! - A writable profile directory (login state is kept there so the QR code
//!   only has to be scanned once)

pub mod session;
pub mod surface;

pub use session::BrowserSession;
pub use surface::{ComposeSurface, COMPOSER_SELECTOR};
