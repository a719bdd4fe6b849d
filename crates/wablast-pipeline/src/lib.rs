//! # wablast-pipeline
//!
//! The send pipeline: given an authenticated session, deliver a rendered
//! message to every contact in order, pacing between attempts and streaming
//! cumulative progress back to the caller.
//!
//! - [`delivery`] sends one message to one recipient and never fails loudly:
//!   every problem becomes a per-contact failure outcome.
//! - [`bulk`] owns the run: one session, optional scheduled start, ordered
//!   deliveries, cooperative cancellation, a finite progress stream.
//! - [`whatsapp`] wires the pipeline to the live browser session.

pub mod bulk;
pub mod delivery;
pub mod whatsapp;

#[cfg(test)]
pub(crate) mod testing;

pub use bulk::{BulkDriver, MessagingSession, RunRequest, SessionProvider};
pub use delivery::{deep_link, DeliveryEngine};
pub use whatsapp::WhatsAppProvider;
