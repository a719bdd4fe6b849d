//! Bulk sequencing: one session, ordered deliveries, a progress stream
//!
//! The driver opens exactly one session for the whole run, walks the contact
//! sequence in order, and yields a cumulative [`ProgressSnapshot`] after
//! every attempt. The stream is finite and forward-only: at most one
//! snapshot per contact, plus a single terminal snapshot when the run aborts
//! before the first attempt.

use async_stream::stream;
use chrono::{DateTime, Local};
use futures::Stream;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use wablast_browser::ComposeSurface;
use wablast_core::config::AppConfig;
use wablast_core::{templates, Contact, DeliveryOutcome, ProgressSnapshot, SessionError};

use crate::delivery::DeliveryEngine;

/// A compose surface that can also be torn down at the end of a run
#[async_trait::async_trait]
pub trait MessagingSession: ComposeSurface {
    /// Release the underlying browser context. Idempotent.
    async fn close(&mut self);
}

/// Opens the one authenticated session a run delivers through
///
/// The indirection keeps the driver testable without a live browser; the
/// production implementation is [`crate::WhatsAppProvider`].
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: MessagingSession + Send;

    async fn start(&self, headless: bool) -> Result<Self::Session, SessionError>;
}

/// Everything one run needs
pub struct RunRequest {
    /// Validated contacts, in delivery order
    pub contacts: Vec<Contact>,
    /// Message body; `{name}` is rendered per contact
    pub template: String,
    /// Optional attachment; the rendered body becomes its caption
    pub media: Option<PathBuf>,
    /// Defer the first attempt until this local time (past times are ignored)
    pub scheduled_at: Option<DateTime<Local>>,
    pub headless: bool,
}

/// Sequences delivery across all contacts of a run
pub struct BulkDriver<P> {
    provider: P,
    config: AppConfig,
    cancel: Arc<AtomicBool>,
}

impl<P: SessionProvider> BulkDriver<P> {
    pub fn new(provider: P, config: AppConfig) -> Self {
        Self {
            provider,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cooperative cancellation handle, checked between contacts
    ///
    /// Setting the flag finishes the in-flight delivery, closes the session,
    /// and ends the stream early. No snapshot is emitted for the
    /// cancellation itself.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the whole sequence, yielding a snapshot after every attempt
    ///
    /// Abort paths (session start failure, empty contact sequence) yield the
    /// single terminal snapshot [`ProgressSnapshot::aborted`] and end. The
    /// session is closed on every exit path: explicitly when the loop ends,
    /// and by drop when the consumer abandons the stream mid-run.
    pub fn run(self, request: RunRequest) -> impl Stream<Item = ProgressSnapshot> {
        stream! {
            let BulkDriver { provider, config, cancel } = self;

            match provider.start(request.headless).await {
                Err(e) => {
                    error!("Session start failed, aborting run: {}", e);
                    yield ProgressSnapshot::aborted();
                }
                Ok(mut session) if request.contacts.is_empty() => {
                    warn!("No valid contacts to deliver to");
                    session.close().await;
                    yield ProgressSnapshot::aborted();
                }
                Ok(mut session) => {
                    if let Some(at) = request.scheduled_at {
                        wait_until(at).await;
                    }

                    let engine = DeliveryEngine::new(config);
                    let total = request.contacts.len();
                    let mut success = 0usize;
                    let mut failed: Vec<Contact> = Vec::new();

                    info!("Starting run: {} contacts", total);
                    for contact in &request.contacts {
                        if cancel.load(Ordering::Relaxed) {
                            info!(
                                "Cancellation requested, stopping after {} of {} contacts",
                                success + failed.len(),
                                total
                            );
                            break;
                        }

                        let message = templates::render(&request.template, &contact.name);
                        match engine
                            .send(&session, contact, &message, request.media.as_deref())
                            .await
                        {
                            DeliveryOutcome::Success => success += 1,
                            DeliveryOutcome::Failure(_) => failed.push(contact.clone()),
                        }

                        yield ProgressSnapshot {
                            success_count: success,
                            total_count: total,
                            failed: failed.clone(),
                        };
                    }

                    session.close().await;
                    info!(
                        "Run finished: {}/{} delivered, {} failed",
                        success,
                        total,
                        failed.len()
                    );
                }
            }
        }
    }
}

/// Sleep until `at`; a time already in the past starts the run immediately
async fn wait_until(at: DateTime<Local>) {
    match (at - Local::now()).to_std() {
        Ok(wait) => {
            info!(
                "Run scheduled for {}, sleeping {}s",
                at.format("%Y-%m-%d %H:%M"),
                wait.as_secs()
            );
            tokio::time::sleep(wait).await;
        }
        Err(_) => {
            info!(
                "Scheduled time {} is already past, starting now",
                at.format("%Y-%m-%d %H:%M")
            );
        }
    }
}
