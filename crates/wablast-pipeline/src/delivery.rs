//! Single-message delivery over the compose surface

use rand::Rng;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};
use wablast_browser::ComposeSurface;
use wablast_core::config::AppConfig;
use wablast_core::{Contact, DeliveryError, DeliveryOutcome};

/// Compose deep link for one recipient
///
/// The `text` parameter stays empty: the message goes in through the
/// composer so multi-line bodies survive, and WhatsApp still opens the
/// direct compose view for the phone number.
pub fn deep_link(base_url: &str, phone: &str) -> String {
    format!("{}/send?phone={}&text=", base_url.trim_end_matches('/'), phone)
}

/// Delivers one rendered message to one recipient
pub struct DeliveryEngine {
    config: AppConfig,
}

impl DeliveryEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Deliver one message, optionally with a media attachment
    ///
    /// This method never returns an error and never panics: every failure is
    /// folded into the outcome and logged with the recipient's identity. The
    /// pacing delay applies on success and failure alike, since a failed
    /// attempt still hit the service.
    pub async fn send<S>(
        &self,
        surface: &S,
        contact: &Contact,
        message: &str,
        media: Option<&Path>,
    ) -> DeliveryOutcome
    where
        S: ComposeSurface + ?Sized,
    {
        let outcome = match self.try_send(surface, contact, message, media).await {
            Ok(()) => {
                info!("Sent to {} | {}", contact.name, contact.phone);
                DeliveryOutcome::Success
            }
            Err(e) => {
                error!("Failed {} | {} | {}", contact.name, contact.phone, e);
                DeliveryOutcome::Failure(e.to_string())
            }
        };

        self.pace().await;
        outcome
    }

    async fn try_send<S>(
        &self,
        surface: &S,
        contact: &Contact,
        message: &str,
        media: Option<&Path>,
    ) -> Result<(), DeliveryError>
    where
        S: ComposeSurface + ?Sized,
    {
        let url = deep_link(&self.config.whatsapp_url, &contact.phone);
        surface.navigate(&url).await?;
        surface.wait_for_ready(self.config.composer_timeout()).await?;

        match media {
            Some(path) => {
                surface.attach_file(path).await?;
                surface
                    .wait_for_attach_preview(self.config.attach_timeout())
                    .await?;
                if !message.trim().is_empty() {
                    surface.fill_compose(message).await?;
                }
                surface.confirm_attachment().await?;
            }
            None => {
                // An empty body is allowed through; the service drops blank
                // sends on its own.
                surface.fill_compose(message).await?;
                surface.submit().await?;
            }
        }

        Ok(())
    }

    /// Uniform jitter between deliveries
    async fn pace(&self) {
        let (lo, hi) = (
            self.config.delays.min_secs.min(self.config.delays.max_secs),
            self.config.delays.min_secs.max(self.config.delays.max_secs),
        );
        let secs = rand::rng().random_range(lo..=hi);
        debug!("Pacing {}s before next message", secs);
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }
}
