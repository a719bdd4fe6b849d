//! Wiring between the pipeline and the live browser session

use async_trait::async_trait;
use wablast_browser::BrowserSession;
use wablast_core::config::AppConfig;
use wablast_core::SessionError;

use crate::bulk::{MessagingSession, SessionProvider};

/// Opens real WhatsApp Web sessions against the configured profile
pub struct WhatsAppProvider {
    config: AppConfig,
}

impl WhatsAppProvider {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionProvider for WhatsAppProvider {
    type Session = BrowserSession;

    async fn start(&self, headless: bool) -> Result<BrowserSession, SessionError> {
        BrowserSession::start(&self.config, headless).await
    }
}

#[async_trait]
impl MessagingSession for BrowserSession {
    async fn close(&mut self) {
        BrowserSession::close(self).await;
    }
}
