//! WhatsApp Web session lifecycle using the Chrome DevTools Protocol
//!
//! One session per run: `Uninitialized → Launching → AwaitingAuth → Ready →
//! Closed`. The browser is bound to a persistent profile directory so the
//! authenticated state survives across runs; a driver crash mid-run shows up
//! lazily as a failed operation on the next delivery, not as a separate
//! signal.

use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use wablast_core::config::AppConfig;
use wablast_core::{SessionError, SessionPhase};

/// Authenticated-state marker: present once the chat list has rendered
const CHAT_LIST_SELECTOR: &str = "div[aria-label=\"Chat list\"]";

/// Launch args that keep WhatsApp from flagging the automated profile
const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-setuid-sandbox",
];

/// Scheduled runs can leave the CDP connection quiet for hours; the default
/// idle timeout would tear the browser down underneath us.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Active WhatsApp Web session bound to a persistent profile
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime; dropping it
    /// kills the child process and releases the profile lock)
    browser: Option<Browser>,
    /// The single tab every delivery goes through
    tab: Option<Arc<Tab>>,
    phase: SessionPhase,
}

impl BrowserSession {
    /// Launch the browser against the persistent profile and block until the
    /// session is authenticated
    ///
    /// Navigates to the WhatsApp Web root and waits up to the configured
    /// login timeout for the chat list to appear. On a fresh profile this is
    /// the window in which the user scans the QR code, so first runs should
    /// pass `headless: false`.
    ///
    /// On any error the partially-started browser is dropped, which releases
    /// the profile lock; no explicit cleanup is needed on the failure path.
    pub async fn start(config: &AppConfig, headless: bool) -> Result<Self, SessionError> {
        info!(
            "Launching browser (headless: {}, profile: {})",
            headless,
            config.profile_dir.display()
        );

        std::fs::create_dir_all(&config.profile_dir).map_err(|e| {
            SessionError::LaunchFailed(format!(
                "cannot create profile dir {}: {}",
                config.profile_dir.display(),
                e
            ))
        })?;

        let launch_options = LaunchOptions::default_builder()
            .headless(headless)
            .sandbox(false)
            .user_data_dir(Some(config.profile_dir.clone()))
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .args(LAUNCH_ARGS.iter().map(OsStr::new).collect())
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| SessionError::LaunchFailed(format!("invalid launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| SessionError::LaunchFailed(format!("failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| SessionError::LaunchFailed(format!("failed to create tab: {}", e)))?;

        debug!("Browser up, navigating to {}", config.whatsapp_url);
        tab.navigate_to(&config.whatsapp_url).map_err(|e| {
            SessionError::LaunchFailed(format!("failed to open {}: {}", config.whatsapp_url, e))
        })?;
        tab.wait_until_navigated().map_err(|e| {
            SessionError::LaunchFailed(format!("navigation to {} failed: {}", config.whatsapp_url, e))
        })?;

        info!(
            "Waiting for WhatsApp login (scan the QR code if prompted, timeout: {}s)",
            config.timeouts.login_secs
        );
        tab.wait_for_element_with_custom_timeout(CHAT_LIST_SELECTOR, config.login_timeout())
            .map_err(|_| SessionError::LoginTimeout(config.timeouts.login_secs))?;

        info!("WhatsApp session authenticated");
        Ok(Self {
            browser: Some(browser),
            tab: Some(tab),
            phase: SessionPhase::Ready,
        })
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The live tab, if the session is still open
    pub(crate) fn live_tab(&self) -> Option<&Arc<Tab>> {
        match self.phase {
            SessionPhase::Ready => self.tab.as_ref(),
            _ => None,
        }
    }

    /// Close the session, releasing the browser and the profile lock
    ///
    /// Idempotent: closing an already-closed session does nothing.
    pub async fn close(&mut self) {
        if self.phase == SessionPhase::Closed {
            return;
        }
        info!("Closing browser session");
        self.tab = None;
        self.browser = None;
        self.phase = SessionPhase::Closed;
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("BrowserSession dropped, browser will be cleaned up");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_args_stay_clear_of_automation_tells() {
        assert!(LAUNCH_ARGS.contains(&"--disable-blink-features=AutomationControlled"));
    }

    #[test]
    fn closed_session_has_no_live_tab() {
        let session = BrowserSession {
            browser: None,
            tab: None,
            phase: SessionPhase::Closed,
        };
        assert!(session.live_tab().is_none());
        assert_eq!(session.phase(), SessionPhase::Closed);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let mut session = BrowserSession {
            browser: None,
            tab: None,
            phase: SessionPhase::Ready,
        };
        session.close().await;
        session.close().await;
        assert_eq!(session.phase(), SessionPhase::Closed);
    }
}
