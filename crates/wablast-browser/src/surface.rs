//! The compose surface
//!
//! The minimal set of page interactions the delivery pipeline needs,
//! abstracted from the automation backend so the pipeline never touches a
//! DOM selector. [`BrowserSession`] is the live implementation; tests drive
//! the pipeline with scripted ones.

use async_trait::async_trait;
use headless_chrome::Tab;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use wablast_core::DeliveryError;

use crate::session::BrowserSession;

/// Message compose box (doubles as the caption box on the attachment preview)
pub const COMPOSER_SELECTOR: &str = "div[contenteditable=\"true\"][data-tab=\"10\"]";

/// Toolbar button that opens the attach menu
const ATTACH_BUTTON_SELECTOR: &str = "div[title=\"Attach\"]";

/// Hidden file input behind the attach menu
const FILE_INPUT_SELECTOR: &str = "input[type=\"file\"]";

/// Confirm control on the attachment preview
const SEND_ICON_SELECTOR: &str = "span[data-icon=\"send\"]";

/// Page capabilities the delivery engine drives
///
/// One method per interaction, all fallible, all bounded: the engine decides
/// ordering and timeouts, the implementation decides selectors and transport.
#[async_trait]
pub trait ComposeSurface: Send + Sync {
    /// Open `url` and wait for the navigation to settle
    async fn navigate(&self, url: &str) -> Result<(), DeliveryError>;

    /// Wait until the message composer is interactive
    async fn wait_for_ready(&self, timeout: Duration) -> Result<(), DeliveryError>;

    /// Put `text` into the composer (or the preview's caption box)
    async fn fill_compose(&self, text: &str) -> Result<(), DeliveryError>;

    /// Submit the composed message with the keyboard
    async fn submit(&self) -> Result<(), DeliveryError>;

    /// Open the attach menu and hand `path` to the file input
    async fn attach_file(&self, path: &Path) -> Result<(), DeliveryError>;

    /// Wait until the attachment preview shows its confirm control
    async fn wait_for_attach_preview(&self, timeout: Duration) -> Result<(), DeliveryError>;

    /// Activate the preview's confirm control
    async fn confirm_attachment(&self) -> Result<(), DeliveryError>;
}

fn require_tab(session: &BrowserSession) -> Result<&Arc<Tab>, DeliveryError> {
    session
        .live_tab()
        .ok_or_else(|| DeliveryError::NavigationFailed("session is closed".to_string()))
}

#[async_trait]
impl ComposeSurface for BrowserSession {
    async fn navigate(&self, url: &str) -> Result<(), DeliveryError> {
        let tab = require_tab(self)?;
        debug!("Navigating to {}", url);

        tab.navigate_to(url)
            .map_err(|e| DeliveryError::NavigationFailed(format!("{}: {}", url, e)))?;
        tab.wait_until_navigated()
            .map_err(|e| DeliveryError::NavigationFailed(format!("{}: {}", url, e)))?;
        Ok(())
    }

    async fn wait_for_ready(&self, timeout: Duration) -> Result<(), DeliveryError> {
        let tab = require_tab(self)?;

        tab.wait_for_element_with_custom_timeout(COMPOSER_SELECTOR, timeout)
            .map_err(|_| {
                DeliveryError::ElementTimeout(format!(
                    "composer not interactive within {}s",
                    timeout.as_secs()
                ))
            })?;
        Ok(())
    }

    async fn fill_compose(&self, text: &str) -> Result<(), DeliveryError> {
        let tab = require_tab(self)?;

        // Click to focus; the deep link leaves the composer empty, so typing
        // is equivalent to filling.
        let composer = tab
            .find_element(COMPOSER_SELECTOR)
            .map_err(|e| DeliveryError::ElementTimeout(format!("composer: {}", e)))?;
        composer
            .click()
            .map_err(|e| DeliveryError::ElementTimeout(format!("composer focus: {}", e)))?;
        tab.type_str(text)
            .map_err(|e| DeliveryError::ElementTimeout(format!("composer input: {}", e)))?;
        Ok(())
    }

    async fn submit(&self) -> Result<(), DeliveryError> {
        let tab = require_tab(self)?;

        tab.press_key("Enter")
            .map_err(|e| DeliveryError::ElementTimeout(format!("submit key: {}", e)))?;
        Ok(())
    }

    async fn attach_file(&self, path: &Path) -> Result<(), DeliveryError> {
        let tab = require_tab(self)?;
        debug!("Attaching {}", path.display());

        let attach = tab
            .wait_for_element(ATTACH_BUTTON_SELECTOR)
            .map_err(|e| DeliveryError::AttachmentFailed(format!("attach button: {}", e)))?;
        attach
            .click()
            .map_err(|e| DeliveryError::AttachmentFailed(format!("attach menu: {}", e)))?;

        let input = tab
            .wait_for_element(FILE_INPUT_SELECTOR)
            .map_err(|e| DeliveryError::AttachmentFailed(format!("file input: {}", e)))?;

        let path_str = path.to_str().ok_or_else(|| {
            DeliveryError::AttachmentFailed(format!("non-UTF-8 media path: {}", path.display()))
        })?;
        input
            .set_input_files(&[path_str])
            .map_err(|e| DeliveryError::AttachmentFailed(format!("file selection: {}", e)))?;
        Ok(())
    }

    async fn wait_for_attach_preview(&self, timeout: Duration) -> Result<(), DeliveryError> {
        let tab = require_tab(self)?;

        tab.wait_for_element_with_custom_timeout(SEND_ICON_SELECTOR, timeout)
            .map_err(|_| {
                DeliveryError::AttachmentFailed(format!(
                    "preview confirm control not shown within {}s",
                    timeout.as_secs()
                ))
            })?;
        Ok(())
    }

    async fn confirm_attachment(&self) -> Result<(), DeliveryError> {
        let tab = require_tab(self)?;

        let send = tab
            .find_element(SEND_ICON_SELECTOR)
            .map_err(|e| DeliveryError::AttachmentFailed(format!("confirm control: {}", e)))?;
        send.click()
            .map_err(|e| DeliveryError::AttachmentFailed(format!("confirm click: {}", e)))?;
        Ok(())
    }
}
