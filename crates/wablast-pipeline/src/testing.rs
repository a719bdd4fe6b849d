//! Scripted session plumbing for pipeline tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wablast_browser::ComposeSurface;
use wablast_core::config::AppConfig;
use wablast_core::{DeliveryError, SessionError};

use crate::bulk::{MessagingSession, SessionProvider};

/// Default config with pacing zeroed so tests never sleep
pub(crate) fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.delays.min_secs = 0;
    config.delays.max_secs = 0;
    config
}

/// Records every interaction and fails `wait_for_ready` according to `plan`
#[derive(Default)]
pub(crate) struct ScriptedSurface {
    /// Per-attempt readiness; `false` simulates a composer timeout. An
    /// exhausted plan means every further attempt succeeds.
    pub plan: Mutex<VecDeque<bool>>,
    pub navigations: Mutex<Vec<String>>,
    pub filled: Mutex<Vec<String>>,
    pub attached: Mutex<Vec<PathBuf>>,
    pub submitted: AtomicUsize,
    pub confirmed: AtomicUsize,
}

impl ScriptedSurface {
    pub fn with_plan(plan: impl IntoIterator<Item = bool>) -> Arc<Self> {
        let surface = Self::default();
        surface.plan.lock().unwrap().extend(plan);
        Arc::new(surface)
    }
}

#[async_trait]
impl ComposeSurface for ScriptedSurface {
    async fn navigate(&self, url: &str) -> Result<(), DeliveryError> {
        self.navigations.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn wait_for_ready(&self, _timeout: Duration) -> Result<(), DeliveryError> {
        if self.plan.lock().unwrap().pop_front().unwrap_or(true) {
            Ok(())
        } else {
            Err(DeliveryError::ElementTimeout("scripted timeout".to_string()))
        }
    }

    async fn fill_compose(&self, text: &str) -> Result<(), DeliveryError> {
        self.filled.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn submit(&self) -> Result<(), DeliveryError> {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn attach_file(&self, path: &Path) -> Result<(), DeliveryError> {
        self.attached.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    async fn wait_for_attach_preview(&self, _timeout: Duration) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn confirm_attachment(&self) -> Result<(), DeliveryError> {
        self.confirmed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Session handing every interaction to a shared [`ScriptedSurface`]
pub(crate) struct ScriptedSession {
    surface: Arc<ScriptedSurface>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl ComposeSurface for ScriptedSession {
    async fn navigate(&self, url: &str) -> Result<(), DeliveryError> {
        self.surface.navigate(url).await
    }

    async fn wait_for_ready(&self, timeout: Duration) -> Result<(), DeliveryError> {
        self.surface.wait_for_ready(timeout).await
    }

    async fn fill_compose(&self, text: &str) -> Result<(), DeliveryError> {
        self.surface.fill_compose(text).await
    }

    async fn submit(&self) -> Result<(), DeliveryError> {
        self.surface.submit().await
    }

    async fn attach_file(&self, path: &Path) -> Result<(), DeliveryError> {
        self.surface.attach_file(path).await
    }

    async fn wait_for_attach_preview(&self, timeout: Duration) -> Result<(), DeliveryError> {
        self.surface.wait_for_attach_preview(timeout).await
    }

    async fn confirm_attachment(&self) -> Result<(), DeliveryError> {
        self.surface.confirm_attachment().await
    }
}

#[async_trait]
impl MessagingSession for ScriptedSession {
    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Provider yielding scripted sessions, or failing outright
pub(crate) struct ScriptedProvider {
    pub fail_start: bool,
    pub surface: Arc<ScriptedSurface>,
    pub closed: Arc<AtomicBool>,
    pub starts: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn ok(surface: Arc<ScriptedSurface>) -> Self {
        Self {
            fail_start: false,
            surface,
            closed: Arc::new(AtomicBool::new(false)),
            starts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::ok(Arc::new(ScriptedSurface::default()))
        }
    }
}

#[async_trait]
impl SessionProvider for ScriptedProvider {
    type Session = ScriptedSession;

    async fn start(&self, _headless: bool) -> Result<ScriptedSession, SessionError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(SessionError::LoginTimeout(60));
        }
        Ok(ScriptedSession {
            surface: Arc::clone(&self.surface),
            closed: Arc::clone(&self.closed),
        })
    }
}
