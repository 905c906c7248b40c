//! Headless Chrome rendering of a page's final markup
//!
//! Each render launches its own Chrome process with a private profile
//! directory, navigates once, waits for the requested page-ready condition
//! and serializes the document. The browser is closed on every exit path
//! once it has been launched.

use crate::{create_browser_config, session_user_data_dir, PageReadyCondition, RenderError, WebSizeOptions};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, NavigateParams, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

const BROWSER_EXIT_GRACE: Duration = Duration::from_secs(5);
const PROFILE_RELEASE_DELAY: Duration = Duration::from_millis(500);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Load `url` and return the document markup once `wait_until` holds.
    async fn render(&self, url: &str, wait_until: PageReadyCondition) -> Result<String, RenderError>;
}

/// One isolated browser context, owned by a single render.
#[async_trait]
pub trait RenderSession: Send {
    async fn navigate(&mut self, url: &str, wait_until: PageReadyCondition) -> Result<(), RenderError>;

    async fn content(&mut self) -> Result<String, RenderError>;

    /// Release the context. Called exactly once per launched session.
    async fn close(self) -> Result<(), RenderError>;
}

#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: RenderSession;

    async fn launch(&self) -> Result<Self::Session, RenderError>;
}

/// [`RenderEngine`] that runs every render in a freshly launched session
pub struct BrowserRenderer<L = ChromeLauncher> {
    launcher: L,
    render_timeout: Option<Duration>,
}

impl BrowserRenderer<ChromeLauncher> {
    pub fn new(options: &WebSizeOptions) -> Self {
        Self::with_launcher(ChromeLauncher::new(options), options.render_timeout)
    }
}

impl<L: SessionLauncher> BrowserRenderer<L> {
    pub fn with_launcher(launcher: L, render_timeout: Option<Duration>) -> Self {
        Self {
            launcher,
            render_timeout,
        }
    }

    async fn render_in_session(
        &self,
        session: &mut L::Session,
        url: &str,
        wait_until: PageReadyCondition,
    ) -> Result<String, RenderError> {
        let rendering = async {
            session.navigate(url, wait_until).await?;
            session.content().await
        };

        match self.render_timeout {
            Some(limit) => timeout(limit, rendering)
                .await
                .map_err(|_| RenderError::Timeout(limit))?,
            None => rendering.await,
        }
    }
}

#[async_trait]
impl<L: SessionLauncher> RenderEngine for BrowserRenderer<L> {
    async fn render(&self, url: &str, wait_until: PageReadyCondition) -> Result<String, RenderError> {
        let mut session = self.launcher.launch().await?;
        debug!("Rendering {} (wait until {})", url, wait_until);

        let rendered = self.render_in_session(&mut session, url, wait_until).await;
        let closed = session.close().await;

        match (rendered, closed) {
            (Ok(content), Ok(())) => Ok(content),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                warn!("Failed to close browser after render error: {}", close_err);
                Err(err)
            }
        }
    }
}

/// Launches a dedicated headless Chrome per session
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    options: WebSizeOptions,
}

impl ChromeLauncher {
    pub fn new(options: &WebSizeOptions) -> Self {
        Self {
            options: options.clone(),
        }
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self) -> Result<ChromeSession, RenderError> {
        let user_data_dir = session_user_data_dir();
        let config = create_browser_config(&self.options, &user_data_dir)
            .map_err(RenderError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::LaunchFailed(e.to_string()))?;

        // The handler drives the DevTools connection and must be polled for
        // the browser to make progress
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                    break;
                }
            }
        });

        debug!("Browser launched with profile {}", user_data_dir.display());

        Ok(ChromeSession {
            browser,
            page: None,
            handler: handler_task,
            user_data_dir,
            closed: false,
        })
    }
}

pub struct ChromeSession {
    browser: Browser,
    page: Option<Page>,
    handler: JoinHandle<()>,
    user_data_dir: PathBuf,
    closed: bool,
}

#[async_trait]
impl RenderSession for ChromeSession {
    async fn navigate(&mut self, url: &str, wait_until: PageReadyCondition) -> Result<(), RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::LaunchFailed(e.to_string()))?;
        let page = self.page.insert(page);

        page.execute(SetLifecycleEventsEnabledParams::new(true)).await?;
        let mut lifecycle = page.event_listener::<EventLifecycleEvent>().await?;

        let navigation = page.execute(NavigateParams::new(url)).await?.result;
        if let Some(error_text) = navigation.error_text {
            return Err(RenderError::NavigationFailed(format!("{url}: {error_text}")));
        }

        let Some(event_name) = wait_until.lifecycle_event() else {
            return Ok(());
        };

        while let Some(event) = lifecycle.next().await {
            let same_document = navigation
                .loader_id
                .as_ref()
                .map_or(true, |loader_id| *loader_id == event.loader_id);

            if event.name == event_name && event.frame_id == navigation.frame_id && same_document {
                debug!("{} reached '{}'", url, event_name);
                return Ok(());
            }
        }

        Err(RenderError::NavigationFailed(format!(
            "{url}: browser disconnected before '{event_name}'"
        )))
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| RenderError::ContentFailed("no page was opened".to_string()))?;

        page.content()
            .await
            .map_err(|e| RenderError::ContentFailed(e.to_string()))
    }

    async fn close(mut self) -> Result<(), RenderError> {
        self.closed = true;
        self.page = None;

        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| RenderError::CloseFailed(e.to_string()));

        if closed.is_err() || timeout(BROWSER_EXIT_GRACE, self.browser.wait()).await.is_err() {
            warn!("Browser did not exit cleanly, killing process");
            let _ = self.browser.kill().await;
        }

        self.handler.abort();

        if let Err(e) = tokio::fs::remove_dir_all(&self.user_data_dir).await {
            debug!("Could not remove profile {}: {}", self.user_data_dir.display(), e);
        }

        closed
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        // Dropped without close (cancelled render). The child has to exit
        // before its profile can be removed
        warn!("Render session dropped without close, releasing browser");
        self.page = None;
        if let Some(child) = self.browser.get_mut_child() {
            let _ = child.as_mut_inner().start_kill();
        }
        self.handler.abort();

        remove_profile_later(self.user_data_dir.clone(), PROFILE_RELEASE_DELAY);
    }
}

/// Removes a profile directory once the killed browser has had `delay` to
/// exit. Falls back to immediate removal outside a runtime.
fn remove_profile_later(user_data_dir: PathBuf, delay: Duration) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(e) = tokio::fs::remove_dir_all(&user_data_dir).await {
                    debug!("Could not remove profile {}: {}", user_data_dir.display(), e);
                }
            });
        }
        Err(_) => {
            let _ = std::fs::remove_dir_all(&user_data_dir);
        }
    }
}
