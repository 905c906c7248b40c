//! Configuration management with serde serialization/deserialization
//!
//! This module holds the options a [`crate::WebSize`] is built from, the
//! page-ready conditions understood by the render engine, and the Chrome
//! launch arguments derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Desktop Chrome identification string sent when no user agent is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Options shared by every measurement issued from one [`crate::WebSize`]
///
/// # Examples
///
/// ```rust
/// use websize::{PageReadyCondition, WebSizeOptions};
///
/// // Use default options
/// let options = WebSizeOptions::default();
///
/// // Wait for the load event only and print a summary after each run
/// let options = WebSizeOptions {
///     wait_until: PageReadyCondition::Load,
///     verbose: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WebSizeOptions {
    /// User-Agent presented by both the HTTP fetch and the browser
    pub user_agent: String,

    /// When the rendered page is considered ready (default: networkidle2)
    pub wait_until: PageReadyCondition,

    /// Print a formatted summary after each measurement (default: false)
    pub verbose: bool,

    /// Path to Chrome/Chromium executable (default: auto-detect)
    pub chrome_path: Option<String>,

    /// Upper bound on navigation plus page-ready wait (default: 30 seconds)
    ///
    /// `None` leaves the wait unbounded apart from the per-command timeout of
    /// the DevTools connection.
    pub render_timeout: Option<Duration>,

    /// Timeout applied to the raw HTTP fetch (default: none)
    pub fetch_timeout: Option<Duration>,
}

impl Default for WebSizeOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            wait_until: PageReadyCondition::default(),
            verbose: false,
            chrome_path: None,
            render_timeout: Some(Duration::from_secs(30)),
            fetch_timeout: None,
        }
    }
}

/// Navigation-completion criterion for the render engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, clap::ValueEnum)]
pub enum PageReadyCondition {
    /// Resolve when the load event fires
    #[serde(rename = "load")]
    #[value(name = "load")]
    Load,
    /// Resolve as soon as navigation is issued
    #[serde(rename = "none")]
    #[value(name = "none")]
    None,
    /// No network connections for at least 500ms
    #[serde(rename = "networkidle0", alias = "network-idle-strict")]
    #[value(name = "networkidle0", alias = "network-idle-strict")]
    NetworkIdleStrict,
    /// No more than 2 network connections for at least 500ms
    #[serde(rename = "networkidle2", alias = "network-idle-relaxed")]
    #[value(name = "networkidle2", alias = "network-idle-relaxed")]
    NetworkIdleRelaxed,
}

impl PageReadyCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageReadyCondition::Load => "load",
            PageReadyCondition::None => "none",
            PageReadyCondition::NetworkIdleStrict => "networkidle0",
            PageReadyCondition::NetworkIdleRelaxed => "networkidle2",
        }
    }

    /// Chrome `Page.lifecycleEvent` name that satisfies this condition.
    ///
    /// `None` has no event to wait for.
    pub fn lifecycle_event(&self) -> Option<&'static str> {
        match self {
            PageReadyCondition::Load => Some("load"),
            PageReadyCondition::None => None,
            PageReadyCondition::NetworkIdleStrict => Some("networkIdle"),
            PageReadyCondition::NetworkIdleRelaxed => Some("networkAlmostIdle"),
        }
    }
}

impl Default for PageReadyCondition {
    fn default() -> Self {
        Self::NetworkIdleRelaxed
    }
}

impl fmt::Display for PageReadyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageReadyCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "load" => Ok(PageReadyCondition::Load),
            "none" => Ok(PageReadyCondition::None),
            "networkidle0" | "network-idle-strict" => Ok(PageReadyCondition::NetworkIdleStrict),
            "networkidle2" | "network-idle-relaxed" => Ok(PageReadyCondition::NetworkIdleRelaxed),
            other => Err(format!("unknown page-ready condition: {other}")),
        }
    }
}

/// Generate Chrome command-line arguments for a render session
///
/// # Examples
///
/// ```rust
/// use websize::{get_chrome_args, WebSizeOptions};
///
/// let options = WebSizeOptions::default();
/// let args = get_chrome_args(&options);
/// assert!(args.contains(&"--headless".to_string()));
/// ```
pub fn get_chrome_args(options: &WebSizeOptions) -> Vec<String> {
    vec![
        "--headless".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-background-timer-throttling".to_string(),
        "--disable-backgrounding-occluded-windows".to_string(),
        "--disable-renderer-backgrounding".to_string(),
        "--disable-features=TranslateUI".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        "--disable-process-singleton-dialog".to_string(),
        format!("--user-agent={}", options.user_agent),
    ]
}

/// Unique temporary profile directory for one browser launch.
pub fn session_user_data_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "websize-chromium-{}-{}",
        std::process::id(),
        uuid::Uuid::new_v4()
    ))
}

/// Browser configuration for one isolated session.
///
/// Every session gets its own profile directory so concurrent renders never
/// share browser state.
pub fn create_browser_config(
    options: &WebSizeOptions,
    user_data_dir: &std::path::Path,
) -> Result<chromiumoxide::browser::BrowserConfig, String> {
    use chromiumoxide::browser::BrowserConfig;

    let mut builder = BrowserConfig::builder()
        .user_data_dir(user_data_dir)
        .args(get_chrome_args(options));

    if let Some(chrome_path) = &options.chrome_path {
        builder = builder.chrome_executable(chrome_path);
    }

    builder.build()
}
