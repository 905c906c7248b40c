//! Measurement orchestration
//!
//! [`WebSize`] runs the raw fetch and the browser render back to back for a
//! URL and turns both outputs into a [`MeasurementResult`].

use crate::{
    calculate_kilobytes, report, BrowserRenderer, ContentFetcher, HttpFetcher, RenderEngine,
    WebSizeError, WebSizeOptions,
};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// Sizes and timing of one measured page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasurementResult {
    /// Raw HTML size in kilobytes
    #[serde(rename = "rawSizeKB")]
    pub raw_size_kb: f64,
    /// Rendered document size in kilobytes, after script execution
    #[serde(rename = "renderedSizeKB")]
    pub rendered_size_kb: f64,
    /// Wall-clock time of the whole measurement (fetch and render) in seconds
    #[serde(rename = "renderTimeSeconds")]
    pub render_time_seconds: f64,
    /// Declared transfer size in megabytes; `None` when the server sent no
    /// `Content-Length`
    #[serde(rename = "transferSizeMB", skip_serializing_if = "Option::is_none")]
    pub transfer_size_mb: Option<f64>,
}

/// Page size measurer with fixed options
///
/// # Examples
///
/// ```rust,no_run
/// use websize::{PageReadyCondition, WebSize, WebSizeOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let web_size = WebSize::new(WebSizeOptions {
///         wait_until: PageReadyCondition::Load,
///         ..Default::default()
///     })?;
///
///     let result = web_size.measure("https://example.com").await?;
///     println!("Rendered size: {:.2} KB", result.rendered_size_kb);
///     Ok(())
/// }
/// ```
pub struct WebSize<F = HttpFetcher, R = BrowserRenderer> {
    options: WebSizeOptions,
    fetcher: F,
    renderer: R,
}

impl WebSize {
    pub fn new(options: WebSizeOptions) -> Result<Self, WebSizeError> {
        let fetcher = HttpFetcher::new(options.user_agent.clone(), options.fetch_timeout)
            .map_err(|e| WebSizeError::Configuration(e.to_string()))?;
        let renderer = BrowserRenderer::new(&options);

        Ok(Self::with_components(options, fetcher, renderer))
    }
}

impl<F: ContentFetcher, R: RenderEngine> WebSize<F, R> {
    pub fn with_components(options: WebSizeOptions, fetcher: F, renderer: R) -> Self {
        Self {
            options,
            fetcher,
            renderer,
        }
    }

    pub fn options(&self) -> &WebSizeOptions {
        &self.options
    }

    /// Fetches and renders `url`, in that order, and reports their sizes.
    ///
    /// A fetch failure aborts before any browser is launched. Either failure
    /// is returned as a [`WebSizeError`]; there are no partial results.
    pub async fn measure(&self, url: &str) -> Result<MeasurementResult, WebSizeError> {
        let start_time = Instant::now();
        debug!("Measuring {}", url);

        let page = self.fetcher.fetch(url).await?;
        let raw_size_kb = calculate_kilobytes(&page.raw_html);

        let rendered = self.renderer.render(url, self.options.wait_until).await?;
        let rendered_size_kb = calculate_kilobytes(&rendered);

        let result = MeasurementResult {
            raw_size_kb,
            rendered_size_kb,
            render_time_seconds: start_time.elapsed().as_secs_f64(),
            transfer_size_mb: page.transfer_size_mb,
        };

        info!(
            "Measured {}: raw {:.2} KB, rendered {:.2} KB in {:.2}s",
            url, result.raw_size_kb, result.rendered_size_kb, result.render_time_seconds
        );

        if self.options.verbose {
            report::log_results(url, &result);
        }

        Ok(result)
    }
}

/// One-off measurement with a transient [`WebSize`].
///
/// ```rust,no_run
/// # async fn run() -> Result<(), websize::WebSizeError> {
/// let result = websize::measure_once("https://example.com", None).await?;
/// println!("{:?}", result);
/// # Ok(())
/// # }
/// ```
pub async fn measure_once(
    url: &str,
    options: Option<WebSizeOptions>,
) -> Result<MeasurementResult, WebSizeError> {
    WebSize::new(options.unwrap_or_default())?.measure(url).await
}
