use std::time::Duration;
use thiserror::Error;

/// Failures of the plain HTTP fetch step.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("HTTP client setup failed: {0}")]
    ClientBuild(String),
}

/// Failures of the headless browser render step.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Navigation timeout after {0:?}")]
    Timeout(Duration),

    #[error("Content extraction failed: {0}")]
    ContentFailed(String),

    #[error("Browser close failed: {0}")]
    CloseFailed(String),
}

/// Which half of a measurement produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementStage {
    Fetch,
    Render,
}

/// Error returned by [`crate::WebSize::measure`].
///
/// Fetch and render failures share the same message prefix and keep the
/// underlying error as their source.
#[derive(Debug, Clone, Error)]
pub enum WebSizeError {
    #[error("Failed to calculate page size: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to calculate page size: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl WebSizeError {
    pub fn stage(&self) -> Option<MeasurementStage> {
        match self {
            WebSizeError::Fetch(_) => Some(MeasurementStage::Fetch),
            WebSizeError::Render(_) => Some(MeasurementStage::Render),
            WebSizeError::Configuration(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WebSizeError::Render(RenderError::Timeout(_)))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_body() || err.is_decode() {
            FetchError::Body(err.to_string())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

impl From<chromiumoxide::error::CdpError> for RenderError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        RenderError::NavigationFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_message() {
        let err = WebSizeError::from(FetchError::Request("Network error".to_string()));
        let message = err.to_string();
        assert!(message.starts_with("Failed to calculate page size"));
        assert!(message.contains("Network error"));
        assert_eq!(err.stage(), Some(MeasurementStage::Fetch));
    }

    #[test]
    fn test_render_failure_message() {
        let err = WebSizeError::from(RenderError::Timeout(Duration::from_secs(30)));
        assert!(err.to_string().starts_with("Failed to calculate page size"));
        assert!(err.to_string().contains("timeout"));
        assert_eq!(err.stage(), Some(MeasurementStage::Render));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_configuration_has_no_stage() {
        let err = WebSizeError::Configuration("bad".to_string());
        assert!(err.stage().is_none());
        assert!(!err.is_timeout());
    }
}
