//! # WebSize
//!
//! Measures how big a webpage is before and after its scripts run, and how
//! long that takes. A measurement is two sequential steps:
//!
//! 1. a plain HTTP GET of the URL (raw HTML size, declared transfer size)
//! 2. a headless Chrome render of the same URL (serialized DOM size)
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `raw_size_kb` | UTF-8 size of the response body / 1024 |
//! | `rendered_size_kb` | UTF-8 size of the rendered document / 1024 |
//! | `render_time_seconds` | Wall-clock time of fetch + render |
//! | `transfer_size_mb` | `Content-Length` / 1,048,576, `None` when not declared |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use websize::{WebSize, WebSizeOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let web_size = WebSize::new(WebSizeOptions::default())?;
//!
//!     let result = web_size.measure("https://example.com").await?;
//!     println!("Raw: {:.2} KB, rendered: {:.2} KB", result.raw_size_kb, result.rendered_size_kb);
//!
//!     // One-off measurement
//!     let quick = websize::measure_once("https://example.com", None).await?;
//!     println!("{quick:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! websize measure https://example.com https://mozilla.org --wait-until load --report
//! websize measure --input urls.txt --json
//! ```

/// Options and Chrome launch settings
pub mod config;

/// Error types for the fetch and render steps
pub mod error;

/// Raw HTML retrieval over HTTP
pub mod fetcher;

/// Headless browser rendering
pub mod renderer;

/// Measurement orchestration
pub mod websize;

/// Console summary of results
pub mod report;

/// Kilobyte and megabyte conversions
pub mod size;

/// Command-line interface implementation
pub mod cli;

/// Utility functions and helpers
pub mod utils;

#[cfg(test)]
mod tests;

pub use cli::*;
pub use config::*;
pub use error::*;
pub use fetcher::*;
pub use renderer::*;
pub use size::*;
pub use utils::*;
pub use websize::*;
