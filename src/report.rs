//! Console summary of a finished measurement

use crate::MeasurementResult;
use std::io::Write;
use tracing::warn;

const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Formats a measurement as a human-readable block.
///
/// ```text
/// 📊 WebSize Results:
/// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
/// 🌐 URL: https://example.com
/// 📈 Measurements:
///   • Raw HTML Size: 15.50 KB
///   • Rendered Size: 25.70 KB
///   • Network Transfer: 0.35 MB
///   • Render Time: 1.20s
/// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
/// ```
pub fn format_results(url: &str, result: &MeasurementResult) -> String {
    let mut lines = vec![
        "📊 WebSize Results:".to_string(),
        DIVIDER.to_string(),
        format!("🌐 URL: {url}"),
        "📈 Measurements:".to_string(),
        format!("  • Raw HTML Size: {:.2} KB", result.raw_size_kb),
        format!("  • Rendered Size: {:.2} KB", result.rendered_size_kb),
    ];

    // A declared zero-length transfer is not worth a line
    if let Some(transfer_size_mb) = result.transfer_size_mb.filter(|mb| *mb > 0.0) {
        lines.push(format!("  • Network Transfer: {transfer_size_mb:.2} MB"));
    }

    lines.push(format!("  • Render Time: {:.2}s", result.render_time_seconds));
    lines.push(DIVIDER.to_string());

    lines.join("\n")
}

/// Prints the summary to stdout. Output errors are logged, never returned.
pub fn log_results(url: &str, result: &MeasurementResult) {
    let summary = format_results(url, result);
    let mut stdout = std::io::stdout().lock();

    if let Err(e) = writeln!(stdout, "\n{summary}\n") {
        warn!("Failed to print results for {}: {}", url, e);
    }
}
