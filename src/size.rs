//! Byte-size conversions for measured content.

const BYTES_PER_KILOBYTE: f64 = 1024.0;
const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Size of `content` in kilobytes, measured on its UTF-8 encoding.
///
/// ```rust
/// assert_eq!(websize::calculate_kilobytes(&"a".repeat(2048)), 2.0);
/// assert_eq!(websize::calculate_kilobytes(""), 0.0);
/// ```
pub fn calculate_kilobytes(content: &str) -> f64 {
    content.len() as f64 / BYTES_PER_KILOBYTE
}

pub fn bytes_to_megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MEGABYTE
}
