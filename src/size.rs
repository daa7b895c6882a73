//! Human-readable byte counts.

use crate::progress::round_half_up;

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count with the largest base-1024 unit whose magnitude is at least 1.
///
/// Display only; decisions always use raw byte counts.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut magnitude = bytes as f64;
    while magnitude >= 1024.0 && unit < UNITS.len() - 1 {
        magnitude /= 1024.0;
        unit += 1;
    }

    // {:.2} alone rounds exact ties to even
    let magnitude = round_half_up(magnitude * 100.0) / 100.0;
    format!("{:.2} {}", magnitude, UNITS[unit])
}
