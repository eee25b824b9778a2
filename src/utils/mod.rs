// Mon Oct 19 2026 - Alex

pub mod logging;

pub use logging::LoggingUtils;

use std::time::Duration;

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();

    if total_secs < 0.001 {
        format!("{}µs", duration.as_micros())
    } else if total_secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0).floor();
        let secs = total_secs % 60.0;
        format!("{:.0}m {:.1}s", mins, secs)
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Lowercase hex with no separators, as stored in result metadata.
pub fn hex_string(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn hex_string_spaced(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02X}", b)).collect::<Vec<_>>().join(" ")
}

/// Accepts `0x1F00`, `1F00h` or plain decimal.
pub fn parse_offset(s: &str) -> Option<usize> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = s.strip_suffix('h').or_else(|| s.strip_suffix('H')) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

/// Rounds `value` up to a multiple of `alignment`. Alignment need not be a
/// power of two; zero and one leave the value unchanged.
pub fn align_up(value: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return value;
    }
    match value % alignment {
        0 => value,
        rem => value.saturating_add(alignment - rem),
    }
}

pub fn is_aligned(value: usize, alignment: usize) -> bool {
    alignment <= 1 || value % alignment == 0
}

/// Printable rendering of matched bytes: valid UTF-8 without control
/// characters is returned as-is, anything else becomes `\xNN` escapes
/// for the non-printable bytes.
pub fn escape_bytes(data: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(data) {
        if text.chars().all(|c| !c.is_control() || c.is_whitespace()) {
            return text.to_string();
        }
    }

    let mut out = String::with_capacity(data.len() * 2);
    for &b in data {
        if b.is_ascii_graphic() || b == b' ' {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{:02x}", b));
        }
    }
    out
}

pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up_non_power_of_two() {
        assert_eq!(align_up(0, 3), 0);
        assert_eq!(align_up(1, 3), 3);
        assert_eq!(align_up(7, 4), 8);
        assert_eq!(align_up(8, 4), 8);
        assert_eq!(align_up(5, 1), 5);
        assert_eq!(align_up(5, 0), 5);
        assert_eq!(align_up(usize::MAX, 2), usize::MAX);
    }

    #[test]
    fn test_escape_bytes() {
        assert_eq!(escape_bytes(b"Kirby Dream"), "Kirby Dream");
        assert_eq!(escape_bytes(&[b'A', 0x00, 0xFF]), "A\\x00\\xff");
        assert_eq!(escape_bytes(b"tab\there"), "tab\there");
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("0xC000"), Some(0xC000));
        assert_eq!(parse_offset("C000h"), Some(0xC000));
        assert_eq!(parse_offset("4096"), Some(4096));
        assert_eq!(parse_offset("zz"), None);
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(0x10000), "64.00 KB");
        assert_eq!(hex_string(&[0xAB, 0x01]), "ab01");
        assert_eq!(hex_string_spaced(&[0xAB, 0x01]), "AB 01");
        assert_eq!(pluralize(1, "match", "matches"), "1 match");
    }
}
