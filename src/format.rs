//! Display helpers for addresses, amounts and countdowns

use rust_decimal::Decimal;
use std::time::Duration;

/// Shorten an address to `0x1234...cdef`
pub fn format_address(address: &str, short: bool) -> String {
    if address.is_empty() {
        return String::new();
    }
    if !short || address.chars().count() <= 10 {
        return address.to_string();
    }

    let head: String = address.chars().take(6).collect();
    let tail: String = {
        let chars: Vec<char> = address.chars().collect();
        chars[chars.len() - 4..].iter().collect()
    };
    format!("{}...{}", head, tail)
}

/// `0x` followed by exactly 16 hex digits
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex_part) => hex_part.len() == 16 && hex_part.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Fixed-point rendering, e.g. `format_amount(10.5, 4) == "10.5000"`
pub fn format_amount(amount: Decimal, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, amount.round_dp(decimals))
}

/// `MM:SS`, rounding partial seconds up
pub fn format_countdown(remaining: Duration) -> String {
    let secs = ceil_secs(remaining);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `1m 0s` style label used on pool listings
pub fn format_time_left(remaining: Duration) -> String {
    let secs = ceil_secs(remaining);
    format!("{}m {}s", secs / 60, secs % 60)
}

pub(crate) fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address() {
        assert_eq!(format_address("0x1234567890abcdef", true), "0x1234...cdef");
        assert_eq!(format_address("0x1234567890abcdef", false), "0x1234567890abcdef");
        assert_eq!(format_address("", true), "");
        assert_eq!(format_address("0xabc", true), "0xabc");
    }

    #[test]
    fn test_is_valid_address() {
        assert!(is_valid_address("0x1234567890abcdef"));
        assert!(is_valid_address("0xABCDEF0123456789"));
        assert!(!is_valid_address("0x2345678901bcdefg"));
        assert!(!is_valid_address("1234567890abcdef"));
        assert!(!is_valid_address("0x1234"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(105, 1), 4), "10.5000");
        assert_eq!(format_amount(Decimal::new(123456, 4), 2), "12.35");
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(Duration::from_secs(60)), "01:00");
        assert_eq!(format_countdown(Duration::from_millis(44_200)), "00:45");
        assert_eq!(format_countdown(Duration::ZERO), "00:00");
        assert_eq!(format_time_left(Duration::from_secs(60)), "1m 0s");
    }
}
