// AccelLog — Wall-clock helpers

use core::fmt::Write;

use heapless::String;

const SECS_PER_DAY: u64 = 86_400;

/// UTC time of day (`HH:MM:SS`) for a timestamp in milliseconds since the
/// Unix epoch.
pub fn format_hms(timestamp_ms: u64) -> String<8> {
    let secs_of_day = (timestamp_ms / 1000) % SECS_PER_DAY;
    let mut out = String::new();
    // Fits: exactly 8 characters.
    let _ = write!(
        out,
        "{:02}:{:02}:{:02}",
        secs_of_day / 3600,
        (secs_of_day / 60) % 60,
        secs_of_day % 60
    );
    out
}

/// Milliseconds since the Unix epoch from the system clock (0 if unset).
///
/// The watch firmware never syncs its clock, so on the device the system
/// clock starts at the epoch on boot and this is really time since boot; the
/// `HH:MM:SS` shown while logging is uptime, not UTC.
pub fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_start() {
        assert_eq!(format_hms(0).as_str(), "00:00:00");
    }

    #[test]
    fn test_drops_date_and_millis() {
        // 2023-11-14 22:13:20.999 UTC
        assert_eq!(format_hms(1_700_000_000_999).as_str(), "22:13:20");
    }

    #[test]
    fn test_end_of_day() {
        assert_eq!(format_hms((SECS_PER_DAY - 1) * 1000).as_str(), "23:59:59");
        assert_eq!(format_hms(SECS_PER_DAY * 1000).as_str(), "00:00:00");
    }
}
