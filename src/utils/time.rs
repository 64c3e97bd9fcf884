//! Time parsing and formatting utilities
//!
//! Clip boundaries travel through the pipeline as whole seconds and are shown
//! to users (and passed to ffmpeg) as `HH:MM:SS`.

/// Placeholder shown when a duration is unknown
pub const ZERO_HMS: &str = "00:00:00";

/// Format whole seconds as `HH:MM:SS`.
///
/// `None` formats as `00:00:00`. Hours are not capped at 99 and simply grow
/// past two digits.
pub fn seconds_to_hms(seconds: Option<u64>) -> String {
    let Some(total) = seconds else {
        return ZERO_HMS.to_string();
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Parse `HH:MM:SS` into whole seconds.
///
/// Lenient: anything that is not exactly three non-negative integer parts
/// yields `0` instead of an error.
pub fn hms_to_seconds(text: &str) -> u64 {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return 0;
    }

    let mut values = [0u64; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        match part.trim().parse::<u64>() {
            Ok(value) => *slot = value,
            Err(_) => return 0,
        }
    }

    let [hours, minutes, secs] = values;
    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(secs))
        .unwrap_or(0)
}

/// Compact form used inside generated file names (`00:01:05` -> `000105`)
pub fn hms_compact(seconds: u64) -> String {
    seconds_to_hms(Some(seconds)).replace(':', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_to_hms() {
        assert_eq!(seconds_to_hms(Some(3661)), "01:01:01");
        assert_eq!(seconds_to_hms(Some(0)), "00:00:00");
        assert_eq!(seconds_to_hms(Some(59)), "00:00:59");
        assert_eq!(seconds_to_hms(None), "00:00:00");
    }

    #[test]
    fn test_seconds_to_hms_large_hours() {
        assert_eq!(seconds_to_hms(Some(100 * 3600 + 5)), "100:00:05");
    }

    #[test]
    fn test_hms_to_seconds() {
        assert_eq!(hms_to_seconds("01:01:01"), 3661);
        assert_eq!(hms_to_seconds("0:0:10"), 10);
        assert_eq!(hms_to_seconds(" 00:02:00 "), 120);
    }

    #[test]
    fn test_hms_to_seconds_malformed_is_zero() {
        assert_eq!(hms_to_seconds("bad"), 0);
        assert_eq!(hms_to_seconds("1:2"), 0);
        assert_eq!(hms_to_seconds("1:2:3:4"), 0);
        assert_eq!(hms_to_seconds("aa:00:10"), 0);
        assert_eq!(hms_to_seconds("-1:00:10"), 0);
        assert_eq!(hms_to_seconds(""), 0);
    }

    #[test]
    fn test_round_trip_within_a_day() {
        for s in 0..24 * 3600 {
            assert_eq!(hms_to_seconds(&seconds_to_hms(Some(s))), s);
        }
    }

    #[test]
    fn test_hms_compact() {
        assert_eq!(hms_compact(10), "000010");
        assert_eq!(hms_compact(3725), "010205");
    }
}
