//! Time utility functions

use chrono::{DateTime, TimeZone, Utc};

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Convert nanoseconds since Unix epoch to DateTime<Utc>
pub fn nanos_to_datetime(nanos: u64) -> DateTime<Utc> {
    let secs = (nanos / 1_000_000_000) as i64;
    let nsecs = (nanos % 1_000_000_000) as u32;
    Utc.timestamp_opt(secs, nsecs).single().unwrap_or_else(|| {
        tracing::warn!(nanos, "Invalid timestamp, using epoch");
        DateTime::UNIX_EPOCH
    })
}

/// Nanosecond timestamp as a signed integer, saturating at `i64::MAX`.
pub fn nanos_to_i64(nanos: u64) -> i64 {
    i64::try_from(nanos).unwrap_or(i64::MAX)
}

/// Duration between two nanosecond timestamps in fractional milliseconds.
///
/// The result is signed: an end time before the start time yields a
/// negative duration.
pub fn duration_ms(start_nanos: u64, end_nanos: u64) -> f64 {
    (end_nanos as i128 - start_nanos as i128) as f64 / NANOS_PER_MILLI
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_nanos_to_datetime_epoch() {
        let dt = nanos_to_datetime(0);
        assert_eq!(dt.year(), 1970);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
    }

    #[test]
    fn test_nanos_to_datetime_known_value() {
        // 2024-01-01 00:00:00 UTC = 1704067200 seconds
        let nanos = 1704067200_u64 * 1_000_000_000;
        let dt = nanos_to_datetime(nanos);
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
    }

    #[test]
    fn test_nanos_to_datetime_with_subsecond() {
        let dt = nanos_to_datetime(1_500_000_000);
        assert_eq!(dt.timestamp(), 1);
        assert_eq!(dt.timestamp_subsec_nanos(), 500_000_000);
    }

    #[test]
    fn test_nanos_to_i64_saturates() {
        let nanos = 1_704_067_200_000_000_000;
        assert_eq!(nanos_to_i64(nanos), nanos as i64);
        assert_eq!(nanos_to_i64(i64::MAX as u64), i64::MAX);
        assert_eq!(nanos_to_i64(u64::MAX), i64::MAX);
    }

    #[test]
    fn test_duration_ms_fractional() {
        assert_eq!(duration_ms(1_000_000, 3_500_000), 2.5);
        assert_eq!(duration_ms(0, 2_000_000), 2.0);
    }

    #[test]
    fn test_duration_ms_zero() {
        assert_eq!(duration_ms(42, 42), 0.0);
    }

    #[test]
    fn test_duration_ms_end_before_start_is_negative() {
        assert_eq!(duration_ms(5_000_000, 2_000_000), -3.0);
    }
}
