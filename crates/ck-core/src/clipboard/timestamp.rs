use chrono::{DateTime, Utc};

/// Milliseconds of `9999-12-31T23:59:59.999Z`.
pub const PINNED_TIMESTAMP_MS: i64 = 253_402_300_799_999;

/// Timestamp that marks an entry as pinned.
///
/// It is the largest instant that still formats as a four digit ISO-8601 year,
/// so pinned entries sort ahead of everything else and survive text round trips.
pub fn pinned_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(PINNED_TIMESTAMP_MS).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn is_pinned_timestamp(ts: &DateTime<Utc>) -> bool {
    ts.timestamp_millis() >= PINNED_TIMESTAMP_MS
}

/// Converts epoch milliseconds to a UTC instant, clamping out of range values.
pub fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(if ms < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_sentinel_is_end_of_year_9999() {
        assert_eq!(
            pinned_timestamp().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "9999-12-31T23:59:59.999Z"
        );
        assert!(is_pinned_timestamp(&pinned_timestamp()));
        assert!(!is_pinned_timestamp(&Utc::now()));
    }

    #[test]
    fn from_millis_round_trips() {
        let ts = from_millis(1_700_000_000_123);
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_123);
    }
}
