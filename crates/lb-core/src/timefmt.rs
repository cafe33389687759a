use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a backend timestamp.
///
/// Offset-aware RFC 3339 strings keep their offset. Naive ISO-8601 strings
/// (the backend's default) are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    let naive = raw
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Some(Utc.from_utc_datetime(&naive).fixed_offset())
}

/// Calendar date of `raw` as seen from `offset`.
pub fn local_date(raw: &str, offset: FixedOffset) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|dt| dt.with_timezone(&offset).date_naive())
}

/// `dd/mm/yyyy hh:mm` in the given offset, or the raw string when it does not
/// parse.
pub fn format_short(raw: &str, offset: FixedOffset) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string(),
        None => raw.to_string(),
    }
}

/// `hh:mm` in the given offset, or the raw string when it does not parse.
pub fn format_time(raw: &str, offset: FixedOffset) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.with_timezone(&offset).format("%H:%M").to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn naive_timestamps_are_utc() {
        // 01:30 UTC is still the previous evening in UTC-3.
        let date = local_date("2024-05-02T01:30:00", brt()).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn fractional_and_space_separated() {
        assert!(parse_timestamp("2024-05-02T01:30:00.123456").is_some());
        assert!(parse_timestamp("2024-05-02 01:30:00").is_some());
        assert!(parse_timestamp("2024-05-02T01:30:00-03:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn short_format_falls_back_to_raw() {
        assert_eq!(format_short("2024-05-02T15:04:00Z", brt()), "02/05/2024 12:04");
        assert_eq!(format_short("n/a", brt()), "n/a");
        assert_eq!(format_time("2024-05-02T15:04:00Z", brt()), "12:04");
    }
}
