//! Date coercion for request input and the UTC day windows used by the
//! Magic Mirror endpoints.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Parses the date formats browsers send: full RFC 3339 timestamps,
/// `datetime-local` values (`2024-12-01T09:30`) and plain `YYYY-MM-DD`.
/// Anything without an offset is read as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(start_of_day)
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Half-open `[midnight, next midnight)` window of `date` in UTC.
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(date);
    (start, start + Duration::days(1))
}

/// The calendar date a `?date=` query selects, or today's UTC date.
pub fn target_date(query: Option<&str>, now: DateTime<Utc>) -> Option<NaiveDate> {
    match query.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_date(raw).map(|dt| dt.date_naive()),
        None => Some(now.date_naive()),
    }
}

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

/// Like [`deserialize_date`] but an empty string or `null` is "no date".
pub fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}"))),
        _ => Ok(None),
    }
}

/// For update bodies: absent field stays `None`, an explicit `null` or empty
/// string becomes `Some(None)` so the stored value is cleared.
pub fn deserialize_date_patch<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_date(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn parses_browser_formats() {
        assert_eq!(parse_date("2024-12-01T10:15:00.000Z"), Some(utc("2024-12-01T10:15:00Z")));
        assert_eq!(parse_date("2024-12-01T10:15:00+02:00"), Some(utc("2024-12-01T08:15:00Z")));
        assert_eq!(parse_date("2024-12-01T10:15"), Some(utc("2024-12-01T10:15:00Z")));
        assert_eq!(parse_date("2024-12-01"), Some(utc("2024-12-01T00:00:00Z")));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn day_window_is_half_open_utc() {
        let (start, end) = day_window(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(start, utc("2024-12-01T00:00:00Z"));
        assert_eq!(end, utc("2024-12-02T00:00:00Z"));
    }

    #[test]
    fn day_window_crosses_month_and_year() {
        let (_, end) = day_window(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(end, utc("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn target_date_defaults_to_today_utc() {
        let now = utc("2024-06-30T23:59:59Z");
        assert_eq!(target_date(None, now), NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(target_date(Some(" "), now), NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(
            target_date(Some("2024-12-01"), now),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
        assert_eq!(target_date(Some("12/01/2024"), now), None);
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_date_patch")]
        due: Option<Option<DateTime<Utc>>>,
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.due, None);

        let cleared: Patch = serde_json::from_str(r#"{"due": null}"#).unwrap();
        assert_eq!(cleared.due, Some(None));

        let blank: Patch = serde_json::from_str(r#"{"due": ""}"#).unwrap();
        assert_eq!(blank.due, Some(None));

        let set: Patch = serde_json::from_str(r#"{"due": "2024-12-01"}"#).unwrap();
        assert_eq!(set.due, Some(Some(utc("2024-12-01T00:00:00Z"))));
    }
}
