use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use mongodb::bson::DateTime as BsonDateTime;

/// Parses dates as the frontend sends them: `2024-05-01` or a full RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<BsonDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(BsonDateTime::from_millis(dt.timestamp_millis()));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(BsonDateTime::from_millis(Utc.from_utc_datetime(&midnight).timestamp_millis()))
}

/// ISO-8601 with millisecond precision, the format the API has always returned.
pub fn to_iso(dt: BsonDateTime) -> String {
    Utc.timestamp_millis_opt(dt.timestamp_millis())
        .single()
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

pub fn to_iso_opt(dt: Option<BsonDateTime>) -> Option<String> {
    dt.map(to_iso)
}

/// Milliseconds since the epoch, used to make stored file names unique.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
