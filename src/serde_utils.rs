use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Non-empty string, or a number rendered as text. Anything else is treated as absent.
pub(crate) fn string_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Counters arrive as numbers, numeric strings, or arrays of likers/viewers.
pub(crate) fn count_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| if f > 0.0 { f as u64 } else { 0 })),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Array(items) => Some(items.len() as u64),
        _ => None,
    }
}

/// RFC 3339, naive `YYYY-MM-DD[ HH:MM:SS]`, or epoch seconds/milliseconds.
pub(crate) fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s.trim()),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            // Anything past 1e11 cannot be seconds for a news article.
            if raw.abs() >= 100_000_000_000 {
                Utc.timestamp_millis_opt(raw).single()
            } else {
                Utc.timestamp_opt(raw, 0).single()
            }
        }
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(string_from_value(&Value::deserialize(deserializer)?))
}

pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(count_from_value(&Value::deserialize(deserializer)?))
}

pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(timestamp_from_value(&Value::deserialize(deserializer)?))
}

/// Keeps the field only when it is an array; a stray object or string is dropped.
pub(crate) fn lenient_array<'de, D>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_accept_loose_shapes() {
        assert_eq!(count_from_value(&json!(5)), Some(5));
        assert_eq!(count_from_value(&json!("12")), Some(12));
        assert_eq!(count_from_value(&json!(["a", "b"])), Some(2));
        assert_eq!(count_from_value(&json!(-3)), Some(0));
        assert_eq!(count_from_value(&json!(null)), None);
        assert_eq!(count_from_value(&json!("many")), None);
    }

    #[test]
    fn timestamps_accept_common_encodings() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        assert_eq!(timestamp_from_value(&json!("2024-03-01T10:30:00Z")), Some(expected));
        assert_eq!(timestamp_from_value(&json!("2024-03-01 10:30:00")), Some(expected));
        assert_eq!(timestamp_from_value(&json!(expected.timestamp_millis())), Some(expected));
        assert_eq!(timestamp_from_value(&json!(expected.timestamp())), Some(expected));
        assert_eq!(timestamp_from_value(&json!("")), None);
        assert_eq!(timestamp_from_value(&json!("yesterday")), None);
    }

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(string_from_value(&json!("  ")), None);
        assert_eq!(string_from_value(&json!(3)), Some("3".to_string()));
        assert_eq!(string_from_value(&json!({"a": 1})), None);
    }
}
