//! Serde helper functions for form deserialization.
//!
//! These functions handle the quirks of HTML form submissions where
//! empty strings should be treated as None for optional fields and
//! checkboxes arrive as assorted truthy strings.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Deserialize an optional UTC timestamp, treating empty strings as None.
/// Accepts RFC 3339 or the datetime-local formats YYYY-MM-DDTHH:MM[:SS],
/// the latter interpreted as UTC.
pub fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.trim().is_empty() => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
                        .map(|naive| naive.and_utc())
                })
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Deserialize an optional UUID, treating empty strings as None.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.trim().is_empty() => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Deserialize an HTML checkbox value. Absent fields and empty strings
/// are false; "on", "true" and "1" are true.
pub fn deserialize_checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(matches!(
        s.as_deref().map(str::trim),
        Some("on") | Some("true") | Some("1")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Test struct that uses the deserializer functions
    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        string_field: Option<String>,
        #[serde(default, deserialize_with = "deserialize_optional_datetime")]
        datetime_field: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        uuid_field: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_checkbox")]
        flag_field: bool,
    }

    #[test]
    fn test_empty_strings_become_none() {
        let parsed: TestStruct = serde_json::from_str(
            r#"{"string_field": "", "datetime_field": "", "uuid_field": "", "flag_field": ""}"#,
        )
        .unwrap();
        assert_eq!(parsed.string_field, None);
        assert_eq!(parsed.datetime_field, None);
        assert_eq!(parsed.uuid_field, None);
        assert!(!parsed.flag_field);
    }

    #[test]
    fn test_absent_fields_default() {
        let parsed: TestStruct = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.string_field, None);
        assert!(!parsed.flag_field);
    }

    #[test]
    fn test_datetime_local_format() {
        let parsed: TestStruct =
            serde_json::from_str(r#"{"datetime_field": "2024-01-01T10:00"}"#).unwrap();
        assert_eq!(
            parsed.datetime_field,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_rfc3339_format() {
        let parsed: TestStruct =
            serde_json::from_str(r#"{"datetime_field": "2024-01-01T10:00:00Z"}"#).unwrap();
        assert_eq!(
            parsed.datetime_field,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_invalid_datetime_rejected() {
        let result: Result<TestStruct, _> =
            serde_json::from_str(r#"{"datetime_field": "94872394"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_checkbox_values() {
        for (value, expected) in [("on", true), ("true", true), ("1", true), ("off", false)] {
            let parsed: TestStruct =
                serde_json::from_str(&format!(r#"{{"flag_field": "{value}"}}"#)).unwrap();
            assert_eq!(parsed.flag_field, expected, "value {value:?}");
        }
    }

    #[test]
    fn test_whitespace_trimmed() {
        let parsed: TestStruct =
            serde_json::from_str(r#"{"string_field": "  hello  "}"#).unwrap();
        assert_eq!(parsed.string_field, Some("hello".to_string()));
    }
}
