use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serializer};

/// API で受け付ける日付形式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `YYYY-MM-DD` と RFC 3339 の両方を受け付ける
///
/// RFC 3339 の場合は記載されたオフセットでの日付部分を使う。
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn invalid_date<E: serde::de::Error>(value: &str) -> E {
    E::custom(format!(
        "invalid date '{}': expected YYYY-MM-DD or RFC 3339",
        value
    ))
}

pub mod flexible_date {
    use super::*;

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse_flexible_date(&value).ok_or_else(|| invalid_date(&value))
    }
}

/// 省略・null・空文字は `None`
pub mod optional_flexible_date {
    use super::*;

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(value) if value.trim().is_empty() => Ok(None),
            Some(value) => parse_flexible_date(&value)
                .map(Some)
                .ok_or_else(|| invalid_date(&value)),
            None => Ok(None),
        }
    }
}
