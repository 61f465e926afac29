use serde::{Deserialize, Deserializer, Serializer};
use time::{Date, OffsetDateTime, Time, format_description::well_known::Rfc3339, macros::format_description};

use crate::core::db::StoreError;

/// Display category of a calendar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTag {
    Blue,
    Yellow,
    Purple,
    Orange,
    Green,
    Gray,
}

impl ColorTag {
    pub fn css_class(self) -> &'static str {
        match self {
            ColorTag::Blue => "bg-blue-500",
            ColorTag::Yellow => "bg-yellow-500",
            ColorTag::Purple => "bg-purple-500",
            ColorTag::Orange => "bg-orange-500",
            ColorTag::Green => "bg-green-500",
            ColorTag::Gray => "bg-gray-500",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorTag::Blue => "blue",
            ColorTag::Yellow => "yellow",
            ColorTag::Purple => "purple",
            ColorTag::Orange => "orange",
            ColorTag::Green => "green",
            ColorTag::Gray => "gray",
        }
    }
}

pub fn parse_date(value: &str) -> Result<Date, StoreError> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|e| StoreError::InvalidRecord(format!("invalid date {value:?}: {e}")))
}

pub fn format_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Accepts either a bare `YYYY-MM-DD` or a full RFC 3339 timestamp and keeps the date.
pub fn parse_date_or_timestamp(value: &str) -> Result<Date, StoreError> {
    parse_date(value).or_else(|_| parse_timestamp(value).map(|ts| ts.date()))
}

pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, StoreError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| StoreError::InvalidRecord(format!("invalid timestamp {value:?}: {e}")))
}

pub fn format_timestamp(value: OffsetDateTime) -> Result<String, StoreError> {
    value
        .format(&Rfc3339)
        .map_err(|e| StoreError::InvalidRecord(format!("unformattable timestamp: {e}")))
}

pub fn parse_hh_mm(value: &str) -> Result<Time, StoreError> {
    Time::parse(value, format_description!("[hour]:[minute]"))
        .map_err(|e| StoreError::InvalidRecord(format!("invalid time {value:?}: {e}")))
}

pub fn format_hh_mm(value: Time) -> String {
    format!("{:02}:{:02}", value.hour(), value.minute())
}

/// Serde adapter for `"HH:MM"` wall-clock times.
pub mod hh_mm {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Time, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_hh_mm(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Time, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_hh_mm(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for project target dates, which fixtures store either as a
/// date or as a timestamp.
pub mod date_or_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date_or_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn target_date_accepts_both_forms() {
        assert_eq!(parse_date_or_timestamp("2024-06-15").unwrap(), date!(2024 - 06 - 15));
        assert_eq!(
            parse_date_or_timestamp("2024-06-15T23:00:00Z").unwrap(),
            date!(2024 - 06 - 15)
        );
        assert!(parse_date_or_timestamp("June 15").is_err());
    }

    #[test]
    fn hh_mm_is_zero_padded() {
        assert_eq!(format_hh_mm(time!(9:05)), "09:05");
        assert_eq!(parse_hh_mm("14:30").unwrap(), time!(14:30));
        assert!(parse_hh_mm("25:00").is_err());
    }

    #[test]
    fn color_classes_match_palette() {
        assert_eq!(ColorTag::Blue.css_class(), "bg-blue-500");
        assert_eq!(ColorTag::Gray.name(), "gray");
    }
}
