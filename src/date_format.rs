//! Serde helpers for the date and timestamp formats used in API payloads.

use time::{format_description::BorrowedFormatItem, macros::format_description};

/// Calendar date format, e.g. "2024-01-15".
pub(crate) const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

pub(crate) mod date {
    //! Serializes a [time::Date] as "YYYY-MM-DD".
    //!
    //! Without the human-readable serde feature, `time` serializes dates as a
    //! tuple of year and ordinal day, which clients cannot read.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::DATE_FORMAT;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

pub(crate) mod timestamp {
    //! Serializes a [time::OffsetDateTime] as an RFC 3339 string.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use time::{Date, OffsetDateTime, UtcOffset, macros::{date, datetime}};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Dated {
        #[serde(with = "super::date")]
        date: Date,
        #[serde(with = "super::timestamp")]
        at: OffsetDateTime,
    }

    #[test]
    fn serializes_date_and_timestamp_as_strings() {
        let dated = Dated {
            date: date!(2024 - 01 - 05),
            at: datetime!(2024-01-05 00:00:00).assume_offset(UtcOffset::UTC),
        };

        let json = serde_json::to_string(&dated).unwrap();

        assert_eq!(json, r#"{"date":"2024-01-05","at":"2024-01-05T00:00:00Z"}"#);
    }

    #[test]
    fn rejects_invalid_calendar_date() {
        let result = serde_json::from_str::<Dated>(r#"{"date":"2024-02-30","at":"2024-01-05T00:00:00Z"}"#);

        assert!(result.is_err());
    }
}
