//! Date-times as written in the descriptor, `YYYYMMDD HHMMSS`.
//!
//! A [`DateTime`] always holds the canonical text, so values built from a
//! string, a `time` date-time or a unix timestamp compare equal when they name
//! the same instant:
//!
//! ```
//! # use flexwrf_input::datetime::DateTime;
//! let a = DateTime::parse("20200101 101010").unwrap();
//! let b = DateTime::from_unix_timestamp(1577873410).unwrap();
//! assert_eq!(a, b);
//! ```
use std::fmt::Display;
use std::str::FromStr;

use error_stack::Report;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time::macros::format_description;

use crate::error::{DResult, DescriptorError};
use crate::value::ValueKind;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct DateTime(String);

impl DateTime {
    /// Parse `YYYYMMDD HHMMSS`. Runs of whitespace between the date and time are accepted.
    pub fn parse(s: &str) -> DResult<Self> {
        let joined = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let parsed = PrimitiveDateTime::parse(
            &joined,
            format_description!("[year][month][day] [hour][minute][second]")
        ).map_err(|e| Report::new(DescriptorError::Parse {
            s: s.to_string(),
            t: ValueKind::DateTime,
            reason: e.to_string()
        }))?;
        Ok(Self::from(parsed))
    }

    /// The UTC date-time `secs` seconds after the unix epoch
    pub fn from_unix_timestamp(secs: i64) -> DResult<Self> {
        let dt = OffsetDateTime::from_unix_timestamp(secs)
            .map_err(|e| Report::new(DescriptorError::Parse {
                s: secs.to_string(),
                t: ValueKind::DateTime,
                reason: e.to_string()
            }))?;
        Ok(Self::from(dt))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert back to a `time` date-time (without an offset).
    pub fn to_primitive(&self) -> DResult<PrimitiveDateTime> {
        PrimitiveDateTime::parse(
            &self.0,
            format_description!("[year][month][day] [hour][minute][second]")
        ).map_err(|e| Report::new(DescriptorError::Parse {
            s: self.0.clone(),
            t: ValueKind::DateTime,
            reason: e.to_string()
        }))
    }
}

impl From<PrimitiveDateTime> for DateTime {
    fn from(value: PrimitiveDateTime) -> Self {
        Self(format!(
            "{:04}{:02}{:02} {:02}{:02}{:02}",
            value.year(), u8::from(value.month()), value.day(),
            value.hour(), value.minute(), value.second()
        ))
    }
}

impl From<OffsetDateTime> for DateTime {
    fn from(value: OffsetDateTime) -> Self {
        let utc = value.to_offset(UtcOffset::UTC);
        Self::from(PrimitiveDateTime::new(utc.date(), utc.time()))
    }
}

impl FromStr for DateTime {
    type Err = Report<DescriptorError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for DateTime {
    type Error = Report<DescriptorError>;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for DateTime {
    type Error = Report<DescriptorError>;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DateTime> for String {
    fn from(value: DateTime) -> Self {
        value.0
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything a date-time field can be set from
pub trait IntoDateTime {
    fn into_datetime(self) -> DResult<DateTime>;
}

impl IntoDateTime for DateTime {
    fn into_datetime(self) -> DResult<DateTime> {
        Ok(self)
    }
}

impl IntoDateTime for &str {
    fn into_datetime(self) -> DResult<DateTime> {
        DateTime::parse(self)
    }
}

impl IntoDateTime for String {
    fn into_datetime(self) -> DResult<DateTime> {
        DateTime::parse(&self)
    }
}

impl IntoDateTime for PrimitiveDateTime {
    fn into_datetime(self) -> DResult<DateTime> {
        Ok(DateTime::from(self))
    }
}

impl IntoDateTime for OffsetDateTime {
    fn into_datetime(self) -> DResult<DateTime> {
        Ok(DateTime::from(self))
    }
}

/// Unix timestamp in seconds
impl IntoDateTime for i64 {
    fn into_datetime(self) -> DResult<DateTime> {
        DateTime::from_unix_timestamp(self)
    }
}
