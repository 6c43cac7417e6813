//! Timestamps and ISO-8601 time intervals.
//!
//! Segment timestamps are rendered in UTC with millisecond precision
//! (`2024-01-01T00:00:00.000Z`); the same rendering is used for interval
//! boundaries so the ingestion document and projected rows agree.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Render a timestamp the way projected rows carry it.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a single ISO-8601 instant.
///
/// Accepts RFC 3339 timestamps with an offset, zone-less date-times (read as
/// UTC) and bare dates (midnight UTC).
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>, IntervalError> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(IntervalError::InvalidInstant {
        input: input.to_string(),
    })
}

/// Error returned when an interval or one of its instants cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    /// The input is not of the form `start/end`.
    #[error("malformed interval `{input}`: expected `start/end`")]
    Malformed {
        /// Offending input.
        input: String,
    },
    /// One side of the interval is not a recognised ISO-8601 instant.
    #[error("invalid instant `{input}`")]
    InvalidInstant {
        /// Offending input.
        input: String,
    },
    /// The end of the interval precedes its start.
    #[error("interval end {end} is before start {start}")]
    EndBeforeStart {
        /// Rendered start instant.
        start: String,
        /// Rendered end instant.
        end: String,
    },
}

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// Build an interval, rejecting an end that precedes the start.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, IntervalError> {
        if end < start {
            return Err(IntervalError::EndBeforeStart {
                start: format_timestamp(&start),
                end: format_timestamp(&end),
            });
        }
        Ok(Self { start, end })
    }

    /// Inclusive start.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((start, end)) = s.split_once('/') else {
            return Err(IntervalError::Malformed {
                input: s.to_string(),
            });
        };
        Interval::new(parse_instant(start)?, parse_instant(end)?)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            format_timestamp(&self.start),
            format_timestamp(&self.end)
        )
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn timestamp_renders_with_millis_and_zulu() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn parse_interval_forms() {
        let dates: Interval = "2024-01-01/2024-02-01".parse().unwrap();
        assert_eq!(
            dates.to_string(),
            "2024-01-01T00:00:00.000Z/2024-02-01T00:00:00.000Z"
        );

        let offset: Interval = "2024-01-01T01:00:00+01:00/2024-01-01T02:00:00Z"
            .parse()
            .unwrap();
        assert_eq!(offset.start(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let naive: Interval = "2024-01-01T00:00:00.250/2024-01-01T00:00:01"
            .parse()
            .unwrap();
        assert_eq!(
            naive.to_string(),
            "2024-01-01T00:00:00.250Z/2024-01-01T00:00:01.000Z"
        );
    }

    #[test]
    fn reject_bad_intervals() {
        assert!(matches!(
            "2024-01-01".parse::<Interval>(),
            Err(IntervalError::Malformed { .. })
        ));
        assert!(matches!(
            "yesterday/today".parse::<Interval>(),
            Err(IntervalError::InvalidInstant { .. })
        ));
        assert!(matches!(
            "2024-02-01/2024-01-01".parse::<Interval>(),
            Err(IntervalError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn serde_uses_string_form() {
        let interval: Interval = "2024-01-01/2024-01-02".parse().unwrap();
        let json = serde_json::to_string(&interval).unwrap();
        assert_eq!(json, "\"2024-01-01T00:00:00.000Z/2024-01-02T00:00:00.000Z\"");
        let back: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, interval);
    }
}
