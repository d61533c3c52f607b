use crate::error::MetricsError;
use hifitime::Unit;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Width of a metric time bin, expressed on the wire as an ISO-8601 duration.
///
/// `PT0S` is the snapshot bin: a single instant rather than a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeBinDuration {
    Snapshot,
    FifteenMinutes,
    Hour,
    Day,
}

impl TimeBinDuration {
    pub const ALL: [TimeBinDuration; 4] = [
        TimeBinDuration::Snapshot,
        TimeBinDuration::FifteenMinutes,
        TimeBinDuration::Hour,
        TimeBinDuration::Day,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBinDuration::Snapshot => "PT0S",
            TimeBinDuration::FifteenMinutes => "PT15M",
            TimeBinDuration::Hour => "PT1H",
            TimeBinDuration::Day => "P1D",
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, TimeBinDuration::Snapshot)
    }

    /// Distance between two consecutive bins. Zero for snapshots.
    pub fn step(&self) -> hifitime::Duration {
        match self {
            TimeBinDuration::Snapshot => hifitime::Duration::ZERO,
            TimeBinDuration::FifteenMinutes => Unit::Minute * 15_i64,
            TimeBinDuration::Hour => Unit::Hour * 1_i64,
            TimeBinDuration::Day => Unit::Day * 1_i64,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        match self {
            TimeBinDuration::Snapshot => 0,
            TimeBinDuration::FifteenMinutes => 15 * 60,
            TimeBinDuration::Hour => 60 * 60,
            TimeBinDuration::Day => 24 * 60 * 60,
        }
    }

    fn from_total_seconds(seconds: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|duration| duration.total_seconds() == seconds)
    }
}

impl fmt::Display for TimeBinDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeBinDuration {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || MetricsError::UnknownInterval(s.to_string());
        // Equivalent spellings such as PT60M or PT24H are accepted.
        let seconds = match iso8601::duration(s).map_err(|_| unknown())? {
            iso8601::Duration::YMDHMS {
                year: 0,
                month: 0,
                day,
                hour,
                minute,
                second,
                millisecond: 0,
            } => {
                u64::from(day) * 86_400
                    + u64::from(hour) * 3_600
                    + u64::from(minute) * 60
                    + u64::from(second)
            }
            iso8601::Duration::Weeks(weeks) => u64::from(weeks) * 7 * 86_400,
            _ => return Err(unknown()),
        };
        Self::from_total_seconds(seconds).ok_or_else(unknown)
    }
}

impl Serialize for TimeBinDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TimeBinDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        for duration in TimeBinDuration::ALL {
            assert_eq!(duration.as_str().parse::<TimeBinDuration>().unwrap(), duration);
        }
    }

    #[test]
    fn test_parse_equivalent_spellings() {
        assert_eq!(
            "PT60M".parse::<TimeBinDuration>().unwrap(),
            TimeBinDuration::Hour
        );
        assert_eq!(
            "PT24H".parse::<TimeBinDuration>().unwrap(),
            TimeBinDuration::Day
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert!("PT5M".parse::<TimeBinDuration>().is_err());
        assert!("P1M".parse::<TimeBinDuration>().is_err());
        assert!("hourly".parse::<TimeBinDuration>().is_err());
    }

    #[test]
    fn test_step() {
        assert_eq!(TimeBinDuration::Snapshot.step(), hifitime::Duration::ZERO);
        assert_eq!(
            TimeBinDuration::FifteenMinutes.step().to_seconds(),
            900.0
        );
        assert_eq!(TimeBinDuration::Hour.step().to_seconds(), 3600.0);
        assert_eq!(TimeBinDuration::Day.step().to_seconds(), 86400.0);
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&TimeBinDuration::FifteenMinutes).unwrap();
        assert_eq!(json, "\"PT15M\"");
        let parsed: TimeBinDuration = serde_json::from_str("\"P1D\"").unwrap();
        assert_eq!(parsed, TimeBinDuration::Day);
    }
}
