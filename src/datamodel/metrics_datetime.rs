pub type MetricsDateTime = hifitime::Epoch;

use hifitime::{UNIX_REF_EPOCH, Unit};

pub trait MetricsDateTimeExt {
    fn from_unix_milliseconds_i64(timestamp: i64) -> Self;
    fn from_unix_seconds_i64(timestamp: i64) -> Self;
    fn to_unix_milliseconds_i64(&self) -> i64;
}

impl MetricsDateTimeExt for MetricsDateTime {
    fn from_unix_milliseconds_i64(timestamp: i64) -> Self {
        Self::from_utc_duration(UNIX_REF_EPOCH.to_utc_duration() + timestamp * Unit::Millisecond)
    }
    fn from_unix_seconds_i64(timestamp: i64) -> Self {
        Self::from_utc_duration(UNIX_REF_EPOCH.to_utc_duration() + timestamp * Unit::Second)
    }
    fn to_unix_milliseconds_i64(&self) -> i64 {
        self.to_unix_milliseconds().round() as i64
    }
}

/// Serde adapter storing datetimes as unix milliseconds, the way the
/// metrics API ships `time_bin_start`.
pub mod unix_milliseconds {
    use super::{MetricsDateTime, MetricsDateTimeExt};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        datetime: &MetricsDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(datetime.to_unix_milliseconds_i64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<MetricsDateTime, D::Error> {
        let timestamp = i64::deserialize(deserializer)?;
        Ok(MetricsDateTime::from_unix_milliseconds_i64(timestamp))
    }

    pub mod option {
        use super::{MetricsDateTime, MetricsDateTimeExt};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            datetime: &Option<MetricsDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match datetime {
                Some(datetime) => serializer.serialize_some(&datetime.to_unix_milliseconds_i64()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<MetricsDateTime>, D::Error> {
            let timestamp = Option::<i64>::deserialize(deserializer)?;
            Ok(timestamp.map(MetricsDateTime::from_unix_milliseconds_i64))
        }
    }
}
