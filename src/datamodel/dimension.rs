use crate::error::MetricsError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Categorical axis a metric can be broken down by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    ProviderId,
    GeographyId,
    VehicleType,
    VehicleState,
    EventType,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::ProviderId,
        Dimension::GeographyId,
        Dimension::VehicleType,
        Dimension::VehicleState,
        Dimension::EventType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::ProviderId => "provider_id",
            Dimension::GeographyId => "geography_id",
            Dimension::VehicleType => "vehicle_type",
            Dimension::VehicleState => "vehicle_state",
            Dimension::EventType => "event_type",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .into_iter()
            .find(|dimension| dimension.as_str() == s)
            .ok_or_else(|| MetricsError::UnknownDimension(s.to_string()))
    }
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// One value per dimension. Iteration follows the `Dimension` order, which
/// keeps derived keys deterministic.
pub type DimensionValues = BTreeMap<Dimension, String>;

/// Distinct candidate values per dimension, in first-seen order.
pub type EnumerableProps = BTreeMap<Dimension, Vec<String>>;

/// Groups of jointly valid combinations.
///
/// A combination is valid when, for every group, it agrees with at least one
/// entry of that group on every dimension they share.
pub type DimensionConstraints = Vec<Vec<DimensionValues>>;

/// Builds a `DimensionValues` from `(dimension, value)` pairs.
pub fn dimension_values<I, V>(pairs: I) -> DimensionValues
where
    I: IntoIterator<Item = (Dimension, V)>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(dimension, value)| (dimension, value.into()))
        .collect()
}
