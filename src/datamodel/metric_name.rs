use crate::error::MetricsError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Identifier of a measurable airport quantity.
///
/// The wire form is the dotted name served by the metrics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    TripsCount,
    TripsDurationAverage,
    TripsRevenue,
    TripsFees,
    EventsCount,
    VehiclesCount,
    VehiclesIdleCount,
    WaitTimeAverage,
    Utilization,
    LotOccupancy,
    ViolationsCount,
}

impl MetricName {
    pub const ALL: [MetricName; 11] = [
        MetricName::TripsCount,
        MetricName::TripsDurationAverage,
        MetricName::TripsRevenue,
        MetricName::TripsFees,
        MetricName::EventsCount,
        MetricName::VehiclesCount,
        MetricName::VehiclesIdleCount,
        MetricName::WaitTimeAverage,
        MetricName::Utilization,
        MetricName::LotOccupancy,
        MetricName::ViolationsCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::TripsCount => "airport.trips.count",
            MetricName::TripsDurationAverage => "airport.trips.duration.avg",
            MetricName::TripsRevenue => "airport.trips.revenue",
            MetricName::TripsFees => "airport.trips.fees",
            MetricName::EventsCount => "airport.events.count",
            MetricName::VehiclesCount => "airport.vehicles.count",
            MetricName::VehiclesIdleCount => "airport.vehicles.idle.count",
            MetricName::WaitTimeAverage => "airport.wait_time.avg",
            MetricName::Utilization => "airport.utilization",
            MetricName::LotOccupancy => "airport.lot.occupancy",
            MetricName::ViolationsCount => "airport.violations.count",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| MetricsError::UnknownMetric(s.to_string()))
    }
}

impl Serialize for MetricName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MetricName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
