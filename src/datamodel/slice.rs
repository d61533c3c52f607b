use super::{
    Dimension, DimensionValues, IntegerMap, MetricAggregate, MetricName, MetricsDateTime,
    TimeBinDuration,
};
use std::collections::BTreeMap;

/// Denormalized per-bin record used by the slice-oriented views
/// (per provider, per vehicle type, per time bin).
///
/// Slices are a view over `MetricAggregate`: measures become counters keyed by
/// their dotted metric name, and slices can carry additional counters and
/// integer maps that have no metric name of their own.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSlice {
    pub time_bin_start: MetricsDateTime,
    pub time_bin_duration: TimeBinDuration,
    pub dimensions: DimensionValues,
    /// Named numeric counters, such as event counts by event type.
    pub counters: BTreeMap<String, f64>,
    /// Named integer maps, such as vehicles by number of trips.
    pub integer_maps: BTreeMap<String, IntegerMap>,
}

impl MetricSlice {
    pub fn new(time_bin_start: MetricsDateTime, time_bin_duration: TimeBinDuration) -> Self {
        Self {
            time_bin_start,
            time_bin_duration,
            dimensions: DimensionValues::new(),
            counters: BTreeMap::new(),
            integer_maps: BTreeMap::new(),
        }
    }

    pub fn with_dimension(mut self, dimension: Dimension, value: impl Into<String>) -> Self {
        self.dimensions.insert(dimension, value.into());
        self
    }

    pub fn with_counter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.counters.insert(name.into(), value);
        self
    }

    pub fn with_integer_map(mut self, name: impl Into<String>, map: IntegerMap) -> Self {
        self.integer_maps.insert(name.into(), map);
        self
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<&str> {
        self.dimensions.get(&dimension).map(String::as_str)
    }

    pub fn counter(&self, name: &str) -> Option<f64> {
        self.counters.get(name).copied()
    }

    pub fn measure(&self, name: MetricName) -> Option<f64> {
        self.counter(name.as_str())
    }

    /// Converts back to the canonical aggregate. Counters that are not metric
    /// names and integer maps have no aggregate counterpart and are dropped.
    pub fn to_aggregate(&self) -> MetricAggregate {
        let measures = self
            .counters
            .iter()
            .filter_map(|(name, value)| name.parse::<MetricName>().ok().map(|name| (name, *value)))
            .collect();
        MetricAggregate {
            time_bin_start: self.time_bin_start,
            time_bin_duration: self.time_bin_duration,
            dimensions: self.dimensions.clone(),
            measures,
            aggregates: Vec::new(),
        }
    }
}

impl From<&MetricAggregate> for MetricSlice {
    fn from(aggregate: &MetricAggregate) -> Self {
        Self {
            time_bin_start: aggregate.time_bin_start,
            time_bin_duration: aggregate.time_bin_duration,
            dimensions: aggregate.dimensions.clone(),
            counters: aggregate
                .measures
                .iter()
                .map(|(name, value)| (name.as_str().to_string(), *value))
                .collect(),
            integer_maps: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::MetricsDateTimeExt;

    #[test]
    fn test_aggregate_adapter() {
        let aggregate = MetricAggregate::new(
            MetricsDateTime::from_unix_seconds_i64(1704067200),
            TimeBinDuration::Hour,
        )
        .with_dimensions([(Dimension::ProviderId, "lime".to_string())].into())
        .with_measure(MetricName::TripsCount, 7.0);

        let slice = MetricSlice::from(&aggregate);
        assert_eq!(slice.dimension(Dimension::ProviderId), Some("lime"));
        assert_eq!(slice.counter("airport.trips.count"), Some(7.0));
        assert_eq!(slice.measure(MetricName::TripsCount), Some(7.0));

        assert_eq!(slice.to_aggregate(), aggregate);
    }

    #[test]
    fn test_extra_counters_are_dropped_from_aggregate() {
        let slice = MetricSlice::new(
            MetricsDateTime::from_unix_seconds_i64(0),
            TimeBinDuration::Day,
        )
        .with_counter("event.trip_start", 3.0)
        .with_counter("airport.events.count", 3.0)
        .with_integer_map("trips_per_vehicle", [(1, 2.0)].into_iter().collect());

        let aggregate = slice.to_aggregate();
        assert_eq!(aggregate.measures.len(), 1);
        assert_eq!(aggregate.measure(MetricName::EventsCount), Some(3.0));
    }
}
