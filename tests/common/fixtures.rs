use fleetmetrics::datamodel::{
    Dimension, MetricAggregate, MetricName, MetricsDateTime, MetricsDateTimeExt, MetricsQuery,
    TimeBinDuration, dimension_values,
};

/// 2024-01-01T00:00:00Z
pub const START_MS: i64 = 1704067200000;
pub const HOUR_MS: i64 = 3_600_000;

pub fn at(ms: i64) -> MetricsDateTime {
    MetricsDateTime::from_unix_milliseconds_i64(ms)
}

pub fn hour(index: i64) -> MetricsDateTime {
    at(START_MS + index * HOUR_MS)
}

/// Hourly trips query over `hours` hours grouped by provider.
pub fn hourly_trips_query(hours: i64) -> MetricsQuery {
    MetricsQuery::new(TimeBinDuration::Hour)
        .with_range(hour(0), hour(hours))
        .with_measures([MetricName::TripsCount, MetricName::TripsDurationAverage])
        .with_dimensions([Dimension::ProviderId])
}

pub fn provider_aggregate(index: i64, provider: &str, trips: f64, duration: f64) -> MetricAggregate {
    MetricAggregate::new(hour(index), TimeBinDuration::Hour)
        .with_dimensions(dimension_values([(Dimension::ProviderId, provider)]))
        .with_measure(MetricName::TripsCount, trips)
        .with_measure(MetricName::TripsDurationAverage, duration)
}

/// Sparse API answer: three of the 48 (hour, provider) slots of a day.
pub fn sparse_day() -> Vec<MetricAggregate> {
    vec![
        provider_aggregate(3, "lime", 12.0, 540.0),
        provider_aggregate(3, "bird", 4.0, 610.0),
        provider_aggregate(17, "lime", 30.0, 480.0),
    ]
}

pub fn sparse_day_json() -> &'static str {
    r#"[
  {"time_bin_start": 1704078000000, "time_bin_duration": "PT1H",
   "dimensions": {"provider_id": "lime"},
   "measures": {"airport.trips.count": 12, "airport.trips.duration.avg": 540}},
  {"time_bin_start": 1704078000000, "time_bin_duration": "PT1H",
   "dimensions": {"provider_id": "bird"},
   "measures": {"airport.trips.count": 4, "airport.trips.duration.avg": 610}},
  {"time_bin_start": 1704128400000, "time_bin_duration": "PT1H",
   "dimensions": {"provider_id": "lime"},
   "measures": {"airport.trips.count": 30, "airport.trips.duration.avg": 480}},
  {"time_bin_start": 1704067200000, "time_bin_duration": "P1D",
   "dimensions": {"provider_id": "lime"},
   "measures": {"airport.trips.count": 42}}
]"#
}

pub fn day_query_json() -> &'static str {
    r#"{
  "start_date": 1704067200000,
  "end_date": 1704153600000,
  "interval": "PT1H",
  "measures": ["airport.trips.count", "airport.trips.duration.avg"],
  "dimensions": ["provider_id"]
}"#
}
