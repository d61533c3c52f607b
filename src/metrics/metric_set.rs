//! Collections of slices with the grouping and re-binning operations used by
//! the slice-oriented tables.

use super::metric::Metric;
use crate::datamodel::{
    Dimension, MetricAggregate, MetricSlice, MetricValue, MetricsDateTime, MetricsDateTimeExt,
    TimeBinDuration,
};
use crate::error::MetricsError;
use serde::Serialize;
use std::collections::BTreeMap;

/// One value of a metric for one time bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDataPoint {
    #[serde(with = "crate::datamodel::metrics_datetime::unix_milliseconds")]
    pub time_bin_start: MetricsDateTime,
    pub time_bin_duration: TimeBinDuration,
    pub value: MetricValue,
    pub formatted: String,
    pub meets_sla: Option<bool>,
}

impl MetricDataPoint {
    fn new(
        metric: &Metric,
        time_bin_start: MetricsDateTime,
        time_bin_duration: TimeBinDuration,
        value: MetricValue,
    ) -> Self {
        Self {
            time_bin_start,
            time_bin_duration,
            formatted: metric.format(&value),
            meets_sla: metric.meets_sla(&value),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSet {
    slices: Vec<MetricSlice>,
}

impl MetricSet {
    pub fn new(slices: Vec<MetricSlice>) -> Self {
        Self { slices }
    }

    pub fn from_aggregates(aggregates: &[MetricAggregate]) -> Self {
        Self::new(aggregates.iter().map(MetricSlice::from).collect())
    }

    pub fn to_aggregates(&self) -> Vec<MetricAggregate> {
        self.slices.iter().map(MetricSlice::to_aggregate).collect()
    }

    pub fn slices(&self) -> &[MetricSlice] {
        &self.slices
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn filter<P>(&self, predicate: P) -> MetricSet
    where
        P: Fn(&MetricSlice) -> bool,
    {
        Self::new(
            self.slices
                .iter()
                .filter(|slice| predicate(slice))
                .cloned()
                .collect(),
        )
    }

    /// One set per value of `dimension`. Slices without the dimension are left out.
    pub fn split(&self, dimension: Dimension) -> BTreeMap<String, MetricSet> {
        self.group_by(&[dimension])
    }

    /// One set per combination of values of `dimensions`, keyed by the values
    /// joined with `_`. Slices missing any of the dimensions are left out.
    pub fn group_by(&self, dimensions: &[Dimension]) -> BTreeMap<String, MetricSet> {
        let mut groups: BTreeMap<String, MetricSet> = BTreeMap::new();
        for slice in &self.slices {
            let values: Option<Vec<&str>> = dimensions
                .iter()
                .map(|dimension| slice.dimension(*dimension))
                .collect();
            if let Some(values) = values {
                groups
                    .entry(values.join("_"))
                    .or_default()
                    .slices
                    .push(slice.clone());
            }
        }
        groups
    }

    /// Slices grouped by time bin start, in chronological order.
    fn time_bins(&self) -> BTreeMap<i64, Vec<&MetricSlice>> {
        let mut bins: BTreeMap<i64, Vec<&MetricSlice>> = BTreeMap::new();
        for slice in &self.slices {
            bins.entry(slice.time_bin_start.to_unix_milliseconds_i64())
                .or_default()
                .push(slice);
        }
        bins
    }

    /// Row-aggregated value of `metric` for every time bin present in the set.
    pub fn get_metric_data(&self, metric: &Metric) -> Vec<MetricDataPoint> {
        self.time_bins()
            .into_values()
            .filter_map(|slices| {
                let first = slices.first()?;
                let values: Vec<MetricValue> =
                    slices.iter().map(|slice| metric.get_value(slice)).collect();
                Some(MetricDataPoint::new(
                    metric,
                    first.time_bin_start,
                    first.time_bin_duration,
                    metric.aggregate_row_values(&values),
                ))
            })
            .collect()
    }

    /// Re-bins the set into `duration`: values are row-aggregated within each
    /// source bin, then the source bins falling in the same UTC-aligned target
    /// bin are combined with the metric's time aggregator.
    ///
    /// `duration` may not be finer than any source bin.
    pub fn aggregate_time_bin(
        &self,
        metric: &Metric,
        duration: TimeBinDuration,
    ) -> Result<Vec<MetricDataPoint>, MetricsError> {
        let finer: Vec<TimeBinDuration> = self
            .slices
            .iter()
            .map(|slice| slice.time_bin_duration)
            .filter(|source| source.total_seconds() > duration.total_seconds())
            .collect();
        if let Some(source) = finer.first() {
            return Err(MetricsError::MismatchedDurations {
                found: vec![*source, duration],
            });
        }

        let target_ms = duration.total_seconds() as i64 * 1000;
        let mut targets: BTreeMap<i64, Vec<MetricValue>> = BTreeMap::new();
        for point in self.get_metric_data(metric) {
            let start_ms = point.time_bin_start.to_unix_milliseconds_i64();
            let bucket = if target_ms == 0 {
                start_ms
            } else {
                start_ms.div_euclid(target_ms) * target_ms
            };
            targets.entry(bucket).or_default().push(point.value);
        }

        Ok(targets
            .into_iter()
            .map(|(start_ms, values)| {
                MetricDataPoint::new(
                    metric,
                    MetricsDateTime::from_unix_milliseconds_i64(start_ms),
                    duration,
                    metric.aggregate_time_values(&values),
                )
            })
            .collect())
    }
}

impl FromIterator<MetricSlice> for MetricSet {
    fn from_iter<I: IntoIterator<Item = MetricSlice>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::aggregators::Aggregator;
    use crate::metrics::metric::{Comparison, ValueExtractor};
    use crate::metrics::format::ValueFormat;

    const START_MS: i64 = 1704067200000;
    const HOUR_MS: i64 = 3_600_000;

    fn slice(hour: i64, provider: &str, vehicle_type: &str, trips: f64) -> MetricSlice {
        MetricSlice::new(
            MetricsDateTime::from_unix_milliseconds_i64(START_MS + hour * HOUR_MS),
            TimeBinDuration::Hour,
        )
        .with_dimension(Dimension::ProviderId, provider)
        .with_dimension(Dimension::VehicleType, vehicle_type)
        .with_counter("trips", trips)
    }

    fn set() -> MetricSet {
        MetricSet::new(vec![
            slice(0, "lime", "scooter", 3.0),
            slice(0, "lime", "bike", 1.0),
            slice(0, "bird", "scooter", 2.0),
            slice(1, "lime", "scooter", 5.0),
            slice(1, "bird", "scooter", 4.0),
        ])
    }

    fn trips() -> Metric {
        Metric::new("trips", "Trips", ValueExtractor::Counter("trips".into()))
            .with_time_aggregator(Aggregator::Largest)
            .with_format(ValueFormat::Count)
    }

    #[test]
    fn test_filter() {
        let bikes = set().filter(|slice| slice.dimension(Dimension::VehicleType) == Some("bike"));
        assert_eq!(bikes.len(), 1);
        assert!(set().filter(|_| false).is_empty());
    }

    #[test]
    fn test_split() {
        let by_provider = set().split(Dimension::ProviderId);
        assert_eq!(by_provider.len(), 2);
        assert_eq!(by_provider["lime"].len(), 3);
        assert_eq!(by_provider["bird"].len(), 2);
    }

    #[test]
    fn test_split_skips_slices_without_dimension() {
        let mut slices = set().slices().to_vec();
        slices.push(MetricSlice::new(
            MetricsDateTime::from_unix_milliseconds_i64(START_MS),
            TimeBinDuration::Hour,
        ));
        let groups = MetricSet::new(slices).split(Dimension::ProviderId);
        assert_eq!(groups.values().map(MetricSet::len).sum::<usize>(), 5);
    }

    #[test]
    fn test_group_by_composite_key() {
        let groups = set().group_by(&[Dimension::ProviderId, Dimension::VehicleType]);
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["bird_scooter", "lime_bike", "lime_scooter"]);
        assert_eq!(groups["lime_scooter"].len(), 2);
    }

    #[test]
    fn test_get_metric_data_row_aggregates_each_bin() {
        let data = set().get_metric_data(&trips());
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].value, MetricValue::Number(6.0));
        assert_eq!(data[0].formatted, "6");
        assert_eq!(data[1].value, MetricValue::Number(9.0));
        assert_eq!(data[1].meets_sla, None);
    }

    #[test]
    fn test_get_metric_data_sla() {
        let metric = trips().with_sla(8.0, Comparison::GreaterOrEqual);
        let verdicts: Vec<Option<bool>> = set()
            .get_metric_data(&metric)
            .into_iter()
            .map(|point| point.meets_sla)
            .collect();
        assert_eq!(verdicts, vec![Some(false), Some(true)]);
    }

    #[test]
    fn test_aggregate_time_bin_into_day() {
        let daily = set()
            .aggregate_time_bin(&trips(), TimeBinDuration::Day)
            .unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].time_bin_duration, TimeBinDuration::Day);
        assert_eq!(
            daily[0].time_bin_start,
            MetricsDateTime::from_unix_milliseconds_i64(START_MS)
        );
        // Rows summed per hour (6 then 9), hours combined with the largest value.
        assert_eq!(daily[0].value, MetricValue::Number(9.0));
    }

    #[test]
    fn test_aggregate_time_bin_rejects_finer_duration() {
        assert_eq!(
            set()
                .aggregate_time_bin(&trips(), TimeBinDuration::FifteenMinutes)
                .unwrap_err(),
            MetricsError::MismatchedDurations {
                found: vec![TimeBinDuration::Hour, TimeBinDuration::FifteenMinutes]
            }
        );
    }

    #[test]
    fn test_aggregates_adapter() {
        let aggregates = vec![
            MetricAggregate::new(
                MetricsDateTime::from_unix_milliseconds_i64(START_MS),
                TimeBinDuration::Hour,
            )
            .with_measure(crate::datamodel::MetricName::TripsCount, 2.0),
        ];
        let set = MetricSet::from_aggregates(&aggregates);
        assert_eq!(set.len(), 1);
        assert_eq!(set.to_aggregates(), aggregates);
    }
}
