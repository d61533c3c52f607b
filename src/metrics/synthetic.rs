//! Placeholder aggregates describing the expected shape of a query result.
//!
//! Every generated aggregate carries all queried measures set to zero, the
//! "no data" marker understood by the combinator.

use super::dimensions::build_dimension_combinations;
use crate::datamodel::{
    DimensionConstraints, DimensionValues, EnumerableProps, MetricAggregate, Measures,
    MetricsDateTime, MetricsQuery,
};
use crate::error::MetricsError;
use tracing::debug;

/// Current instant, used as the timestamp of snapshot aggregates.
pub fn current_time() -> Result<MetricsDateTime, MetricsError> {
    MetricsDateTime::now().map_err(|e| MetricsError::Clock(e.to_string()))
}

fn zero_measures(query: &MetricsQuery) -> Measures {
    query.measures.iter().map(|name| (*name, 0.0)).collect()
}

/// One empty aggregate per time bin in `[start_date, end_date)`.
///
/// Snapshot queries ignore the range and produce exactly one aggregate at
/// `now`. Ranged queries without both ends fail with
/// [`MetricsError::MissingTimeRange`].
pub fn generate_empty_aggregates_over_time(
    query: &MetricsQuery,
    now: MetricsDateTime,
) -> Result<Vec<MetricAggregate>, MetricsError> {
    let measures = zero_measures(query);

    if query.interval.is_snapshot() {
        return Ok(vec![MetricAggregate {
            time_bin_start: now,
            time_bin_duration: query.interval,
            dimensions: DimensionValues::new(),
            measures,
            aggregates: Vec::new(),
        }]);
    }

    let (Some(start_date), Some(end_date)) = (query.start_date, query.end_date) else {
        return Err(MetricsError::MissingTimeRange {
            interval: query.interval,
        });
    };

    let step = query.interval.step();
    let mut aggregates = Vec::new();
    let mut time_bin_start = start_date;
    while time_bin_start < end_date {
        aggregates.push(MetricAggregate {
            time_bin_start,
            time_bin_duration: query.interval,
            dimensions: DimensionValues::new(),
            measures: measures.clone(),
            aggregates: Vec::new(),
        });
        time_bin_start += step;
    }
    Ok(aggregates)
}

/// Expands every time bin aggregate into one copy per dimension combination,
/// time bin first.
pub fn split_empty_metric_by_dimensions(
    aggregates: &[MetricAggregate],
    combinations: &[DimensionValues],
) -> Vec<MetricAggregate> {
    let mut split = Vec::with_capacity(aggregates.len() * combinations.len());
    for aggregate in aggregates {
        for combination in combinations {
            split.push(MetricAggregate {
                dimensions: combination.clone(),
                ..aggregate.clone()
            });
        }
    }
    split
}

/// Dense synthetic result for `query`: every time bin crossed with every
/// combination of the values the query filters its grouping dimensions on.
///
/// Grouping dimensions the query does not filter have no known values and
/// are left out of the combinations.
pub fn generate_aggregates(
    query: &MetricsQuery,
    constraints: Option<&DimensionConstraints>,
    now: MetricsDateTime,
) -> Result<Vec<MetricAggregate>, MetricsError> {
    let props: EnumerableProps = query
        .dimensions
        .iter()
        .filter_map(|dimension| {
            query
                .filter_values(*dimension)
                .map(|values| (*dimension, values.to_vec()))
        })
        .collect();
    let combinations = build_dimension_combinations(&props, constraints);
    let over_time = generate_empty_aggregates_over_time(query, now)?;
    debug!(
        "Generating {} time bins x {} dimension combinations",
        over_time.len(),
        combinations.len()
    );
    Ok(split_empty_metric_by_dimensions(&over_time, &combinations))
}
