use super::dimensions::extract_dimensions_in_common;
use super::registry::MetricRegistry;
use crate::datamodel::{
    Dimension, MetricAggregate, Measures, MetricsDateTimeExt, TimeBinDuration, is_present_value,
};
use crate::error::MetricsError;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Folds aggregates sharing one time bin duration into a single aggregate.
///
/// The earliest aggregate provides the time bin and the list of metrics to
/// compute. For each metric, values from non-empty aggregates are pooled and
/// reduced with the metric's registered reduction. Zero and NaN values never
/// enter the pool: zero doubles as the synthetic "no data" marker, so genuine
/// zero readings are excluded as well.
///
/// The result keeps only the dimensions shared by every input, and retains the
/// inputs in `aggregates`.
pub fn aggregate_metrics(
    registry: &MetricRegistry,
    aggregates: &[MetricAggregate],
) -> Result<MetricAggregate, MetricsError> {
    let earliest = aggregates
        .iter()
        .min_by(|a, b| {
            a.time_bin_start
                .partial_cmp(&b.time_bin_start)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .ok_or(MetricsError::EmptyAggregates)?;

    let mut durations: Vec<TimeBinDuration> = aggregates
        .iter()
        .map(|aggregate| aggregate.time_bin_duration)
        .collect();
    durations.sort();
    durations.dedup();
    if durations.len() > 1 {
        return Err(MetricsError::MismatchedDurations { found: durations });
    }

    let non_empty: Vec<&MetricAggregate> = aggregates
        .iter()
        .filter(|aggregate| !aggregate.is_empty())
        .collect();

    let mut measures = Measures::new();
    for metric in earliest.measures.keys() {
        let Some(definition) = registry.definition(*metric) else {
            warn!("No definition for metric {}, skipping it", metric);
            continue;
        };
        let pool: Vec<f64> = non_empty
            .iter()
            .filter_map(|aggregate| aggregate.measure(*metric))
            .filter(|value| is_present_value(*value))
            .collect();
        measures.insert(*metric, definition.aggregate(&pool));
    }

    Ok(MetricAggregate {
        time_bin_start: earliest.time_bin_start,
        time_bin_duration: earliest.time_bin_duration,
        dimensions: extract_dimensions_in_common(aggregates),
        measures,
        aggregates: aggregates.to_vec(),
    })
}

/// Partitions aggregates by their value for `dimension`. Aggregates without
/// that dimension are dropped.
pub fn group_metrics_by_dimension(
    aggregates: &[MetricAggregate],
    dimension: Dimension,
) -> BTreeMap<String, Vec<MetricAggregate>> {
    let mut groups: BTreeMap<String, Vec<MetricAggregate>> = BTreeMap::new();
    for aggregate in aggregates {
        if let Some(value) = aggregate.dimensions.get(&dimension) {
            groups
                .entry(value.clone())
                .or_default()
                .push(aggregate.clone());
        }
    }
    groups
}

/// Partitions aggregates by time bin start, in chronological order.
pub fn group_metrics_by_time_bin(
    aggregates: &[MetricAggregate],
) -> BTreeMap<i64, Vec<MetricAggregate>> {
    let mut groups: BTreeMap<i64, Vec<MetricAggregate>> = BTreeMap::new();
    for aggregate in aggregates {
        groups
            .entry(aggregate.time_bin_start.to_unix_milliseconds_i64())
            .or_default()
            .push(aggregate.clone());
    }
    groups
}

/// Key returned by a grouping selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    Single(String),
    /// Joined with `_` to form the group key.
    Composite(Vec<String>),
}

impl GroupKey {
    pub fn into_key(self) -> String {
        match self {
            GroupKey::Single(key) => key,
            GroupKey::Composite(parts) => parts.join("_"),
        }
    }
}

impl From<String> for GroupKey {
    fn from(key: String) -> Self {
        GroupKey::Single(key)
    }
}

impl From<&str> for GroupKey {
    fn from(key: &str) -> Self {
        GroupKey::Single(key.to_string())
    }
}

impl From<Vec<String>> for GroupKey {
    fn from(parts: Vec<String>) -> Self {
        GroupKey::Composite(parts)
    }
}

/// Groups aggregates with `key_fn` and combines each group. Groups are
/// returned in the order their key was first seen.
pub fn group_and_aggregate_metrics<F, K>(
    registry: &MetricRegistry,
    aggregates: &[MetricAggregate],
    key_fn: F,
) -> Result<Vec<(String, MetricAggregate)>, MetricsError>
where
    F: Fn(&MetricAggregate) -> K,
    K: Into<GroupKey>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<MetricAggregate>)> = Vec::new();
    for aggregate in aggregates {
        let key = key_fn(aggregate).into().into_key();
        match positions.get(&key) {
            Some(&position) => groups[position].1.push(aggregate.clone()),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push((key, vec![aggregate.clone()]));
            }
        }
    }
    debug!(
        "Combining {} aggregates into {} groups",
        aggregates.len(),
        groups.len()
    );

    groups
        .into_iter()
        .map(|(key, group)| Ok((key, aggregate_metrics(registry, &group)?)))
        .collect()
}

/// Combines the aggregates matching `predicate`.
///
/// Unlike [`aggregate_metrics`], an empty selection is not an error: it means
/// there is no data for that slice and yields `Ok(None)`.
pub fn filter_and_aggregate_metrics<P>(
    registry: &MetricRegistry,
    aggregates: &[MetricAggregate],
    predicate: P,
) -> Result<Option<MetricAggregate>, MetricsError>
where
    P: Fn(&MetricAggregate) -> bool,
{
    let selected: Vec<MetricAggregate> = aggregates
        .iter()
        .filter(|aggregate| predicate(aggregate))
        .cloned()
        .collect();
    if selected.is_empty() {
        return Ok(None);
    }
    aggregate_metrics(registry, &selected).map(Some)
}
