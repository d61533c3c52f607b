//! Densifies sparse metric responses.
//!
//! The metrics API only returns aggregates for slots that have data. Charts
//! need every (time bin, dimension combination) slot, so the missing ones are
//! filled with zeroed synthetic aggregates.
//!
//! Dimension values come from three sources, from least to most trusted:
//! values observed in the response, caller hints, then the query filters.

use super::dimensions::{
    build_dimension_combinations, build_metric_key, extract_dimension_values_from_aggregates,
    merge_dimension_values,
};
use super::synthetic::{
    current_time, generate_empty_aggregates_over_time, split_empty_metric_by_dimensions,
};
use crate::datamodel::{
    DimensionConstraints, EnumerableProps, MetricAggregate, MetricsDateTime, MetricsQuery,
};
use crate::error::MetricsError;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct DefragmentRequest<'a> {
    pub query: &'a MetricsQuery,
    /// Aggregates returned for `query`, possibly with gaps.
    pub aggregates: &'a [MetricAggregate],
    pub constraints: Option<&'a DimensionConstraints>,
    /// Dimension values known to the caller that may be absent from the response.
    pub dimension_values: Option<&'a EnumerableProps>,
    /// Timestamp for snapshot queries. Defaults to the current time.
    pub now: Option<MetricsDateTime>,
}

impl<'a> DefragmentRequest<'a> {
    pub fn new(query: &'a MetricsQuery, aggregates: &'a [MetricAggregate]) -> Self {
        Self {
            query,
            aggregates,
            constraints: None,
            dimension_values: None,
            now: None,
        }
    }

    pub fn with_constraints(mut self, constraints: &'a DimensionConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn with_dimension_values(mut self, dimension_values: &'a EnumerableProps) -> Self {
        self.dimension_values = Some(dimension_values);
        self
    }

    pub fn with_now(mut self, now: MetricsDateTime) -> Self {
        self.now = Some(now);
        self
    }
}

/// Candidate values for each dimension the query groups by.
///
/// Observed values and hints are unioned; a query filter on a dimension
/// replaces whatever was inferred for it. A filter on a dimension that is
/// neither grouped by the query nor already known adds no slots.
pub fn build_dimension_superset(request: &DefragmentRequest<'_>) -> EnumerableProps {
    let mut superset = extract_dimension_values_from_aggregates(request.aggregates);
    if let Some(hints) = request.dimension_values {
        merge_dimension_values(&mut superset, hints);
    }
    for filter in &request.query.filters {
        if request.query.dimensions.contains(&filter.name)
            || superset.contains_key(&filter.name)
        {
            superset.insert(filter.name, filter.values.clone());
        }
    }
    superset
}

/// Returns the source aggregates completed with a zeroed synthetic aggregate
/// for every missing slot.
///
/// Slots are identified by [`build_metric_key`]. When a source aggregate and a
/// synthetic one share a slot, the source aggregate is kept. Output follows the
/// synthetic slot order (time bin first), followed by source aggregates that
/// match no synthetic slot.
pub fn defragment_metrics(
    request: DefragmentRequest<'_>,
) -> Result<Vec<MetricAggregate>, MetricsError> {
    let superset = build_dimension_superset(&request);
    let combinations = build_dimension_combinations(&superset, request.constraints);

    let now = match request.now {
        Some(now) => now,
        None => current_time()?,
    };
    let over_time = generate_empty_aggregates_over_time(request.query, now)?;
    let mut merged = split_empty_metric_by_dimensions(&over_time, &combinations);
    let synthetic_count = merged.len();

    let mut positions: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(position, aggregate)| (build_metric_key(aggregate), position))
        .collect();

    for aggregate in request.aggregates {
        let key = build_metric_key(aggregate);
        match positions.get(&key) {
            Some(&position) => merged[position] = aggregate.clone(),
            None => {
                positions.insert(key, merged.len());
                merged.push(aggregate.clone());
            }
        }
    }

    debug!(
        "Defragmented {} source aggregates into {} ({} synthetic slots)",
        request.aggregates.len(),
        merged.len(),
        synthetic_count
    );
    Ok(merged)
}
