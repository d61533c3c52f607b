use crate::datamodel::{
    DimensionConstraints, DimensionValues, EnumerableProps, MetricAggregate, MetricsDateTimeExt,
};

/// Distinct values observed for each dimension, in first-seen order.
pub fn extract_dimension_values_from_aggregates(aggregates: &[MetricAggregate]) -> EnumerableProps {
    let mut props = EnumerableProps::new();
    for aggregate in aggregates {
        for (dimension, value) in &aggregate.dimensions {
            let values = props.entry(*dimension).or_default();
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
    }
    props
}

/// Dimension values shared, with the same value, by every aggregate.
pub fn extract_dimensions_in_common(aggregates: &[MetricAggregate]) -> DimensionValues {
    let Some((first, rest)) = aggregates.split_first() else {
        return DimensionValues::new();
    };
    let mut common = first.dimensions.clone();
    common.retain(|dimension, value| {
        rest.iter()
            .all(|aggregate| aggregate.dimensions.get(dimension) == Some(value))
    });
    common
}

/// Adds the values of `other` to `props`, skipping values already present.
pub fn merge_dimension_values(props: &mut EnumerableProps, other: &EnumerableProps) {
    for (dimension, values) in other {
        let merged = props.entry(*dimension).or_default();
        for value in values {
            if !merged.contains(value) {
                merged.push(value.clone());
            }
        }
    }
}

/// Cartesian product of the candidate values, one `DimensionValues` per tuple.
///
/// With no dimensions the result is a single empty combination. When
/// `constraints` is given, only combinations satisfying every group are kept.
pub fn build_dimension_combinations(
    dimensions: &EnumerableProps,
    constraints: Option<&DimensionConstraints>,
) -> Vec<DimensionValues> {
    let mut combinations = vec![DimensionValues::new()];
    for (dimension, values) in dimensions {
        combinations = combinations
            .into_iter()
            .flat_map(|combination| {
                values.iter().map(move |value| {
                    let mut extended = combination.clone();
                    extended.insert(*dimension, value.clone());
                    extended
                })
            })
            .collect();
    }

    if let Some(constraints) = constraints {
        combinations.retain(|combination| satisfies_constraints(combination, constraints));
    }
    combinations
}

/// Every group must contain at least one entry agreeing with `combination`
/// on all the dimensions they share.
pub fn satisfies_constraints(
    combination: &DimensionValues,
    constraints: &DimensionConstraints,
) -> bool {
    constraints.iter().all(|group| {
        group.iter().any(|allowed| {
            allowed.iter().all(|(dimension, value)| {
                combination
                    .get(dimension)
                    .is_none_or(|candidate| candidate == value)
            })
        })
    })
}

/// Canonical slot key of an aggregate: duration, start (omitted for
/// snapshots) and the dimension values in iteration order.
///
/// Separators inside dimension values are backslash-escaped, so distinct
/// slots never share a key.
pub fn build_metric_key(aggregate: &MetricAggregate) -> String {
    let mut parts = vec![aggregate.time_bin_duration.as_str().to_string()];
    if !aggregate.time_bin_duration.is_snapshot() {
        parts.push(aggregate.time_bin_start.to_unix_milliseconds_i64().to_string());
    }
    parts.extend(
        aggregate
            .dimensions
            .iter()
            .map(|(dimension, value)| format!("{}={}", dimension, escape_key_value(value))),
    );
    parts.join("|")
}

fn escape_key_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        if matches!(character, '\\' | '|' | '=') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}
