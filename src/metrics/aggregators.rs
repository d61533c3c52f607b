//! Reduction of a list of raw values to one summary value.
//!
//! Named strategies are a closed set; arbitrary reductions go through
//! [`Aggregator::Custom`].

use crate::datamodel::MetricValue;
use crate::error::MetricsError;
use std::{fmt, str::FromStr, sync::Arc};

pub type AggregatorFn = dyn Fn(&[MetricValue]) -> MetricValue + Send + Sync;

#[derive(Clone)]
pub enum Aggregator {
    /// Marks a value as not aggregatable: always null.
    None,
    First,
    Smallest,
    Largest,
    Sum,
    Average,
    SumIntegerMaps,
    AverageIntegerMaps,
    Custom(Arc<AggregatorFn>),
}

impl Aggregator {
    pub fn custom<F>(function: F) -> Self
    where
        F: Fn(&[MetricValue]) -> MetricValue + Send + Sync + 'static,
    {
        Aggregator::Custom(Arc::new(function))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Aggregator::None => "none",
            Aggregator::First => "first",
            Aggregator::Smallest => "smallest",
            Aggregator::Largest => "largest",
            Aggregator::Sum => "sum",
            Aggregator::Average => "average",
            Aggregator::SumIntegerMaps => "sumIntegerMaps",
            Aggregator::AverageIntegerMaps => "averageIntegerMaps",
            Aggregator::Custom(_) => "custom",
        }
    }

    /// Applies the strategy without rounding.
    pub fn apply(&self, values: &[MetricValue]) -> MetricValue {
        match self {
            Aggregator::None => MetricValue::Null,
            Aggregator::First => values.first().cloned().unwrap_or_default(),
            Aggregator::Smallest => extremum(values, f64::min),
            Aggregator::Largest => extremum(values, f64::max),
            Aggregator::Sum => MetricValue::Number(sum(values)),
            Aggregator::Average => MetricValue::Number(average(values)),
            Aggregator::SumIntegerMaps => sum_integer_maps(values),
            Aggregator::AverageIntegerMaps => average_integer_maps(values),
            Aggregator::Custom(function) => function(values),
        }
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aggregator({})", self.name())
    }
}

impl FromStr for Aggregator {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Aggregator::None),
            "first" => Ok(Aggregator::First),
            "smallest" => Ok(Aggregator::Smallest),
            "largest" => Ok(Aggregator::Largest),
            "sum" => Ok(Aggregator::Sum),
            "average" => Ok(Aggregator::Average),
            "sumIntegerMaps" => Ok(Aggregator::SumIntegerMaps),
            "averageIntegerMaps" => Ok(Aggregator::AverageIntegerMaps),
            _ => Err(MetricsError::UnknownAggregator(s.to_string())),
        }
    }
}

/// Reduces `values` with `aggregator`, then rounds the result to `precision`
/// decimal digits.
pub fn aggregate_values(
    values: &[MetricValue],
    aggregator: &Aggregator,
    precision: usize,
) -> MetricValue {
    round_value(aggregator.apply(values), precision)
}

/// Rounds the exact binary value, so `1.005` rounds down to `1.00`.
///
/// An exact tie rounds away from zero: `0.125` gives `0.13` and `-2.5` at
/// precision 0 gives `-3`.
pub fn round_to_precision(value: f64, precision: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let rounded: f64 = format!("{:.*}", precision, value)
        .parse()
        .unwrap_or(value);
    if !is_exact_tie(value, precision) || rounded.abs() >= value.abs() {
        return rounded;
    }
    // A tie implies a precision below 1075.
    let step = 10f64.powi(-(precision as i32));
    let bumped = rounded + step.copysign(value);
    format!("{:.*}", precision, bumped)
        .parse()
        .unwrap_or(bumped)
}

/// True when `value * 10^precision` has a fractional part of exactly one half.
///
/// With `value = mantissa * 2^exponent`, that product doubled is an odd
/// integer only when the powers of two cancel out exactly.
fn is_exact_tie(value: f64, precision: usize) -> bool {
    let bits = value.abs().to_bits();
    let biased_exponent = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased_exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased_exponent - 1075)
    };
    mantissa != 0
        && i64::from(mantissa.trailing_zeros()) + exponent + 1 + precision as i64 == 0
}

fn round_value(value: MetricValue, precision: usize) -> MetricValue {
    match value {
        MetricValue::Number(value) => MetricValue::Number(round_to_precision(value, precision)),
        MetricValue::Array(values) => MetricValue::Array(
            values
                .into_iter()
                .map(|value| round_to_precision(value, precision))
                .collect(),
        ),
        other => other,
    }
}

/// Numbers only; any other value makes the whole list unusable.
fn numbers(values: &[MetricValue]) -> Option<Vec<f64>> {
    values.iter().map(MetricValue::as_number).collect()
}

fn sum(values: &[MetricValue]) -> f64 {
    match numbers(values) {
        Some(numbers) if !numbers.is_empty() => numbers.iter().sum(),
        _ => 0.0,
    }
}

fn average(values: &[MetricValue]) -> f64 {
    match numbers(values) {
        Some(numbers) if !numbers.is_empty() => {
            numbers.iter().sum::<f64>() / numbers.len() as f64
        }
        _ => 0.0,
    }
}

fn extremum(values: &[MetricValue], pick: fn(f64, f64) -> f64) -> MetricValue {
    values
        .iter()
        .filter_map(MetricValue::as_number)
        .reduce(pick)
        .into()
}

fn sum_integer_maps(values: &[MetricValue]) -> MetricValue {
    let dense: Vec<Vec<f64>> = values.iter().filter_map(MetricValue::to_dense).collect();
    let len = dense.iter().map(Vec::len).max().unwrap_or(0);
    let mut totals = vec![0.0; len];
    for row in &dense {
        for (total, value) in totals.iter_mut().zip(row) {
            *total += value;
        }
    }
    MetricValue::Array(totals)
}

fn average_integer_maps(values: &[MetricValue]) -> MetricValue {
    match sum_integer_maps(values) {
        MetricValue::Array(totals) => {
            let count = values.len() as f64;
            MetricValue::Array(totals.into_iter().map(|total| total / count).collect())
        }
        _ => MetricValue::Null,
    }
}
