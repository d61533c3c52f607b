//! Slice-level metric description.
//!
//! A `Metric` knows how to read its value from a [`MetricSlice`], how to
//! combine several slices of the same time bin (row aggregation, e.g. across
//! vehicle types), how to combine several time bins (time aggregation, e.g.
//! hours into a day), and optionally which threshold the value must meet.

use super::aggregators::{Aggregator, aggregate_values};
use super::format::{MISSING_VALUE, ValueFormat};
use super::registry::{MetricDefinition, Reduction};
use crate::datamodel::{IntegerMap, MetricName, MetricSlice, MetricValue};
use std::fmt;
use std::sync::Arc;

pub type SliceExtractorFn = dyn Fn(&MetricSlice) -> MetricValue + Send + Sync;

/// Where a metric reads its value in a slice. Missing counters read as zero
/// and missing integer maps as empty maps.
#[derive(Clone)]
pub enum ValueExtractor {
    Counter(String),
    IntegerMap(String),
    Measure(MetricName),
    Custom(Arc<SliceExtractorFn>),
}

impl ValueExtractor {
    pub fn custom<F>(function: F) -> Self
    where
        F: Fn(&MetricSlice) -> MetricValue + Send + Sync + 'static,
    {
        ValueExtractor::Custom(Arc::new(function))
    }

    pub fn extract(&self, slice: &MetricSlice) -> MetricValue {
        match self {
            ValueExtractor::Counter(name) => {
                MetricValue::Number(slice.counter(name).unwrap_or(0.0))
            }
            ValueExtractor::IntegerMap(name) => MetricValue::IntegerMap(
                slice.integer_maps.get(name).cloned().unwrap_or_else(IntegerMap::new),
            ),
            ValueExtractor::Measure(name) => {
                MetricValue::Number(slice.measure(*name).unwrap_or(0.0))
            }
            ValueExtractor::Custom(function) => function(slice),
        }
    }
}

impl fmt::Debug for ValueExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueExtractor::Counter(name) => write!(f, "Counter({})", name),
            ValueExtractor::IntegerMap(name) => write!(f, "IntegerMap({})", name),
            ValueExtractor::Measure(name) => write!(f, "Measure({})", name),
            ValueExtractor::Custom(_) => write!(f, "Custom"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

impl Comparison {
    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::LessThan => value < threshold,
            Comparison::LessOrEqual => value <= threshold,
            Comparison::GreaterThan => value > threshold,
            Comparison::GreaterOrEqual => value >= threshold,
        }
    }
}

/// Service level a metric value must meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlaThreshold {
    pub value: f64,
    pub comparison: Comparison,
}

#[derive(Debug, Clone)]
pub struct Metric {
    pub name: String,
    pub title: String,
    pub extractor: ValueExtractor,
    pub row_aggregator: Aggregator,
    pub time_aggregator: Aggregator,
    pub precision: usize,
    pub format: ValueFormat,
    pub sla: Option<SlaThreshold>,
}

impl Metric {
    pub fn new(name: impl Into<String>, title: impl Into<String>, extractor: ValueExtractor) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            extractor,
            row_aggregator: Aggregator::Sum,
            time_aggregator: Aggregator::Sum,
            precision: 2,
            format: ValueFormat::Number,
            sla: None,
        }
    }

    /// Slice metric reading a registered measure, aggregated across rows and
    /// time with the definition's reduction.
    pub fn from_definition(definition: &MetricDefinition) -> Self {
        let aggregator = match definition.reduction {
            Reduction::Sum => Aggregator::Sum,
            Reduction::Average => Aggregator::Average,
            Reduction::Min => Aggregator::Smallest,
            Reduction::Max => Aggregator::Largest,
            Reduction::Custom(function) => Aggregator::custom(move |values| {
                let numbers: Vec<f64> = values.iter().filter_map(MetricValue::as_number).collect();
                MetricValue::Number(function(&numbers))
            }),
        };
        Self {
            name: definition.name.as_str().to_string(),
            title: definition.title.to_string(),
            extractor: ValueExtractor::Measure(definition.name),
            row_aggregator: aggregator.clone(),
            time_aggregator: aggregator,
            precision: definition.precision,
            format: definition.format,
            sla: None,
        }
    }

    pub fn with_row_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.row_aggregator = aggregator;
        self
    }

    pub fn with_time_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.time_aggregator = aggregator;
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_sla(mut self, value: f64, comparison: Comparison) -> Self {
        self.sla = Some(SlaThreshold { value, comparison });
        self
    }

    pub fn get_value(&self, slice: &MetricSlice) -> MetricValue {
        self.extractor.extract(slice)
    }

    /// Display string. Indexed values render element by element.
    pub fn format(&self, value: &MetricValue) -> String {
        match value {
            MetricValue::Null => MISSING_VALUE.to_string(),
            MetricValue::Number(value) => self.format.format(Some(*value), self.precision),
            indexed => indexed
                .to_dense()
                .unwrap_or_default()
                .into_iter()
                .map(|value| self.format.format(Some(value), self.precision))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Combines values of several slices within one time bin.
    pub fn aggregate_row_values(&self, values: &[MetricValue]) -> MetricValue {
        aggregate_values(values, &self.row_aggregator, self.precision)
    }

    /// Combines per-bin values into a coarser time bin.
    pub fn aggregate_time_values(&self, values: &[MetricValue]) -> MetricValue {
        aggregate_values(values, &self.time_aggregator, self.precision)
    }

    /// `None` when the metric has no threshold or the value is not a number.
    pub fn meets_sla(&self, value: &MetricValue) -> Option<bool> {
        let sla = self.sla?;
        let value = value.as_number()?;
        Some(sla.comparison.compare(value, sla.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::{MetricsDateTime, MetricsDateTimeExt, TimeBinDuration};
    use crate::metrics::registry::MetricRegistry;

    fn slice() -> MetricSlice {
        MetricSlice::new(MetricsDateTime::from_unix_seconds_i64(0), TimeBinDuration::Hour)
            .with_counter("event.trip_start", 4.0)
            .with_counter("airport.trips.count", 12.0)
            .with_integer_map("trips_per_vehicle", [(0, 3.0), (2, 1.0)].into_iter().collect())
    }

    #[test]
    fn test_extractors() {
        let slice = slice();
        assert_eq!(
            ValueExtractor::Counter("event.trip_start".into()).extract(&slice),
            MetricValue::Number(4.0)
        );
        assert_eq!(
            ValueExtractor::Counter("event.trip_end".into()).extract(&slice),
            MetricValue::Number(0.0)
        );
        assert_eq!(
            ValueExtractor::Measure(MetricName::TripsCount).extract(&slice),
            MetricValue::Number(12.0)
        );
        assert_eq!(
            ValueExtractor::IntegerMap("missing".into()).extract(&slice),
            MetricValue::IntegerMap(IntegerMap::new())
        );
        let ratio = ValueExtractor::custom(|slice| {
            MetricValue::Number(
                slice.counter("event.trip_start").unwrap_or(0.0)
                    / slice.counter("airport.trips.count").unwrap_or(1.0),
            )
        });
        assert_eq!(ratio.extract(&slice), MetricValue::Number(4.0 / 12.0));
    }

    #[test]
    fn test_row_and_time_aggregators_differ() {
        let metric = Metric::new("vehicles", "Vehicles", ValueExtractor::Counter("vehicles".into()))
            .with_row_aggregator(Aggregator::Sum)
            .with_time_aggregator(Aggregator::Largest);
        let values = vec![MetricValue::Number(2.0), MetricValue::Number(5.0)];
        assert_eq!(metric.aggregate_row_values(&values), MetricValue::Number(7.0));
        assert_eq!(metric.aggregate_time_values(&values), MetricValue::Number(5.0));
    }

    #[test]
    fn test_format() {
        let metric = Metric::new("fees", "Fees", ValueExtractor::Counter("fees".into()))
            .with_format(ValueFormat::Currency);
        assert_eq!(metric.format(&MetricValue::Number(1500.0)), "$1,500.00");
        assert_eq!(metric.format(&MetricValue::Null), "-");

        let histogram = Metric::new(
            "trips_per_vehicle",
            "Trips per vehicle",
            ValueExtractor::IntegerMap("trips_per_vehicle".into()),
        )
        .with_format(ValueFormat::Count);
        assert_eq!(histogram.format(&histogram.get_value(&slice())), "3, 0, 1");
    }

    #[test]
    fn test_sla() {
        let metric = Metric::new("wait", "Wait", ValueExtractor::Counter("wait".into()))
            .with_sla(300.0, Comparison::LessOrEqual);
        assert_eq!(metric.meets_sla(&MetricValue::Number(120.0)), Some(true));
        assert_eq!(metric.meets_sla(&MetricValue::Number(300.0)), Some(true));
        assert_eq!(metric.meets_sla(&MetricValue::Number(301.0)), Some(false));
        assert_eq!(metric.meets_sla(&MetricValue::Null), None);

        let no_sla = Metric::new("x", "X", ValueExtractor::Counter("x".into()));
        assert_eq!(no_sla.meets_sla(&MetricValue::Number(1.0)), None);
    }

    #[test]
    fn test_comparisons() {
        assert!(Comparison::LessThan.compare(1.0, 2.0));
        assert!(!Comparison::LessThan.compare(2.0, 2.0));
        assert!(Comparison::GreaterThan.compare(3.0, 2.0));
        assert!(Comparison::GreaterOrEqual.compare(2.0, 2.0));
    }

    #[test]
    fn test_from_definition() {
        let registry = MetricRegistry::standard();
        let metric = Metric::from_definition(registry.definition(MetricName::Utilization).unwrap());
        assert_eq!(metric.name, "airport.utilization");
        assert_eq!(metric.row_aggregator.name(), "average");
        assert_eq!(metric.format(&MetricValue::Number(0.25)), "25.0%");
    }
}
