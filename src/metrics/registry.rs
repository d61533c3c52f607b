//! Metric definitions: how each metric is reduced, titled and formatted.
//!
//! The registry is an immutable table built once and passed to whatever needs
//! it, so tests can swap in their own definitions.

use super::format::ValueFormat;
use crate::datamodel::MetricName;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Metric-level reduction over plain numbers sharing one metric name.
#[derive(Clone, Copy)]
pub enum Reduction {
    Sum,
    Average,
    Min,
    Max,
    Custom(fn(&[f64]) -> f64),
}

impl Reduction {
    /// Reduces `values`. An empty list reduces to `0`.
    pub fn reduce(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            Reduction::Sum => values.iter().sum(),
            Reduction::Average => values.iter().sum::<f64>() / values.len() as f64,
            Reduction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Reduction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Reduction::Custom(function) => function(values),
        }
    }
}

impl fmt::Debug for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reduction::Sum => "Sum",
            Reduction::Average => "Average",
            Reduction::Min => "Min",
            Reduction::Max => "Max",
            Reduction::Custom(_) => "Custom",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
pub struct MetricDefinition {
    pub name: MetricName,
    pub title: &'static str,
    pub reduction: Reduction,
    pub format: ValueFormat,
    pub precision: usize,
}

impl MetricDefinition {
    pub fn new(
        name: MetricName,
        title: &'static str,
        reduction: Reduction,
        format: ValueFormat,
        precision: usize,
    ) -> Self {
        Self {
            name,
            title,
            reduction,
            format,
            precision,
        }
    }

    pub fn aggregate(&self, values: &[f64]) -> f64 {
        self.reduction.reduce(values)
    }

    pub fn format(&self, value: Option<f64>) -> String {
        self.format.format(value, self.precision)
    }
}

#[derive(Debug, Clone)]
pub struct MetricRegistry {
    definitions: BTreeMap<MetricName, MetricDefinition>,
}

impl MetricRegistry {
    /// The airport metric table. Covers every `MetricName`.
    pub fn standard() -> Self {
        use MetricName::*;
        use Reduction::{Average, Sum};

        Self::with_definitions([
            MetricDefinition::new(TripsCount, "Trips", Sum, ValueFormat::Count, 0),
            MetricDefinition::new(
                TripsDurationAverage,
                "Average Trip Duration",
                Average,
                ValueFormat::Duration,
                0,
            ),
            MetricDefinition::new(TripsRevenue, "Trip Revenue", Sum, ValueFormat::Currency, 2),
            MetricDefinition::new(TripsFees, "Airport Fees", Sum, ValueFormat::Currency, 2),
            MetricDefinition::new(EventsCount, "Events", Sum, ValueFormat::Count, 0),
            MetricDefinition::new(VehiclesCount, "Vehicles", Sum, ValueFormat::Count, 0),
            MetricDefinition::new(VehiclesIdleCount, "Idle Vehicles", Sum, ValueFormat::Count, 0),
            MetricDefinition::new(
                WaitTimeAverage,
                "Average Wait Time",
                Average,
                ValueFormat::Duration,
                0,
            ),
            MetricDefinition::new(Utilization, "Utilization", Average, ValueFormat::Percent, 1),
            MetricDefinition::new(LotOccupancy, "Lot Occupancy", Average, ValueFormat::Percent, 1),
            MetricDefinition::new(ViolationsCount, "Violations", Sum, ValueFormat::Count, 0),
        ])
    }

    pub fn with_definitions(definitions: impl IntoIterator<Item = MetricDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|definition| (definition.name, definition))
                .collect(),
        }
    }

    pub fn definition(&self, name: MetricName) -> Option<&MetricDefinition> {
        self.definitions.get(&name)
    }

    /// Looks up a metric by its dotted name. Unknown names log a warning and
    /// return `None`.
    pub fn get_metric(&self, name: &str) -> Option<&MetricDefinition> {
        let definition = name
            .parse::<MetricName>()
            .ok()
            .and_then(|name| self.definition(name));
        if definition.is_none() {
            warn!("Unknown metric requested: {}", name);
        }
        definition
    }

    pub fn get_metrics(&self, names: &[&str]) -> Vec<Option<&MetricDefinition>> {
        names.iter().map(|name| self.get_metric(name)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
