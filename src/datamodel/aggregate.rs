use super::{
    DimensionValues, MetricName, MetricsDateTime, TimeBinDuration, metrics_datetime::unix_milliseconds,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type Measures = BTreeMap<MetricName, f64>;

/// The atomic unit of metric data: measures for one time bin and one
/// combination of dimension values.
///
/// `aggregates` keeps the records that were folded into this one, so a
/// combined aggregate can be re-aggregated without fetching again. It is empty
/// for raw and synthetic aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAggregate {
    #[serde(with = "unix_milliseconds")]
    pub time_bin_start: MetricsDateTime,
    pub time_bin_duration: TimeBinDuration,
    #[serde(default)]
    pub dimensions: DimensionValues,
    #[serde(default)]
    pub measures: Measures,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregates: Vec<MetricAggregate>,
}

impl MetricAggregate {
    pub fn new(time_bin_start: MetricsDateTime, time_bin_duration: TimeBinDuration) -> Self {
        Self {
            time_bin_start,
            time_bin_duration,
            dimensions: DimensionValues::new(),
            measures: Measures::new(),
            aggregates: Vec::new(),
        }
    }

    pub fn with_dimensions(mut self, dimensions: DimensionValues) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_measure(mut self, name: MetricName, value: f64) -> Self {
        self.measures.insert(name, value);
        self
    }

    pub fn measure(&self, name: MetricName) -> Option<f64> {
        self.measures.get(&name).copied()
    }

    /// An aggregate is empty when none of its measures carries data.
    /// Zero is the "no data" marker used by synthetic aggregates.
    pub fn is_empty(&self) -> bool {
        !self
            .measures
            .values()
            .any(|value| is_present_value(*value))
    }

    /// `time_bin_start` as a Gregorian UTC string, for tables and chart labels.
    pub fn formatted_time_bin_start(&self) -> String {
        format!("{}", self.time_bin_start)
    }
}

/// Zero and NaN are treated as "no data".
pub fn is_present_value(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

impl fmt::Display for MetricAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MetricAggregate {{ time_bin_start: {}, time_bin_duration: {}",
            self.time_bin_start, self.time_bin_duration
        )?;
        if !self.dimensions.is_empty() {
            write!(f, ", dimensions: {:?}", self.dimensions)?;
        }
        if !self.measures.is_empty() {
            write!(f, ", measures: {:?}", self.measures)?;
        }
        write!(f, " }}")
    }
}
