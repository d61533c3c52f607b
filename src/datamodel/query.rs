//! Query sent to the metrics API.
//!
//! The engine never issues queries itself; it reads the time range, interval,
//! grouping dimensions and filters to know what shape the answer should have.

use super::{Dimension, MetricName, MetricsDateTime, TimeBinDuration, metrics_datetime::unix_milliseconds};
use serde::{Deserialize, Serialize};

/// Restricts a dimension to a set of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub name: Dimension,
    pub values: Vec<String>,
}

impl QueryFilter {
    pub fn new<V: Into<String>>(name: Dimension, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            name,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsQuery {
    #[serde(default, with = "unix_milliseconds::option")]
    pub start_date: Option<MetricsDateTime>,
    #[serde(default, with = "unix_milliseconds::option")]
    pub end_date: Option<MetricsDateTime>,
    pub interval: TimeBinDuration,
    #[serde(default)]
    pub measures: Vec<MetricName>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub filters: Vec<QueryFilter>,
}

impl MetricsQuery {
    pub fn new(interval: TimeBinDuration) -> Self {
        Self {
            start_date: None,
            end_date: None,
            interval,
            measures: Vec::new(),
            dimensions: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn with_range(mut self, start_date: MetricsDateTime, end_date: MetricsDateTime) -> Self {
        self.start_date = Some(start_date);
        self.end_date = Some(end_date);
        self
    }

    pub fn with_measures(mut self, measures: impl IntoIterator<Item = MetricName>) -> Self {
        self.measures = measures.into_iter().collect();
        self
    }

    pub fn with_dimensions(mut self, dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        self.dimensions = dimensions.into_iter().collect();
        self
    }

    pub fn with_filter(mut self, filter: QueryFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Values the query restricts `dimension` to, if it filters on it.
    /// Later filters on the same dimension replace earlier ones.
    pub fn filter_values(&self, dimension: Dimension) -> Option<&[String]> {
        self.filters
            .iter()
            .rev()
            .find(|filter| filter.name == dimension)
            .map(|filter| filter.values.as_slice())
    }
}
