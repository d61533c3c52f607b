pub mod aggregate;
pub mod dimension;
pub mod metric_name;
pub mod metric_value;
pub mod metrics_datetime;
pub mod query;
pub mod slice;
pub mod time_bin;

pub use aggregate::{Measures, MetricAggregate, is_present_value};
pub use dimension::{
    Dimension, DimensionConstraints, DimensionValues, EnumerableProps, dimension_values,
};
pub use metric_name::MetricName;
pub use metric_value::{IntegerMap, MetricValue};
pub use metrics_datetime::{MetricsDateTime, MetricsDateTimeExt};
pub use query::{MetricsQuery, QueryFilter};
pub use slice::MetricSlice;
pub use time_bin::TimeBinDuration;
