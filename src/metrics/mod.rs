pub mod aggregators;
pub mod combinator;
pub mod defragment;
pub mod dimensions;
pub mod format;
pub mod metric;
pub mod metric_set;
pub mod registry;
pub mod synthetic;

pub use aggregators::{Aggregator, aggregate_values, round_to_precision};
pub use combinator::{
    GroupKey, aggregate_metrics, filter_and_aggregate_metrics, group_and_aggregate_metrics,
    group_metrics_by_dimension, group_metrics_by_time_bin,
};
pub use defragment::{DefragmentRequest, build_dimension_superset, defragment_metrics};
pub use dimensions::{
    build_dimension_combinations, build_metric_key, extract_dimension_values_from_aggregates,
    extract_dimensions_in_common, merge_dimension_values, satisfies_constraints,
};
pub use format::{MISSING_VALUE, ValueFormat};
pub use metric::{Comparison, Metric, SlaThreshold, ValueExtractor};
pub use metric_set::{MetricDataPoint, MetricSet};
pub use registry::{MetricDefinition, MetricRegistry, Reduction};
pub use synthetic::{
    generate_aggregates, generate_empty_aggregates_over_time, split_empty_metric_by_dimensions,
};
