use crate::datamodel::TimeBinDuration;
use thiserror::Error;

/// Errors raised by the metrics engine.
///
/// Validation errors signal a broken caller contract and are never retried.
/// Lookup misses are not errors: registry and dimension lookups return `None`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// The combinator was given nothing to combine.
    #[error("Cannot aggregate an empty list of metric aggregates")]
    EmptyAggregates,

    /// The combinator was given aggregates from different time bin widths.
    #[error("Cannot aggregate metrics with different time bin durations: {}", format_durations(.found))]
    MismatchedDurations { found: Vec<TimeBinDuration> },

    /// A ranged interval was requested without both ends of the range.
    #[error("Query with interval {interval} requires both start_date and end_date")]
    MissingTimeRange { interval: TimeBinDuration },

    #[error("Unknown time bin duration: {0}")]
    UnknownInterval(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("Unknown aggregator: {0}")]
    UnknownAggregator(String),

    /// The system clock could not provide the snapshot instant.
    #[error("Clock error: {0}")]
    Clock(String),
}

fn format_durations(durations: &[TimeBinDuration]) -> String {
    durations
        .iter()
        .map(TimeBinDuration::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
