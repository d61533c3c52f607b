//! Boundary with the metrics API.
//!
//! The engine only sees the aggregates a transport returns. Transport errors
//! are propagated untouched and nothing is defragmented on failure.

use crate::datamodel::{DimensionConstraints, EnumerableProps, MetricAggregate, MetricsQuery};
use crate::metrics::{DefragmentRequest, defragment_metrics};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Bearer token forwarded to the metrics API. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[async_trait]
pub trait MetricsTransport: Send + Sync {
    async fn fetch(
        &self,
        query: &MetricsQuery,
        token: Option<&AuthToken>,
    ) -> Result<Vec<MetricAggregate>>;
}

/// Fetches `query` and fills the gaps of the response.
pub async fn fetch_defragmented(
    transport: &dyn MetricsTransport,
    query: &MetricsQuery,
    token: Option<&AuthToken>,
    constraints: Option<&DimensionConstraints>,
    dimension_values: Option<&EnumerableProps>,
) -> Result<Vec<MetricAggregate>> {
    let aggregates = transport.fetch(query, token).await?;

    let mut request = DefragmentRequest::new(query, &aggregates);
    if let Some(constraints) = constraints {
        request = request.with_constraints(constraints);
    }
    if let Some(dimension_values) = dimension_values {
        request = request.with_dimension_values(dimension_values);
    }
    Ok(defragment_metrics(request)?)
}

/// Serves aggregates stored in a JSON file, answering queries the way the
/// metrics API does: only aggregates of the queried interval, inside the
/// queried range and matching every filter.
#[derive(Debug, Clone)]
pub struct JsonFileTransport {
    path: PathBuf,
}

impl JsonFileTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn matches(query: &MetricsQuery, aggregate: &MetricAggregate) -> bool {
        if aggregate.time_bin_duration != query.interval {
            return false;
        }
        if !query.interval.is_snapshot() {
            if query
                .start_date
                .is_some_and(|start| aggregate.time_bin_start < start)
            {
                return false;
            }
            if query
                .end_date
                .is_some_and(|end| aggregate.time_bin_start >= end)
            {
                return false;
            }
        }
        query.filters.iter().all(|filter| {
            aggregate
                .dimensions
                .get(&filter.name)
                .is_some_and(|value| filter.values.contains(value))
        })
    }
}

#[async_trait]
impl MetricsTransport for JsonFileTransport {
    async fn fetch(
        &self,
        query: &MetricsQuery,
        _token: Option<&AuthToken>,
    ) -> Result<Vec<MetricAggregate>> {
        let content = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read aggregates from {}", self.path.display()))?;
        let aggregates: Vec<MetricAggregate> = serde_json::from_slice(&content)
            .with_context(|| format!("Failed to parse aggregates from {}", self.path.display()))?;
        let total = aggregates.len();
        let matching: Vec<MetricAggregate> = aggregates
            .into_iter()
            .filter(|aggregate| Self::matches(query, aggregate))
            .collect();
        debug!(
            "Loaded {} aggregates from {}, {} match the query",
            total,
            self.path.display(),
            matching.len()
        );
        Ok(matching)
    }
}
