//! `fleetmetrics` command line, working on JSON files.

use crate::config::FleetMetricsConfig;
use crate::datamodel::{
    Dimension, DimensionConstraints, EnumerableProps, MetricAggregate, MetricsQuery,
};
use crate::metrics::{MetricRegistry, group_and_aggregate_metrics, round_to_precision};
use crate::transport::{JsonFileTransport, fetch_defragmented};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::info;

/// Metric aggregation and defragmentation for airport fleet dashboards.
#[derive(Parser, Debug)]
#[command(name = "fleetmetrics")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fill the gaps of a sparse metrics response
    Defragment {
        /// Query the aggregates answer (JSON)
        #[arg(long)]
        query: PathBuf,
        /// Aggregates returned by the metrics API (JSON array)
        #[arg(long)]
        aggregates: PathBuf,
        /// Allowed dimension combinations (JSON array of OR-groups)
        #[arg(long)]
        constraints: Option<PathBuf>,
        /// Known dimension values (JSON object of dimension to values)
        #[arg(long)]
        hints: Option<PathBuf>,
    },
    /// Combine aggregates per value of a dimension
    Group {
        #[arg(long)]
        aggregates: PathBuf,
        #[arg(long)]
        dimension: Dimension,
    },
    /// List the registered metrics
    Metrics,
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Runs `command` and returns its JSON output.
pub async fn run(command: &Command, config: &FleetMetricsConfig) -> Result<Value> {
    let registry = MetricRegistry::standard();
    match command {
        Command::Defragment {
            query,
            aggregates,
            constraints,
            hints,
        } => {
            let query: MetricsQuery = read_json(query).await?;
            let constraints: Option<DimensionConstraints> = match constraints {
                Some(path) => Some(read_json(path).await?),
                None => None,
            };
            let hints: Option<EnumerableProps> = match hints {
                Some(path) => Some(read_json(path).await?),
                None => None,
            };
            let transport = JsonFileTransport::new(aggregates.clone());
            let merged = fetch_defragmented(
                &transport,
                &query,
                None,
                constraints.as_ref(),
                hints.as_ref(),
            )
            .await?;
            info!("Defragmented response has {} aggregates", merged.len());
            Ok(serde_json::to_value(merged)?)
        }
        Command::Group {
            aggregates,
            dimension,
        } => {
            let aggregates: Vec<MetricAggregate> = read_json(aggregates).await?;
            let dimension = *dimension;
            let groups = group_and_aggregate_metrics(&registry, &aggregates, |aggregate| {
                aggregate
                    .dimensions
                    .get(&dimension)
                    .cloned()
                    .unwrap_or_default()
            })?;
            let rows: Vec<Value> = groups
                .into_iter()
                .map(|(key, aggregate)| {
                    let measures: serde_json::Map<String, Value> = aggregate
                        .measures
                        .iter()
                        .map(|(name, value)| {
                            let formatted = registry
                                .definition(*name)
                                .map(|definition| definition.format(Some(*value)));
                            (
                                name.to_string(),
                                json!({
                                    "value": round_to_precision(*value, config.precision),
                                    "formatted": formatted,
                                }),
                            )
                        })
                        .collect();
                    json!({
                        "key": key,
                        "time_bin_start": aggregate.formatted_time_bin_start(),
                        "time_bin_duration": aggregate.time_bin_duration,
                        "dimensions": aggregate.dimensions,
                        "measures": measures,
                    })
                })
                .collect();
            Ok(Value::Array(rows))
        }
        Command::Metrics => Ok(Value::Array(
            registry
                .iter()
                .map(|definition| {
                    json!({
                        "name": definition.name,
                        "title": definition.title,
                        "reduction": format!("{:?}", definition.reduction),
                        "format": definition.format,
                        "precision": definition.precision,
                    })
                })
                .collect(),
        )),
    }
}

/// Serializes command output according to the configuration.
pub fn render(output: &Value, config: &FleetMetricsConfig) -> Result<String> {
    let rendered = if config.pretty_output {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FleetMetricsConfig {
        FleetMetricsConfig {
            precision: 1,
            log_filter: "info".to_string(),
            pretty_output: false,
        }
    }

    #[test]
    fn test_parse_defragment() {
        let cli = Cli::try_parse_from([
            "fleetmetrics",
            "defragment",
            "--query",
            "query.json",
            "--aggregates",
            "aggregates.json",
            "--hints",
            "hints.json",
        ])
        .unwrap();
        match cli.command {
            Command::Defragment {
                query,
                constraints,
                hints,
                ..
            } => {
                assert_eq!(query, PathBuf::from("query.json"));
                assert!(constraints.is_none());
                assert_eq!(hints, Some(PathBuf::from("hints.json")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_group_dimension() {
        let cli = Cli::try_parse_from([
            "fleetmetrics",
            "group",
            "--aggregates",
            "a.json",
            "--dimension",
            "provider_id",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Group {
                dimension: Dimension::ProviderId,
                ..
            }
        ));
        assert!(
            Cli::try_parse_from([
                "fleetmetrics",
                "group",
                "--aggregates",
                "a.json",
                "--dimension",
                "color",
            ])
            .is_err()
        );
    }

    #[tokio::test]
    async fn test_metrics_command() {
        let output = run(&Command::Metrics, &config()).await.unwrap();
        let metrics = output.as_array().unwrap();
        assert_eq!(metrics.len(), 11);
        assert!(
            metrics
                .iter()
                .any(|metric| metric["name"] == "airport.trips.count" && metric["reduction"] == "Sum")
        );
    }

    #[test]
    fn test_render() {
        let value = json!({"a": 1});
        assert_eq!(render(&value, &config()).unwrap(), r#"{"a":1}"#);
        let pretty = FleetMetricsConfig {
            pretty_output: true,
            ..config()
        };
        assert!(render(&value, &pretty).unwrap().contains('\n'));
    }
}
