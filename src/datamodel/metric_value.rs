use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Sparse mapping from a small non-negative index to a count, such as
/// "number of vehicles that made N trips".
pub type IntegerMap = BTreeMap<usize, f64>;

/// A raw or aggregated metric value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    #[default]
    Null,
    Number(f64),
    Array(Vec<f64>),
    IntegerMap(IntegerMap),
}

/// Shape of a value on the wire. Object keys arrive as strings whatever the
/// format, so integer map keys are parsed afterwards.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireValue {
    Null,
    Number(f64),
    Array(Vec<f64>),
    IntegerMap(BTreeMap<String, f64>),
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match WireValue::deserialize(deserializer)? {
            WireValue::Null => MetricValue::Null,
            WireValue::Number(value) => MetricValue::Number(value),
            WireValue::Array(values) => MetricValue::Array(values),
            WireValue::IntegerMap(entries) => MetricValue::IntegerMap(
                entries
                    .into_iter()
                    .map(|(key, value)| {
                        key.parse::<usize>().map(|index| (index, value)).map_err(|_| {
                            D::Error::custom(format!("invalid integer map key: {}", key))
                        })
                    })
                    .collect::<Result<IntegerMap, _>>()?,
            ),
        })
    }
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MetricValue::Null)
    }

    /// Dense view of an indexed value. Arrays are returned as-is, integer maps
    /// are expanded with zeros for missing indexes.
    pub fn to_dense(&self) -> Option<Vec<f64>> {
        match self {
            MetricValue::Array(values) => Some(values.clone()),
            MetricValue::IntegerMap(map) => {
                let len = map.keys().next_back().map_or(0, |last| last + 1);
                let mut dense = vec![0.0; len];
                for (index, value) in map {
                    dense[*index] = *value;
                }
                Some(dense)
            }
            MetricValue::Null | MetricValue::Number(_) => None,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(MetricValue::Null, MetricValue::Number)
    }
}

impl From<IntegerMap> for MetricValue {
    fn from(value: IntegerMap) -> Self {
        MetricValue::IntegerMap(value)
    }
}

impl From<Vec<f64>> for MetricValue {
    fn from(value: Vec<f64>) -> Self {
        MetricValue::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_dense_pads_missing_indexes() {
        let map: IntegerMap = [(0, 1.0), (3, 2.0)].into_iter().collect();
        assert_eq!(
            MetricValue::IntegerMap(map).to_dense(),
            Some(vec![1.0, 0.0, 0.0, 2.0])
        );
    }

    #[test]
    fn test_to_dense_non_indexed() {
        assert_eq!(MetricValue::Number(1.0).to_dense(), None);
        assert_eq!(MetricValue::Null.to_dense(), None);
        assert_eq!(
            MetricValue::IntegerMap(IntegerMap::new()).to_dense(),
            Some(vec![])
        );
    }

    #[test]
    fn test_untagged_json() {
        assert_eq!(serde_json::to_string(&MetricValue::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&MetricValue::Number(2.5)).unwrap(), "2.5");
        assert_eq!(
            serde_json::to_string(&MetricValue::Array(vec![1.0, 2.0])).unwrap(),
            "[1.0,2.0]"
        );
        let parsed: MetricValue = serde_json::from_str("[3.0]").unwrap();
        assert_eq!(parsed, MetricValue::Array(vec![3.0]));
    }

    #[test]
    fn test_integer_map_json() {
        let map = MetricValue::IntegerMap([(0, 1.0), (2, 3.0)].into_iter().collect());
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"0":1.0,"2":3.0}"#);
        assert_eq!(serde_json::from_str::<MetricValue>(&json).unwrap(), map);
        assert_eq!(
            serde_json::from_str::<MetricValue>(r#"{"1":4}"#).unwrap(),
            MetricValue::IntegerMap([(1, 4.0)].into_iter().collect())
        );
        assert_eq!(serde_json::from_str::<MetricValue>("null").unwrap(), MetricValue::Null);
        assert_eq!(serde_json::from_str::<MetricValue>("7").unwrap(), MetricValue::Number(7.0));
        let error = serde_json::from_str::<MetricValue>(r#"{"a":1}"#).unwrap_err();
        assert!(error.to_string().contains("invalid integer map key"));
    }
}
