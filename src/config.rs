use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ConfigError;

// ─── Supported statistics ────────────────────────────────────────

/// Summary statistic a latency threshold can be declared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LatencyMetric {
    P99,
    P95,
    P50,
    Avg,
    Max,
}

impl LatencyMetric {
    /// The fixed set of statistics a threshold may name.
    pub const ALL: [LatencyMetric; 5] = [
        LatencyMetric::P99,
        LatencyMetric::P95,
        LatencyMetric::P50,
        LatencyMetric::Avg,
        LatencyMetric::Max,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P99 => "P99",
            Self::P95 => "P95",
            Self::P50 => "P50",
            Self::Avg => "Avg",
            Self::Max => "Max",
        }
    }

    /// Comma separated list used in error messages.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for LatencyMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LatencyMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedMetric {
                metric: s.to_owned(),
                supported: Self::supported_list(),
            })
    }
}

// ─── Measurement configuration ───────────────────────────────────

/// One `thresholds` row of a measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyThreshold {
    /// Condition the threshold applies to, e.g. `Ready`
    pub condition_type: String,
    /// Kept verbatim so that validation can reject unknown names
    pub metric: String,
    /// Upper bound for the selected statistic, written as `"2s"`, `"750ms"`
    #[serde(
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub threshold: Duration,
}

/// Parsed latency measurement configuration. Read-only once a run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub thresholds: Vec<LatencyThreshold>,

    /// Indexer receiving raw latency documents. Empty means all indexers.
    #[serde(default, deserialize_with = "deserialize_indexer_name")]
    pub timeseries_indexer: Option<String>,

    /// Indexer receiving quantile summaries. Empty means all indexers.
    #[serde(default, deserialize_with = "deserialize_indexer_name")]
    pub quantiles_indexer: Option<String>,
}

impl MeasurementConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn timeseries_indexer(&self) -> Option<&str> {
        non_empty(self.timeseries_indexer.as_deref())
    }

    pub fn quantiles_indexer(&self) -> Option<&str> {
        non_empty(self.quantiles_indexer.as_deref())
    }
}

fn non_empty(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.is_empty())
}

// ─── Run / job configuration ─────────────────────────────────────

/// Identifiers shared by every measurement of one benchmark execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default = "default_uuid")]
    pub uuid: String,
    #[serde(default = "default_uuid")]
    pub run_id: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            uuid: default_uuid(),
            run_id: default_uuid(),
        }
    }
}

fn default_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// The slice of a job definition a measurement needs to know about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    /// Suffix of every indexed stream name
    pub name: String,
}

// ─── serde helpers ───────────────────────────────────────────────

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*value))
}

fn deserialize_indexer_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|n| !n.is_empty()))
}
