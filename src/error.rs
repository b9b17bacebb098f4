use thiserror::Error;

/// Permanent configuration problems, surfaced before a run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported condition type in measurement: {0}")]
    UnsupportedCondition(String),

    #[error("unsupported metric {metric} in measurement, supported are: {supported}")]
    UnsupportedMetric { metric: String, supported: String },

    #[error("invalid measurement configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single indexer rejected or failed a write.
///
/// Never fatal for the run: the router logs it and carries on with the
/// remaining deliveries.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("indexer {0} is not registered")]
    UnknownIndexer(String),

    #[error("indexer backend error: {0}")]
    Backend(String),

    #[error("i/o error while indexing: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot serialize documents: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One configured threshold exceeded by the observed statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdViolation {
    pub condition_type: String,
    pub metric: String,
    pub observed_ms: u64,
    pub threshold_ms: u64,
}

#[derive(Debug, Error)]
#[error("{} latency threshold(s) exceeded: {}", .0.len(), describe(.0))]
pub struct ThresholdError(pub Vec<ThresholdViolation>);

fn describe(violations: &[ThresholdViolation]) -> String {
    violations
        .iter()
        .map(|v| {
            format!(
                "{} {} {}ms > {}ms",
                v.condition_type, v.metric, v.observed_ms, v.threshold_ms
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures reported by the cluster API collaborator.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    #[error("cluster API unavailable: {0}")]
    Unavailable(String),

    #[error("operation cancelled")]
    Cancelled,
}
