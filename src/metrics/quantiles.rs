use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::config::LatencyMetric;
use crate::factory::Metadata;

/// Statistics for one condition across every observed entity of a job.
/// All latency fields are milliseconds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyQuantiles {
    /// Condition type the statistics belong to
    pub quantile_name: String,
    pub uuid: String,
    #[serde(rename = "P99")]
    pub p99: u64,
    #[serde(rename = "P95")]
    pub p95: u64,
    #[serde(rename = "P50")]
    pub p50: u64,
    pub min: u64,
    pub max: u64,
    pub avg: u64,
    pub count: u64,
    pub timestamp: DateTime<Utc>,
    pub metric_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub job_name: String,
    #[serde(skip_serializing_if = "metadata_is_empty")]
    pub metadata: Arc<Metadata>,
}

fn metadata_is_empty(metadata: &Arc<Metadata>) -> bool {
    metadata.is_empty()
}

impl LatencyQuantiles {
    /// Summarize the latencies observed for `condition`, in milliseconds.
    /// Identity fields are left empty for the caller to stamp.
    ///
    /// Percentiles use the nearest-rank method over the observed values, so
    /// every reported statistic except `avg` is a latency some entity had.
    pub fn from_latencies(condition: &str, mut latencies: Vec<u64>) -> Self {
        let mut summary = Self {
            quantile_name: condition.to_owned(),
            uuid: String::new(),
            p99: 0,
            p95: 0,
            p50: 0,
            min: 0,
            max: 0,
            avg: 0,
            count: 0,
            timestamp: Utc::now(),
            metric_name: String::new(),
            job_name: String::new(),
            metadata: Arc::default(),
        };
        latencies.sort_unstable();
        let (Some(&min), Some(&max)) = (latencies.first(), latencies.last()) else {
            return summary;
        };

        summary.p99 = nearest_rank(&latencies, 99);
        summary.p95 = nearest_rank(&latencies, 95);
        summary.p50 = nearest_rank(&latencies, 50);
        summary.min = min;
        summary.max = max;
        summary.avg = rounded_mean(&latencies);
        summary.count = latencies.len() as u64;
        summary
    }

    /// Value of the statistic a threshold refers to.
    pub fn statistic(&self, metric: LatencyMetric) -> u64 {
        match metric {
            LatencyMetric::P99 => self.p99,
            LatencyMetric::P95 => self.p95,
            LatencyMetric::P50 => self.p50,
            LatencyMetric::Avg => self.avg,
            LatencyMetric::Max => self.max,
        }
    }

    /// Convert summaries into the opaque documents handed to indexers.
    pub fn to_documents(summaries: &[LatencyQuantiles]) -> serde_json::Result<Vec<Value>> {
        summaries.iter().map(serde_json::to_value).collect()
    }
}

/// Value at rank `ceil(n * percentile / 100)` of a sorted, non-empty slice.
fn nearest_rank(sorted: &[u64], percentile: usize) -> u64 {
    let rank = (sorted.len() * percentile).div_ceil(100).max(1);
    sorted[rank - 1]
}

fn rounded_mean(values: &[u64]) -> u64 {
    let n = values.len() as u128;
    let sum: u128 = values.iter().map(|&v| u128::from(v)).sum();
    ((sum * 2 + n) / (n * 2)) as u64
}
