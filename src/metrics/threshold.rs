use tracing::{info, warn};

use super::quantiles::LatencyQuantiles;
use crate::config::{LatencyMetric, LatencyThreshold};
use crate::error::{ThresholdError, ThresholdViolation};

/// Compare every configured threshold with the matching summary.
///
/// All violations are collected before failing. Thresholds for conditions
/// that were never observed, or naming an unknown metric, are skipped.
pub fn check_thresholds(
    thresholds: &[LatencyThreshold],
    quantiles: &[LatencyQuantiles],
) -> Result<(), ThresholdError> {
    let mut violations = Vec::new();

    for th in thresholds {
        let Ok(metric) = th.metric.parse::<LatencyMetric>() else {
            warn!(metric = %th.metric, "Skipping threshold with unsupported metric");
            continue;
        };
        let Some(summary) = quantiles
            .iter()
            .find(|q| q.quantile_name == th.condition_type)
        else {
            warn!(
                condition = %th.condition_type,
                "No latencies observed for threshold condition"
            );
            continue;
        };

        let observed_ms = summary.statistic(metric);
        let threshold_ms = u64::try_from(th.threshold.as_millis()).unwrap_or(u64::MAX);
        if observed_ms > threshold_ms {
            violations.push(ThresholdViolation {
                condition_type: th.condition_type.clone(),
                metric: metric.to_string(),
                observed_ms,
                threshold_ms,
            });
        } else {
            info!(
                "{} {} {}ms <= {}ms",
                th.condition_type, metric, observed_ms, threshold_ms
            );
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ThresholdError(violations))
    }
}
