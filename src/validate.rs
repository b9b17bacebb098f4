use crate::config::{LatencyMetric, MeasurementConfig};
use crate::error::ConfigError;

/// Check every declared threshold against the condition vocabulary of the
/// measurement kind and the fixed set of supported statistics.
///
/// Thresholds are checked in declaration order and the first problem wins.
pub fn verify_measurement_config(
    config: &MeasurementConfig,
    supported_conditions: &[&str],
) -> Result<(), ConfigError> {
    for th in &config.thresholds {
        if !supported_conditions.contains(&th.condition_type.as_str()) {
            return Err(ConfigError::UnsupportedCondition(th.condition_type.clone()));
        }
        th.metric.parse::<LatencyMetric>()?;
    }
    Ok(())
}
