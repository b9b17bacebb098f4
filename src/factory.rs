use std::sync::Arc;
use std::time::Duration;

use crate::config::{GlobalConfig, JobConfig, MeasurementConfig};
use crate::error::ConfigError;
use crate::indexer::{IndexerRegistry, ResultSets};
use crate::metrics::{self, EntityKind, LatencyQuantiles, MetricKind};
use crate::router::{self, DispatchReport};
use crate::validate;

/// Free-form run metadata copied into every indexed document.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Identity shared by every measurement of one run.
/// Cloning is cheap; the metadata is never mutated after construction.
#[derive(Debug, Clone)]
pub struct MeasurementIdentity {
    pub uuid: String,
    pub run_id: String,
    pub metadata: Arc<Metadata>,
}

impl MeasurementIdentity {
    pub fn new(uuid: impl Into<String>, run_id: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            uuid: uuid.into(),
            run_id: run_id.into(),
            metadata: Arc::new(metadata),
        }
    }
}

/// Snapshot of a measurement's configuration and run identity, from which a
/// bound instance is derived for every job.
#[derive(Debug, Clone)]
pub struct BaseMeasurementFactory {
    config: Arc<MeasurementConfig>,
    identity: MeasurementIdentity,
}

impl BaseMeasurementFactory {
    pub fn new(global: &GlobalConfig, measurement: MeasurementConfig, metadata: Metadata) -> Self {
        Self {
            config: Arc::new(measurement),
            identity: MeasurementIdentity::new(global.uuid.clone(), global.run_id.clone(), metadata),
        }
    }

    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }

    pub fn identity(&self) -> &MeasurementIdentity {
        &self.identity
    }

    /// Bind the shared measurement to one job and its cluster handles.
    pub fn new_base_latency<C, R>(
        &self,
        job_config: Arc<JobConfig>,
        client: C,
        rest_config: R,
    ) -> BaseMeasurement<C, R> {
        BaseMeasurement {
            config: Arc::clone(&self.config),
            identity: self.identity.clone(),
            job_config,
            client,
            rest_config,
        }
    }
}

/// Per-job measurement instance.
///
/// `C` is the cluster client handle and `R` its REST configuration; both are
/// opaque here and only passed through to the measurement kind.
#[derive(Debug, Clone)]
pub struct BaseMeasurement<C, R> {
    config: Arc<MeasurementConfig>,
    identity: MeasurementIdentity,
    job_config: Arc<JobConfig>,
    client: C,
    rest_config: R,
}

impl<C, R> BaseMeasurement<C, R> {
    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }

    pub fn identity(&self) -> &MeasurementIdentity {
        &self.identity
    }

    pub fn uuid(&self) -> &str {
        &self.identity.uuid
    }

    pub fn run_id(&self) -> &str {
        &self.identity.run_id
    }

    pub fn metadata(&self) -> &Metadata {
        &self.identity.metadata
    }

    pub fn job_config(&self) -> &JobConfig {
        &self.job_config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn rest_config(&self) -> &R {
        &self.rest_config
    }

    /// Validate the thresholds against the conditions of `entity`.
    pub fn validate(&self, entity: EntityKind) -> Result<(), ConfigError> {
        validate::verify_measurement_config(&self.config, entity.supported_conditions())
    }

    /// Quantile summaries of this job's records for `entity`.
    pub fn quantiles<T, F, I, K>(
        &self,
        entity: EntityKind,
        records: &[T],
        get_latency: F,
    ) -> Vec<LatencyQuantiles>
    where
        F: Fn(&T) -> I,
        I: IntoIterator<Item = (K, Duration)>,
        K: AsRef<str>,
    {
        metrics::calculate_quantiles(
            &self.identity,
            &self.job_config.name,
            records,
            get_latency,
            MetricKind::quantiles(entity).name(),
        )
    }

    /// Ship this job's result sets to the configured indexers.
    pub fn index(&self, result_sets: &ResultSets, indexers: &IndexerRegistry) -> DispatchReport {
        router::index_latency_measurement(
            &self.config,
            &self.job_config.name,
            result_sets,
            indexers,
        )
    }
}
