//! Latency measurement core of a workload benchmarking tool.
//!
//! Validates latency thresholds, summarizes per-entity latencies into
//! per-condition quantiles and routes the resulting documents to indexers.

pub mod cluster;
pub mod config;
pub mod error;
pub mod factory;
pub mod indexer;
pub mod metrics;
pub mod router;
pub mod validate;

pub use config::{GlobalConfig, JobConfig, LatencyMetric, LatencyThreshold, MeasurementConfig};
pub use error::{ClusterError, ConfigError, IndexError, ThresholdError};
pub use factory::{BaseMeasurement, BaseMeasurementFactory, MeasurementIdentity, Metadata};
pub use indexer::{Indexer, IndexerRegistry, IndexingOpts, LocalIndexer, MemoryIndexer, ResultSets};
pub use metrics::{calculate_quantiles, check_thresholds, EntityKind, LatencyQuantiles, MetricKind};
pub use router::{index_latency_measurement, Delivery, DispatchReport};
pub use validate::verify_measurement_config;
