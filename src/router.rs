use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::MeasurementConfig;
use crate::error::IndexError;
use crate::indexer::{Indexer, IndexerRegistry, IndexingOpts, ResultSets};
use crate::metrics::MetricKind;

/// Result of one `(metric, indexer)` delivery.
#[derive(Debug)]
pub struct Delivery {
    pub metric: MetricKind,
    pub indexer: String,
    pub outcome: Result<String, IndexError>,
}

/// Every delivery attempted by `index_latency_measurement`.
pub type DispatchReport = Vec<Delivery>;

/// Deliver each result set to the indexer(s) it belongs to.
///
/// Raw latency sets go to the timeseries indexer and quantile sets to the
/// quantiles indexer when those are configured; everything else is broadcast
/// to all registered indexers. A failing delivery is logged and never stops
/// the others. The returned report is informational.
pub fn index_latency_measurement(
    config: &MeasurementConfig,
    job_name: &str,
    result_sets: &ResultSets,
    indexers: &IndexerRegistry,
) -> DispatchReport {
    let mut report = DispatchReport::new();

    for (metric, documents) in result_sets {
        match dedicated_indexer(config, metric) {
            Some(name) => {
                let outcome = match indexers.get(name) {
                    Some(indexer) => index_documents(indexer, metric, job_name, documents),
                    None => {
                        let err = IndexError::UnknownIndexer(name.to_owned());
                        error!(metric = %metric, "{err}");
                        Err(err)
                    }
                };
                report.push(Delivery {
                    metric: metric.clone(),
                    indexer: name.to_owned(),
                    outcome,
                });
            }
            None => {
                for (name, indexer) in indexers.iter() {
                    report.push(Delivery {
                        metric: metric.clone(),
                        indexer: name.to_owned(),
                        outcome: index_documents(indexer, metric, job_name, documents),
                    });
                }
            }
        }
    }

    report
}

fn dedicated_indexer<'a>(config: &'a MeasurementConfig, metric: &MetricKind) -> Option<&'a str> {
    match (config.timeseries_indexer(), config.quantiles_indexer()) {
        (Some(name), _) if metric.is_timeseries() => Some(name),
        (_, Some(name)) if metric.is_quantiles() => Some(name),
        _ => None,
    }
}

fn index_documents(
    indexer: &Arc<dyn Indexer>,
    metric: &MetricKind,
    job_name: &str,
    documents: &[Value],
) -> Result<String, IndexError> {
    info!("Indexing metric {metric}");
    let opts = IndexingOpts {
        metric_name: format!("{metric}-{job_name}"),
    };
    debug!("Indexing [{}] documents: {metric}", documents.len());
    match indexer.index(documents, &opts) {
        Ok(resp) => {
            info!("{resp}");
            Ok(resp)
        }
        Err(err) => {
            error!(metric = %metric, "{err}");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::indexer::MemoryIndexer;

    struct BrokenIndexer;

    impl Indexer for BrokenIndexer {
        fn index(&self, _: &[Value], _: &IndexingOpts) -> Result<String, IndexError> {
            Err(IndexError::Backend("connection refused".into()))
        }
    }

    fn config(timeseries: &str, quantiles: &str) -> MeasurementConfig {
        MeasurementConfig {
            timeseries_indexer: Some(timeseries.to_owned()),
            quantiles_indexer: Some(quantiles.to_owned()),
            ..Default::default()
        }
    }

    fn result_sets(kinds: &[MetricKind]) -> ResultSets {
        kinds
            .iter()
            .map(|k| (k.clone(), vec![json!({"metricName": k.name()})]))
            .collect()
    }

    #[test]
    fn raw_latency_goes_to_timeseries_indexer_only() {
        let es = Arc::new(MemoryIndexer::new());
        let local = Arc::new(MemoryIndexer::new());
        let registry = IndexerRegistry::new()
            .with("es", es.clone())
            .with("local", local.clone());

        let report = index_latency_measurement(
            &config("es", ""),
            "job",
            &result_sets(&[MetricKind::PodLatency, MetricKind::PodLatencyQuantiles]),
            &registry,
        );

        assert_eq!(
            es.metric_names(),
            vec!["podLatencyMeasurement-job", "podLatencyQuantilesMeasurement-job"]
        );
        assert_eq!(local.metric_names(), vec!["podLatencyQuantilesMeasurement-job"]);
        assert_eq!(report.len(), 3);
        assert!(report.iter().all(|d| d.outcome.is_ok()));
    }

    #[test]
    fn quantiles_go_to_quantiles_indexer_only() {
        let es = Arc::new(MemoryIndexer::new());
        let local = Arc::new(MemoryIndexer::new());
        let registry = IndexerRegistry::new()
            .with("es", es.clone())
            .with("local", local.clone());

        index_latency_measurement(
            &config("", "local"),
            "job",
            &result_sets(&[MetricKind::NodeLatencyQuantiles, MetricKind::NodeLatency]),
            &registry,
        );

        // raw sets still broadcast when only a quantiles indexer is set
        assert_eq!(es.metric_names(), vec!["nodeLatencyMeasurement-job"]);
        assert_eq!(
            local.metric_names(),
            vec!["nodeLatencyMeasurement-job", "nodeLatencyQuantilesMeasurement-job"]
        );
    }

    #[test]
    fn custom_metrics_always_broadcast() {
        let es = Arc::new(MemoryIndexer::new());
        let local = Arc::new(MemoryIndexer::new());
        let registry = IndexerRegistry::new()
            .with("es", es.clone())
            .with("local", local.clone());

        index_latency_measurement(
            &config("es", "es"),
            "job",
            &result_sets(&[MetricKind::Custom("jobSummary".into())]),
            &registry,
        );

        assert_eq!(es.metric_names(), vec!["jobSummary-job"]);
        assert_eq!(local.metric_names(), vec!["jobSummary-job"]);
    }

    #[test]
    fn failing_indexer_does_not_block_others() {
        let es = Arc::new(MemoryIndexer::new());
        let registry = IndexerRegistry::new()
            .with("es", es.clone())
            .with("local", Arc::new(BrokenIndexer));

        let report = index_latency_measurement(
            &MeasurementConfig::default(),
            "job",
            &result_sets(&[MetricKind::SvcLatencyQuantiles, MetricKind::PvcLatency]),
            &registry,
        );

        assert_eq!(report.len(), 4);
        assert_eq!(es.metric_names().len(), 2);
        let failed: Vec<&Delivery> = report.iter().filter(|d| d.outcome.is_err()).collect();
        assert_eq!(failed.len(), 2);
        assert!(failed.iter().all(|d| d.indexer == "local"));
    }

    #[test]
    fn unknown_dedicated_indexer_is_reported() {
        let es = Arc::new(MemoryIndexer::new());
        let registry = IndexerRegistry::new().with("es", es.clone());

        let report = index_latency_measurement(
            &config("opensearch", ""),
            "job",
            &result_sets(&[MetricKind::PodLatency, MetricKind::PodLatencyQuantiles]),
            &registry,
        );

        assert_eq!(report.len(), 2);
        assert!(matches!(
            &report[0].outcome,
            Err(IndexError::UnknownIndexer(name)) if name == "opensearch"
        ));
        assert_eq!(es.metric_names(), vec!["podLatencyQuantilesMeasurement-job"]);
    }

    #[test]
    fn empty_result_sets_do_nothing() {
        let registry = IndexerRegistry::new().with("es", Arc::new(MemoryIndexer::new()));
        let report =
            index_latency_measurement(&MeasurementConfig::default(), "job", &ResultSets::new(), &registry);
        assert!(report.is_empty());
    }
}
