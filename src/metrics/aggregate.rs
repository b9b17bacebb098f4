use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use super::quantiles::LatencyQuantiles;
use crate::factory::MeasurementIdentity;

/// Summarize normalized latency records into one `LatencyQuantiles` per
/// observed condition.
///
/// `get_latency` exposes the `(condition, latency)` pairs of a record, so pod,
/// service, node and volume-claim records can share this routine. Conditions
/// that no record reports produce no summary; the output is sorted by
/// condition name.
pub fn calculate_quantiles<R, F, I, K>(
    identity: &MeasurementIdentity,
    job_name: &str,
    records: &[R],
    get_latency: F,
    metric_name: &str,
) -> Vec<LatencyQuantiles>
where
    F: Fn(&R) -> I,
    I: IntoIterator<Item = (K, Duration)>,
    K: AsRef<str>,
{
    let mut by_condition: BTreeMap<String, Vec<u64>> = BTreeMap::new();
    for record in records {
        for (condition, latency) in get_latency(record) {
            by_condition
                .entry(condition.as_ref().to_owned())
                .or_default()
                .push(duration_ms(latency));
        }
    }

    debug!(
        metric = metric_name,
        job = job_name,
        records = records.len(),
        conditions = by_condition.len(),
        "Calculating latency quantiles"
    );

    by_condition
        .into_iter()
        .map(|(condition, latencies)| {
            let mut summary = LatencyQuantiles::from_latencies(&condition, latencies);
            summary.uuid = identity.uuid.clone();
            summary.metadata = identity.metadata.clone();
            summary.metric_name = metric_name.to_owned();
            summary.job_name = job_name.to_owned();
            summary
        })
        .collect()
}

fn duration_ms(latency: Duration) -> u64 {
    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::factory::Metadata;

    fn identity() -> MeasurementIdentity {
        let mut metadata = Metadata::new();
        metadata.insert("platform".into(), "kind".into());
        MeasurementIdentity::new("uuid-1", "run-1", metadata)
    }

    fn record(pairs: &[(&str, u64)]) -> HashMap<String, Duration> {
        pairs
            .iter()
            .map(|(c, ms)| (c.to_string(), Duration::from_millis(*ms)))
            .collect()
    }

    fn verbatim(r: &HashMap<String, Duration>) -> Vec<(String, Duration)> {
        r.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    #[test]
    fn one_summary_per_observed_condition() {
        let records = vec![record(&[("A", 10), ("B", 20)]), record(&[("A", 30)])];
        let summaries = calculate_quantiles(
            &identity(),
            "job",
            &records,
            verbatim,
            "podLatencyQuantilesMeasurement",
        );

        assert_eq!(summaries.len(), 2);
        let a = &summaries[0];
        assert_eq!(a.quantile_name, "A");
        assert_eq!(a.count, 2);
        assert_eq!(a.p50, 10);
        assert_eq!(a.p99, 30);
        assert_eq!(a.max, 30);
        assert_eq!(a.min, 10);
        assert_eq!(a.avg, 20);

        let b = &summaries[1];
        assert_eq!(b.quantile_name, "B");
        assert_eq!(b.count, 1);
        assert_eq!(b.p50, 20);
        assert_eq!(b.max, 20);
    }

    #[test]
    fn summaries_carry_identity() {
        let records = vec![record(&[("Ready", 5)])];
        let summaries = calculate_quantiles(&identity(), "job-a", &records, verbatim, "metric");

        let s = &summaries[0];
        assert_eq!(s.uuid, "uuid-1");
        assert_eq!(s.job_name, "job-a");
        assert_eq!(s.metric_name, "metric");
        assert_eq!(s.metadata["platform"], "kind");
    }

    #[test]
    fn no_records_no_summaries() {
        let records: Vec<HashMap<String, Duration>> = Vec::new();
        assert!(calculate_quantiles(&identity(), "job", &records, verbatim, "m").is_empty());
    }

    #[test]
    fn repeated_calls_agree() {
        let records = vec![
            record(&[("Ready", 120), ("PodScheduled", 3)]),
            record(&[("Ready", 340), ("PodScheduled", 9)]),
            record(&[("Ready", 95)]),
        ];
        let first = calculate_quantiles(&identity(), "job", &records, verbatim, "m");
        let second = calculate_quantiles(&identity(), "job", &records, verbatim, "m");

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.quantile_name, b.quantile_name);
            assert_eq!((a.p50, a.p95, a.p99), (b.p50, b.p95, b.p99));
            assert_eq!((a.min, a.max, a.avg, a.count), (b.min, b.max, b.avg, b.count));
        }
    }

    #[test]
    fn multi_second_latencies_keep_observed_values() {
        let records = vec![record(&[("Ready", 10_000)]), record(&[("Ready", 12_345)])];
        let summaries = calculate_quantiles(&identity(), "job", &records, verbatim, "m");

        let ready = &summaries[0];
        assert_eq!(ready.min, 10_000);
        assert_eq!(ready.max, 12_345);
        assert_eq!(ready.p50, 10_000);
        assert_eq!(ready.p99, 12_345);
        assert_eq!(ready.avg, 11_173);
    }
}
