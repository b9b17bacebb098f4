use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::IndexError;
use crate::metrics::MetricKind;

/// Documents awaiting delivery, keyed by the kind of metric they hold.
pub type ResultSets = BTreeMap<MetricKind, Vec<Value>>;

/// Options attached to a single `index` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexingOpts {
    /// Logical stream name, `{metric}-{job}`
    pub metric_name: String,
}

/// A storage backend that persists a named document collection.
///
/// Implementations are shared across concurrently running jobs and must be
/// safe to call from several threads.
pub trait Indexer: Send + Sync {
    fn index(&self, documents: &[Value], opts: &IndexingOpts) -> Result<String, IndexError>;
}

/// Named indexers configured for the run. Read-only once built.
#[derive(Clone, Default)]
pub struct IndexerRegistry {
    indexers: BTreeMap<String, Arc<dyn Indexer>>,
}

impl IndexerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, indexer: Arc<dyn Indexer>) -> Self {
        self.insert(name, indexer);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, indexer: Arc<dyn Indexer>) {
        self.indexers.insert(name.into(), indexer);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Indexer>> {
        self.indexers.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Indexer>)> {
        self.indexers.iter().map(|(name, indexer)| (name.as_str(), indexer))
    }

    pub fn len(&self) -> usize {
        self.indexers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexers.is_empty()
    }
}

impl fmt::Debug for IndexerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.indexers.keys()).finish()
    }
}

// ─── In-memory indexer ───────────────────────────────────────────

/// Keeps every indexed batch in memory. Handy for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryIndexer {
    batches: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MemoryIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream names received so far, in call order.
    pub fn metric_names(&self) -> Vec<String> {
        self.batches.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn documents(&self, metric_name: &str) -> Vec<Value> {
        self.batches
            .lock()
            .iter()
            .filter(|(name, _)| name == metric_name)
            .flat_map(|(_, docs)| docs.iter().cloned())
            .collect()
    }
}

impl Indexer for MemoryIndexer {
    fn index(&self, documents: &[Value], opts: &IndexingOpts) -> Result<String, IndexError> {
        self.batches
            .lock()
            .push((opts.metric_name.clone(), documents.to_vec()));
        Ok(format!(
            "{} documents kept in memory for {}",
            documents.len(),
            opts.metric_name
        ))
    }
}

// ─── Local file indexer ──────────────────────────────────────────

/// Writes each batch as a JSON array to `{directory}/{metric_name}.json`.
#[derive(Debug, Clone)]
pub struct LocalIndexer {
    directory: PathBuf,
}

impl LocalIndexer {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl Indexer for LocalIndexer {
    fn index(&self, documents: &[Value], opts: &IndexingOpts) -> Result<String, IndexError> {
        fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(format!("{}.json", opts.metric_name));
        let body = serde_json::to_vec_pretty(documents)?;
        fs::write(&path, body)?;
        Ok(format!("File {} created with {} documents", path.display(), documents.len()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn memory_indexer_records_batches() {
        let indexer = MemoryIndexer::new();
        let opts = IndexingOpts {
            metric_name: "podLatencyMeasurement-job".into(),
        };
        indexer.index(&[json!({"a": 1}), json!({"a": 2})], &opts).unwrap();

        assert_eq!(indexer.metric_names(), vec!["podLatencyMeasurement-job"]);
        assert_eq!(indexer.documents("podLatencyMeasurement-job").len(), 2);
        assert!(indexer.documents("other").is_empty());
    }

    #[test]
    fn local_indexer_writes_json_file() {
        let dir = std::env::temp_dir().join(format!("burner-{}", uuid::Uuid::new_v4()));
        let indexer = LocalIndexer::new(&dir);
        let opts = IndexingOpts {
            metric_name: "podLatencyQuantilesMeasurement-job".into(),
        };

        let resp = indexer.index(&[json!({"P99": 12})], &opts).unwrap();
        assert!(resp.contains("1 documents"));

        let raw = fs::read(dir.join("podLatencyQuantilesMeasurement-job.json")).unwrap();
        let written: Vec<Value> = serde_json::from_slice(&raw).unwrap();
        assert_eq!(written, vec![json!({"P99": 12})]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn registry_is_ordered_by_name() {
        let registry = IndexerRegistry::new()
            .with("local", Arc::new(MemoryIndexer::new()))
            .with("es", Arc::new(MemoryIndexer::new()));

        let names: Vec<&str> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["es", "local"]);
        assert!(registry.get("es").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(format!("{registry:?}"), r#"["es", "local"]"#);
    }
}
