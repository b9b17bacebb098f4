use std::fmt;

use serde::{Serialize, Serializer};

/// Kind of object a latency measurement observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Pod,
    Service,
    Node,
    VolumeClaim,
}

impl EntityKind {
    /// Condition types a threshold may reference for this kind.
    pub fn supported_conditions(self) -> &'static [&'static str] {
        match self {
            Self::Pod => &[
                "PodScheduled",
                "PodReadyToStartContainers",
                "Initialized",
                "ContainersReady",
                "Ready",
            ],
            Self::Service => &["Ready", "LoadBalancer"],
            Self::Node => &["MemoryPressure", "DiskPressure", "PIDPressure", "Ready"],
            Self::VolumeClaim => &["Pending", "Bound", "Lost"],
        }
    }
}

/// Tag attached to every result set, used to pick its indexers.
///
/// `Custom` carries any other metric name; it is never claimed by a
/// dedicated indexer and always broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    PodLatency,
    PodLatencyQuantiles,
    SvcLatency,
    SvcLatencyQuantiles,
    NodeLatency,
    NodeLatencyQuantiles,
    PvcLatency,
    PvcLatencyQuantiles,
    Custom(String),
}

impl MetricKind {
    pub fn raw(entity: EntityKind) -> Self {
        match entity {
            EntityKind::Pod => Self::PodLatency,
            EntityKind::Service => Self::SvcLatency,
            EntityKind::Node => Self::NodeLatency,
            EntityKind::VolumeClaim => Self::PvcLatency,
        }
    }

    pub fn quantiles(entity: EntityKind) -> Self {
        match entity {
            EntityKind::Pod => Self::PodLatencyQuantiles,
            EntityKind::Service => Self::SvcLatencyQuantiles,
            EntityKind::Node => Self::NodeLatencyQuantiles,
            EntityKind::VolumeClaim => Self::PvcLatencyQuantiles,
        }
    }

    /// Name used for the indexed stream and the `metricName` document field.
    pub fn name(&self) -> &str {
        match self {
            Self::PodLatency => "podLatencyMeasurement",
            Self::PodLatencyQuantiles => "podLatencyQuantilesMeasurement",
            Self::SvcLatency => "svcLatencyMeasurement",
            Self::SvcLatencyQuantiles => "svcLatencyQuantilesMeasurement",
            Self::NodeLatency => "nodeLatencyMeasurement",
            Self::NodeLatencyQuantiles => "nodeLatencyQuantilesMeasurement",
            Self::PvcLatency => "pvcLatencyMeasurement",
            Self::PvcLatencyQuantiles => "pvcLatencyQuantilesMeasurement",
            Self::Custom(name) => name,
        }
    }

    /// Maps a metric name back to its tag; unknown names become `Custom`.
    pub fn from_name(name: &str) -> Self {
        [
            EntityKind::Pod,
            EntityKind::Service,
            EntityKind::Node,
            EntityKind::VolumeClaim,
        ]
        .into_iter()
        .flat_map(|e| [Self::raw(e), Self::quantiles(e)])
        .find(|k| k.name() == name)
        .unwrap_or_else(|| Self::Custom(name.to_owned()))
    }

    /// Raw per-entity latency documents.
    pub fn is_timeseries(&self) -> bool {
        matches!(
            self,
            Self::PodLatency | Self::SvcLatency | Self::NodeLatency | Self::PvcLatency
        )
    }

    /// Per-condition quantile summaries.
    pub fn is_quantiles(&self) -> bool {
        matches!(
            self,
            Self::PodLatencyQuantiles
                | Self::SvcLatencyQuantiles
                | Self::NodeLatencyQuantiles
                | Self::PvcLatencyQuantiles
        )
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for MetricKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
