use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ClusterError;

/// Delay between two pod status lookups.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lifecycle phase reported for a pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

/// The cluster API calls the measurement helpers rely on.
pub trait ClusterClient: Send + Sync {
    fn create_namespace(&self, name: &str) -> impl Future<Output = Result<(), ClusterError>> + Send;

    fn create_pod(&self, pod: &PodTemplate) -> impl Future<Output = Result<(), ClusterError>> + Send;

    fn pod_phase(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<PodPhase, ClusterError>> + Send;
}

// ─── Pod template ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImagePullPolicy {
    Always,
    IfNotPresent,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeccompProfile {
    RuntimeDefault,
    Unconfined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    pub allow_privilege_escalation: bool,
    pub drop_capabilities: Vec<String>,
    pub run_as_non_root: bool,
    pub run_as_user: i64,
    pub seccomp_profile: SeccompProfile,
}

/// Single-container helper pod deployed next to the workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplate {
    pub namespace: String,
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub termination_grace_period_seconds: i64,
    pub image_pull_policy: ImagePullPolicy,
    pub security_context: SecurityContext,
}

impl PodTemplate {
    /// Unprivileged pod: uid 1000, every capability dropped, runtime default
    /// seccomp, no grace period on deletion.
    pub fn hardened(
        namespace: impl Into<String>,
        name: impl Into<String>,
        image: impl Into<String>,
        command: Vec<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            image: image.into(),
            command,
            termination_grace_period_seconds: 0,
            image_pull_policy: ImagePullPolicy::Always,
            security_context: SecurityContext {
                allow_privilege_escalation: false,
                drop_capabilities: vec!["ALL".to_owned()],
                run_as_non_root: true,
                run_as_user: 1000,
                seccomp_profile: SeccompProfile::RuntimeDefault,
            },
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Create the pod's namespace and the pod, then wait until it is running.
///
/// Existing objects are reused. The first failed status lookup ends the wait
/// and is returned as is; cancelling `cancel` ends it with
/// `ClusterError::Cancelled`.
pub async fn deploy_pod_in_namespace<C: ClusterClient>(
    client: &C,
    pod: &PodTemplate,
    cancel: &CancellationToken,
) -> Result<(), ClusterError> {
    match client.create_namespace(&pod.namespace).await {
        Ok(()) | Err(ClusterError::AlreadyExists(_)) => {}
        Err(err) => return Err(err),
    }
    match client.create_pod(pod).await {
        Ok(()) => {}
        Err(err @ ClusterError::AlreadyExists(_)) => warn!("{err}"),
        Err(err) => return Err(err),
    }

    // first tick completes immediately
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    // a slow lookup pushes the next one back instead of bunching them up
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Err(ClusterError::Cancelled),
            _ = ticker.tick() => {}
        }
        let phase = client.pod_phase(&pod.namespace, &pod.name).await?;
        if phase == PodPhase::Running {
            return Ok(());
        }
        debug!(namespace = %pod.namespace, pod = %pod.name, ?phase, "Waiting for pod");
    }
}

/// Integer value of `key` in `labels`, or 0 when absent or malformed.
pub fn int_from_labels(labels: &HashMap<String, String>, key: &str) -> i64 {
    labels
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
