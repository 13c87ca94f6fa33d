//! Chief pod selection.

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;

/// Release pods split into workers and the chosen chief.
#[derive(Debug, Clone, Default)]
pub struct PodSet {
    pub workers: Vec<Pod>,
    pub chief: Option<Pod>,
}

impl PodSet {
    /// Workers followed by the chief, if any.
    pub fn into_pods(self) -> (Option<Pod>, Vec<Pod>) {
        let mut pods = self.workers;
        if let Some(chief) = &self.chief {
            pods.push(chief.clone());
        }
        (self.chief, pods)
    }
}

fn is_owned_by(pod: &Pod, owner_kind: &str) -> bool {
    pod.metadata
        .owner_references
        .as_ref()
        .is_some_and(|owners| owners.iter().any(|o| o.kind == owner_kind))
}

fn created(pod: &Pod) -> Option<DateTime<Utc>> {
    pod.metadata.creation_timestamp.as_ref().map(|t| t.0)
}

/// The newest pod owned by an `owner_kind` resource.
///
/// Equal timestamps keep the first candidate seen, and a missing timestamp
/// sorts before any real one.
pub fn latest_owned<'a>(
    pods: impl IntoIterator<Item = &'a Pod>,
    owner_kind: &str,
) -> Option<&'a Pod> {
    let mut latest: Option<&'a Pod> = None;
    for pod in pods {
        if !is_owned_by(pod, owner_kind) {
            continue;
        }
        if latest.is_none_or(|current| created(current) < created(pod)) {
            latest = Some(pod);
        }
    }
    latest
}

/// Split pods into workers and a chief, the newest pod owned by an
/// `owner_kind` resource.
///
/// Pods without such an owner are workers. Owned pods other than the chief
/// are left out of the set.
pub fn select_chief<'a>(pods: impl IntoIterator<Item = &'a Pod>, owner_kind: &str) -> PodSet {
    let pods: Vec<&Pod> = pods.into_iter().collect();
    let chief = latest_owned(pods.iter().copied(), owner_kind);
    if let Some(chief) = chief {
        tracing::debug!(
            "Set pod {} as chief",
            chief.metadata.name.as_deref().unwrap_or_default()
        );
    }
    PodSet {
        workers: pods
            .into_iter()
            .filter(|pod| !is_owned_by(pod, owner_kind))
            .cloned()
            .collect(),
        chief: chief.cloned(),
    }
}
