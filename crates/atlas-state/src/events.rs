//! Events of pods that have not started, shown for pending jobs.

use crate::types::TrainingJob;
use atlas_kube::{ClusterError, ClusterReader, ListFilter};
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Event, Pod};

/// Events recorded against one pod.
#[derive(Debug, Clone, PartialEq)]
pub struct PodEvents {
    pub pod: String,
    pub events: Vec<Event>,
}

fn is_started(pod: &Pod) -> bool {
    matches!(
        pod.status.as_ref().and_then(|s| s.phase.as_deref()),
        Some("Running") | Some("Succeeded")
    )
}

fn involves(event: &Event, pod: &str) -> bool {
    event.involved_object.kind.as_deref() == Some("Pod")
        && event.involved_object.name.as_deref() == Some(pod)
}

/// When the event was first recorded.
pub fn event_time(event: &Event) -> Option<DateTime<Utc>> {
    event
        .metadata
        .creation_timestamp
        .as_ref()
        .or(event.first_timestamp.as_ref())
        .map(|t| t.0)
}

/// Group `events` under the pods that are neither running nor succeeded.
///
/// Pods keep their order in `pods` and events their order in `events`. A
/// pod without events still gets an (empty) entry.
pub fn pending_pod_events(pods: &[Pod], events: &[Event]) -> Vec<PodEvents> {
    pods.iter()
        .filter(|pod| !is_started(pod))
        .map(|pod| {
            let name = pod.metadata.name.clone().unwrap_or_default();
            let events = events
                .iter()
                .filter(|event| involves(event, &name))
                .cloned()
                .collect();
            PodEvents { pod: name, events }
        })
        .collect()
}

/// Events of the job's pods that have not started, read from the job's namespace.
pub async fn job_events<C: ClusterReader>(
    cluster: &C,
    job: &TrainingJob,
) -> Result<Vec<PodEvents>, ClusterError> {
    let events = cluster
        .list_events(&job.namespace, &ListFilter::pod_events())
        .await?;
    tracing::debug!("Found {} pod events in {}", events.len(), job.namespace);
    Ok(pending_pod_events(&job.pods, &events))
}
