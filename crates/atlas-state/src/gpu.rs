//! GPU figures for containers, pods, and nodes.
//!
//! Every figure reads the current resource key first and falls back to the
//! deprecated one, so clusters on either side of the rename report correctly.

use atlas_parsers::quantity_value;
use k8s_openapi::api::core::v1::{Container, Node, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

pub const GPU_RESOURCE_NAME: &str = "nvidia.com/gpu";
pub const DEPRECATED_GPU_RESOURCE_NAME: &str = "alpha.kubernetes.io/nvidia-gpu";

fn gpu_in_resources(resources: Option<&BTreeMap<String, Quantity>>) -> i64 {
    let Some(resources) = resources else {
        return 0;
    };
    resources
        .get(GPU_RESOURCE_NAME)
        .or_else(|| resources.get(DEPRECATED_GPU_RESOURCE_NAME))
        .map(|q| quantity_value(q).max(0))
        .unwrap_or(0)
}

/// GPU limit of a single container.
pub fn gpu_in_container(container: &Container) -> i64 {
    gpu_in_resources(
        container
            .resources
            .as_ref()
            .and_then(|r| r.limits.as_ref()),
    )
}

/// GPU limits summed over the pod's containers, whatever the pod phase.
pub fn gpu_in_pod(pod: &Pod) -> i64 {
    pod.spec
        .as_ref()
        .map(|spec| spec.containers.iter().map(gpu_in_container).sum())
        .unwrap_or(0)
}

/// Like [`gpu_in_pod`] but zero once the pod has succeeded or failed.
pub fn gpu_in_active_pod(pod: &Pod) -> i64 {
    let phase = pod.status.as_ref().and_then(|s| s.phase.as_deref());
    if matches!(phase, Some("Succeeded") | Some("Failed")) {
        return 0;
    }
    gpu_in_pod(pod)
}

/// GPU capacity of a node.
pub fn gpu_in_node(node: &Node) -> i64 {
    gpu_in_resources(node.status.as_ref().and_then(|s| s.capacity.as_ref()))
}

/// Pods with a non-zero GPU figure.
pub fn gpu_pods(pods: &[Pod]) -> Vec<&Pod> {
    pods.iter().filter(|pod| gpu_in_pod(pod) > 0).collect()
}
