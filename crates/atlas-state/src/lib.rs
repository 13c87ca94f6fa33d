//! Training job reconciliation for atlas.
//!
//! Turns releases, batch jobs, workload resources, and pods into typed
//! training jobs, and aggregates GPU usage per pod, node, and cluster.
//! Also finds the events and log viewer links used to diagnose a job.

pub mod dashboard;
pub mod error;
pub mod events;
pub mod gpu;
pub mod node;
pub mod order;
pub mod snapshot;
pub mod status;
pub mod trainer;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use dashboard::{dashboard_url, job_dashboards, log_url, service_url};
pub use error::StateError;
pub use events::{PodEvents, event_time, job_events, pending_pod_events};
pub use gpu::{
    DEPRECATED_GPU_RESOURCE_NAME, GPU_RESOURCE_NAME, gpu_in_active_pod, gpu_in_container,
    gpu_in_node, gpu_in_pod, gpu_pods,
};
pub use node::{
    ClusterGpu, NodeDescriber, NodeInfo, calculate_node_gpu, cluster_gpu_totals, node_infos,
    node_internal_ip,
};
pub use order::{order_by_age, order_by_gpu};
pub use snapshot::ClusterSnapshot;
pub use status::corrected_status;
pub use trainer::{Trainer, Trainers, resolve, resolve_all};
pub use types::{JobStatus, TrainerType, TrainingJob, Workload};
