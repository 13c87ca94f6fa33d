//! Training job types.

use crate::gpu::{gpu_in_active_pod, gpu_in_pod};
use atlas_parsers::short_human_duration;
use chrono::{DateTime, Utc};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;
use std::fmt;

/// Job family. Each family is recognised by its `app=<tag>` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainerType {
    Standalone,
    Horovod,
    Mpi,
    TensorFlow,
}

impl TrainerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standalone => "Standalone",
            Self::Horovod => "Horovod",
            Self::Mpi => "MPI",
            Self::TensorFlow => "TensorFlow",
        }
    }

    /// Value of the `app` label the family's chart puts on its workload.
    pub fn app_label(&self) -> &'static str {
        match self {
            Self::Standalone => "training",
            Self::Horovod => "tf-horovod",
            Self::Mpi => "mpijob",
            Self::TensorFlow => "tfjob",
        }
    }
}

impl fmt::Display for TrainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job status as displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Map a pod phase (`Pending`, `Running`, ...) to a status.
    pub fn from_pod_phase(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => Self::Pending,
            Some("Running") => Self::Running,
            Some("Succeeded") => Self::Succeeded,
            Some("Failed") => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resource a training job is built around.
#[derive(Debug, Clone)]
pub enum Workload {
    /// A `batch/v1` Job.
    BatchJob(Box<Job>),
    /// A custom workload resource such as a `TFJob`.
    Custom(Box<DynamicObject>),
}

impl Workload {
    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::BatchJob(job) => &job.metadata,
            Self::Custom(obj) => &obj.metadata,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn batch_job(&self) -> Option<&Job> {
        match self {
            Self::BatchJob(job) => Some(job),
            Self::Custom(_) => None,
        }
    }

    pub fn creation_timestamp(&self) -> Option<DateTime<Utc>> {
        self.metadata().creation_timestamp.as_ref().map(|t| t.0)
    }
}

/// A training job resolved from one release.
///
/// Built fresh on every resolution and never updated afterwards. When
/// `chief_pod` is set it is also one of `pods`: the last element for batch
/// job families, wherever it falls in release order for TensorFlow jobs.
///
/// `chief_pod` can be `None` while `pods` is not empty. That happens when a
/// batch job family has worker pods but its job has not created a pod yet;
/// such a job is treated as not yet scheduled.
#[derive(Debug, Clone)]
pub struct TrainingJob {
    /// Release name
    pub name: String,

    /// Release namespace
    pub namespace: String,

    /// Family that recognised the release
    pub trainer_type: TrainerType,

    /// Underlying batch job or workload resource
    pub workload: Workload,

    /// Primary pod; `None` until a job-owned pod has been created
    pub chief_pod: Option<Pod>,

    /// Every pod of the job, chief included
    pub pods: Vec<Pod>,

    /// Whether the pods are placed by a gang scheduler
    pub gang_scheduled: bool,
}

impl TrainingJob {
    pub fn chief_pod(&self) -> Option<&Pod> {
        self.chief_pod.as_ref()
    }

    pub fn batch_job(&self) -> Option<&Job> {
        self.workload.batch_job()
    }

    /// Creation time of the chief pod, or of the workload when there is no chief.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.chief_pod
            .as_ref()
            .and_then(|pod| pod.metadata.creation_timestamp.as_ref())
            .map(|t| t.0)
            .or_else(|| self.workload.creation_timestamp())
    }

    /// Age relative to `now`, formatted for display.
    pub fn age(&self, now: DateTime<Utc>) -> String {
        match self.created_at() {
            Some(created) => short_human_duration(now - created),
            None => "N/A".to_string(),
        }
    }

    /// Host IP of the chief pod while the job is running.
    pub fn host_ip_of_chief(&self) -> String {
        if self.raw_status() != JobStatus::Running {
            return "N/A".to_string();
        }
        self.chief_pod
            .as_ref()
            .and_then(|pod| pod.status.as_ref())
            .and_then(|status| status.host_ip.clone())
            .filter(|ip| !ip.is_empty())
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// GPUs requested by every pod of the job, whatever its phase.
    pub fn requested_gpu(&self) -> i64 {
        self.pods.iter().map(gpu_in_pod).sum()
    }

    /// GPUs held by pods that are bound to a node and not yet finished.
    pub fn allocated_gpu(&self) -> i64 {
        self.pods
            .iter()
            .filter(|pod| {
                pod.spec
                    .as_ref()
                    .and_then(|spec| spec.node_name.as_deref())
                    .is_some_and(|node| !node.is_empty())
            })
            .map(gpu_in_active_pod)
            .sum()
    }
}
