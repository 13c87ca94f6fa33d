//! Job status derivation.

use crate::types::{JobStatus, TrainingJob, Workload};
use k8s_openapi::api::batch::v1::Job;
use kube::api::DynamicObject;

fn batch_job_status(job: &Job) -> Option<JobStatus> {
    let status = job.status.as_ref()?;
    let status = if status.active.unwrap_or(0) > 0 {
        JobStatus::Running
    } else if status.succeeded.unwrap_or(0) > 0 {
        JobStatus::Succeeded
    } else if status.failed.unwrap_or(0) > 0 {
        JobStatus::Failed
    } else {
        JobStatus::Pending
    };
    Some(status)
}

/// Status of a workload resource from the type of its last condition.
fn condition_status(obj: &DynamicObject) -> Option<JobStatus> {
    let last = obj.data.get("status")?.get("conditions")?.as_array()?.last()?;
    let status = match last.get("type").and_then(|t| t.as_str()) {
        Some("Created") => JobStatus::Pending,
        Some("Running") => JobStatus::Running,
        Some("Succeeded") => JobStatus::Succeeded,
        Some("Failed") => JobStatus::Failed,
        _ => JobStatus::Unknown,
    };
    Some(status)
}

impl TrainingJob {
    /// Status as reported by the workload, before pod phases are considered.
    pub fn raw_status(&self) -> JobStatus {
        let reported = match &self.workload {
            Workload::BatchJob(job) => batch_job_status(job),
            Workload::Custom(obj) => condition_status(obj),
        };
        reported.unwrap_or_else(|| match &self.chief_pod {
            Some(pod) => JobStatus::from_pod_phase(
                pod.status.as_ref().and_then(|s| s.phase.as_deref()),
            ),
            None => JobStatus::Pending,
        })
    }
}

/// Status shown to users.
///
/// Controllers report RUNNING as soon as the workload starts, so a job with
/// any pod still Pending is shown as PENDING. Other statuses pass through.
pub fn corrected_status(job: &TrainingJob) -> JobStatus {
    let status = job.raw_status();
    if status != JobStatus::Running {
        return status;
    }
    let any_pending = job
        .pods
        .iter()
        .any(|pod| pod.status.as_ref().and_then(|s| s.phase.as_deref()) == Some("Pending"));
    if any_pending {
        JobStatus::Pending
    } else {
        status
    }
}
