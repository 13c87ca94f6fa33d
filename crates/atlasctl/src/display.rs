//! Table rendering for command output.

use atlas_parsers::{non_empty_string, short_human_duration};
use atlas_state::{
    ClusterGpu, NodeInfo, PodEvents, TrainingJob, corrected_status, event_time, gpu_in_pod,
};
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use k8s_openapi::api::core::v1::Pod;

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    table
}

fn job_row(job: &TrainingJob, now: DateTime<Utc>) -> Vec<String> {
    vec![
        job.name.clone(),
        corrected_status(job).to_string(),
        job.trainer_type.as_str().to_uppercase(),
        job.age(now),
        job.host_ip_of_chief(),
    ]
}

/// `list` output.
pub fn job_list_table(jobs: &[TrainingJob], now: DateTime<Utc>) -> Table {
    let mut table = table(&["NAME", "STATUS", "TRAINER", "AGE", "NODE"]);
    for job in jobs {
        table.add_row(job_row(job, now));
    }
    table
}

/// `top job` output, with requested and allocated GPUs per job.
pub fn job_gpu_table(jobs: &[TrainingJob], now: DateTime<Utc>) -> Table {
    let mut table = table(&[
        "NAME",
        "STATUS",
        "TRAINER",
        "AGE",
        "NODE",
        "GPU(Requests)",
        "GPU(Allocated)",
    ]);
    for job in jobs {
        let mut row = job_row(job, now);
        row.push(job.requested_gpu().to_string());
        row.push(job.allocated_gpu().to_string());
        table.add_row(row);
    }
    table
}

/// Totals printed under the `top job` table.
pub fn job_gpu_totals(jobs: &[TrainingJob]) -> String {
    let requested: i64 = jobs.iter().map(TrainingJob::requested_gpu).sum();
    let allocated: i64 = jobs.iter().map(TrainingJob::allocated_gpu).sum();
    format!(
        "Total Allocated GPUs of Training Job: {allocated}\nTotal Requested GPUs of Training Job: {requested}"
    )
}

fn pod_phase(pod: &Pod) -> &str {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("Unknown")
}

/// `get` output: one row per pod of the job.
pub fn job_pods_table(job: &TrainingJob, now: DateTime<Utc>) -> Table {
    let mut table = table(&["NAME", "STATUS", "TRAINER", "AGE", "INSTANCE", "NODE"]);
    let trainer = job.trainer_type.as_str().to_uppercase();
    let age = job.age(now);
    for pod in &job.pods {
        let phase = pod_phase(pod);
        let host_ip = if phase == "Running" {
            pod.status
                .as_ref()
                .and_then(|s| s.host_ip.as_deref())
                .and_then(non_empty_string)
        } else {
            None
        };
        table.add_row(vec![
            job.name.clone(),
            phase.to_uppercase(),
            trainer.clone(),
            age.clone(),
            pod.metadata.name.clone().unwrap_or_default(),
            host_ip.unwrap_or_else(|| "N/A".to_string()),
        ]);
    }
    table
}

/// Events of the pods a pending job is waiting on.
pub fn pod_events_table(pods: &[PodEvents], now: DateTime<Utc>) -> Table {
    let mut table = table(&["INSTANCE", "TYPE", "AGE", "MESSAGE"]);
    for entry in pods {
        for event in &entry.events {
            let age = event_time(event)
                .map(|t| short_human_duration(now - t))
                .unwrap_or_else(|| "N/A".to_string());
            table.add_row(vec![
                entry.pod.clone(),
                event.type_.clone().unwrap_or_default(),
                age,
                format!(
                    "[{}] {}",
                    event.reason.as_deref().unwrap_or_default(),
                    event.message.as_deref().unwrap_or_default()
                ),
            ]);
        }
    }
    table
}

/// `allocated/total (pct%)`
pub fn usage_line(gpu: ClusterGpu) -> String {
    format!("{}/{} ({}%)", gpu.allocated, gpu.total, gpu.usage_percent())
}

/// `top node` summary.
pub fn node_summary_table(infos: &[NodeInfo]) -> Table {
    let mut table = table(&["NAME", "IPADDRESS", "ROLE", "GPU(Total)", "GPU(Allocated)"]);
    for info in infos {
        let gpu = info.gpu();
        table.add_row(vec![
            info.name().to_string(),
            info.internal_ip().to_string(),
            info.role_display(),
            gpu.total.to_string(),
            gpu.allocated.to_string(),
        ]);
    }
    table
}

/// `top node -d` block for one node.
pub fn node_details(info: &NodeInfo) -> String {
    let gpu = info.gpu();
    let mut out = format!(
        "NAME:      {}\nIPADDRESS: {}\nROLE:      {}\n",
        info.name(),
        info.internal_ip(),
        info.role_display()
    );

    let pods = info.gpu_pods();
    if !pods.is_empty() {
        let mut table = table(&["NAMESPACE", "NAME", "GPU REQUESTS", "GPU LIMITS"]);
        for pod in pods {
            let gpus = gpu_in_pod(pod).to_string();
            table.add_row(vec![
                pod.metadata.namespace.clone().unwrap_or_default(),
                pod.metadata.name.clone().unwrap_or_default(),
                gpus.clone(),
                gpus,
            ]);
        }
        out.push_str(&format!("\n{table}\n"));
    }

    out.push_str(&format!(
        "Total GPUs In Node {}: {}\nAllocated GPUs In Node {}: {} ({}%)\n",
        info.name(),
        gpu.total,
        info.name(),
        gpu.allocated,
        gpu.usage_percent()
    ));
    out
}
