//! Subcommand implementations.

use crate::display;
use atlas_cli::OutputFormat;
use atlas_helm::{HelmReleaseStore, ReleaseStore};
use atlas_kube::{KubeCluster, init_kube_client};
use atlas_state::{
    ClusterSnapshot, JobStatus, TrainingJob, cluster_gpu_totals, corrected_status, job_dashboards,
    job_events, node_infos, order_by_age, order_by_gpu, resolve, resolve_all,
};
use chrono::Utc;
use miette::{IntoDiagnostic, Result, WrapErr, bail};
use std::path::PathBuf;

/// Connection settings shared by every subcommand.
pub struct Session {
    pub store: HelmReleaseStore,
    pub kubeconfig: Option<PathBuf>,
    pub namespace: Option<String>,
    /// Where the atlas system services run
    pub system_namespace: String,
}

impl Session {
    /// Connect to the cluster and settle the target namespace.
    async fn connect(&self) -> Result<(KubeCluster, String)> {
        let context = init_kube_client(self.kubeconfig.clone())
            .await
            .into_diagnostic()
            .wrap_err("Failed to connect to the cluster")?;
        let namespace = self
            .namespace
            .clone()
            .unwrap_or(context.default_namespace);
        tracing::debug!("Using namespace {}", namespace);
        Ok((KubeCluster::new(context.client), namespace))
    }

    /// Every installed release resolved against one cluster-wide snapshot.
    async fn all_jobs(&self) -> Result<Vec<TrainingJob>> {
        let (cluster, _) = self.connect().await?;
        let releases = self.store.list().await.into_diagnostic()?;
        tracing::debug!("Found {} releases", releases.len());
        let snapshot = ClusterSnapshot::fetch_all(&cluster).await.into_diagnostic()?;
        resolve_all(&snapshot, &releases).into_diagnostic()
    }

    /// Resolve one installed release, failing when it is not installed.
    async fn installed_job(&self, name: &str) -> Result<(KubeCluster, TrainingJob)> {
        let exists = self.store.exists(name).await.into_diagnostic()?;
        if !exists {
            bail!(
                "The job {} doesn't exist, please create it first",
                name
            );
        }

        let (cluster, namespace) = self.connect().await?;
        let job = resolve(&cluster, name, &namespace).await.into_diagnostic()?;
        Ok((cluster, job))
    }
}

pub async fn list(session: &Session) -> Result<()> {
    let jobs = order_by_age(session.all_jobs().await?);
    println!("{}", display::job_list_table(&jobs, Utc::now()));
    Ok(())
}

pub async fn get(session: &Session, name: &str, output: OutputFormat) -> Result<()> {
    let (cluster, job) = session.installed_job(name).await?;
    match output {
        OutputFormat::Name => println!("{}", job.name),
        OutputFormat::Wide => {
            println!("{}", display::job_pods_table(&job, Utc::now()));
            if corrected_status(&job) == JobStatus::Pending {
                let events = job_events(&cluster, &job).await.into_diagnostic()?;
                println!();
                println!("Events:");
                println!("{}", display::pod_events_table(&events, Utc::now()));
            }
        }
    }
    Ok(())
}

pub async fn logviewer(session: &Session, name: &str) -> Result<()> {
    let (cluster, job) = session.installed_job(name).await?;
    let urls = job_dashboards(&cluster, &session.system_namespace, &job)
        .await
        .into_diagnostic()?;
    if urls.is_empty() {
        bail!("No log viewer is available for job {}", name);
    }
    println!("Your LogViewer will be available on:");
    for url in urls {
        println!("{url}");
    }
    Ok(())
}

pub async fn top_job(session: &Session) -> Result<()> {
    let jobs = order_by_gpu(session.all_jobs().await?);
    println!("{}", display::job_gpu_table(&jobs, Utc::now()));
    println!();
    println!("{}", display::job_gpu_totals(&jobs));
    Ok(())
}

pub async fn top_node(session: &Session, details: bool) -> Result<()> {
    let (cluster, _) = session.connect().await?;
    let infos = node_infos(&cluster).await.into_diagnostic()?;
    let totals = cluster_gpu_totals(&infos);
    tracing::debug!("gpu: {}, allocated GPUs {}", totals.total, totals.allocated);

    if details {
        for info in &infos {
            println!("{}", display::node_details(info));
        }
    } else {
        println!("{}", display::node_summary_table(&infos));
    }
    println!("Allocated/Total GPUs In Cluster:");
    println!("{}", display::usage_line(totals));
    Ok(())
}

pub async fn delete(session: &Session, names: &[String]) -> Result<()> {
    for name in names {
        session
            .store
            .delete(name)
            .await
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to delete {name}"))?;
        tracing::info!("Deleted job {}", name);
    }
    Ok(())
}
