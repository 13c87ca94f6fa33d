//! Point-in-time view of the cluster objects resolution reads.

use crate::trainer::TFJOB_RESOURCE;
use atlas_kube::{ClusterError, ClusterReader, ListFilter};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;

/// Pods, batch jobs, and workload resources fetched once per command.
///
/// Resolution only ever reads a snapshot, so a cluster-wide snapshot and a
/// release-scoped one produce the same job for the same release.
#[derive(Debug, Clone, Default)]
pub struct ClusterSnapshot {
    pods: Vec<Pod>,
    jobs: Vec<Job>,
    workloads: Vec<DynamicObject>,
}

fn label<'a>(metadata: &'a ObjectMeta, key: &str) -> Option<&'a str> {
    metadata.labels.as_ref()?.get(key).map(String::as_str)
}

fn in_release(metadata: &ObjectMeta, name: &str, namespace: &str) -> bool {
    label(metadata, "release") == Some(name) && metadata.namespace.as_deref() == Some(namespace)
}

fn in_family(metadata: &ObjectMeta, name: &str, namespace: &str, app: &str) -> bool {
    in_release(metadata, name, namespace) && label(metadata, "app") == Some(app)
}

/// TFJob lists fail with 404 when the CRD is not installed; that just means none exist.
async fn list_tfjobs<C: ClusterReader>(
    cluster: &C,
    namespace: Option<&str>,
    filter: &ListFilter,
) -> Result<Vec<DynamicObject>, ClusterError> {
    match cluster.list_workloads(&TFJOB_RESOURCE, namespace, filter).await {
        Ok(workloads) => Ok(workloads),
        Err(e) if e.is_not_found() => {
            tracing::debug!("{} are not served by this cluster", TFJOB_RESOURCE.plural);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

impl ClusterSnapshot {
    pub fn new(pods: Vec<Pod>, jobs: Vec<Job>, workloads: Vec<DynamicObject>) -> Self {
        Self {
            pods,
            jobs,
            workloads,
        }
    }

    /// Everything in every namespace, for resolving many releases at once.
    pub async fn fetch_all<C: ClusterReader>(cluster: &C) -> Result<Self, ClusterError> {
        let filter = ListFilter::all();
        let pods = cluster.list_pods(None, &filter).await?;
        let jobs = cluster.list_jobs(None, &filter).await?;
        let workloads = list_tfjobs(cluster, None, &filter).await?;
        tracing::debug!(
            "Fetched {} pods, {} jobs, {} workloads cluster-wide",
            pods.len(),
            jobs.len(),
            workloads.len()
        );
        Ok(Self::new(pods, jobs, workloads))
    }

    /// Only the objects labelled `release=<name>` in `namespace`.
    pub async fn fetch_release<C: ClusterReader>(
        cluster: &C,
        name: &str,
        namespace: &str,
    ) -> Result<Self, ClusterError> {
        let filter = ListFilter::release(name);
        let pods = cluster.list_pods(Some(namespace), &filter).await?;
        let jobs = cluster.list_jobs(Some(namespace), &filter).await?;
        let workloads = list_tfjobs(cluster, Some(namespace), &filter).await?;
        Ok(Self::new(pods, jobs, workloads))
    }

    pub fn pods(&self) -> &[Pod] {
        &self.pods
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn workloads(&self) -> &[DynamicObject] {
        &self.workloads
    }

    /// Pods of a release, in snapshot order.
    pub fn release_pods(&self, name: &str, namespace: &str) -> Vec<&Pod> {
        self.pods
            .iter()
            .filter(|pod| in_release(&pod.metadata, name, namespace))
            .collect()
    }

    /// First batch job labelled for the release and family.
    pub fn find_job(&self, name: &str, namespace: &str, app: &str) -> Option<&Job> {
        self.jobs
            .iter()
            .find(|job| in_family(&job.metadata, name, namespace, app))
    }

    /// First workload resource labelled for the release and family.
    pub fn find_workload(&self, name: &str, namespace: &str, app: &str) -> Option<&DynamicObject> {
        self.workloads
            .iter()
            .find(|obj| in_family(&obj.metadata, name, namespace, app))
    }
}
