//! Read-only cluster API.

use crate::filter::ListFilter;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Event, Node, Pod, Service};
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind};
use kube::config::{InferConfigError, KubeconfigError};
use kube::Client;
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] KubeconfigError),
    #[error("Failed to infer cluster configuration: {0}")]
    InferConfig(#[from] InferConfigError),
    #[error("Failed to connect to Kubernetes API: {0}")]
    Connection(#[source] kube::Error),
    #[error("Failed to {action} {kind}: {source}")]
    Api {
        action: &'static str,
        kind: String,
        #[source]
        source: kube::Error,
    },
}

impl ClusterError {
    /// Whether the API server answered 404 (missing object or missing resource type).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Api {
                source: kube::Error::Api(response),
                ..
            } if response.code == 404
        )
    }
}

/// Coordinates of a custom workload kind, e.g. `kubeflow.org/v1 TFJob`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadResource {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
}

impl WorkloadResource {
    pub fn api_resource(&self) -> ApiResource {
        ApiResource::from_gvk_with_plural(
            &GroupVersionKind::gvk(self.group, self.version, self.kind),
            self.plural,
        )
    }
}

/// Read access to the cluster.
///
/// `namespace: None` means all namespaces. Lists return every object
/// matching the filter.
pub trait ClusterReader: Send + Sync {
    fn list_pods(
        &self,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> impl Future<Output = Result<Vec<Pod>, ClusterError>> + Send;

    fn list_jobs(
        &self,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> impl Future<Output = Result<Vec<Job>, ClusterError>> + Send;

    fn list_nodes(&self) -> impl Future<Output = Result<Vec<Node>, ClusterError>> + Send;

    fn list_workloads(
        &self,
        resource: &WorkloadResource,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> impl Future<Output = Result<Vec<DynamicObject>, ClusterError>> + Send;

    fn get_pod(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Pod, ClusterError>> + Send;

    fn get_job(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Job, ClusterError>> + Send;

    fn get_node(&self, name: &str) -> impl Future<Output = Result<Node, ClusterError>> + Send;

    /// Events recorded in one namespace.
    fn list_events(
        &self,
        namespace: &str,
        filter: &ListFilter,
    ) -> impl Future<Output = Result<Vec<Event>, ClusterError>> + Send;

    fn get_service(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Service, ClusterError>> + Send;
}

/// [`ClusterReader`] over a live API server.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn scoped<K>(&self, namespace: Option<&str>) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

fn api_error<'a>(
    action: &'static str,
    kind: &'a str,
) -> impl FnOnce(kube::Error) -> ClusterError + 'a {
    move |source| ClusterError::Api {
        action,
        kind: kind.to_string(),
        source,
    }
}

impl ClusterReader for KubeCluster {
    async fn list_pods(
        &self,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> Result<Vec<Pod>, ClusterError> {
        let api: Api<Pod> = self.scoped(namespace);
        let list = api
            .list(&filter.to_list_params())
            .await
            .map_err(api_error("list", "pods"))?;
        Ok(list.items)
    }

    async fn list_jobs(
        &self,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> Result<Vec<Job>, ClusterError> {
        let api: Api<Job> = self.scoped(namespace);
        let list = api
            .list(&filter.to_list_params())
            .await
            .map_err(api_error("list", "jobs"))?;
        Ok(list.items)
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError> {
        let api: Api<Node> = Api::all(self.client.clone());
        let list = api
            .list(&ListFilter::all().to_list_params())
            .await
            .map_err(api_error("list", "nodes"))?;
        Ok(list.items)
    }

    async fn list_workloads(
        &self,
        resource: &WorkloadResource,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> Result<Vec<DynamicObject>, ClusterError> {
        let ar = resource.api_resource();
        let api: Api<DynamicObject> = match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        };
        let list = api
            .list(&filter.to_list_params())
            .await
            .map_err(api_error("list", resource.plural))?;
        Ok(list.items)
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClusterError> {
        let api: Api<Pod> = self.scoped(Some(namespace));
        api.get(name).await.map_err(api_error("get", "pod"))
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, ClusterError> {
        let api: Api<Job> = self.scoped(Some(namespace));
        api.get(name).await.map_err(api_error("get", "job"))
    }

    async fn get_node(&self, name: &str) -> Result<Node, ClusterError> {
        let api: Api<Node> = Api::all(self.client.clone());
        api.get(name).await.map_err(api_error("get", "node"))
    }

    async fn list_events(
        &self,
        namespace: &str,
        filter: &ListFilter,
    ) -> Result<Vec<Event>, ClusterError> {
        let api: Api<Event> = self.scoped(Some(namespace));
        let list = api
            .list(&filter.to_list_params())
            .await
            .map_err(api_error("list", "events"))?;
        Ok(list.items)
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, ClusterError> {
        let api: Api<Service> = self.scoped(Some(namespace));
        api.get(name).await.map_err(api_error("get", "service"))
    }
}
