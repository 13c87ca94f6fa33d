//! Builders and an in-memory cluster for tests.

use crate::gpu::{DEPRECATED_GPU_RESOURCE_NAME, GPU_RESOURCE_NAME};
use crate::trainer::TFJOB_RESOURCE;
use atlas_kube::{ClusterError, ClusterReader, ListFilter, WorkloadResource};
use chrono::{DateTime, Duration, TimeZone, Utc};
use k8s_openapi::api::batch::v1::{Job, JobStatus as BatchJobStatus};
use k8s_openapi::api::core::v1::{
    Container, Event, LoadBalancerIngress, LoadBalancerStatus, Node, NodeAddress, NodeStatus,
    ObjectReference, Pod, PodSpec, PodStatus, ResourceRequirements, Service, ServicePort,
    ServiceSpec, ServiceStatus,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference, Time};
use kube::api::DynamicObject;
use kube::core::ErrorResponse;
use serde_json::json;
use std::collections::BTreeMap;

/// Fixed reference time; `at(n)` is `n` minutes after it.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn meta(name: &str, namespace: Option<&str>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        ..Default::default()
    }
}

fn release_labels(release: &str, app: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("release".to_string(), release.to_string()),
        ("app".to_string(), app.to_string()),
    ])
}

fn gpu_limits(key: &str, count: i64) -> ResourceRequirements {
    ResourceRequirements {
        limits: Some(BTreeMap::from([(
            key.to_string(),
            Quantity(count.to_string()),
        )])),
        ..Default::default()
    }
}

pub struct PodBuilder {
    pod: Pod,
}

impl PodBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            pod: Pod {
                metadata: meta(name, Some("default")),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: "main".to_string(),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
                status: Some(PodStatus::default()),
            },
        }
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.pod.metadata.namespace = Some(namespace.to_string());
        self
    }

    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.pod
            .metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn release(self, release: &str) -> Self {
        self.label("release", release)
    }

    pub fn owner(mut self, kind: &str, name: &str) -> Self {
        self.pod
            .metadata
            .owner_references
            .get_or_insert_with(Vec::new)
            .push(OwnerReference {
                api_version: "batch/v1".to_string(),
                kind: kind.to_string(),
                name: name.to_string(),
                uid: format!("uid-{name}"),
                ..Default::default()
            });
        self
    }

    pub fn created(mut self, time: DateTime<Utc>) -> Self {
        self.pod.metadata.creation_timestamp = Some(Time(time));
        self
    }

    pub fn phase(mut self, phase: &str) -> Self {
        self.status().phase = Some(phase.to_string());
        self
    }

    pub fn host_ip(mut self, ip: &str) -> Self {
        self.status().host_ip = Some(ip.to_string());
        self
    }

    pub fn node(mut self, node: &str) -> Self {
        self.spec().node_name = Some(node.to_string());
        self
    }

    pub fn scheduler(mut self, scheduler: &str) -> Self {
        self.spec().scheduler_name = Some(scheduler.to_string());
        self
    }

    /// GPU limit on the first container under the current key.
    pub fn gpu(mut self, count: i64) -> Self {
        self.merge_limit(GPU_RESOURCE_NAME, count);
        self
    }

    /// GPU limit on the first container under the deprecated key.
    pub fn deprecated_gpu(mut self, count: i64) -> Self {
        self.merge_limit(DEPRECATED_GPU_RESOURCE_NAME, count);
        self
    }

    /// Adds a sidecar container with its own GPU limit.
    pub fn container_gpu(mut self, count: i64) -> Self {
        let spec = self.spec();
        let name = format!("sidecar-{}", spec.containers.len());
        spec.containers.push(Container {
            name,
            resources: Some(gpu_limits(GPU_RESOURCE_NAME, count)),
            ..Default::default()
        });
        self
    }

    pub fn build(self) -> Pod {
        self.pod
    }

    fn spec(&mut self) -> &mut PodSpec {
        self.pod.spec.get_or_insert_with(PodSpec::default)
    }

    fn status(&mut self) -> &mut PodStatus {
        self.pod.status.get_or_insert_with(PodStatus::default)
    }

    fn merge_limit(&mut self, key: &str, count: i64) {
        let container = &mut self.spec().containers[0];
        container
            .resources
            .get_or_insert_with(ResourceRequirements::default)
            .limits
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), Quantity(count.to_string()));
    }
}

pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    /// A batch job named `<release>-<app>` labelled for the release and family.
    pub fn new(release: &str, app: &str) -> Self {
        let mut metadata = meta(&format!("{release}-{app}"), Some("default"));
        metadata.labels = Some(release_labels(release, app));
        Self {
            job: Job {
                metadata,
                ..Default::default()
            },
        }
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.job.metadata.namespace = Some(namespace.to_string());
        self
    }

    pub fn created(mut self, time: DateTime<Utc>) -> Self {
        self.job.metadata.creation_timestamp = Some(Time(time));
        self
    }

    pub fn counts(mut self, active: i32, succeeded: i32, failed: i32) -> Self {
        self.job.status = Some(BatchJobStatus {
            active: Some(active),
            succeeded: Some(succeeded),
            failed: Some(failed),
            ..Default::default()
        });
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

/// A `TFJob` labelled for the release, with the given condition types in order.
pub fn tfjob(release: &str, namespace: &str, conditions: &[&str]) -> DynamicObject {
    let ar = TFJOB_RESOURCE.api_resource();
    let mut obj = DynamicObject::new(release, &ar).within(namespace);
    obj.metadata.labels = Some(release_labels(release, "tfjob"));
    obj.metadata.creation_timestamp = Some(Time(at(0)));
    if !conditions.is_empty() {
        let conditions: Vec<_> = conditions
            .iter()
            .map(|kind| json!({ "type": kind, "status": "True" }))
            .collect();
        obj.data = json!({ "status": { "conditions": conditions } });
    }
    obj
}

pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            node: Node {
                metadata: meta(name, None),
                status: Some(NodeStatus::default()),
                ..Default::default()
            },
        }
    }

    pub fn gpu(self, count: i64) -> Self {
        self.capacity(GPU_RESOURCE_NAME, count)
    }

    pub fn deprecated_gpu(self, count: i64) -> Self {
        self.capacity(DEPRECATED_GPU_RESOURCE_NAME, count)
    }

    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.node
            .metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn address(mut self, kind: &str, address: &str) -> Self {
        self.status()
            .addresses
            .get_or_insert_with(Vec::new)
            .push(NodeAddress {
                type_: kind.to_string(),
                address: address.to_string(),
            });
        self
    }

    pub fn build(self) -> Node {
        self.node
    }

    fn capacity(mut self, key: &str, count: i64) -> Self {
        self.status()
            .capacity
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), Quantity(count.to_string()));
        self
    }

    fn status(&mut self) -> &mut NodeStatus {
        self.node.status.get_or_insert_with(NodeStatus::default)
    }
}

/// A `Pod` event in `default`, created at `at(minutes)`.
pub fn pod_event(pod: &str, kind: &str, reason: &str, message: &str, minutes: i64) -> Event {
    let mut metadata = meta(&format!("{pod}.{reason}"), Some("default"));
    metadata.creation_timestamp = Some(Time(at(minutes)));
    Event {
        metadata,
        involved_object: ObjectReference {
            kind: Some("Pod".to_string()),
            name: Some(pod.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        type_: Some(kind.to_string()),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        ..Default::default()
    }
}

/// A dashboard-style service of the given type exposing port 443.
pub fn service(name: &str, namespace: &str, kind: &str) -> Service {
    Service {
        metadata: meta(name, Some(namespace)),
        spec: Some(ServiceSpec {
            type_: Some(kind.to_string()),
            ports: Some(vec![ServicePort {
                port: 443,
                node_port: (kind == "NodePort").then_some(30443),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status: Some(ServiceStatus::default()),
    }
}

/// Give a LoadBalancer service an ingress IP.
pub fn with_ingress(mut service: Service, ip: &str) -> Service {
    service.status = Some(ServiceStatus {
        load_balancer: Some(LoadBalancerStatus {
            ingress: Some(vec![LoadBalancerIngress {
                ip: Some(ip.to_string()),
                ..Default::default()
            }]),
        }),
        ..Default::default()
    });
    service
}

/// In-memory [`ClusterReader`] that honours `k=v` label selectors, and the
/// `involvedObject.kind=X` field selector on events.
#[derive(Default)]
pub struct FakeCluster {
    pub pods: Vec<Pod>,
    pub jobs: Vec<Job>,
    pub nodes: Vec<Node>,
    pub workloads: Vec<DynamicObject>,
    pub events: Vec<Event>,
    pub services: Vec<Service>,
    /// Answer workload lists with 404, as a cluster without the CRD does.
    pub missing_workload_crd: bool,
    /// Fail every pod list with a server error.
    pub fail_pods: bool,
}

fn api_status(action: &'static str, kind: &str, code: u16) -> ClusterError {
    ClusterError::Api {
        action,
        kind: kind.to_string(),
        source: kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{kind} unavailable"),
            reason: if code == 404 { "NotFound" } else { "InternalError" }.to_string(),
            code,
        }),
    }
}

fn matches(metadata: &ObjectMeta, namespace: Option<&str>, filter: &ListFilter) -> bool {
    if namespace.is_some_and(|ns| metadata.namespace.as_deref() != Some(ns)) {
        return false;
    }
    if let Some(labels) = &filter.labels {
        for pair in labels.split(',') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let actual = metadata.labels.as_ref().and_then(|l| l.get(key));
            if actual.map(String::as_str) != Some(value) {
                return false;
            }
        }
    }
    true
}

fn involved_kind(filter: &ListFilter) -> Option<&str> {
    filter
        .fields
        .as_deref()?
        .split(',')
        .find_map(|pair| pair.strip_prefix("involvedObject.kind="))
}

impl ClusterReader for FakeCluster {
    async fn list_pods(
        &self,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> Result<Vec<Pod>, ClusterError> {
        if self.fail_pods {
            return Err(api_status("list", "pods", 500));
        }
        Ok(self
            .pods
            .iter()
            .filter(|p| matches(&p.metadata, namespace, filter))
            .cloned()
            .collect())
    }

    async fn list_jobs(
        &self,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> Result<Vec<Job>, ClusterError> {
        Ok(self
            .jobs
            .iter()
            .filter(|j| matches(&j.metadata, namespace, filter))
            .cloned()
            .collect())
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError> {
        Ok(self.nodes.clone())
    }

    async fn list_workloads(
        &self,
        resource: &WorkloadResource,
        namespace: Option<&str>,
        filter: &ListFilter,
    ) -> Result<Vec<DynamicObject>, ClusterError> {
        if self.missing_workload_crd {
            return Err(api_status("list", resource.plural, 404));
        }
        Ok(self
            .workloads
            .iter()
            .filter(|w| matches(&w.metadata, namespace, filter))
            .cloned()
            .collect())
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClusterError> {
        self.pods
            .iter()
            .find(|p| {
                p.metadata.namespace.as_deref() == Some(namespace)
                    && p.metadata.name.as_deref() == Some(name)
            })
            .cloned()
            .ok_or_else(|| api_status("get", "pod", 404))
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, ClusterError> {
        self.jobs
            .iter()
            .find(|j| {
                j.metadata.namespace.as_deref() == Some(namespace)
                    && j.metadata.name.as_deref() == Some(name)
            })
            .cloned()
            .ok_or_else(|| api_status("get", "job", 404))
    }

    async fn get_node(&self, name: &str) -> Result<Node, ClusterError> {
        self.nodes
            .iter()
            .find(|n| n.metadata.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| api_status("get", "node", 404))
    }

    async fn list_events(
        &self,
        namespace: &str,
        filter: &ListFilter,
    ) -> Result<Vec<Event>, ClusterError> {
        let kind = involved_kind(filter);
        Ok(self
            .events
            .iter()
            .filter(|e| matches(&e.metadata, Some(namespace), filter))
            .filter(|e| kind.is_none() || e.involved_object.kind.as_deref() == kind)
            .cloned()
            .collect())
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, ClusterError> {
        self.services
            .iter()
            .find(|s| {
                s.metadata.namespace.as_deref() == Some(namespace)
                    && s.metadata.name.as_deref() == Some(name)
            })
            .cloned()
            .ok_or_else(|| api_status("get", "service", 404))
    }
}
