//! Log viewer links served by the Kubernetes dashboard.

use crate::node::node_internal_ip;
use crate::types::TrainingJob;
use atlas_kube::{ClusterError, ClusterReader};
use k8s_openapi::api::core::v1::{Node, Service};

pub const DASHBOARD_SERVICE: &str = "kubernetes-dashboard";

/// Older installs run the dashboard here instead of the atlas namespace.
pub const LEGACY_DASHBOARD_NAMESPACE: &str = "kube-system";

fn service_type(service: &Service) -> Option<&str> {
    service.spec.as_ref()?.type_.as_deref()
}

/// Externally reachable base URL of a service.
///
/// LoadBalancer services answer on their first ingress, NodePort services on
/// the first node with an internal IP. Other types are not reachable.
pub fn service_url(service: &Service, nodes: &[Node]) -> Option<String> {
    let port = service.spec.as_ref()?.ports.as_ref()?.first()?;
    match service_type(service)? {
        "LoadBalancer" => {
            let ingress = service
                .status
                .as_ref()?
                .load_balancer
                .as_ref()?
                .ingress
                .as_ref()?
                .first()?;
            let host = ingress.ip.as_deref().or(ingress.hostname.as_deref())?;
            Some(format!("http://{}:{}", host, port.port))
        }
        "NodePort" => {
            let node_port = port.node_port?;
            let ip = nodes.iter().find_map(node_internal_ip)?;
            Some(format!("http://{ip}:{node_port}"))
        }
        _ => None,
    }
}

/// Base URL of the dashboard in `namespace`, or in kube-system when it is
/// not there. `None` when neither has a reachable dashboard service.
pub async fn dashboard_url<C: ClusterReader>(
    cluster: &C,
    namespace: &str,
) -> Result<Option<String>, ClusterError> {
    for ns in [namespace, LEGACY_DASHBOARD_NAMESPACE] {
        let service = match cluster.get_service(ns, DASHBOARD_SERVICE).await {
            Ok(service) => service,
            Err(e) if e.is_not_found() => {
                tracing::debug!("No {} service in {}", DASHBOARD_SERVICE, ns);
                continue;
            }
            Err(e) => return Err(e),
        };
        let nodes = if service_type(&service) == Some("NodePort") {
            cluster.list_nodes().await?
        } else {
            Vec::new()
        };
        return Ok(service_url(&service, &nodes));
    }
    Ok(None)
}

/// Dashboard log page of the chief pod's first container.
pub fn log_url(dashboard: &str, job: &TrainingJob) -> Option<String> {
    let chief = job.chief_pod()?;
    let pod = chief.metadata.name.as_deref()?;
    let container = chief.spec.as_ref()?.containers.first()?;
    Some(format!(
        "{dashboard}/#!/log/{ns}/{pod}/{container}?namespace={ns}",
        ns = job.namespace,
        container = container.name
    ))
}

/// Log viewer links of a job.
///
/// Empty when no dashboard is installed or the job has no chief pod yet.
pub async fn job_dashboards<C: ClusterReader>(
    cluster: &C,
    namespace: &str,
    job: &TrainingJob,
) -> Result<Vec<String>, ClusterError> {
    let Some(dashboard) = dashboard_url(cluster, namespace).await? else {
        return Ok(Vec::new());
    };
    Ok(log_url(&dashboard, job).into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FakeCluster, JobBuilder, NodeBuilder, PodBuilder, at, service, with_ingress};
    use crate::trainer::resolve;

    fn horovod(services: Vec<Service>) -> FakeCluster {
        FakeCluster {
            pods: vec![
                PodBuilder::new("foo-launcher")
                    .release("foo")
                    .owner("Job", "foo-tf-horovod")
                    .created(at(1))
                    .build(),
            ],
            jobs: vec![JobBuilder::new("foo", "tf-horovod").counts(1, 0, 0).build()],
            nodes: vec![
                NodeBuilder::new("n0").build(),
                NodeBuilder::new("n1").address("InternalIP", "10.0.0.5").build(),
            ],
            services,
            ..Default::default()
        }
    }

    #[test]
    fn test_service_url() {
        let lb = with_ingress(service(DASHBOARD_SERVICE, "atlas-system", "LoadBalancer"), "1.2.3.4");
        assert_eq!(service_url(&lb, &[]).as_deref(), Some("http://1.2.3.4:443"));

        // No ingress assigned yet
        let pending_lb = service(DASHBOARD_SERVICE, "atlas-system", "LoadBalancer");
        assert!(service_url(&pending_lb, &[]).is_none());

        let nodes = vec![NodeBuilder::new("n1").address("InternalIP", "10.0.0.5").build()];
        let np = service(DASHBOARD_SERVICE, "atlas-system", "NodePort");
        assert_eq!(
            service_url(&np, &nodes).as_deref(),
            Some("http://10.0.0.5:30443")
        );
        assert!(service_url(&np, &[]).is_none());

        let internal = service(DASHBOARD_SERVICE, "atlas-system", "ClusterIP");
        assert!(service_url(&internal, &nodes).is_none());
    }

    #[tokio::test]
    async fn test_job_dashboards() {
        let cluster = horovod(vec![service(DASHBOARD_SERVICE, "atlas-system", "NodePort")]);
        let job = resolve(&cluster, "foo", "default").await.unwrap();

        let urls = job_dashboards(&cluster, "atlas-system", &job).await.unwrap();
        assert_eq!(
            urls,
            vec!["http://10.0.0.5:30443/#!/log/default/foo-launcher/main?namespace=default"]
        );
    }

    #[tokio::test]
    async fn test_dashboard_falls_back_to_kube_system() {
        let lb = with_ingress(service(DASHBOARD_SERVICE, "kube-system", "LoadBalancer"), "1.2.3.4");
        let cluster = horovod(vec![lb]);
        let url = dashboard_url(&cluster, "atlas-system").await.unwrap();
        assert_eq!(url.as_deref(), Some("http://1.2.3.4:443"));
    }

    #[tokio::test]
    async fn test_no_dashboard_or_no_chief() {
        let cluster = horovod(vec![]);
        let job = resolve(&cluster, "foo", "default").await.unwrap();
        assert!(job_dashboards(&cluster, "atlas-system", &job).await.unwrap().is_empty());

        let mut job = job;
        job.chief_pod = None;
        assert!(log_url("http://1.2.3.4:443", &job).is_none());
    }
}
