//! Node and cluster GPU aggregation.

use crate::gpu::{gpu_in_node, gpu_in_pod, gpu_pods};
use atlas_kube::{ClusterError, ClusterReader, ListFilter};
use k8s_openapi::api::core::v1::{Node, Pod};
use std::collections::BTreeSet;
use std::ops::Add;

const NODE_ROLE_PREFIX: &str = "node-role.kubernetes.io/";
const LEGACY_ROLE_LABEL: &str = "kubernetes.io/role";

/// Total and allocated GPUs for a node or the whole cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterGpu {
    pub total: i64,
    pub allocated: i64,
}

impl ClusterGpu {
    /// Allocated share of total as a truncated percentage; 0 with no GPUs.
    pub fn usage_percent(&self) -> i64 {
        if self.total == 0 {
            return 0;
        }
        self.allocated * 100 / self.total
    }
}

impl Add for ClusterGpu {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            allocated: self.allocated + other.allocated,
        }
    }
}

/// First `InternalIP` address of a node.
pub fn node_internal_ip(node: &Node) -> Option<&str> {
    node.status
        .as_ref()?
        .addresses
        .as_ref()?
        .iter()
        .find(|a| a.type_ == "InternalIP")
        .map(|a| a.address.as_str())
}

/// A node and the pods scheduled onto it.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub node: Node,
    pub pods: Vec<Pod>,
}

impl NodeInfo {
    pub fn name(&self) -> &str {
        self.node.metadata.name.as_deref().unwrap_or_default()
    }

    /// First `InternalIP` address, or "unknown".
    pub fn internal_ip(&self) -> &str {
        node_internal_ip(&self.node).unwrap_or("unknown")
    }

    /// Roles from `node-role.kubernetes.io/<role>` labels and the legacy
    /// `kubernetes.io/role=<role>` label, deduplicated and sorted.
    pub fn roles(&self) -> Vec<String> {
        let Some(labels) = self.node.metadata.labels.as_ref() else {
            return Vec::new();
        };
        let mut roles = BTreeSet::new();
        for (key, value) in labels {
            if let Some(role) = key.strip_prefix(NODE_ROLE_PREFIX) {
                if !role.is_empty() {
                    roles.insert(role.to_string());
                }
            } else if key == LEGACY_ROLE_LABEL && !value.is_empty() {
                roles.insert(value.clone());
            }
        }
        roles.into_iter().collect()
    }

    /// Roles joined with `,`, or `<none>`.
    pub fn role_display(&self) -> String {
        let roles = self.roles();
        if roles.is_empty() {
            "<none>".to_string()
        } else {
            roles.join(",")
        }
    }

    pub fn gpu_pods(&self) -> Vec<&Pod> {
        gpu_pods(&self.pods)
    }

    pub fn gpu(&self) -> ClusterGpu {
        let (total, allocated) = calculate_node_gpu(self);
        ClusterGpu { total, allocated }
    }
}

/// `(total, allocated)` GPUs of a node.
///
/// Allocated sums every pod on the node whatever its phase, so finished pods
/// that have not been collected yet still count.
pub fn calculate_node_gpu(info: &NodeInfo) -> (i64, i64) {
    let total = gpu_in_node(&info.node);
    let allocated = info.pods.iter().map(gpu_in_pod).sum();
    (total, allocated)
}

/// Sum of node figures across the cluster.
pub fn cluster_gpu_totals(infos: &[NodeInfo]) -> ClusterGpu {
    infos
        .iter()
        .map(NodeInfo::gpu)
        .fold(ClusterGpu::default(), |acc, gpu| acc + gpu)
}

/// Groups a pod snapshot by the node each pod is bound to.
pub struct NodeDescriber {
    pods: Vec<Pod>,
}

impl NodeDescriber {
    pub fn new(pods: Vec<Pod>) -> Self {
        Self { pods }
    }

    /// Pods whose `spec.nodeName` is exactly `node_name`.
    pub fn pods_on(&self, node_name: &str) -> Vec<Pod> {
        self.pods
            .iter()
            .filter(|pod| {
                pod.spec.as_ref().and_then(|s| s.node_name.as_deref()) == Some(node_name)
            })
            .cloned()
            .collect()
    }

    pub fn node_infos(&self, nodes: Vec<Node>) -> Vec<NodeInfo> {
        nodes
            .into_iter()
            .map(|node| {
                let pods = self.pods_on(node.metadata.name.as_deref().unwrap_or_default());
                NodeInfo { node, pods }
            })
            .collect()
    }
}

/// Every node with every pod bound to it, in any phase.
pub async fn node_infos<C: ClusterReader>(cluster: &C) -> Result<Vec<NodeInfo>, ClusterError> {
    let nodes = cluster.list_nodes().await?;
    let pods = cluster.list_pods(None, &ListFilter::all()).await?;
    tracing::debug!("Describing {} nodes with {} pods", nodes.len(), pods.len());
    Ok(NodeDescriber::new(pods).node_infos(nodes))
}
