//! Kubernetes integration for atlas.
//!
//! Read-only access to pods, batch jobs, nodes, events, services, and
//! custom workload resources. Everything is a blocking list/get that
//! returns a fully materialized result; there is no watch or streaming.

pub mod client;
pub mod filter;
pub mod reader;

pub use client::{KubeContext, init_kube_client};
pub use filter::ListFilter;
pub use reader::{ClusterError, ClusterReader, KubeCluster, WorkloadResource};
