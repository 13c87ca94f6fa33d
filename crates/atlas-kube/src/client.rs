//! Kubernetes client construction.

use crate::reader::ClusterError;
use kube::Client;
use kube::Config;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use std::path::PathBuf;

/// A connected client plus the namespace the kubeconfig context selects.
#[derive(Clone)]
pub struct KubeContext {
    pub client: Client,
    pub default_namespace: String,
}

/// Build a client from an explicit kubeconfig, or from the environment
/// (in-cluster service account, `KUBECONFIG`, or `~/.kube/config`).
pub async fn init_kube_client(kubeconfig: Option<PathBuf>) -> Result<KubeContext, ClusterError> {
    let config = match kubeconfig {
        Some(kubeconfig_path) => {
            tracing::info!("Use specified kubeconfig file {}", kubeconfig_path.display());
            let kubeconfig = Kubeconfig::read_from(&kubeconfig_path)?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
        }
        None => Config::infer().await?,
    };

    let default_namespace = config.default_namespace.clone();
    let client = Client::try_from(config).map_err(ClusterError::Connection)?;

    Ok(KubeContext {
        client,
        default_namespace,
    })
}
