//! Release store backed by the helm binary.

use crate::list::parse_release_list;
use crate::types::ReleaseMap;
use atlas_parsers::{CommandError, run_command, run_command_status};
use serde::Serialize;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Unexpected exit status {code:?} from helm get {name}")]
    UnexpectedStatus { name: String, code: Option<i32> },
    #[error("Chart not found: {0}")]
    ChartNotFound(PathBuf),
    #[error("Failed to serialize values: {0}")]
    Values(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Named, namespace-scoped installations of packaged workloads.
///
/// The resolution core only reads `list`/`exists`; `install` and `delete` are
/// pass-throughs for the commands that create and remove jobs.
pub trait ReleaseStore {
    /// All installed releases, name to namespace.
    fn list(&self) -> impl Future<Output = Result<ReleaseMap, ReleaseError>> + Send;

    /// Whether a release with this name is installed.
    fn exists(&self, name: &str) -> impl Future<Output = Result<bool, ReleaseError>> + Send;

    /// Install `chart` as release `name` in `namespace` with the given values.
    fn install<V: Serialize + Sync>(
        &self,
        name: &str,
        namespace: &str,
        values: &V,
        chart: &str,
    ) -> impl Future<Output = Result<(), ReleaseError>> + Send;

    /// Delete a release and purge its history.
    fn delete(&self, name: &str) -> impl Future<Output = Result<(), ReleaseError>> + Send;
}

/// Release store that shells out to `helm`.
#[derive(Debug, Clone)]
pub struct HelmReleaseStore {
    binary: PathBuf,
    kubeconfig: Option<PathBuf>,
}

impl Default for HelmReleaseStore {
    fn default() -> Self {
        Self::new("helm")
    }
}

impl HelmReleaseStore {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            kubeconfig: None,
        }
    }

    /// Point helm at a specific cluster.
    pub fn with_kubeconfig(mut self, kubeconfig: Option<PathBuf>) -> Self {
        self.kubeconfig = kubeconfig;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        if let Some(kubeconfig) = &self.kubeconfig {
            cmd.env("KUBECONFIG", kubeconfig);
        }
        cmd
    }

    fn write_values<V: Serialize>(values: &V) -> Result<tempfile::NamedTempFile, ReleaseError> {
        let mut file = tempfile::Builder::new()
            .prefix("values")
            .suffix(".yaml")
            .tempfile()?;
        let yaml = serde_yaml::to_string(values)?;
        file.write_all(yaml.as_bytes())?;
        file.flush()?;
        tracing::debug!("Saved values file {}", file.path().display());
        Ok(file)
    }
}

impl ReleaseStore for HelmReleaseStore {
    async fn list(&self) -> Result<ReleaseMap, ReleaseError> {
        let mut cmd = self.command();
        cmd.arg("list");
        let stdout = run_command(&mut cmd, "helm list").await?;
        Ok(parse_release_list(&stdout))
    }

    async fn exists(&self, name: &str) -> Result<bool, ReleaseError> {
        let mut cmd = self.command();
        cmd.args(["get", name]);
        match run_command_status(&mut cmd, "helm get").await? {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            code => Err(ReleaseError::UnexpectedStatus {
                name: name.to_string(),
                code,
            }),
        }
    }

    async fn install<V: Serialize + Sync>(
        &self,
        name: &str,
        namespace: &str,
        values: &V,
        chart: &str,
    ) -> Result<(), ReleaseError> {
        // Absolute paths point at a local chart; anything else is a repo reference.
        let chart_path = Path::new(chart);
        if chart_path.is_absolute() && !chart_path.exists() {
            return Err(ReleaseError::ChartNotFound(chart_path.to_path_buf()));
        }

        let values_file = Self::write_values(values)?;

        let mut cmd = self.command();
        cmd.arg("install")
            .arg("-f")
            .arg(values_file.path())
            .args(["--namespace", namespace, "--name", name, chart]);
        tracing::debug!("Exec {} {:?}", self.binary.display(), cmd.as_std().get_args());

        let stdout = run_command(&mut cmd, "helm install").await?;
        tracing::info!("{}", stdout.trim_end());

        if tracing::enabled!(tracing::Level::DEBUG) {
            // Keep the rendered values around for inspection.
            match values_file.keep() {
                Ok((_, path)) => tracing::debug!("Kept values file {}", path.display()),
                Err(e) => tracing::warn!("Failed to keep values file: {}", e),
            }
        }

        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), ReleaseError> {
        let mut cmd = self.command();
        cmd.args(["del", "--purge", name]);
        let stdout = run_command(&mut cmd, "helm del").await?;
        tracing::info!("{}", stdout.trim_end());
        Ok(())
    }
}
