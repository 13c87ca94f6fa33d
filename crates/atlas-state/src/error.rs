use crate::types::TrainerType;
use atlas_kube::ClusterError;
use thiserror::Error;

/// Resolution failures.
#[derive(Error, Debug)]
pub enum StateError {
    /// A release matched a trainer but its workload is gone (label race or manual deletion).
    #[error("Failed to find the {trainer} workload for release {name} in namespace {namespace}")]
    NotFound {
        trainer: TrainerType,
        name: String,
        namespace: String,
    },
    /// No trainer recognises the release.
    #[error("Failed to find the training job {name} in namespace {namespace}")]
    Unsupported { name: String, namespace: String },
    /// The cluster API itself failed.
    #[error(transparent)]
    Upstream(#[from] ClusterError),
}
