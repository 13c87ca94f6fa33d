//! Job families and release resolution.
//!
//! Each [`Trainer`] recognises one family by the `release=<name>` and
//! `app=<tag>` labels on its workload. [`Trainers`] tries them in a fixed
//! order and the first one that recognises a release builds its job.

mod batch;
mod chief;
mod tensorflow;

pub use batch::BatchJobTrainer;
pub use chief::{PodSet, latest_owned, select_chief};
pub use tensorflow::{TFJOB_RESOURCE, TensorFlowTrainer};

use crate::error::StateError;
use crate::snapshot::ClusterSnapshot;
use crate::types::{TrainerType, TrainingJob};
use atlas_helm::ReleaseMap;
use atlas_kube::ClusterReader;

/// One job family.
pub trait Trainer: Send + Sync {
    fn trainer_type(&self) -> TrainerType;

    /// Whether the snapshot holds this family's workload for the release.
    fn is_supported(&self, snapshot: &ClusterSnapshot, name: &str, namespace: &str) -> bool;

    /// Build the job for a release. Fails with [`StateError::NotFound`] when
    /// the workload is missing.
    fn training_job(
        &self,
        snapshot: &ClusterSnapshot,
        name: &str,
        namespace: &str,
    ) -> Result<TrainingJob, StateError>;
}

/// Trainers in priority order.
pub struct Trainers {
    trainers: Vec<Box<dyn Trainer>>,
}

impl Default for Trainers {
    fn default() -> Self {
        Self::standard()
    }
}

impl Trainers {
    /// Standalone, Horovod, MPI, TensorFlow.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(BatchJobTrainer::standalone()),
            Box::new(BatchJobTrainer::horovod()),
            Box::new(BatchJobTrainer::mpi()),
            Box::new(TensorFlowTrainer),
        ])
    }

    pub fn new(trainers: Vec<Box<dyn Trainer>>) -> Self {
        Self { trainers }
    }

    /// The first trainer that recognises the release.
    pub fn find(
        &self,
        snapshot: &ClusterSnapshot,
        name: &str,
        namespace: &str,
    ) -> Option<&dyn Trainer> {
        for trainer in &self.trainers {
            if trainer.is_supported(snapshot, name, namespace) {
                return Some(trainer.as_ref());
            }
        }
        None
    }

    /// Resolve one release against an existing snapshot.
    pub fn resolve_in(
        &self,
        snapshot: &ClusterSnapshot,
        name: &str,
        namespace: &str,
    ) -> Result<TrainingJob, StateError> {
        let trainer = self
            .find(snapshot, name, namespace)
            .ok_or_else(|| StateError::Unsupported {
                name: name.to_string(),
                namespace: namespace.to_string(),
            })?;
        tracing::debug!(
            "Release {} in {} is a {} job",
            name,
            namespace,
            trainer.trainer_type()
        );
        trainer.training_job(snapshot, name, namespace)
    }

    /// Resolve one release with queries scoped to it.
    pub async fn resolve<C: ClusterReader>(
        &self,
        cluster: &C,
        name: &str,
        namespace: &str,
    ) -> Result<TrainingJob, StateError> {
        let snapshot = ClusterSnapshot::fetch_release(cluster, name, namespace).await?;
        self.resolve_in(&snapshot, name, namespace)
    }

    /// Resolve every release in `releases`, skipping those no trainer recognises.
    pub fn resolve_all(
        &self,
        snapshot: &ClusterSnapshot,
        releases: &ReleaseMap,
    ) -> Result<Vec<TrainingJob>, StateError> {
        let mut jobs = Vec::with_capacity(releases.len());
        for (name, namespace) in releases.iter() {
            match self.resolve_in(snapshot, name, namespace) {
                Ok(job) => jobs.push(job),
                Err(StateError::Unsupported { .. }) => {
                    tracing::debug!(
                        "Release {} in {} is not a training job, skipping",
                        name,
                        namespace
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(jobs)
    }
}

/// [`Trainers::resolve`] with the standard trainers.
pub async fn resolve<C: ClusterReader>(
    cluster: &C,
    name: &str,
    namespace: &str,
) -> Result<TrainingJob, StateError> {
    Trainers::standard().resolve(cluster, name, namespace).await
}

/// [`Trainers::resolve_all`] with the standard trainers.
pub fn resolve_all(
    snapshot: &ClusterSnapshot,
    releases: &ReleaseMap,
) -> Result<Vec<TrainingJob>, StateError> {
    Trainers::standard().resolve_all(snapshot, releases)
}
