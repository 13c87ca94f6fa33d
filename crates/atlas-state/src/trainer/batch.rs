use super::Trainer;
use super::chief::select_chief;
use crate::error::StateError;
use crate::snapshot::ClusterSnapshot;
use crate::types::{TrainerType, TrainingJob, Workload};

/// Families whose chart runs the job as a `batch/v1` Job: standalone
/// training, Horovod, and the MPI launcher.
#[derive(Debug, Clone, Copy)]
pub struct BatchJobTrainer {
    trainer_type: TrainerType,
}

impl BatchJobTrainer {
    pub fn standalone() -> Self {
        Self {
            trainer_type: TrainerType::Standalone,
        }
    }

    pub fn horovod() -> Self {
        Self {
            trainer_type: TrainerType::Horovod,
        }
    }

    pub fn mpi() -> Self {
        Self {
            trainer_type: TrainerType::Mpi,
        }
    }
}

impl Trainer for BatchJobTrainer {
    fn trainer_type(&self) -> TrainerType {
        self.trainer_type
    }

    fn is_supported(&self, snapshot: &ClusterSnapshot, name: &str, namespace: &str) -> bool {
        snapshot
            .find_job(name, namespace, self.trainer_type.app_label())
            .is_some()
    }

    fn training_job(
        &self,
        snapshot: &ClusterSnapshot,
        name: &str,
        namespace: &str,
    ) -> Result<TrainingJob, StateError> {
        let job = snapshot
            .find_job(name, namespace, self.trainer_type.app_label())
            .ok_or_else(|| StateError::NotFound {
                trainer: self.trainer_type,
                name: name.to_string(),
                namespace: namespace.to_string(),
            })?;

        let (chief_pod, pods) =
            select_chief(snapshot.release_pods(name, namespace), "Job").into_pods();

        Ok(TrainingJob {
            name: name.to_string(),
            namespace: namespace.to_string(),
            trainer_type: self.trainer_type,
            workload: Workload::BatchJob(Box::new(job.clone())),
            chief_pod,
            pods,
            gang_scheduled: false,
        })
    }
}
