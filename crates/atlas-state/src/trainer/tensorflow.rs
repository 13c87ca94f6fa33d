use super::Trainer;
use super::chief::latest_owned;
use crate::error::StateError;
use crate::snapshot::ClusterSnapshot;
use crate::types::{TrainerType, TrainingJob, Workload};
use atlas_kube::WorkloadResource;

/// The kubeflow `TFJob` custom resource.
pub const TFJOB_RESOURCE: WorkloadResource = WorkloadResource {
    group: "kubeflow.org",
    version: "v1",
    kind: "TFJob",
    plural: "tfjobs",
};

const GANG_SCHEDULER: &str = "kube-batch";

/// Parameter-server TensorFlow jobs run by the TFJob operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TensorFlowTrainer;

impl Trainer for TensorFlowTrainer {
    fn trainer_type(&self) -> TrainerType {
        TrainerType::TensorFlow
    }

    fn is_supported(&self, snapshot: &ClusterSnapshot, name: &str, namespace: &str) -> bool {
        snapshot
            .find_workload(name, namespace, TrainerType::TensorFlow.app_label())
            .is_some()
    }

    fn training_job(
        &self,
        snapshot: &ClusterSnapshot,
        name: &str,
        namespace: &str,
    ) -> Result<TrainingJob, StateError> {
        let tfjob = snapshot
            .find_workload(name, namespace, TrainerType::TensorFlow.app_label())
            .ok_or_else(|| StateError::NotFound {
                trainer: TrainerType::TensorFlow,
                name: name.to_string(),
                namespace: namespace.to_string(),
            })?;

        // Parameter servers and workers are all owned by the TFJob, so every
        // release pod stays in the set and the newest one doubles as chief.
        let pods: Vec<_> = snapshot
            .release_pods(name, namespace)
            .into_iter()
            .cloned()
            .collect();
        let chief_pod = latest_owned(&pods, TFJOB_RESOURCE.kind).cloned();
        let gang_scheduled = pods.iter().any(|pod| {
            pod.spec.as_ref().and_then(|s| s.scheduler_name.as_deref()) == Some(GANG_SCHEDULER)
        });

        Ok(TrainingJob {
            name: name.to_string(),
            namespace: namespace.to_string(),
            trainer_type: TrainerType::TensorFlow,
            workload: Workload::Custom(Box::new(tfjob.clone())),
            chief_pod,
            pods,
            gang_scheduled,
        })
    }
}
