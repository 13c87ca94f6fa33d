//! Display orderings for job lists. Both sorts are stable.

use crate::types::TrainingJob;
use std::cmp::Reverse;

/// Newest first; jobs without a creation time go last.
pub fn order_by_age(mut jobs: Vec<TrainingJob>) -> Vec<TrainingJob> {
    jobs.sort_by_key(|job| Reverse(job.created_at()));
    jobs
}

/// Most requested GPUs first.
pub fn order_by_gpu(mut jobs: Vec<TrainingJob>) -> Vec<TrainingJob> {
    jobs.sort_by_key(|job| Reverse(job.requested_gpu()));
    jobs
}
