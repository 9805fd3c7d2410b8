//! Host task queue seam
//!
//! Units that hand long-running work to the host (resaving elements,
//! find-and-replace across stored content) do it through an `Enqueuer`.
//! The contract is fire-and-forget: `enqueue` returning `Ok` is all the
//! runner needs before it records the unit as applied.

use crate::errors::Result;
use crate::model::Job;
use std::sync::Mutex;

/// Fire-and-forget job submission
pub trait Enqueuer {
    /// Submit a job. An error fails the enclosing unit.
    fn enqueue(&self, job: &Job) -> Result<()>;
}

/// Enqueuer that keeps submitted jobs in memory
///
/// Useful for hosts that drain jobs themselves after a run, and for tests.
#[derive(Debug, Default)]
pub struct RecordingEnqueuer {
    jobs: Mutex<Vec<Job>>,
}

impl RecordingEnqueuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs submitted so far, in submission order
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().map(|j| j.clone()).unwrap_or_default()
    }
}

impl Enqueuer for RecordingEnqueuer {
    fn enqueue(&self, job: &Job) -> Result<()> {
        tracing::debug!(job_kind = %job.kind, "job recorded");
        self.jobs
            .lock()
            .map(|mut jobs| jobs.push(job.clone()))
            .map_err(|_| {
                crate::errors::LedgerError::EnqueueFailed {
                    job_kind: job.kind.clone(),
                    reason: "job buffer poisoned".to_string(),
                }
                .into()
            })
    }
}
