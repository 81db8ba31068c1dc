/*
    Fan the scheduled jobs across a bounded thread pool
        at most `workers` jobs in flight, the submission loop waits for a free slot
        results come back over a channel tagged with their submission index
        arrival order does not matter, results are keyed by index
    First failure wins
        nothing new is submitted once a job has failed
        jobs already running finish (their scratch cleanup is their own)
        the first failure is returned
*/

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use threadpool::ThreadPool;
use log::{debug, info, warn};
use super::dedup::Job;
use super::errors::{FoldError, Result};
use super::worker::WorkerResult;

pub fn run_jobs<F>(jobs: Vec<Job>, workers: usize, task: F) -> Result<BTreeMap<usize, WorkerResult>>
where
    F: Fn(&Job) -> Result<WorkerResult> + Send + Sync + 'static,
{
    if workers == 0 {
        return Err(FoldError::ThreadCount);
    }
    let total = jobs.len();
    let task = Arc::new(task);
    let pool = ThreadPool::with_name(String::from("fold-worker"), workers);
    let (tx, rx) = mpsc::channel::<(usize, Result<WorkerResult>)>();
    let mut pending = jobs.into_iter();
    let mut results: BTreeMap<usize, WorkerResult> = BTreeMap::new();
    let mut first_failure: Option<FoldError> = None;
    let mut in_flight = 0usize;
    loop {
        while first_failure.is_none() && in_flight < workers {
            let Some(job) = pending.next() else { break };
            debug!("Submitting {}", job.tag());
            let tx = tx.clone();
            let task = Arc::clone(&task);
            pool.execute(move || {
                let index = job.index;
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| (*task)(&job)))
                    .unwrap_or(Err(FoldError::WorkerPanicked { index }));
                // receiver outlives every job
                let _ = tx.send((index, outcome));
            });
            in_flight += 1;
        }
        if in_flight == 0 {
            break;
        }
        let Ok((index, outcome)) = rx.recv() else { break };
        in_flight -= 1;
        match outcome {
            Ok(result) => {
                if results.insert(index, result).is_some() {
                    first_failure.get_or_insert(FoldError::IncompleteResults { index });
                }
                info!("Folded {}/{} (bit_{})", results.len(), total, index);
            }
            Err(e) if first_failure.is_none() => {
                warn!("bit_{} failed, no further jobs will be submitted", index);
                first_failure = Some(e);
            }
            Err(e) => debug!("Later failure ignored: {}", e),
        }
    }
    pool.join();
    info!("Threadpool jobs complete");
    match first_failure {
        Some(e) => Err(e),
        None => Ok(results),
    }
}
