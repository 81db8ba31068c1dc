/*
    Whole run, start to finish
        load the bit file and the reference entry
        schedule jobs (length check + constraint dedup happen here)
        fold every job on the worker pool
        merge into the four outputs
*/

use std::path::PathBuf;
use std::sync::Arc;
use log::info;
use super::dedup::schedule;
use super::engine::run_jobs;
use super::errors::Result;
use super::merger::{write_outputs, OutputPaths};
use super::profiles::load_bit_file;
use super::reference::load_reference;
use super::tools::ToolChain;
use super::worker;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub bit_file: PathBuf,
    pub reference_file: PathBuf,
    pub transcript: String,
    pub outputs: OutputPaths,
    pub workers: usize,
    pub scratch_root: PathBuf,
    pub tools: ToolChain,
}

/// Counts reported to the operator once the run is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub unique: usize,
    pub jobs: usize,
    pub workers: usize,
}

pub fn run_pipeline(config: &PipelineConfig) -> Result<RunSummary> {
    let counts = load_bit_file(&config.bit_file)?;
    info!("unique bits vectors: {} from total: {}", counts.unique(), counts.total);
    let reference: Arc<str> = Arc::from(load_reference(&config.reference_file, &config.transcript)?);

    let jobs = schedule(counts.entries(), &reference)?;
    let job_count = jobs.len();
    info!("Folding {} jobs with {} workers", job_count, config.workers);

    let tools = Arc::new(config.tools.clone());
    let scratch_root = Arc::new(config.scratch_root.clone());
    let task_reference = Arc::clone(&reference);
    let results = run_jobs(jobs, config.workers, move |job| {
        worker::run(job, &task_reference, &tools, &scratch_root)
    })?;

    write_outputs(&results, job_count, &config.outputs)?;
    Ok(RunSummary {
        total: counts.total,
        unique: counts.unique(),
        jobs: job_count,
        workers: config.workers,
    })
}
