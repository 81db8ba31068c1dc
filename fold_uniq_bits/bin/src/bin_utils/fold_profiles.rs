/*
    Turn the command line into a pipeline run
        resolve the tool chain
            CONTRAfold from PATH unless configured
            conversion scripts next to this executable unless configured
        worker count defaults to the available parallelism
        report the run summary
*/

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use log::{debug, info};
use bit_profiles::{run_pipeline, OutputPaths, PipelineConfig, Result, RunSummary, ToolChain, ToolCommand};
use crate::bin_utils::get_args::Cli;

const FOLD2DOTBRACKET_SCRIPT: &str = "fold2dotbracketFasta.py";
const RNACONVERT_SCRIPT: &str = "rnaConvert.py";

pub fn fold_profiles(cli: &Cli) -> Result<RunSummary> {
    let config = pipeline_config(cli);
    info!("Folding {:?} against {} from {:?}", config.bit_file, config.transcript, config.reference_file);
    debug!("Prediction: {}", config.tools.predictor.describe());
    debug!("Dot-bracket conversion: {}", config.tools.dotbracket.describe());
    debug!("Element string conversion: {}", config.tools.element.describe());
    let summary = run_pipeline(&config)?;
    info!("workers: {}, jobs: {}", summary.workers, summary.jobs);
    for path in [&config.outputs.structure, &config.outputs.posterior,
                 &config.outputs.element, &config.outputs.size] {
        info!("Output file: {:?}", path);
    }
    Ok(summary)
}

fn pipeline_config(cli: &Cli) -> PipelineConfig {
    let tools = ToolChain {
        predictor: ToolCommand::new(resolve_program(&cli.contrafold)),
        dotbracket: ToolCommand::script(cli.python.clone(),
                                        &script_path(cli.fold2dotbracket.as_deref(), FOLD2DOTBRACKET_SCRIPT)),
        element: ToolCommand::script(cli.python.clone(),
                                     &script_path(cli.rna_convert.as_deref(), RNACONVERT_SCRIPT)),
        timeout: cli.tool_timeout.map(Duration::from_secs),
    };
    PipelineConfig {
        bit_file: cli.bit_file.clone(),
        reference_file: cli.reference_file.clone(),
        transcript: cli.transcript.clone(),
        outputs: OutputPaths::from_basename(&cli.output_basename, cli.size_file.clone()),
        workers: cli.nproc.unwrap_or_else(default_workers),
        scratch_root: cli.scratch_dir.clone().unwrap_or_else(std::env::temp_dir),
        tools,
    }
}

fn default_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

// tools run inside scratch directories, so relative paths must be anchored first
fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn resolve_program(program: &str) -> String {
    if program.contains(std::path::MAIN_SEPARATOR) {
        absolute(Path::new(program)).to_string_lossy().into_owned()
    } else {
        // bare name, left to PATH lookup
        program.to_string()
    }
}

fn script_path(configured: Option<&Path>, default_name: &str) -> PathBuf {
    match configured {
        Some(path) => absolute(path),
        None => std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(default_name)))
            .unwrap_or_else(|| PathBuf::from(default_name)),
    }
}
