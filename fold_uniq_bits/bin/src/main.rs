/*
Fold the unique bit vectors of a mutational profiling run with CONTRAfold
    + collapse identical bit vectors, keep their counts
    + collapse bit vectors that give identical constraints
        + the one with the most mutations (first seen on ties) is kept
    + fold every survivor on a pool of workers
        + CONTRAfold -> dot-bracket -> element string
    + write merged .db / .txt / .element_string and the size file
        + rows of all four files line up by bit_<k>

Implement clap to parse cli

Arguments
    bit file, reference FASTA and transcript name
    output basename and size file
    worker count, tool locations, tool timeout
*/

mod bin_utils;
use clap::Parser;
use bin_utils::get_args::Cli;
use bin_utils::fold_profiles::fold_profiles;
use log::{debug, error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    debug!("Parsing commandline arguments");
    match fold_profiles(&cli) {
        Ok(_) => {
            info!("DONE");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
