use clap::Parser;
use std::ops::RangeFrom;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Tab separated bit file: read label followed by one call per position
    #[arg(short='b', long="bit-file", default_value="merged_R1_R2.bit")]
    pub bit_file: PathBuf,
    /// FASTA file holding the reference transcript
    #[arg(short='r', long="reference-file", default_value="cool6.fasta")]
    pub reference_file: PathBuf,
    /// Name of the reference entry to fold against
    #[arg(short='t', long="transcript", default_value_t=String::from("COOLAIR3"))]
    pub transcript: String,
    /// Output file for bit_<k>, occurrence count and profile
    #[arg(short='s', long="size-file", default_value="sizer.tab")]
    pub size_file: PathBuf,
    /// Basename of the .db, .txt and .element_string outputs
    #[arg(short='o', long="output-basename", default_value_t=String::from("merged"))]
    pub output_basename: String,
    /// Number of folding workers. Default: available parallelism
    #[arg(short='n', long="threads", value_parser=validate_threads)]
    pub nproc: Option<usize>,
    /// CONTRAfold executable
    #[arg(long="contrafold", env="FOLD_UNIQ_CONTRAFOLD", default_value_t=String::from("contrafold"))]
    pub contrafold: String,
    /// Python interpreter running the two conversion scripts
    #[arg(long="python", env="FOLD_UNIQ_PYTHON", default_value_t=String::from("python"))]
    pub python: String,
    /// fold2dotbracketFasta.py. Default: next to this executable
    #[arg(long="fold2dotbracket", env="FOLD_UNIQ_FOLD2DOTBRACKET")]
    pub fold2dotbracket: Option<PathBuf>,
    /// rnaConvert.py. Default: next to this executable
    #[arg(long="rna-convert", env="FOLD_UNIQ_RNACONVERT")]
    pub rna_convert: Option<PathBuf>,
    /// Directory holding the per-job scratch directories. Default: system temp dir
    #[arg(long="scratch-dir")]
    pub scratch_dir: Option<PathBuf>,
    /// Kill any external tool running longer than this many seconds.
    /// Each tool then runs in its own process group and the whole group is killed
    #[arg(long="tool-timeout", value_parser=validate_timeout)]
    pub tool_timeout: Option<u64>,
}

const THREADS: RangeFrom<usize> = 1..;

fn validate_threads(input_str: &str) -> Result<usize, String> {
    let threads: usize = input_str
        .parse()
        .map_err(|_| format!("'{input_str}' is not a number of threads"))?;
    if THREADS.contains(&threads) {
        Ok(threads)
    } else {
        Err(
            format!("Threads not in the range {}..", THREADS.start)
        )
    }
}

fn validate_timeout(input_str: &str) -> Result<u64, String> {
    match input_str.parse::<u64>() {
        Ok(0) => Err(String::from("Timeout must be at least 1 second")),
        Ok(seconds) => Ok(seconds),
        Err(_) => Err(format!("'{input_str}' is not a number of seconds")),
    }
}
