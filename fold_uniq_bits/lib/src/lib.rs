/*
    Fold the unique mutation profiles of a bit file
        Load the bit file, count every distinct profile
        Deduplicate a second time on the derived constraints
            highest mutation count first, scan order on ties
            survivors are numbered bit_1..bit_K
        Fold every survivor with CONTRAfold under its constraints
            convert to dot-bracket, then to element string
        Merge the per-job results into four row-aligned outputs
            any failure aborts the run, no output is left behind
*/

pub mod lib_utils;

pub use lib_utils::errors::{ConversionStage, FoldError, Result, ToolStage};
pub use lib_utils::merger::OutputPaths;
pub use lib_utils::pipeline::{run_pipeline, PipelineConfig, RunSummary};
pub use lib_utils::tools::{ToolChain, ToolCommand};
