/*
    Fold one scheduled profile
        Create a private scratch directory, removed on every exit path
        Write the constraints file
        predictor => structure (parens) file + posterior file
        structure file => dot-bracket file
        dot-bracket file => element string side file, line 3 is kept
        Read the posterior file
    Steps run strictly in sequence, each one needs the previous output
*/

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use log::{debug, warn};
use tempfile::TempDir;
use super::constraints::ConstraintSpec;
use super::dedup::Job;
use super::errors::{ConversionStage, FoldError, Result, ToolStage};
use super::profiles::Profile;
use super::struct_helper::FileBufferHelper;
use super::tools::{run_tool, ToolChain};

const ELEMENT_LINE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerResult {
    pub index: usize,
    pub dotbracket: String,
    pub posterior: String,
    pub element_line: String,
    pub profile: Profile,
    pub count: usize,
}

/// Name of the file the element-string converter derives from `--filename`
pub fn element_artifact_name(filename: &str) -> String {
    format!("{filename}001.element_string")
}

pub fn run(job: &Job, reference: &str, tools: &ToolChain, scratch_root: &Path) -> Result<WorkerResult> {
    let tag = job.tag();
    let scratch = tempfile::Builder::new()
        .prefix(&format!("{tag}."))
        .tempdir_in(scratch_root)?;
    debug!("{} folding in {:?}", tag, scratch.path());
    let result = fold_in(job, &tag, reference, tools, &scratch);
    if let Err(e) = &result {
        debug!("{} failed: {}", tag, e);
    }
    let scratch_path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        warn!("Could not remove scratch directory {:?} of {}: {}", scratch_path, tag, e);
    }
    result
}

fn fold_in(job: &Job, tag: &str, reference: &str, tools: &ToolChain,
           scratch: &TempDir) -> Result<WorkerResult> {
    let dir = scratch.path();
    let constraints = ConstraintSpec::build(reference, &job.profile)?;
    let constraint_file = format!("{tag}.tmp.bpseq");
    let mut writer = BufWriter::new(File::create(dir.join(&constraint_file))?);
    constraints.write_to(&mut writer)?;
    writer.flush()?;
    drop(writer);

    let fold_file = format!("{tag}.fold");
    let post_file = format!("{tag}.post");
    let predicted = run_tool(tools, ToolStage::Prediction, job.index, &[
        "predict".to_string(),
        "--constraints".to_string(), constraint_file,
        "--parens".to_string(), fold_file.clone(),
        "--posteriors".to_string(), "0.0".to_string(), post_file.clone(),
    ], dir)?;
    if !predicted.success() {
        return Err(FoldError::PredictionFailed { index: job.index, stderr: predicted.stderr });
    }

    let db_file = format!("{tag}.db");
    let converted = run_tool(tools, ToolStage::Conversion(ConversionStage::DotBracket), job.index, &[
        "--input_file".to_string(), fold_file,
        "--tag".to_string(), tag.to_string(),
        "--output_file".to_string(), db_file.clone(),
    ], dir)?;
    if !converted.success() {
        return Err(FoldError::ConversionFailed {
            index: job.index,
            stage: ConversionStage::DotBracket,
            stderr: converted.stderr,
        });
    }
    let dotbracket = read_trimmed(&dir.join(&db_file), job.index)?;

    let element_file = format!("{tag}.txt");
    let converted = run_tool(tools, ToolStage::Conversion(ConversionStage::Element), job.index, &[
        db_file,
        "-T".to_string(), "element_string".to_string(),
        "--force".to_string(), "--to-file".to_string(),
        "--filename".to_string(), element_file.clone(),
    ], dir)?;
    if !converted.success() {
        return Err(FoldError::ConversionFailed {
            index: job.index,
            stage: ConversionStage::Element,
            stderr: converted.stderr,
        });
    }
    let element_line = read_element_line(&dir.join(element_artifact_name(&element_file)), job.index)?;

    let posterior = read_trimmed(&dir.join(&post_file), job.index)?;

    Ok(WorkerResult {
        index: job.index,
        dotbracket,
        posterior,
        element_line,
        profile: job.profile.clone(),
        count: job.count,
    })
}

fn missing(path: &Path, index: usize) -> FoldError {
    FoldError::MissingArtifact { index, path: PathBuf::from(path) }
}

fn read_trimmed(path: &Path, index: usize) -> Result<String> {
    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .map_err(|_| missing(path, index))
}

/// Third line of the element-string side file
pub fn read_element_line(path: &Path, index: usize) -> Result<String> {
    let mut element_file = FileBufferHelper::new(path).map_err(|_| missing(path, index))?;
    while element_file.read_next()? {
        if element_file.line_number == ELEMENT_LINE {
            return Ok(element_file.line.trim().to_string());
        }
    }
    Err(missing(path, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_name_decoration() {
        assert_eq!(element_artifact_name("bit_7.txt"), "bit_7.txt001.element_string");
    }

    #[test]
    fn element_line_is_the_third() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bit_1.txt001.element_string");
        fs::write(&path, ">bit_1\n((..))\nsssffsss \nextra\n").unwrap();
        assert_eq!(read_element_line(&path, 1).unwrap(), "sssffsss");
    }

    #[test]
    fn short_element_file_is_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bit_2.txt001.element_string");
        fs::write(&path, ">bit_2\n((..))\n").unwrap();
        assert!(matches!(read_element_line(&path, 2), Err(FoldError::MissingArtifact { index: 2, .. })));
        let absent = dir.path().join("absent");
        assert!(matches!(read_element_line(&absent, 2), Err(FoldError::MissingArtifact { index: 2, .. })));
    }
}
