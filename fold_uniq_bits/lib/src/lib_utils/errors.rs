
// error type shared by every stage of the folding pipeline


use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// External conversion step that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    DotBracket,
    Element,
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStage::DotBracket => write!(f, "dotbracket"),
            ConversionStage::Element => write!(f, "element"),
        }
    }
}

/// Any of the three external invocations a worker makes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStage {
    Prediction,
    Conversion(ConversionStage),
}

impl fmt::Display for ToolStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolStage::Prediction => write!(f, "prediction"),
            ToolStage::Conversion(stage) => write!(f, "{stage}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FoldError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse reference file {path:?}: {message}")]
    Fasta { path: PathBuf, message: String },

    #[error("Reference entry '{name}' not found in {path:?}")]
    ReferenceNotFound { name: String, path: PathBuf },

    #[error("Reference entry '{name}' is empty")]
    EmptyReference { name: String },

    /// reference and profile lengths disagree; fatal for the whole run
    #[error("Reference length mismatch: reference has {expected} positions, profile has {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Could not find executable '{executable}' for bit_{index} ({stage})")]
    ToolNotFound {
        index: usize,
        stage: ToolStage,
        executable: String,
    },

    #[error("Prediction failed for bit_{index}: {}", .stderr.trim())]
    PredictionFailed { index: usize, stderr: String },

    #[error("Conversion ({stage}) failed for bit_{index}: {}", .stderr.trim())]
    ConversionFailed {
        index: usize,
        stage: ConversionStage,
        stderr: String,
    },

    #[error("Missing or malformed artifact for bit_{index}: {path:?}")]
    MissingArtifact { index: usize, path: PathBuf },

    #[error("{stage} step for bit_{index} exceeded {seconds}s and was killed")]
    ToolTimedOut {
        index: usize,
        stage: ToolStage,
        seconds: u64,
    },

    #[error("Worker for bit_{index} panicked")]
    WorkerPanicked { index: usize },

    /// merge found a hole (or a duplicate) in the result set
    #[error("Incomplete results: bit_{index} has no unique result")]
    IncompleteResults { index: usize },

    #[error("Cannot write output {path:?}: {reason}")]
    OutputBlocked { path: PathBuf, reason: &'static str },

    #[error("Worker count must be at least 1")]
    ThreadCount,
}

pub type Result<T> = std::result::Result<T, FoldError>;
