use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Everything that can go wrong while analyzing a predicted complex.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Input file does not exist: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Unsupported file extension for {}, expected '{expected}'", path.display())]
    InvalidExtension {
        path: PathBuf,
        expected: &'static str,
    },

    #[error("Failed to parse structure {}: {message}", path.display())]
    Structure { path: PathBuf, message: String },

    #[error("No ATOM records found in {}", path.display())]
    NoAtomRecords { path: PathBuf },

    #[error("Residue '{name}' has no one-letter amino acid code")]
    UnknownResidue { name: String },

    #[error("Inconsistent structure: {0}")]
    InconsistentStructure(String),

    #[error("Model number {model} is outside 1..=5 ({context})")]
    InvalidModelNumber { model: usize, context: String },

    #[error("PAE values could not be parsed: {len} values do not form a square matrix")]
    MalformedMatrix { len: usize },

    #[error("No 'pae' entry found in the scores file")]
    MissingPaeKey,

    #[error("Failed to decode scores JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Structure and PAE files belong to different models (structure {structure}, PAE {matrix})"
    )]
    ModelNumberMismatch { structure: usize, matrix: usize },

    #[error("PAE lookup ({i}, {j}) outside of the {size}x{size} matrix; structure and PAE files do not match")]
    MatrixIndexOutOfBounds { i: usize, j: usize, size: usize },

    #[error("Number of structure files ({structures}) does not match number of PAE files ({matrices})")]
    FileCountMismatch { structures: usize, matrices: usize },

    #[error("No structure files found for complex {0}")]
    NoStructures(String),

    #[error("Invalid contact criteria: {0}")]
    InvalidCriteria(String),

    #[error("Work must be distributed across at least one worker")]
    NoWorkers,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build report: {0}")]
    Report(#[from] polars::prelude::PolarsError),
}
