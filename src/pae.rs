//! Predicted aligned error (PAE) matrices.

use crate::errors::{AnalysisError, Result};
use crate::utils::{model_num_from_path, read_input_text};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Key of the PAE matrix in ColabFold score files.
const PAE_KEY: &str = "pae";

/// A square N x N PAE matrix stored row-major, N being the residue count of the matching structure.
///
/// The matrix is not assumed to be symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct PaeMatrix {
    model_num: usize,
    size: usize,
    values: Vec<f64>,
}

impl PaeMatrix {
    /// Wrap flattened PAE values, checking that they form a square matrix.
    pub fn new(model_num: usize, values: Vec<f64>) -> Result<Self> {
        let size = values.len().isqrt();
        if values.is_empty() || size * size != values.len() {
            return Err(AnalysisError::MalformedMatrix { len: values.len() });
        }
        Ok(Self {
            model_num,
            size,
            values,
        })
    }

    /// Parse the `pae` array of arrays of a ColabFold scores JSON document.
    pub fn from_json_str(model_num: usize, text: &str) -> Result<Self> {
        let mut doc: Value = serde_json::from_str(text)?;
        let pae = doc
            .get_mut(PAE_KEY)
            .map(Value::take)
            .ok_or(AnalysisError::MissingPaeKey)?;
        let rows: Vec<Vec<f64>> = serde_json::from_value(pae)?;
        Self::new(model_num, rows.into_iter().flatten().collect())
    }

    pub fn model_num(&self) -> usize {
        self.model_num
    }

    /// Number of residues N covered by the matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Offset of the entry for residues `i` and `j` (1-based absolute indices) in the flat storage.
    pub fn linear_index(&self, i: usize, j: usize) -> Option<usize> {
        if i == 0 || j == 0 || i > self.size || j > self.size {
            return None;
        }
        Some((i - 1) * self.size + (j - 1))
    }

    /// PAE value at row `i`, column `j` (1-based absolute residue indices).
    pub fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        self.linear_index(i, j)
            .map(|idx| self.values[idx])
            .ok_or(AnalysisError::MatrixIndexOutOfBounds {
                i,
                j,
                size: self.size,
            })
    }
}

/// Load a PAE matrix from a `.json` scores file, optionally gzip or xz compressed.
pub fn load_pae(path: &Path) -> Result<PaeMatrix> {
    let text = read_input_text(path, "json")?;
    let model_num = model_num_from_path(path)?;
    let matrix = PaeMatrix::from_json_str(model_num, &text)?;
    debug!(
        "Loaded {n}x{n} PAE matrix for model {model_num} from {}",
        path.display(),
        n = matrix.size()
    );
    Ok(matrix)
}
