//! Discovery and analysis of the predicted complexes in a folder.

use crate::consensus::{summarize_consensus, ConsensusStats};
use crate::contacts::{get_contacts, ContactCriteria, ModelContacts};
use crate::errors::{AnalysisError, Result};
use crate::pae::load_pae;
use crate::reports::{batch_reports, merge_reports, write_reports, Reports};
use crate::stats::{select_best_model, ModelInterfaceReport};
use crate::structure::load_structure;
use crate::utils::{model_num_from_filename, run_with_threads, DataFrameFileType};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Suffix of the marker files written for every finished prediction.
pub const DONE_MARKER: &str = ".done.txt";

/// Batch-level options of a folder analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOptions {
    pub criteria: ContactCriteria,
    /// Only analyze complexes whose name contains this string
    pub name_filter: Option<String>,
    /// Number of workers, 0 for one per available core
    pub num_workers: usize,
    pub output_format: DataFrameFileType,
    /// Defaults to `<folder>/<folder name>_analysis`
    pub output_dir: Option<PathBuf>,
}

/// Names of all complexes with a `.done.txt` marker in `folder`, sorted.
pub fn find_finished_complexes(folder: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let file_name = entry?.file_name();
        if let Some(name) = file_name.to_str().and_then(|f| f.strip_suffix(DONE_MARKER)) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Files of a complex with extension `ext`, ordered by model number.
///
/// Files are matched as `<name>_*.<ext>`, plus their gzip (`.<ext>.gz`) and xz (`.<ext>.xz`) archives.
pub fn complex_files(folder: &Path, name: &str, ext: &str) -> Result<Vec<PathBuf>> {
    let prefix = format!("{name}_");
    let suffix = format!(".{ext}");
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        let Some(rest) = file_name.strip_prefix(&prefix) else {
            continue;
        };
        let matches = ["", ".gz", ".xz"]
            .iter()
            .any(|archive| rest.ends_with(&format!("{suffix}{archive}")));
        if matches {
            files.push(path);
        }
    }
    files.sort_by_cached_key(|path| {
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or_default()
            .to_string();
        (model_num_from_filename(&file_name), file_name)
    });
    Ok(files)
}

/// Protein names of the chains of a complex, taken from the `_`-separated complex name.
///
/// Chains without a matching token keep their identifier as label.
pub fn chain_labels(complex_name: &str, chain_ids: &[&str]) -> Vec<String> {
    let tokens: Vec<&str> = complex_name.split('_').collect();
    chain_ids
        .iter()
        .enumerate()
        .map(|(i, id)| tokens.get(i).unwrap_or(id).to_string())
        .collect()
}

/// Analysis results of one complex.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexReport {
    pub name: String,
    pub consensus: ConsensusStats,
    /// Per-model interface statistics, ordered by model number
    pub models: Vec<ModelInterfaceReport>,
    /// Contacts of every model, in the same order as `models`
    pub contacts: Vec<ModelContacts>,
    /// Index of the best model in `models`
    best: usize,
}

impl ComplexReport {
    pub fn best_model(&self) -> &ModelInterfaceReport {
        &self.models[self.best]
    }
}

/// Analyze all predicted models of one complex.
pub fn analyze_complex(folder: &Path, name: &str, criteria: &ContactCriteria) -> Result<ComplexReport> {
    let structure_files = complex_files(folder, name, "pdb")?;
    if structure_files.is_empty() {
        return Err(AnalysisError::NoStructures(name.to_string()));
    }

    let pae_files: Vec<Option<PathBuf>> = match criteria.ignore_pae {
        true => vec![None; structure_files.len()],
        false => {
            let files = complex_files(folder, name, "json")?;
            if files.len() != structure_files.len() {
                return Err(AnalysisError::FileCountMismatch {
                    structures: structure_files.len(),
                    matrices: files.len(),
                });
            }
            files.into_iter().map(Some).collect()
        }
    };

    let mut models = Vec::with_capacity(structure_files.len());
    let mut contacts = Vec::with_capacity(structure_files.len());
    for (structure_file, pae_file) in structure_files.iter().zip(&pae_files) {
        let structure = load_structure(structure_file)?;
        let pae = pae_file.as_deref().map(load_pae).transpose()?;
        debug!("Retrieving contacts for model {}", structure.model_num());
        let model_contacts = get_contacts(&structure, pae.as_ref(), criteria)?;

        let labels = chain_labels(name, &structure.chain_ids());
        models.push(ModelInterfaceReport::build(&structure, &model_contacts, &labels));
        contacts.push(model_contacts);
    }

    let best = select_best_model(&models)
        .and_then(|best| models.iter().position(|m| std::ptr::eq(m, best)))
        .ok_or_else(|| AnalysisError::NoStructures(name.to_string()))?;
    info!("Model {} is the best model of {name}", models[best].model_num);

    let consensus = summarize_consensus(&contacts);
    Ok(ComplexReport {
        name: name.to_string(),
        consensus,
        models,
        contacts,
        best,
    })
}

/// Split `items` round-robin into at most `n_bins` non-empty bins; item `i` lands in bin `i % n`.
pub fn distribute<T>(items: Vec<T>, n_bins: usize) -> Result<Vec<Vec<T>>> {
    if n_bins == 0 {
        return Err(AnalysisError::NoWorkers);
    }
    let n_bins = n_bins.min(items.len());
    let mut bins: Vec<Vec<T>> = (0..n_bins).map(|_| Vec::new()).collect();
    for (i, item) in items.into_iter().enumerate() {
        bins[i % n_bins].push(item);
    }
    Ok(bins)
}

/// Everything one worker produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutput {
    pub reports: Vec<ComplexReport>,
    /// Complexes skipped because their analysis failed
    pub failed: Vec<String>,
}

/// Analyze a batch of complexes one after the other.
///
/// A complex that fails is logged and skipped; the rest of the batch continues.
pub fn analyze_batch(
    worker: usize,
    folder: &Path,
    names: &[String],
    criteria: &ContactCriteria,
) -> BatchOutput {
    let mut output = BatchOutput::default();
    for (i, name) in names.iter().enumerate() {
        info!("[worker {worker}] Analyzing {} / {}: {name}", i + 1, names.len());
        match analyze_complex(folder, name, criteria) {
            Ok(report) => output.reports.push(report),
            Err(e) => {
                error!("Skipping {name}: {e}");
                output.failed.push(name.clone());
            }
        }
    }
    output
}

/// Analyze complexes on a fixed number of workers, each handling its own round-robin batch.
///
/// `num_workers` of 0 uses one worker per available core. The outputs are
/// returned in worker order once all workers are done.
pub fn analyze_complexes(
    folder: &Path,
    names: Vec<String>,
    criteria: &ContactCriteria,
    num_workers: usize,
) -> Result<Vec<BatchOutput>> {
    let num_workers = match num_workers {
        0 => rayon::current_num_threads(),
        n => n,
    };
    let batches = distribute(names, num_workers)?;
    info!("Splitting analysis across {} worker(s)", batches.len());

    Ok(run_with_threads(batches.len(), || {
        batches
            .par_iter()
            .enumerate()
            .map(|(worker, names)| analyze_batch(worker, folder, names, criteria))
            .collect::<Vec<BatchOutput>>()
    }))
}

/// Result of analyzing a whole folder.
#[derive(Debug, Clone)]
pub struct FolderAnalysis {
    pub output_dir: PathBuf,
    pub reports: Reports,
    pub analyzed: usize,
    pub failed: Vec<String>,
}

/// Default output directory, `<folder>/<folder name>_analysis`.
pub fn default_output_dir(folder: &Path) -> PathBuf {
    let folder_name = folder
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "predictions".to_string());
    folder.join(format!("{folder_name}_analysis"))
}

/// Analyze every finished complex in a folder and write the merged reports.
///
/// Returns `None` if no complex is left to analyze after filtering.
pub fn analyze_folder(folder: &Path, options: &AnalysisOptions) -> Result<Option<FolderAnalysis>> {
    options.criteria.validate()?;

    let mut names = find_finished_complexes(folder)?;
    if let Some(filter) = options.name_filter.as_deref().filter(|f| !f.is_empty()) {
        names.retain(|name| name.contains(filter));
    }
    if names.is_empty() {
        return Ok(None);
    }
    info!(
        "Found {} complexes to analyze in folder {}",
        names.len(),
        folder.display()
    );

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(folder));
    if output_dir.is_dir() {
        info!("Reusing directory {}", output_dir.display());
    } else {
        std::fs::create_dir_all(&output_dir)?;
    }

    let batches = analyze_complexes(folder, names, &options.criteria, options.num_workers)?;
    let failed: Vec<String> = batches.iter().flat_map(|b| b.failed.clone()).collect();
    let analyzed: usize = batches.iter().map(|b| b.reports.len()).sum();

    let per_worker = batches
        .iter()
        .map(batch_reports)
        .collect::<Result<Vec<Reports>>>()?;
    let mut reports = merge_reports(per_worker)?;
    if analyzed == 0 {
        warn!("Was not able to generate any summary statistics");
    } else {
        write_reports(&mut reports, &output_dir, options.output_format)?;
    }

    Ok(Some(FolderAnalysis {
        output_dir,
        reports,
        analyzed,
        failed,
    }))
}
