use crate::errors::{AnalysisError, Result};
use flate2::read::GzDecoder;
use polars::prelude::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{trace, warn};
use xz2::read::XzDecoder;

/// Run a closure inside a dedicated rayon thread pool.
///
/// `num_threads` of 0 lets rayon pick one thread per available core.
/// If the pool cannot be built the closure runs on the current pool instead.
pub fn run_with_threads<F, R>(num_threads: usize, f: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
    {
        Ok(pool) => pool.install(f),
        Err(e) => {
            warn!("Failed to build a thread pool with {num_threads} thread(s): {e}");
            f()
        }
    }
}

/// Extract the AlphaFold model number from a file name, e.g. `..._model_3_seed_000.pdb` -> 3.
///
/// Returns 0 if the name carries no `model_<n>` tag.
pub fn model_num_from_filename(filename: &str) -> usize {
    filename
        .match_indices("model_")
        .find_map(|(idx, tag)| {
            let digits: String = filename[idx + tag.len()..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        })
        .unwrap_or(0)
}

/// Model number of a structure or PAE file, validated to lie within 1..=5.
pub fn model_num_from_path(path: &Path) -> Result<usize> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let model = model_num_from_filename(filename);
    if !(1..=5).contains(&model) {
        return Err(AnalysisError::InvalidModelNumber {
            model,
            context: format!(
                "there are only 5 AlphaFold models; cannot analyze {}",
                path.display()
            ),
        });
    }
    Ok(model)
}

/// Compression applied on top of an input file, picked from its trailing extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Gzip,
    Xz,
}

impl Compression {
    fn from_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("gz") {
            Compression::Gzip
        } else if ext.eq_ignore_ascii_case("xz") {
            Compression::Xz
        } else {
            Compression::Plain
        }
    }
}

/// Make sure an input file exists and has the expected extension.
///
/// A trailing `.gz` or `.xz` is peeled off first, so `model_1.pdb.gz` passes as `pdb`.
pub fn check_input_file(path: &Path, expected: &'static str) -> Result<Compression> {
    if !path.is_file() {
        return Err(AnalysisError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let ext_of = |p: &Path| p.extension().and_then(|ext| ext.to_str()).map(str::to_owned);
    let compression = ext_of(path)
        .map(|ext| Compression::from_extension(&ext))
        .unwrap_or(Compression::Plain);
    let inner = match compression {
        Compression::Plain => ext_of(path),
        _ => path.file_stem().and_then(|stem| ext_of(Path::new(stem))),
    };
    match inner {
        Some(ext) if ext.eq_ignore_ascii_case(expected) => Ok(compression),
        _ => Err(AnalysisError::InvalidExtension {
            path: path.to_path_buf(),
            expected,
        }),
    }
}

/// Read an input file to text, decompressing gzip and xz archives on the fly.
pub fn read_input_text(path: &Path, expected: &'static str) -> Result<String> {
    let compression = check_input_file(path, expected)?;
    let file = File::open(path)?;
    let mut reader: Box<dyn Read> = match compression {
        Compression::Plain => Box::new(file),
        Compression::Gzip => Box::new(GzDecoder::new(file)),
        Compression::Xz => Box::new(XzDecoder::new(file)),
    };
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    trace!(
        "Read {} bytes of {compression:?} input from {}",
        text.len(),
        path.display()
    );
    Ok(text)
}

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Write a DataFrame to a file, replacing the extension by the one of `file_type`.
pub fn write_df_to_file(
    df: &mut DataFrame,
    file_path: &Path,
    file_type: DataFrameFileType,
) -> Result<()> {
    let file_suffix = file_type.to_string();
    let mut file = std::fs::File::create(file_path.with_extension(file_suffix))?;
    match file_type {
        DataFrameFileType::Csv => {
            CsvWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Json => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(df)?;
        }
        DataFrameFileType::NDJson => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::JsonLines)
                .finish(df)?;
        }
    }
    Ok(())
}

/// File format for writing DataFrames.
#[derive(clap::ValueEnum, Clone, Debug, Copy, Default, PartialEq, Eq)]
pub enum DataFrameFileType {
    /// Comma-separated values
    #[default]
    Csv,
    /// Parquet columnar storage
    Parquet,
    /// Standard JSON
    Json,
    /// Newline-delimited JSON
    NDJson,
}

impl std::fmt::Display for DataFrameFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DataFrameFileType::Csv => write!(f, "csv"),
            DataFrameFileType::Parquet => write!(f, "parquet"),
            DataFrameFileType::Json => write!(f, "json"),
            DataFrameFileType::NDJson => write!(f, "ndjson"),
        }
    }
}
