use super::CriteriaArgs;
use clap::Parser;
use multimer_contacts::{analyze_folder, AnalysisOptions, DataFrameFileType, Result};
use std::path::PathBuf;
use tracing::{error, info, trace, warn};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Folders with the PDB and PAE JSON files of finished predictions.
    /// Complexes are found through their `.done.txt` marker files
    #[arg(required = true)]
    folders: Vec<PathBuf>,

    #[command(flatten)]
    criteria: CriteriaArgs,

    /// Only analyze complexes whose name contains this string
    #[arg(short, long)]
    name_filter: Option<String>,

    /// Number of workers analyzing complexes in parallel, 0 for one per core
    #[arg(short = 'j', long = "num-workers", default_value_t = 0)]
    num_workers: usize,

    /// Output file type
    #[arg(short = 't', long, default_value_t = DataFrameFileType::Csv)]
    output_format: DataFrameFileType,

    /// Output directory; defaults to `<folder>/<folder name>_analysis`.
    /// Only allowed with a single input folder
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(args: &Args) -> Result<()> {
    trace!("{args:?}");

    let options = AnalysisOptions {
        criteria: args.criteria.criteria()?,
        name_filter: args.name_filter.clone(),
        num_workers: args.num_workers,
        output_format: args.output_format,
        output_dir: args.output.clone(),
    };
    if options.output_dir.is_some() && args.folders.len() > 1 {
        warn!("Writing the reports of all folders into the same output directory");
    }

    for folder in &args.folders {
        if !folder.is_dir() {
            error!("{} is not a valid folder, skipping", folder.display());
            continue;
        }

        info!("Starting to analyze folder {}", folder.display());
        match analyze_folder(folder, &options)? {
            Some(analysis) => {
                if !analysis.failed.is_empty() {
                    warn!(
                        "Skipped {} complex(es): {}",
                        analysis.failed.len(),
                        analysis.failed.join(", ")
                    );
                }
                info!(
                    "Finished analyzing {} complex(es) in {}; reports saved to {}",
                    analysis.analyzed,
                    folder.display(),
                    analysis.output_dir.display()
                );
            }
            None => error!(
                "No complexes to analyze found in {}. Make sure every finished prediction has a .done.txt file",
                folder.display()
            ),
        }
    }
    Ok(())
}
