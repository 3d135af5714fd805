use super::CriteriaArgs;
use clap::Parser;
use multimer_contacts::reports::contacts_df;
use multimer_contacts::{
    get_contacts, load_pae, load_structure, write_df_to_file, DataFrameFileType, Result,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Path to the predicted structure in PDB format
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the matching PAE scores JSON file
    #[arg(long = "pae-file")]
    pae_file: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Name of the output file
    #[arg(short = 'f', long = "filename", default_value_t = String::from("contacts"))]
    filename: String,

    /// Output file type
    #[arg(short = 't', long, default_value_t = DataFrameFileType::Csv)]
    output_format: DataFrameFileType,

    #[command(flatten)]
    criteria: CriteriaArgs,
}

pub(crate) fn run(args: &Args) -> Result<()> {
    trace!("{args:?}");
    let criteria = args.criteria.criteria()?;

    let structure = load_structure(&args.input)?;
    let pae = match (&args.pae_file, criteria.ignore_pae) {
        (Some(path), false) => Some(load_pae(path)?),
        (Some(_), true) => {
            debug!("Ignoring the PAE file");
            None
        }
        (None, false) => {
            warn!("No PAE file given, contacts are not filtered by PAE");
            None
        }
        (None, true) => None,
    };

    let contacts = get_contacts(&structure, pae.as_ref(), &criteria)?;
    for (pair, interface) in &contacts.interfaces {
        info!("Found {} contacts between chains {pair}", interface.len());
    }
    if contacts.is_empty() {
        warn!("No contacts found in {}", args.input.display());
    }

    let name = args
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut df = contacts_df(contacts.contacts().map(|c| (name.as_str(), c)))?;

    std::fs::create_dir_all(&args.output)?;
    let output_file = Path::new(&args.output)
        .join(&args.filename)
        .with_extension(args.output_format.to_string());
    write_df_to_file(&mut df, &output_file, args.output_format)?;
    info!("Results saved to {}", output_file.display());
    Ok(())
}
