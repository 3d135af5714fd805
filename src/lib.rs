//! # multimer-contacts
//!
//! Inter-chain contact analysis for ensembles of predicted protein complexes,
//! such as the ranked models ColabFold writes for an AlphaFold-Multimer run.
//!
//! For every model of a complex the library finds residue pairs in contact
//! across chains, keeps those that pass pLDDT and PAE confidence cutoffs,
//! scores each interface with pDockQ and summarizes the confidence of its
//! contacts. Across the models of a complex it then measures how often each
//! contact was reproduced and picks the best model.
//!
//! Results are returned as Polars DataFrames, which can be written to CSV,
//! Parquet or JSON.
//!
//! ```no_run
//! use multimer_contacts::{get_contacts, load_pae, load_structure, ContactCriteria};
//! use std::path::Path;
//!
//! let structure = load_structure(Path::new("complex_unrelaxed_rank_001_model_1_seed_000.pdb"))?;
//! let pae = load_pae(Path::new("complex_scores_rank_001_model_1_seed_000.json"))?;
//! let contacts = get_contacts(&structure, Some(&pae), &ContactCriteria::default())?;
//! println!("Found {} contacts", contacts.len());
//! # Ok::<(), multimer_contacts::AnalysisError>(())
//! ```

pub mod chains;
pub mod complexes;
pub mod consensus;
pub mod contacts;
pub mod errors;
pub mod pae;
pub mod pdockq;
pub mod reports;
pub mod residues;
pub mod stats;
pub mod structure;
pub mod utils;

// Re-export key public types
pub use complexes::{analyze_complex, analyze_folder, distribute, AnalysisOptions, ComplexReport};
pub use consensus::{summarize_consensus, ConsensusStats};
pub use contacts::{
    get_contacts, ChainPair, Contact, ContactCriteria, ContactKey, ModelContacts, PaeMode,
};
pub use errors::{AnalysisError, Result};
pub use pae::{load_pae, PaeMatrix};
pub use pdockq::get_pdockq;
pub use reports::Reports;
pub use stats::{interface_stats, select_best_model, InterfaceStats, ModelInterfaceReport};
pub use structure::{load_structure, StructureModel};
pub use utils::{run_with_threads, write_df_to_file, DataFrameFileType};
