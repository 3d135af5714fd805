//! In-memory representation of one predicted model of a complex.

use crate::chains::{split_chains, Chain, ChainExt};
use crate::errors::{AnalysisError, Result};
use crate::residues::{Atom, Residue, ResidueExt, BACKBONE_NITROGEN};
use crate::utils::{model_num_from_path, read_input_text};
use pdbtbx::{ErrorLevel, PDB};
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, error, trace, warn};

/// All residues of one predicted model, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureModel {
    model_num: usize,
    residues: Vec<Residue>,
}

impl StructureModel {
    /// Build a structure model, checking the model number and residue invariants.
    pub fn new(model_num: usize, residues: Vec<Residue>) -> Result<Self> {
        if !(1..=5).contains(&model_num) {
            return Err(AnalysisError::InvalidModelNumber {
                model: model_num,
                context: "structure models are numbered 1 to 5".to_string(),
            });
        }

        let mut last_index = 0;
        for res in &residues {
            if res.abs_index <= last_index {
                return Err(AnalysisError::InconsistentStructure(format!(
                    "absolute residue index {} of chain {} does not increase (previous {last_index})",
                    res.abs_index, res.chain
                )));
            }
            if !(0.0..=100.0).contains(&res.plddt) {
                return Err(AnalysisError::InconsistentStructure(format!(
                    "pLDDT {} of residue {}{} is outside 0-100",
                    res.plddt, res.chain, res.chain_index
                )));
            }
            last_index = res.abs_index;
        }

        Ok(Self {
            model_num,
            residues,
        })
    }

    /// Convert the first model of a parsed PDB file.
    ///
    /// Every backbone nitrogen opens a new residue; atoms preceding the first
    /// nitrogen of a chain are ignored. HETATM records are skipped.
    pub fn from_pdb(pdb: &PDB, model_num: usize) -> Result<Self> {
        let mut residues: Vec<Residue> = Vec::new();
        let mut abs_index = 0;

        if let Some(model) = pdb.models().next() {
            for chain in model.chains() {
                for residue in chain.residues() {
                    for conformer in residue.conformers() {
                        for atom in conformer.atoms().filter(|a| !a.hetero()) {
                            if atom.name() == BACKBONE_NITROGEN {
                                abs_index += 1;
                                let aa = conformer.resn().ok_or_else(|| {
                                    AnalysisError::UnknownResidue {
                                        name: conformer.name().to_string(),
                                    }
                                })?;
                                residues.push(Residue {
                                    chain: chain.id().to_string(),
                                    chain_index: residue.serial_number(),
                                    abs_index,
                                    aa,
                                    plddt: atom.b_factor(),
                                    atoms: Vec::new(),
                                });
                            }

                            match residues.last_mut() {
                                Some(current) if current.chain == chain.id() => {
                                    current.atoms.push(Atom::new(atom.name(), atom.pos()))
                                }
                                _ => trace!(
                                    "Ignoring atom {} of chain {} preceding any backbone nitrogen",
                                    atom.name(),
                                    chain.id()
                                ),
                            }
                        }
                    }
                }
            }
        }

        Self::new(model_num, residues)
    }

    pub fn model_num(&self) -> usize {
        self.model_num
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    /// Chains in file order.
    pub fn chains(&self) -> Vec<Chain<'_>> {
        split_chains(&self.residues)
    }

    /// Chain identifiers in file order.
    pub fn chain_ids(&self) -> Vec<&str> {
        self.chains().iter().map(|c| c.id).collect()
    }

    pub fn chain(&self, id: &str) -> Option<Chain<'_>> {
        self.chains().into_iter().find(|c| c.id == id)
    }
}

/// Load a predicted structure from a `.pdb` file, optionally gzip or xz compressed.
///
/// The model number is taken from the `model_<n>` tag of the file name and
/// pLDDT values are read from the B-factor column.
pub fn load_structure(path: &Path) -> Result<StructureModel> {
    let text = read_input_text(path, "pdb")?;
    let model_num = model_num_from_path(path)?;

    let (pdb, pdb_warnings) = pdbtbx::ReadOptions::default()
        .set_format(pdbtbx::Format::Pdb)
        .set_only_atomic_coords(true)
        .set_level(pdbtbx::StrictnessLevel::Loose)
        .read_raw(BufReader::new(text.as_bytes()))
        .map_err(|errors| AnalysisError::Structure {
            path: path.to_path_buf(),
            message: errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        })?;
    for e in &pdb_warnings {
        match e.level() {
            ErrorLevel::BreakingError => error!("{e}"),
            ErrorLevel::InvalidatingError => error!("{e}"),
            _ => warn!("{e}"),
        }
    }

    let structure = StructureModel::from_pdb(&pdb, model_num)?;
    if structure.residue_count() == 0 {
        return Err(AnalysisError::NoAtomRecords {
            path: path.to_path_buf(),
        });
    }
    debug!(
        "Loaded model {model_num} with {} residues in chains {:?} from {}",
        structure.residue_count(),
        structure.chain_ids(),
        path.display()
    );
    for chain in structure.chains() {
        debug!("Chain {}: {}", chain.id, chain.pdb_seq());
    }
    Ok(structure)
}
