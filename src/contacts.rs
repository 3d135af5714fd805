//! Inter-chain contact detection.
//!
//! Contacts are found in two phases. A broad phase compares only the backbone
//! nitrogen of each residue against a relaxed cutoff of `(d + 20)²`, using an
//! R*-tree over the nitrogens of the second chain. A narrow phase then finds
//! the closest pair of atoms for every candidate residue pair and keeps it if
//! that distance is below `d`. The 20 Å margin covers the largest displacement
//! of any atom from the nitrogen of its residue, so no true contact is lost.
//!
//! Geometric contacts are then filtered by PAE and amino acid type.

use crate::errors::{AnalysisError, Result};
use crate::pae::PaeMatrix;
use crate::residues::Residue;
use crate::structure::StructureModel;
use crate::utils::round_to;
use rstar::{primitives::GeomWithData, RTree};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, trace, warn};

/// Margin added to the contact distance in the broad phase.
pub const BROAD_PHASE_MARGIN: f64 = 20.0;

/// The 20 standard amino acids accepted in type restrictions.
const STANDARD_AAS: &str = "ACDEFGHIKLMNPQRSTVWY";

/// How to combine the two directional PAE values (i, j) and (j, i) of a residue pair.
#[derive(
    clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PaeMode {
    /// Mean of both values
    Avg,
    /// Smaller of both values
    #[default]
    Min,
}

impl PaeMode {
    pub fn combine(self, pae_ij: f64, pae_ji: f64) -> f64 {
        match self {
            PaeMode::Avg => 0.5 * (pae_ij + pae_ji),
            PaeMode::Min => pae_ij.min(pae_ji),
        }
    }
}

impl fmt::Display for PaeMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PaeMode::Avg => write!(f, "avg"),
            PaeMode::Min => write!(f, "min"),
        }
    }
}

/// Criteria a residue pair has to meet to count as a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactCriteria {
    /// Maximum distance in Ångströms between the closest atoms of both residues
    pub max_distance: f64,
    /// Minimum pLDDT of both residues
    pub min_plddt: f64,
    /// Maximum combined PAE of the pair
    pub max_pae: f64,
    /// How to combine the two directional PAE values
    pub pae_mode: PaeMode,
    /// Allowed one-letter residue types; empty allows all
    pub valid_aas: BTreeSet<char>,
    /// Skip PAE filtering entirely
    pub ignore_pae: bool,
    /// Also search for contacts within each chain
    pub within_chain: bool,
}

impl Default for ContactCriteria {
    fn default() -> Self {
        Self {
            max_distance: 8.0,
            min_plddt: 50.0,
            max_pae: 15.0,
            pae_mode: PaeMode::Min,
            valid_aas: BTreeSet::new(),
            ignore_pae: false,
            within_chain: false,
        }
    }
}

impl ContactCriteria {
    /// Check the criteria are within their sensible ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_distance < 1.0 {
            return Err(AnalysisError::InvalidCriteria(
                "the distance cutoff has been set too low, use a number of at least 1 Ångström"
                    .to_string(),
            ));
        }
        if !self.ignore_pae && self.max_pae < 1.0 {
            return Err(AnalysisError::InvalidCriteria(
                "the PAE cutoff has been set too low, use a number of at least 1 Ångström"
                    .to_string(),
            ));
        }
        if !(1.0..=99.0).contains(&self.min_plddt) {
            return Err(AnalysisError::InvalidCriteria(
                "the pLDDT cutoff must lie between 1 and 99".to_string(),
            ));
        }
        Ok(())
    }

    /// Restrict contacts to the amino acid types in `aas`, see [`parse_valid_aas`].
    pub fn with_valid_aas(mut self, aas: &str) -> Self {
        self.valid_aas = parse_valid_aas(aas);
        self
    }

    /// Whether a residue type passes the amino acid restriction.
    pub fn allows(&self, aa: char) -> bool {
        self.valid_aas.is_empty() || self.valid_aas.contains(&aa)
    }

    fn broad_cutoff_squared(&self) -> f64 {
        (self.max_distance + BROAD_PHASE_MARGIN).powi(2)
    }

    fn cutoff_squared(&self) -> f64 {
        self.max_distance.powi(2)
    }
}

/// Upper-case a string of one-letter codes and drop anything that is not a standard amino acid.
pub fn parse_valid_aas(aas: &str) -> BTreeSet<char> {
    aas.to_uppercase()
        .chars()
        .filter(|c| STANDARD_AAS.contains(*c))
        .collect()
}

/// The two chains of an interface, in the order they were compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainPair {
    pub first: String,
    pub second: String,
}

impl ChainPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

impl fmt::Display for ChainPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.second)
    }
}

/// Unordered pair of absolute residue indices identifying a contact within an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactKey {
    pub low: usize,
    pub high: usize,
}

impl ContactKey {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }
}

impl fmt::Display for ContactKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}&{}", self.low, self.high)
    }
}

/// One side of a contact.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactResidue {
    pub chain: String,
    pub chain_index: isize,
    pub abs_index: usize,
    pub aa: char,
    pub plddt: f64,
    /// Name of the atom closest to the other residue
    pub atom: String,
}

impl ContactResidue {
    fn new(res: &Residue, atom: &str) -> Self {
        Self {
            chain: res.chain.clone(),
            chain_index: res.chain_index,
            abs_index: res.abs_index,
            aa: res.aa,
            plddt: res.plddt,
            atom: atom.to_string(),
        }
    }
}

/// A residue pair whose closest atoms are within the distance cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometricContact {
    pub aa1: ContactResidue,
    pub aa2: ContactResidue,
    /// Distance between the closest atoms, rounded to 0.1 Å
    pub distance: f64,
}

/// A contact that met all geometric and confidence criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub aa1: ContactResidue,
    pub aa2: ContactResidue,
    pub distance: f64,
    /// Combined PAE of the pair, 0 if PAE is ignored
    pub pae: f64,
    /// PAE values at (aa1, aa2) and (aa2, aa1)
    pub paes: [f64; 2],
    pub model_num: usize,
}

impl Contact {
    pub fn chain_pair(&self) -> ChainPair {
        ChainPair::new(self.aa1.chain.as_str(), self.aa2.chain.as_str())
    }

    pub fn key(&self) -> ContactKey {
        ContactKey::new(self.aa1.abs_index, self.aa2.abs_index)
    }

    /// Mean pLDDT of both residues.
    pub fn avg_plddt(&self) -> f64 {
        0.5 * (self.aa1.plddt + self.aa2.plddt)
    }
}

/// Contacts of a single interface.
pub type InterfaceContacts = BTreeMap<ContactKey, Contact>;

/// All contacts of one model, grouped by chain pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelContacts {
    pub model_num: usize,
    pub interfaces: BTreeMap<ChainPair, InterfaceContacts>,
}

impl ModelContacts {
    pub fn empty(model_num: usize) -> Self {
        Self {
            model_num,
            interfaces: BTreeMap::new(),
        }
    }

    pub fn interface(&self, pair: &ChainPair) -> Option<&InterfaceContacts> {
        self.interfaces.get(pair)
    }

    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.interfaces.values().flat_map(|contacts| contacts.values())
    }

    pub fn len(&self) -> usize {
        self.interfaces.values().map(|contacts| contacts.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, contact: Contact) {
        self.interfaces
            .entry(contact.chain_pair())
            .or_default()
            .insert(contact.key(), contact);
    }
}

/// Residues of one chain that passed the pLDDT filter.
struct EligibleChain<'a> {
    id: &'a str,
    residues: Vec<&'a Residue>,
}

/// Drop residues below the pLDDT cutoff before any geometry is computed.
fn eligible_chains<'a>(
    structure: &'a StructureModel,
    criteria: &ContactCriteria,
) -> Vec<EligibleChain<'a>> {
    structure
        .chains()
        .into_iter()
        .filter_map(|chain| {
            let residues: Vec<&Residue> = chain
                .residues
                .iter()
                .filter(|res| res.plddt >= criteria.min_plddt)
                .collect();
            match residues.is_empty() {
                true => None,
                false => Some(EligibleChain {
                    id: chain.id,
                    residues,
                }),
            }
        })
        .collect()
}

/// Broad phase: residue index pairs whose backbone nitrogens are closer than `sqrt(cutoff_squared)`.
///
/// Residues without a backbone nitrogen never become candidates.
pub fn broad_phase_candidates(
    chain_a: &[&Residue],
    chain_b: &[&Residue],
    cutoff_squared: f64,
) -> Vec<(usize, usize)> {
    let tree = RTree::bulk_load(
        chain_b
            .iter()
            .enumerate()
            .filter_map(|(j, res)| res.nitrogen().map(|n| GeomWithData::new(n.coords(), j)))
            .collect(),
    );

    chain_a
        .iter()
        .enumerate()
        .filter_map(|(i, res)| res.nitrogen().map(|n| (i, n)))
        .flat_map(|(i, n)| {
            let mut neighbors: Vec<usize> = tree
                .locate_within_distance(n.coords(), cutoff_squared)
                .filter(|point| {
                    let [x, y, z] = *point.geom();
                    let d2 = (x - n.pos.x).powi(2) + (y - n.pos.y).powi(2) + (z - n.pos.z).powi(2);
                    d2 < cutoff_squared
                })
                .map(|point| point.data)
                .collect();
            neighbors.sort_unstable();
            neighbors.into_iter().map(move |j| (i, j))
        })
        .collect()
}

/// Narrow phase: accept a residue pair if its closest atoms are within `sqrt(cutoff_squared)`.
pub fn narrow_phase(r1: &Residue, r2: &Residue, cutoff_squared: f64) -> Option<GeometricContact> {
    let (min_d2, atom1, atom2) = r1.closest_atoms(r2)?;
    match min_d2 < cutoff_squared {
        true => Some(GeometricContact {
            aa1: ContactResidue::new(r1, &atom1.name),
            aa2: ContactResidue::new(r2, &atom2.name),
            distance: round_to(min_d2.sqrt(), 1),
        }),
        false => None,
    }
}

/// Find all residue pairs in contact between chains of a structure.
///
/// Every unordered pair of distinct chains is compared once, the first chain
/// always preceding the second in file order. With `within_chain` set, each
/// chain is additionally compared against itself.
pub fn find_structure_contacts(
    structure: &StructureModel,
    criteria: &ContactCriteria,
) -> Vec<GeometricContact> {
    let chains = eligible_chains(structure, criteria);
    let broad_cutoff = criteria.broad_cutoff_squared();
    let cutoff = criteria.cutoff_squared();

    let mut contacts = Vec::new();
    for (i, chain_1) in chains.iter().enumerate() {
        let i2_start = if criteria.within_chain { i } else { i + 1 };
        for (i2, chain_2) in chains.iter().enumerate().skip(i2_start) {
            let candidates = broad_phase_candidates(&chain_1.residues, &chain_2.residues, broad_cutoff);
            trace!(
                "{} candidate residue pairs between chains {} and {}",
                candidates.len(),
                chain_1.id,
                chain_2.id
            );

            for (c1_res_ix, c2_res_ix) in candidates {
                // Within a chain, compare each unordered pair of distinct residues once
                if i == i2 && c2_res_ix <= c1_res_ix {
                    continue;
                }
                let r1 = chain_1.residues[c1_res_ix];
                let r2 = chain_2.residues[c2_res_ix];
                if let Some(contact) = narrow_phase(r1, r2, cutoff) {
                    contacts.push(contact);
                }
            }
        }
    }

    debug!(
        "Found {} geometric contacts in model {}",
        contacts.len(),
        structure.model_num()
    );
    contacts
}

/// Apply the PAE and amino acid type criteria to geometric contacts.
///
/// Without a PAE matrix (or with `ignore_pae` set) the PAE values are reported as 0.
pub fn filter_contacts(
    geometric: Vec<GeometricContact>,
    pae: Option<&PaeMatrix>,
    criteria: &ContactCriteria,
    model_num: usize,
) -> Result<ModelContacts> {
    let pae = pae.filter(|_| !criteria.ignore_pae);
    let mut filtered = ModelContacts::empty(model_num);

    for c in geometric {
        let (paes, pae_value) = match pae {
            Some(matrix) => {
                let paes = [
                    matrix.value_at(c.aa1.abs_index, c.aa2.abs_index)?,
                    matrix.value_at(c.aa2.abs_index, c.aa1.abs_index)?,
                ];
                let pae_value = criteria.pae_mode.combine(paes[0], paes[1]);
                if pae_value > criteria.max_pae {
                    trace!(
                        "Dropping {}{}-{}{} with PAE {pae_value}",
                        c.aa1.chain,
                        c.aa1.chain_index,
                        c.aa2.chain,
                        c.aa2.chain_index
                    );
                    continue;
                }
                (paes, pae_value)
            }
            None => ([0.0, 0.0], 0.0),
        };

        if !criteria.allows(c.aa1.aa) || !criteria.allows(c.aa2.aa) {
            continue;
        }

        filtered.insert(Contact {
            aa1: c.aa1,
            aa2: c.aa2,
            distance: c.distance,
            pae: pae_value,
            paes,
            model_num,
        });
    }

    Ok(filtered)
}

/// Find all contacts of a predicted model that meet the criteria.
///
/// The PAE matrix, if given, must come from the same model as the structure.
pub fn get_contacts(
    structure: &StructureModel,
    pae: Option<&PaeMatrix>,
    criteria: &ContactCriteria,
) -> Result<ModelContacts> {
    let model_num = structure.model_num();
    let pae = pae.filter(|_| !criteria.ignore_pae);

    if let Some(matrix) = pae {
        if matrix.model_num() != model_num {
            return Err(AnalysisError::ModelNumberMismatch {
                structure: model_num,
                matrix: matrix.model_num(),
            });
        }
        if matrix.size() != structure.residue_count() {
            warn!(
                "PAE matrix of model {model_num} covers {} residues but the structure has {}",
                matrix.size(),
                structure.residue_count()
            );
        }
    }

    let geometric = find_structure_contacts(structure, criteria);
    if geometric.is_empty() {
        return Ok(ModelContacts::empty(model_num));
    }

    filter_contacts(geometric, pae, criteria, model_num)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pae::load_pae;
    use crate::residues::Atom;
    use crate::structure::load_structure;
    use std::path::{Path, PathBuf};

    fn test_file(name: &str) -> PathBuf {
        let root = env!("CARGO_MANIFEST_DIR");
        Path::new(root).join("test-data").join(name)
    }

    fn model_files(model: usize) -> (PathBuf, PathBuf) {
        (
            test_file(&format!(
                "PROTA_PROTB_unrelaxed_rank_00{model}_alphafold2_multimer_v3_model_{model}_seed_000.pdb"
            )),
            test_file(&format!(
                "PROTA_PROTB_scores_rank_00{model}_alphafold2_multimer_v3_model_{model}_seed_000.json"
            )),
        )
    }

    /// A residue whose atoms are offset from its backbone nitrogen at `origin`.
    fn residue(chain: &str, abs_index: usize, aa: char, plddt: f64, origin: (f64, f64, f64)) -> Residue {
        let (x, y, z) = origin;
        Residue {
            chain: chain.to_string(),
            chain_index: abs_index as isize,
            abs_index,
            aa,
            plddt,
            atoms: vec![
                Atom::new("N", (x, y, z)),
                Atom::new("CA", (x + 1.5, y, z)),
                Atom::new("CB", (x + 1.5, y - 1.5, z)),
            ],
        }
    }

    #[test]
    fn test_single_contact_without_pae() {
        // N atoms 5 Å apart, all other atoms further away
        let structure = StructureModel::new(
            1,
            vec![
                residue("A", 1, 'K', 90.0, (0.0, 0.0, 0.0)),
                residue("B", 2, 'E', 90.0, (0.0, 0.0, 5.0)),
            ],
        )
        .unwrap();
        let criteria = ContactCriteria {
            min_plddt: 50.0,
            ..Default::default()
        };

        let contacts = get_contacts(&structure, None, &criteria).unwrap();
        assert_eq!(contacts.len(), 1);

        let contact = contacts.contacts().next().unwrap();
        assert_eq!(contact.chain_pair(), ChainPair::new("A", "B"));
        assert_eq!(contact.key(), ContactKey::new(1, 2));
        assert_eq!(contact.distance, 5.0);
        assert_eq!(contact.pae, 0.0);
        assert_eq!(contact.paes, [0.0, 0.0]);
        assert_eq!(contact.model_num, 1);
    }

    #[test]
    fn test_min_pae_of_symmetric_pair() {
        let structure = StructureModel::new(
            1,
            vec![
                residue("A", 1, 'K', 90.0, (0.0, 0.0, 0.0)),
                residue("B", 2, 'E', 90.0, (0.0, 0.0, 5.0)),
            ],
        )
        .unwrap();
        let pae = PaeMatrix::new(1, vec![0.0, 5.0, 5.0, 0.0]).unwrap();
        let contacts = get_contacts(&structure, Some(&pae), &ContactCriteria::default()).unwrap();
        let contact = contacts.contacts().next().unwrap();
        assert_eq!(contact.pae, 5.0);
        assert_eq!(contact.paes, [5.0, 5.0]);
    }

    #[test]
    fn test_pae_modes() {
        assert_eq!(PaeMode::Min.combine(8.0, 10.0), 8.0);
        assert_eq!(PaeMode::Avg.combine(8.0, 10.0), 9.0);
        assert_eq!(PaeMode::Avg.combine(20.0, 25.0), 22.5);
    }

    #[test]
    fn test_model_mismatch() {
        let (pdb, _) = model_files(1);
        let (_, json) = model_files(2);
        let structure = load_structure(&pdb).unwrap();
        let pae = load_pae(&json).unwrap();

        let res = get_contacts(&structure, Some(&pae), &ContactCriteria::default());
        assert!(matches!(
            res,
            Err(AnalysisError::ModelNumberMismatch {
                structure: 1,
                matrix: 2
            })
        ));

        // Ignoring PAE also ignores its model number
        let criteria = ContactCriteria {
            ignore_pae: true,
            ..Default::default()
        };
        assert!(get_contacts(&structure, Some(&pae), &criteria).is_ok());
    }

    #[test]
    fn test_pae_index_mismatch() {
        let structure = StructureModel::new(
            1,
            vec![
                residue("A", 1, 'K', 90.0, (0.0, 0.0, 0.0)),
                residue("A", 2, 'K', 90.0, (15.0, 0.0, 0.0)),
                residue("B", 3, 'E', 90.0, (15.0, 0.0, 5.0)),
            ],
        )
        .unwrap();
        let pae = PaeMatrix::new(1, vec![0.0, 5.0, 5.0, 0.0]).unwrap();
        let res = get_contacts(&structure, Some(&pae), &ContactCriteria::default());
        assert!(matches!(
            res,
            Err(AnalysisError::MatrixIndexOutOfBounds { size: 2, .. })
        ));
    }

    #[test]
    fn test_single_chain_has_no_contacts() {
        let structure = StructureModel::new(
            1,
            vec![
                residue("A", 1, 'K', 90.0, (0.0, 0.0, 0.0)),
                residue("A", 2, 'E', 90.0, (0.0, 0.0, 5.0)),
            ],
        )
        .unwrap();
        // A matrix that would fail every lookup is never touched
        let pae = PaeMatrix::new(1, vec![0.0]).unwrap();
        let contacts = get_contacts(&structure, Some(&pae), &ContactCriteria::default()).unwrap();
        assert!(contacts.is_empty());

        // Within-chain mode compares the chain against itself
        let criteria = ContactCriteria {
            within_chain: true,
            ignore_pae: true,
            ..Default::default()
        };
        let contacts = get_contacts(&structure, None, &criteria).unwrap();
        assert_eq!(contacts.len(), 1);
        let contact = contacts.contacts().next().unwrap();
        assert_eq!(contact.chain_pair(), ChainPair::new("A", "A"));
        assert_eq!(contact.key(), ContactKey::new(1, 2));
    }

    #[test]
    fn test_plddt_prefilter() {
        let structure = StructureModel::new(
            1,
            vec![
                residue("A", 1, 'K', 49.9, (0.0, 0.0, 0.0)),
                residue("B", 2, 'E', 90.0, (0.0, 0.0, 5.0)),
            ],
        )
        .unwrap();
        let contacts = get_contacts(&structure, None, &ContactCriteria::default()).unwrap();
        assert!(contacts.is_empty());
    }

    #[test]
    fn test_valid_aas() {
        let structure = StructureModel::new(
            1,
            vec![
                residue("A", 1, 'K', 90.0, (0.0, 0.0, 0.0)),
                residue("A", 2, 'R', 90.0, (15.0, 0.0, 0.0)),
                residue("B", 3, 'E', 90.0, (0.0, 0.0, 5.0)),
                residue("B", 4, 'K', 90.0, (15.0, 0.0, 5.0)),
            ],
        )
        .unwrap();
        let criteria = ContactCriteria::default().with_valid_aas("kr");
        assert_eq!(criteria.valid_aas, BTreeSet::from(['K', 'R']));

        let contacts = get_contacts(&structure, None, &criteria).unwrap();
        let keys: Vec<ContactKey> = contacts.contacts().map(|c| c.key()).collect();
        assert_eq!(keys, vec![ContactKey::new(2, 4)]);
    }

    #[test]
    fn test_parse_valid_aas() {
        assert_eq!(parse_valid_aas("k r-x1B"), BTreeSet::from(['K', 'R']));
        assert!(parse_valid_aas("").is_empty());
    }

    #[test]
    fn test_broad_phase_is_superset() {
        let (pdb, _) = model_files(1);
        let structure = load_structure(&pdb).unwrap();
        let chains = structure.chains();
        let chain_a: Vec<&Residue> = chains[0].residues.iter().collect();
        let chain_b: Vec<&Residue> = chains[1].residues.iter().collect();

        for d in [0.5, 2.0, 2.6, 4.0, 8.0, 12.0] {
            let broad = broad_phase_candidates(&chain_a, &chain_b, (d + BROAD_PHASE_MARGIN).powi(2));
            let exhaustive: Vec<(usize, usize)> = (0..chain_a.len())
                .flat_map(|i| (0..chain_b.len()).map(move |j| (i, j)))
                .filter(|&(i, j)| narrow_phase(chain_a[i], chain_b[j], d * d).is_some())
                .collect();
            for pair in &exhaustive {
                assert!(
                    broad.contains(pair),
                    "Broad phase missed {pair:?} at cutoff {d}"
                );
            }
        }
    }

    #[test]
    fn test_relabeling_symmetry() {
        let (pdb, _) = model_files(1);
        let structure = load_structure(&pdb).unwrap();
        let chains = structure.chains();
        let chain_a: Vec<&Residue> = chains[0].residues.iter().collect();
        let chain_b: Vec<&Residue> = chains[1].residues.iter().collect();

        let cutoff = 8.0 * 8.0;
        let broad = (8.0 + BROAD_PHASE_MARGIN) * (8.0 + BROAD_PHASE_MARGIN);
        let mut ab: Vec<ContactKey> = broad_phase_candidates(&chain_a, &chain_b, broad)
            .into_iter()
            .filter_map(|(i, j)| narrow_phase(chain_a[i], chain_b[j], cutoff))
            .map(|c| ContactKey::new(c.aa1.abs_index, c.aa2.abs_index))
            .collect();
        let mut ba: Vec<ContactKey> = broad_phase_candidates(&chain_b, &chain_a, broad)
            .into_iter()
            .filter_map(|(i, j)| narrow_phase(chain_b[i], chain_a[j], cutoff))
            .map(|c| ContactKey::new(c.aa1.abs_index, c.aa2.abs_index))
            .collect();
        ab.sort();
        ba.sort();
        assert_eq!(ab, ba);
        assert_eq!(ab.len(), 3);
    }

    #[test]
    fn test_predicted_models() {
        // Model 1: A1-B1 and A2-B2 in contact, A3 below the pLDDT cutoff
        let (pdb, json) = model_files(1);
        let structure = load_structure(&pdb).unwrap();
        let pae = load_pae(&json).unwrap();
        let contacts = get_contacts(&structure, Some(&pae), &ContactCriteria::default()).unwrap();

        let interface = contacts.interface(&ChainPair::new("A", "B")).unwrap();
        let keys: Vec<ContactKey> = interface.keys().copied().collect();
        assert_eq!(keys, vec![ContactKey::new(1, 4), ContactKey::new(2, 5)]);

        let c14 = &interface[&ContactKey::new(1, 4)];
        assert_eq!(c14.distance, 2.5);
        assert_eq!(c14.aa1.atom, "O");
        assert_eq!(c14.aa2.atom, "CB");
        assert_eq!(c14.paes, [4.0, 6.0]);
        assert_eq!(c14.pae, 4.0);
        assert_eq!(c14.aa1.chain_index, 1);
        assert_eq!(c14.aa2.chain_index, 1);
        assert_eq!(interface[&ContactKey::new(2, 5)].pae, 8.0);

        // Model 2: the A2-B2 pair is dropped for its PAE
        let (pdb, json) = model_files(2);
        let structure = load_structure(&pdb).unwrap();
        let pae = load_pae(&json).unwrap();
        let contacts = get_contacts(&structure, Some(&pae), &ContactCriteria::default()).unwrap();
        assert_eq!(contacts.len(), 1);

        // ... unless the PAE cutoff is relaxed
        let relaxed = ContactCriteria {
            max_pae: 30.0,
            pae_mode: PaeMode::Avg,
            ..Default::default()
        };
        let contacts = get_contacts(&structure, Some(&pae), &relaxed).unwrap();
        assert_eq!(contacts.len(), 2);
        let interface = contacts.interface(&ChainPair::new("A", "B")).unwrap();
        assert_eq!(interface[&ContactKey::new(2, 5)].pae, 22.5);
    }

    #[test]
    fn test_validate_criteria() {
        assert!(ContactCriteria::default().validate().is_ok());
        let too_close = ContactCriteria {
            max_distance: 0.5,
            ..Default::default()
        };
        assert!(too_close.validate().is_err());
        let bad_plddt = ContactCriteria {
            min_plddt: 100.0,
            ..Default::default()
        };
        assert!(bad_plddt.validate().is_err());
        let low_pae = ContactCriteria {
            max_pae: 0.5,
            ..Default::default()
        };
        assert!(low_pae.validate().is_err());
        let ignored_pae = ContactCriteria {
            max_pae: 0.5,
            ignore_pae: true,
            ..Default::default()
        };
        assert!(ignored_pae.validate().is_ok());
    }

    #[test]
    fn test_criteria_from_json() {
        let criteria: ContactCriteria =
            serde_json::from_str(r#"{"max_distance": 5.0, "pae_mode": "avg"}"#).unwrap();
        assert_eq!(criteria.max_distance, 5.0);
        assert_eq!(criteria.pae_mode, PaeMode::Avg);
        assert_eq!(criteria.min_plddt, 50.0);
    }
}
