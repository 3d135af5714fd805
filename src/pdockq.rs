//! pDockQ interface confidence score.
//!
//! The score was fitted by Bryant, Pozzati & Elofsson, "Improved prediction of
//! protein-protein interactions using AlphaFold2" (Nat Commun, 2022):
//!
//! pDockQ = L / (1 + exp(-k (x - x0))) + b, with x = mean interface pLDDT × log10(number of interface contacts)
//!
//! Interface contacts are pairs of CB atoms (CA for glycine) from both chains
//! within 8 Å. The fitted constants give an output range of [0.018, 0.742).

use crate::chains::Chain;
use crate::residues::Residue;
use crate::structure::StructureModel;
use std::collections::BTreeSet;

/// Distance cutoff between representative atoms of an interface contact.
pub const PDOCKQ_CONTACT_DISTANCE: f64 = 8.0;

const L: f64 = 0.724;
const K: f64 = 0.052;
const X0: f64 = 152.611;
const B: f64 = 0.018;

/// The fitted logistic curve.
pub fn pdockq_from_interface(avg_if_plddt: f64, n_if_contacts: usize) -> f64 {
    let x = avg_if_plddt * (n_if_contacts as f64).log10();
    L / (1.0 + (-K * (x - X0)).exp()) + B
}

/// Residues of a chain that carry a representative atom.
fn representatives<'a>(chain: &Chain<'a>) -> Vec<&'a Residue> {
    chain
        .residues
        .iter()
        .filter(|res| res.representative_atom().is_some())
        .collect()
}

/// pDockQ of the interface between two chains of a structure.
///
/// Returns 0 if either chain is missing, has no representative atoms, or no
/// pair of representative atoms is within [`PDOCKQ_CONTACT_DISTANCE`].
pub fn get_pdockq(structure: &StructureModel, chain1: &str, chain2: &str) -> f64 {
    let (Some(c1), Some(c2)) = (structure.chain(chain1), structure.chain(chain2)) else {
        return 0.0;
    };
    let reps1 = representatives(&c1);
    let reps2 = representatives(&c2);

    let cutoff_squared = PDOCKQ_CONTACT_DISTANCE * PDOCKQ_CONTACT_DISTANCE;
    let mut n_if_contacts = 0;
    let mut if_residues1 = BTreeSet::new();
    let mut if_residues2 = BTreeSet::new();
    for (i, r1) in reps1.iter().enumerate() {
        for (j, r2) in reps2.iter().enumerate() {
            let (Some(a1), Some(a2)) = (r1.representative_atom(), r2.representative_atom()) else {
                continue;
            };
            if a1.distance_squared(a2) <= cutoff_squared {
                n_if_contacts += 1;
                if_residues1.insert(i);
                if_residues2.insert(j);
            }
        }
    }

    if n_if_contacts == 0 {
        return 0.0;
    }

    let if_plddts: Vec<f64> = if_residues1
        .iter()
        .map(|&i| reps1[i].plddt)
        .chain(if_residues2.iter().map(|&j| reps2[j].plddt))
        .collect();
    let avg_if_plddt = if_plddts.iter().sum::<f64>() / if_plddts.len() as f64;

    pdockq_from_interface(avg_if_plddt, n_if_contacts)
}
