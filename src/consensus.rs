//! Agreement of contacts across the predicted models of a complex.

use crate::contacts::{ChainPair, ContactKey, ModelContacts};
use crate::utils::round_to;
use std::collections::{BTreeMap, BTreeSet};

/// How often the contacts of a complex were reproduced across its models.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConsensusStats {
    /// Highest number of models any single contact appears in
    pub max_n_models: usize,
    /// Mean number of models per distinct contact, rounded to one decimal
    pub avg_n_models: f64,
    pub num_contacts_with_max_n_models: usize,
    /// Distinct contacts across all models
    pub num_unique_contacts: usize,
}

/// Count in how many models each distinct contact was found.
///
/// Contacts are identified by chain pair and residue indices, regardless of
/// which model produced them. No contacts at all give zeroed statistics.
pub fn summarize_consensus(models: &[ModelContacts]) -> ConsensusStats {
    let mut reproductions: BTreeMap<(ChainPair, ContactKey), BTreeSet<usize>> = BTreeMap::new();
    for (i, model) in models.iter().enumerate() {
        for (pair, contacts) in &model.interfaces {
            for key in contacts.keys() {
                reproductions
                    .entry((pair.clone(), *key))
                    .or_default()
                    .insert(i);
            }
        }
    }

    let counts: Vec<usize> = reproductions.values().map(BTreeSet::len).collect();
    let Some(&max_n_models) = counts.iter().max() else {
        return ConsensusStats::default();
    };
    let total: usize = counts.iter().sum();

    ConsensusStats {
        max_n_models,
        avg_n_models: round_to(total as f64 / counts.len() as f64, 1),
        num_contacts_with_max_n_models: counts.iter().filter(|&&c| c == max_n_models).count(),
        num_unique_contacts: counts.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{get_contacts, Contact, ContactCriteria, ContactResidue};
    use crate::pae::load_pae;
    use crate::structure::load_structure;
    use std::path::Path;

    fn contact(model_num: usize, chains: (&str, &str), indices: (usize, usize)) -> Contact {
        let side = |chain: &str, abs_index: usize| ContactResidue {
            chain: chain.to_string(),
            chain_index: abs_index as isize,
            abs_index,
            aa: 'A',
            plddt: 90.0,
            atom: "CA".to_string(),
        };
        Contact {
            aa1: side(chains.0, indices.0),
            aa2: side(chains.1, indices.1),
            distance: 4.0,
            pae: 2.0,
            paes: [2.0, 2.0],
            model_num,
        }
    }

    fn model(model_num: usize, contacts: &[Contact]) -> ModelContacts {
        let mut model = ModelContacts::empty(model_num);
        for c in contacts {
            model
                .interfaces
                .entry(c.chain_pair())
                .or_default()
                .insert(c.key(), c.clone());
        }
        model
    }

    #[test]
    fn test_three_of_four_models() {
        let shared = |m| contact(m, ("A", "B"), (1, 10));
        let models = vec![
            model(1, &[shared(1)]),
            model(2, &[shared(2)]),
            model(3, &[shared(3)]),
            model(4, &[]),
        ];
        let stats = summarize_consensus(&models);
        assert_eq!(stats.max_n_models, 3);
        assert_eq!(stats.avg_n_models, 3.0);
        assert_eq!(stats.num_contacts_with_max_n_models, 1);
        assert_eq!(stats.num_unique_contacts, 1);
    }

    #[test]
    fn test_chain_pair_is_part_of_the_key() {
        // Same residue indices on different interfaces are different contacts
        let models = vec![
            model(1, &[contact(1, ("A", "B"), (1, 10))]),
            model(2, &[contact(2, ("A", "C"), (1, 10))]),
        ];
        let stats = summarize_consensus(&models);
        assert_eq!(stats.max_n_models, 1);
        assert_eq!(stats.num_unique_contacts, 2);
        assert_eq!(stats.num_contacts_with_max_n_models, 2);
    }

    #[test]
    fn test_no_contacts() {
        assert_eq!(summarize_consensus(&[]), ConsensusStats::default());
        let stats = summarize_consensus(&[ModelContacts::empty(1), ModelContacts::empty(2)]);
        assert_eq!(stats.max_n_models, 0);
        assert_eq!(stats.avg_n_models, 0.0);
    }

    #[test]
    fn test_predicted_models() {
        let root = env!("CARGO_MANIFEST_DIR");
        let models: Vec<ModelContacts> = (1..=3)
            .map(|m| {
                let pdb = Path::new(root).join(format!(
                    "test-data/PROTA_PROTB_unrelaxed_rank_00{m}_alphafold2_multimer_v3_model_{m}_seed_000.pdb"
                ));
                let json = Path::new(root).join(format!(
                    "test-data/PROTA_PROTB_scores_rank_00{m}_alphafold2_multimer_v3_model_{m}_seed_000.json"
                ));
                let structure = load_structure(&pdb).unwrap();
                let pae = load_pae(&json).unwrap();
                get_contacts(&structure, Some(&pae), &ContactCriteria::default()).unwrap()
            })
            .collect();

        let stats = summarize_consensus(&models);
        assert_eq!(stats.max_n_models, 3);
        assert_eq!(stats.avg_n_models, 2.0);
        assert_eq!(stats.num_contacts_with_max_n_models, 1);
        assert_eq!(stats.num_unique_contacts, 2);
        assert!(stats.max_n_models <= models.len());
        assert!(stats.avg_n_models <= stats.max_n_models as f64);
    }
}
