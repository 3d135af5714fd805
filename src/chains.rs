use crate::residues::Residue;

/// A borrowed view of one chain: a contiguous run of residues sharing a chain identifier.
#[derive(Debug, Clone, Copy)]
pub struct Chain<'a> {
    pub id: &'a str,
    pub residues: &'a [Residue],
}

pub trait ChainExt {
    fn pdb_seq(&self) -> String;
}

impl ChainExt for Chain<'_> {
    fn pdb_seq(&self) -> String {
        self.residues.iter().map(|res| res.aa).collect()
    }
}

/// Split residues into chains in file order. A new chain starts whenever the chain identifier changes.
pub fn split_chains(residues: &[Residue]) -> Vec<Chain<'_>> {
    residues
        .chunk_by(|a, b| a.chain == b.chain)
        .map(|run| Chain {
            id: run[0].chain.as_str(),
            residues: run,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::load_structure;
    use std::path::Path;

    #[test]
    fn test_pdb_seq() {
        let root = env!("CARGO_MANIFEST_DIR");
        let path = format!(
            "{}/{}",
            root, "test-data/PROTA_PROTB_unrelaxed_rank_001_alphafold2_multimer_v3_model_1_seed_000.pdb"
        );

        let structure = load_structure(Path::new(&path)).unwrap();
        let chains = structure.chains();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].id, "A");
        assert_eq!(chains[0].pdb_seq(), "AGA");
        assert_eq!(chains[1].id, "B");
        assert_eq!(chains[1].pdb_seq(), "AAA");
    }

    #[test]
    fn test_split_noncontiguous_chains() {
        let residue = |chain: &str, abs_index: usize| Residue {
            chain: chain.to_string(),
            chain_index: abs_index as isize,
            abs_index,
            aa: 'A',
            plddt: 90.0,
            atoms: vec![],
        };
        let residues = vec![residue("A", 1), residue("A", 2), residue("B", 3), residue("A", 4)];
        let ids: Vec<&str> = split_chains(&residues).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["A", "B", "A"]);
    }
}
