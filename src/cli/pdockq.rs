use clap::Parser;
use multimer_contacts::utils::round_to;
use multimer_contacts::{get_pdockq, load_structure, AnalysisError, Result};
use std::path::PathBuf;
use tracing::{error, trace};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Paths to predicted structures in PDB format
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Pair of chains to score, e.g. "A,B". All pairs of chains are scored if omitted
    #[arg(short, long)]
    chains: Option<String>,
}

/// Chain pairs to score: the selected pair, or every pair of `chain_ids` in file order.
fn chain_pairs<'a>(
    selected: Option<&'a [String]>,
    chain_ids: &[&'a str],
) -> Result<Vec<(&'a str, &'a str)>> {
    match selected {
        Some([c1, c2]) if c1 == c2 => Err(AnalysisError::InvalidCriteria(format!(
            "cannot score chain {c1} against itself"
        ))),
        Some([c1, c2]) => Ok(vec![(c1.as_str(), c2.as_str())]),
        Some(ids) => Err(AnalysisError::InvalidCriteria(format!(
            "expected exactly two chains to score, got {ids:?}"
        ))),
        None => Ok(chain_ids
            .iter()
            .enumerate()
            .flat_map(|(i, c1)| chain_ids[i + 1..].iter().map(move |c2| (*c1, *c2)))
            .collect()),
    }
}

pub(crate) fn run(args: &Args) -> Result<()> {
    trace!("{args:?}");
    let selected: Option<Vec<String>> = args
        .chains
        .as_ref()
        .map(|c| c.split(',').map(|id| id.trim().to_string()).collect());

    for f in &args.input {
        let structure = load_structure(f)?;
        let chain_ids = structure.chain_ids();
        let pairs = chain_pairs(selected.as_deref(), &chain_ids)?;

        println!("File: {}", f.display());
        for (c1, c2) in pairs {
            if structure.chain(c1).is_none() || structure.chain(c2).is_none() {
                error!("Chains {c1} and {c2} are not both present in {}", f.display());
                continue;
            }
            let score = get_pdockq(&structure, c1, c2);
            println!("{c1}:{c2}: {}", round_to(score, 3));
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(s: &str) -> Vec<String> {
        s.split(',').map(String::from).collect()
    }

    #[test]
    fn test_all_pairs() {
        let pairs = chain_pairs(None, &["A", "B", "C"]).unwrap();
        assert_eq!(pairs, vec![("A", "B"), ("A", "C"), ("B", "C")]);
        assert!(chain_pairs(None, &["A"]).unwrap().is_empty());
    }

    #[test]
    fn test_selected_pair() {
        let selected = ids("B,A");
        let pairs = chain_pairs(Some(selected.as_slice()), &["A", "B"]).unwrap();
        assert_eq!(pairs, vec![("B", "A")]);
    }

    #[test]
    fn test_reject_same_chain() {
        let selected = ids("A,A");
        assert!(matches!(
            chain_pairs(Some(selected.as_slice()), &["A", "B"]),
            Err(AnalysisError::InvalidCriteria(_))
        ));
    }

    #[test]
    fn test_reject_wrong_count() {
        for s in ["A", "A,B,C"] {
            let selected = ids(s);
            assert!(matches!(
                chain_pairs(Some(selected.as_slice()), &["A", "B", "C"]),
                Err(AnalysisError::InvalidCriteria(_))
            ));
        }
    }
}
