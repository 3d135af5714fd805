//! Per-interface and per-model confidence statistics.

use crate::contacts::{ChainPair, Contact, ModelContacts};
use crate::pdockq::get_pdockq;
use crate::structure::StructureModel;
use crate::utils::round_to;
use tracing::debug;

/// Minimum, mean and maximum of a quantity across the contacts of an interface.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

/// Confidence statistics of one interface in one model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceStats {
    pub num_contacts: usize,
    /// Mean pLDDT of both residues of each contact
    pub plddt: Summary,
    /// Combined PAE of each contact
    pub pae: Summary,
    pub distance_avg: f64,
}

#[derive(Debug, Clone, Copy)]
struct RunningSummary {
    sum: f64,
    min: f64,
    max: f64,
}

impl Default for RunningSummary {
    fn default() -> Self {
        Self {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningSummary {
    fn push(self, value: f64) -> Self {
        Self {
            sum: self.sum + value,
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    fn finish(self, count: usize) -> Summary {
        match count {
            0 => Summary::default(),
            _ => Summary {
                min: self.min,
                avg: round_to(self.sum / count as f64, 1),
                max: self.max,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct InterfaceAccumulator {
    count: usize,
    plddt: RunningSummary,
    pae: RunningSummary,
    distance_sum: f64,
}

impl InterfaceAccumulator {
    fn push(self, contact: &Contact) -> Self {
        Self {
            count: self.count + 1,
            plddt: self.plddt.push(contact.avg_plddt()),
            pae: self.pae.push(contact.pae),
            distance_sum: self.distance_sum + contact.distance,
        }
    }

    fn finish(self) -> InterfaceStats {
        InterfaceStats {
            num_contacts: self.count,
            plddt: self.plddt.finish(self.count),
            pae: self.pae.finish(self.count),
            distance_avg: match self.count {
                0 => 0.0,
                n => round_to(self.distance_sum / n as f64, 1),
            },
        }
    }
}

/// Reduce the contacts of an interface to summary statistics.
///
/// An empty interface reports zero for every statistic.
pub fn interface_stats<'a>(contacts: impl IntoIterator<Item = &'a Contact>) -> InterfaceStats {
    contacts
        .into_iter()
        .fold(InterfaceAccumulator::default(), InterfaceAccumulator::push)
        .finish()
}

/// Statistics and pDockQ of one chain pair in one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainPairReport {
    /// Chain identifiers
    pub pair: ChainPair,
    /// Protein names of both chains
    pub labels: ChainPair,
    pub stats: InterfaceStats,
    /// pDockQ rounded to three decimals, 0 if the interface has no contacts
    pub pdockq: f64,
}

/// Interface statistics of every chain pair of one model, and their means.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInterfaceReport {
    pub model_num: usize,
    pub interfaces: Vec<ChainPairReport>,
    pub avg_pdockq: f64,
    pub avg_plddt: f64,
    pub avg_pae: f64,
}

impl ModelInterfaceReport {
    /// Summarize all pairs of distinct chains of a model.
    ///
    /// `labels` names the chains in file order; chains beyond its length are labelled by their identifier.
    pub fn build(structure: &StructureModel, contacts: &ModelContacts, labels: &[String]) -> Self {
        let chain_ids = structure.chain_ids();
        let label = |i: usize| -> String {
            labels
                .get(i)
                .cloned()
                .unwrap_or_else(|| chain_ids[i].to_string())
        };

        let mut interfaces = Vec::new();
        for (i, chain1) in chain_ids.iter().enumerate() {
            for (i2, chain2) in chain_ids.iter().enumerate().skip(i + 1) {
                let pair = ChainPair::new(*chain1, *chain2);
                let labels = ChainPair::new(label(i), label(i2));
                debug!(
                    "Calculating interface statistics for proteins {labels} in model {}",
                    structure.model_num()
                );

                let stats = contacts
                    .interface(&pair)
                    .map(|c| interface_stats(c.values()))
                    .unwrap_or_default();
                let pdockq = match stats.num_contacts {
                    0 => {
                        debug!("No contacts found for {labels}");
                        0.0
                    }
                    _ => round_to(get_pdockq(structure, chain1, chain2), 3),
                };

                interfaces.push(ChainPairReport {
                    pair,
                    labels,
                    stats,
                    pdockq,
                });
            }
        }

        let n = interfaces.len();
        let mean = |f: fn(&ChainPairReport) -> f64| -> f64 {
            match n {
                0 => 0.0,
                _ => interfaces.iter().map(f).sum::<f64>() / n as f64,
            }
        };
        let avg_pdockq = mean(|r| r.pdockq);
        let avg_plddt = mean(|r| r.stats.plddt.avg);
        let avg_pae = mean(|r| r.stats.pae.avg);

        Self {
            model_num: structure.model_num(),
            interfaces,
            avg_pdockq,
            avg_plddt,
            avg_pae,
        }
    }
}

/// The model with the highest mean pDockQ; ties keep the first model.
pub fn select_best_model(reports: &[ModelInterfaceReport]) -> Option<&ModelInterfaceReport> {
    reports.iter().fold(None, |best, report| match best {
        Some(b) if b.avg_pdockq >= report.avg_pdockq => Some(b),
        _ => Some(report),
    })
}
