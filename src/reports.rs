//! Tabular reports of analyzed complexes.

use crate::complexes::{BatchOutput, ComplexReport};
use crate::contacts::Contact;
use crate::errors::Result;
use crate::stats::{ChainPairReport, ModelInterfaceReport};
use crate::utils::{write_df_to_file, DataFrameFileType};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The three report tables of a folder analysis.
#[derive(Debug, Clone)]
pub struct Reports {
    /// One row per complex
    pub summary: DataFrame,
    /// One row per complex, model and chain pair
    pub interfaces: DataFrame,
    /// One row per contact
    pub contacts: DataFrame,
}

/// Consensus statistics and best model of each complex.
pub fn summary_df(reports: &[ComplexReport]) -> Result<DataFrame> {
    let best: Vec<&ModelInterfaceReport> = reports.iter().map(|r| r.best_model()).collect();
    let df = df!(
        "complex_name" => reports.iter().map(|r| r.name.to_owned()).collect::<Vec<String>>(),
        "avg_n_models" => reports.iter().map(|r| r.consensus.avg_n_models).collect::<Vec<f64>>(),
        "max_n_models" => reports.iter().map(|r| r.consensus.max_n_models as u32).collect::<Vec<u32>>(),
        "num_contacts_with_max_n_models" => reports.iter().map(|r| r.consensus.num_contacts_with_max_n_models as u32).collect::<Vec<u32>>(),
        "num_unique_contacts" => reports.iter().map(|r| r.consensus.num_unique_contacts as u32).collect::<Vec<u32>>(),
        "best_model_num" => best.iter().map(|m| m.model_num as u32).collect::<Vec<u32>>(),
        "best_avg_pdockq" => best.iter().map(|m| m.avg_pdockq).collect::<Vec<f64>>(),
        "best_avg_plddt" => best.iter().map(|m| m.avg_plddt).collect::<Vec<f64>>(),
        "best_avg_pae" => best.iter().map(|m| m.avg_pae).collect::<Vec<f64>>(),
    )?;
    Ok(df)
}

/// Interface statistics of every chain pair of every model.
pub fn interfaces_df(reports: &[ComplexReport]) -> Result<DataFrame> {
    let rows: Vec<(&str, &ModelInterfaceReport, &ChainPairReport)> = reports
        .iter()
        .flat_map(|r| {
            r.models.iter().flat_map(move |m| {
                m.interfaces
                    .iter()
                    .map(move |i| (r.name.as_str(), m, i))
            })
        })
        .collect();

    let df = df!(
        "complex_name" => rows.iter().map(|x| x.0.to_owned()).collect::<Vec<String>>(),
        "model_num" => rows.iter().map(|x| x.1.model_num as u32).collect::<Vec<u32>>(),
        "chains" => rows.iter().map(|x| x.2.pair.to_string()).collect::<Vec<String>>(),
        "proteins" => rows.iter().map(|x| x.2.labels.to_string()).collect::<Vec<String>>(),
        "num_contacts" => rows.iter().map(|x| x.2.stats.num_contacts as u32).collect::<Vec<u32>>(),
        "plddt_min" => rows.iter().map(|x| x.2.stats.plddt.min).collect::<Vec<f64>>(),
        "plddt_avg" => rows.iter().map(|x| x.2.stats.plddt.avg).collect::<Vec<f64>>(),
        "plddt_max" => rows.iter().map(|x| x.2.stats.plddt.max).collect::<Vec<f64>>(),
        "pae_min" => rows.iter().map(|x| x.2.stats.pae.min).collect::<Vec<f64>>(),
        "pae_avg" => rows.iter().map(|x| x.2.stats.pae.avg).collect::<Vec<f64>>(),
        "pae_max" => rows.iter().map(|x| x.2.stats.pae.max).collect::<Vec<f64>>(),
        "distance_avg" => rows.iter().map(|x| x.2.stats.distance_avg).collect::<Vec<f64>>(),
        "pdockq" => rows.iter().map(|x| x.2.pdockq).collect::<Vec<f64>>(),
        "model_avg_pdockq" => rows.iter().map(|x| x.1.avg_pdockq).collect::<Vec<f64>>(),
        "model_avg_plddt" => rows.iter().map(|x| x.1.avg_plddt).collect::<Vec<f64>>(),
        "model_avg_pae" => rows.iter().map(|x| x.1.avg_pae).collect::<Vec<f64>>(),
    )?;
    Ok(df)
}

/// One row per contact, labelled with the name of the complex (or structure) it belongs to.
///
/// pLDDT values are rounded to integers.
pub fn contacts_df<'a>(contacts: impl IntoIterator<Item = (&'a str, &'a Contact)>) -> Result<DataFrame> {
    let rows: Vec<(&str, &Contact)> = contacts.into_iter().collect();
    let df = df!(
        "complex_name" => rows.iter().map(|x| x.0.to_owned()).collect::<Vec<String>>(),
        "model_num" => rows.iter().map(|x| x.1.model_num as u32).collect::<Vec<u32>>(),
        "aa1_chain" => rows.iter().map(|x| x.1.aa1.chain.to_owned()).collect::<Vec<String>>(),
        "aa1_index" => rows.iter().map(|x| x.1.aa1.chain_index as i32).collect::<Vec<i32>>(),
        "aa1_type" => rows.iter().map(|x| x.1.aa1.aa.to_string()).collect::<Vec<String>>(),
        "aa1_plddt" => rows.iter().map(|x| x.1.aa1.plddt.round() as u32).collect::<Vec<u32>>(),
        "aa1_atom" => rows.iter().map(|x| x.1.aa1.atom.to_owned()).collect::<Vec<String>>(),
        "aa2_chain" => rows.iter().map(|x| x.1.aa2.chain.to_owned()).collect::<Vec<String>>(),
        "aa2_index" => rows.iter().map(|x| x.1.aa2.chain_index as i32).collect::<Vec<i32>>(),
        "aa2_type" => rows.iter().map(|x| x.1.aa2.aa.to_string()).collect::<Vec<String>>(),
        "aa2_plddt" => rows.iter().map(|x| x.1.aa2.plddt.round() as u32).collect::<Vec<u32>>(),
        "aa2_atom" => rows.iter().map(|x| x.1.aa2.atom.to_owned()).collect::<Vec<String>>(),
        "pae" => rows.iter().map(|x| x.1.pae).collect::<Vec<f64>>(),
        "min_distance" => rows.iter().map(|x| x.1.distance).collect::<Vec<f64>>(),
    )?;
    Ok(df)
}

/// Report tables of the complexes one worker analyzed.
pub fn batch_reports(batch: &BatchOutput) -> Result<Reports> {
    let contacts = batch.reports.iter().flat_map(|r| {
        r.contacts
            .iter()
            .flat_map(|model| model.contacts())
            .map(move |c| (r.name.as_str(), c))
    });
    Ok(Reports {
        summary: summary_df(&batch.reports)?,
        interfaces: interfaces_df(&batch.reports)?,
        contacts: contacts_df(contacts)?,
    })
}

fn concat_frames(frames: Vec<DataFrame>) -> Result<LazyFrame> {
    let frames: Vec<LazyFrame> = frames.into_iter().map(|df| df.lazy()).collect();
    Ok(concat(frames, UnionArgs::default())?)
}

/// Concatenate the reports of all workers.
///
/// The summary is sorted by `avg_n_models`, most reproduced complexes first.
pub fn merge_reports(parts: Vec<Reports>) -> Result<Reports> {
    if parts.is_empty() {
        return batch_reports(&BatchOutput::default());
    }

    let mut summaries = Vec::with_capacity(parts.len());
    let mut interfaces = Vec::with_capacity(parts.len());
    let mut contacts = Vec::with_capacity(parts.len());
    for part in parts {
        summaries.push(part.summary);
        interfaces.push(part.interfaces);
        contacts.push(part.contacts);
    }

    let summary = concat_frames(summaries)?
        .sort(
            ["avg_n_models"],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;
    Ok(Reports {
        summary,
        interfaces: concat_frames(interfaces)?.collect()?,
        contacts: concat_frames(contacts)?.collect()?,
    })
}

/// Write the report tables into `output_dir`; an empty contacts table is skipped.
pub fn write_reports(
    reports: &mut Reports,
    output_dir: &Path,
    file_type: DataFrameFileType,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (name, df) in [
        ("summary", &mut reports.summary),
        ("interfaces", &mut reports.interfaces),
        ("contacts", &mut reports.contacts),
    ] {
        if name == "contacts" && df.height() == 0 {
            debug!("No contacts to write");
            continue;
        }
        let path = output_dir.join(name).with_extension(file_type.to_string());
        write_df_to_file(df, &path, file_type)?;
        info!("Wrote {} rows to {}", df.height(), path.display());
        written.push(path);
    }
    Ok(written)
}
