pub(crate) mod analyze;
pub(crate) mod contacts;
pub(crate) mod pdockq;

use multimer_contacts::{ContactCriteria, PaeMode, Result};

/// Contact criteria shared by the subcommands.
#[derive(clap::Args, Debug, Clone)]
pub(crate) struct CriteriaArgs {
    /// Maximum distance in Ångströms between any two atoms of two residues for them to be in contact
    #[arg(short, long, default_value_t = 8.0)]
    distance: f64,

    /// Minimum pLDDT of both residues of a contact (1 to 99)
    #[arg(short, long, default_value_t = 50.0)]
    plddt: f64,

    /// Maximum PAE of a contact in Ångströms, from 0 (best) to 30 (worst)
    #[arg(long, default_value_t = 15.0)]
    pae: f64,

    /// How to combine the PAE values (x, y) and (y, x) of a residue pair
    #[arg(long, value_enum, default_value_t = PaeMode::Min)]
    pae_mode: PaeMode,

    /// Only keep contacts where both residues are of these types, e.g. "KR"
    #[arg(long = "aas", default_value_t = String::new())]
    valid_aas: String,

    /// Ignore PAE files and filter on structure alone
    #[arg(long, default_value_t = false)]
    ignore_pae: bool,

    /// Also search for contacts within each chain
    #[arg(long, default_value_t = false)]
    within_chain: bool,
}

impl CriteriaArgs {
    pub(crate) fn criteria(&self) -> Result<ContactCriteria> {
        let criteria = ContactCriteria {
            max_distance: self.distance,
            min_plddt: self.plddt,
            max_pae: self.pae,
            pae_mode: self.pae_mode,
            ignore_pae: self.ignore_pae,
            within_chain: self.within_chain,
            ..Default::default()
        }
        .with_valid_aas(&self.valid_aas);
        criteria.validate()?;
        Ok(criteria)
    }
}
