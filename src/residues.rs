use nalgebra as na;
use pdbtbx::Conformer;

/// Atom name marking the start of every amino acid residue.
pub const BACKBONE_NITROGEN: &str = "N";
/// Atom name of the backbone alpha carbon.
pub const BACKBONE_ALPHA: &str = "CA";
/// Atom name of the side chain beta carbon.
pub const SIDE_CHAIN_BETA: &str = "CB";

/// A single atom: its name and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom name, e.g. `CA`
    pub name: String,
    /// Cartesian coordinates in Ångströms
    pub pos: na::Point3<f64>,
}

impl Atom {
    pub fn new(name: impl Into<String>, pos: (f64, f64, f64)) -> Self {
        Self {
            name: name.into(),
            pos: na::Point3::new(pos.0, pos.1, pos.2),
        }
    }

    pub fn distance_squared(&self, other: &Atom) -> f64 {
        na::distance_squared(&self.pos, &other.pos)
    }

    /// Coordinates as a plain array, the point type of the spatial index.
    pub fn coords(&self) -> [f64; 3] {
        [self.pos.x, self.pos.y, self.pos.z]
    }
}

/// An amino acid residue of a predicted structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    /// Chain identifier
    pub chain: String,
    /// Residue number within the chain
    pub chain_index: isize,
    /// 1-based position across the whole structure, used for PAE lookups
    pub abs_index: usize,
    /// One-letter amino acid code
    pub aa: char,
    /// Per-residue confidence (pLDDT), 0-100
    pub plddt: f64,
    /// Atoms in file order, starting with the backbone nitrogen
    pub atoms: Vec<Atom>,
}

impl Residue {
    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|atom| atom.name == name)
    }

    /// The backbone nitrogen used as reference point in broad contact searches.
    pub fn nitrogen(&self) -> Option<&Atom> {
        self.atom(BACKBONE_NITROGEN)
    }

    /// The atom standing in for the whole residue when scoring interfaces:
    /// CB, or CA for glycine which has no side chain.
    pub fn representative_atom(&self) -> Option<&Atom> {
        match self.aa {
            'G' => self.atom(BACKBONE_ALPHA),
            _ => self.atom(SIDE_CHAIN_BETA),
        }
    }

    /// Find the closest pair of atoms between two residues.
    ///
    /// Returns the squared distance and the two atoms, or `None` if either residue has no atoms.
    pub fn closest_atoms<'a>(&'a self, other: &'a Residue) -> Option<(f64, &'a Atom, &'a Atom)> {
        self.atoms
            .iter()
            .flat_map(|a1| other.atoms.iter().map(move |a2| (a1.distance_squared(a2), a1, a2)))
            .fold(None, |closest, candidate| match closest {
                Some(best) if best.0 <= candidate.0 => Some(best),
                _ => Some(candidate),
            })
    }
}

pub trait ResidueExt {
    /// The residue one-letter code, or `None` if it's not one of the 20 standard amino acids.
    fn resn(&self) -> Option<char>;
}

impl ResidueExt for Conformer {
    fn resn(&self) -> Option<char> {
        one_letter_code(self.name())
    }
}

/// Map a three-letter amino acid code to its one-letter code.
pub fn one_letter_code(name: &str) -> Option<char> {
    let aa_code = match name.trim().to_uppercase().as_str() {
        "ALA" => 'A',
        "ARG" => 'R',
        "ASN" => 'N',
        "ASP" => 'D',
        "CYS" => 'C',
        "GLN" => 'Q',
        "GLU" => 'E',
        "GLY" => 'G',
        "HIS" => 'H',
        "ILE" => 'I',
        "LEU" => 'L',
        "LYS" => 'K',
        "MET" => 'M',
        "PHE" => 'F',
        "PRO" => 'P',
        "SER" => 'S',
        "THR" => 'T',
        "TRP" => 'W',
        "TYR" => 'Y',
        "VAL" => 'V',
        _ => return None,
    };
    Some(aa_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residue(aa: char, atoms: Vec<Atom>) -> Residue {
        Residue {
            chain: "A".to_string(),
            chain_index: 1,
            abs_index: 1,
            aa,
            plddt: 90.0,
            atoms,
        }
    }

    #[test]
    fn test_one_letter_codes() {
        assert_eq!(one_letter_code("ALA"), Some('A'));
        assert_eq!(one_letter_code("trp"), Some('W'));
        assert_eq!(one_letter_code("HOH"), None);
        assert_eq!(one_letter_code("UNK"), None);
    }

    #[test]
    fn test_representative_atom() {
        let ala = residue(
            'A',
            vec![
                Atom::new("N", (0.0, 0.0, 0.0)),
                Atom::new("CA", (1.5, 0.0, 0.0)),
                Atom::new("CB", (1.5, -1.5, 0.0)),
            ],
        );
        assert_eq!(ala.representative_atom().unwrap().name, "CB");

        let gly = residue(
            'G',
            vec![Atom::new("N", (0.0, 0.0, 0.0)), Atom::new("CA", (1.5, 0.0, 0.0))],
        );
        assert_eq!(gly.representative_atom().unwrap().name, "CA");

        // Incomplete side chain
        let ser = residue('S', vec![Atom::new("N", (0.0, 0.0, 0.0))]);
        assert!(ser.representative_atom().is_none());
    }

    #[test]
    fn test_closest_atoms() {
        let r1 = residue(
            'A',
            vec![Atom::new("N", (0.0, 0.0, 0.0)), Atom::new("O", (2.5, 2.2, 0.0))],
        );
        let r2 = residue(
            'A',
            vec![Atom::new("N", (0.0, 6.0, 0.0)), Atom::new("CB", (1.5, 4.5, 0.0))],
        );
        let (d2, a1, a2) = r1.closest_atoms(&r2).unwrap();
        assert!((d2 - 6.29).abs() < 1e-9, "Expected 6.29, found {d2}");
        assert_eq!(a1.name, "O");
        assert_eq!(a2.name, "CB");

        let empty = residue('A', vec![]);
        assert!(r1.closest_atoms(&empty).is_none());
    }
}
