//! The parsed form of one connection-table record: the hand-off point
//! between a text reader and `Molecule::read_table`.
//!
//! Every index in these records is 1-based, as in the table file itself.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Valence code meaning "this atom has no hydrogens and no bonds".
pub const ZERO_VALENCE_CODE: i32 = 15;

// Bond stereo codes of the bond block.
pub const STEREO_NONE: i32 = 0;
pub const STEREO_SINGLE_UP: i32 = 1;
pub const STEREO_DOUBLE_EITHER: i32 = 3;
pub const STEREO_SINGLE_EITHER: i32 = 4;
pub const STEREO_SINGLE_DOWN: i32 = 6;

/// One line of the atom block.
#[derive(Debug, Clone, PartialEq)]
pub struct TableAtom {
    pub symbol: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Raw mass difference from the rounded average mass.
    pub mass_difference: i32,
    pub charge: i32,
    /// Radical code: 0 none, 1 singlet, 2 doublet, 3 triplet.
    pub radical: i32,
    /// Declared valence, 0 when the table gives none.
    pub valence: i32,
    /// Set when an alias line replaced the atom's drawn label.
    pub aliased: bool,
}

impl TableAtom {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            mass_difference: 0,
            charge: 0,
            radical: 0,
            valence: 0,
            aliased: false,
        }
    }
}

/// One line of the bond block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBond {
    pub atom1: usize,
    pub atom2: usize,
    pub bond_type: i32,
    pub stereo: i32,
}

impl TableBond {
    pub fn new(atom1: usize, atom2: usize, bond_type: i32) -> Self {
        Self {
            atom1,
            atom2,
            bond_type,
            stereo: 0,
        }
    }
}

macro_rules! mdl_codes {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            #[default]
            None,
            $($variant),+
        }

        impl $name {
            /// Looks up the three-letter (or two-letter) table mnemonic.
            pub fn from_mdl(text: &str) -> Option<Self> {
                match text.trim() {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn mdl(self) -> &'static str {
                match self {
                    Self::None => "",
                    $(Self::$variant => $text),+
                }
            }

            /// Position in declaration order, 0 for `None`.
            pub fn code(self) -> i32 {
                [$(Self::$variant),+]
                    .iter()
                    .position(|&variant| variant == self)
                    .map_or(0, |i| i as i32 + 1)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter) -> FmtResult {
                write!(f, "{}", self.mdl())
            }
        }
    };
}

mdl_codes!(
    /// S-group type, `M  STY`.
    SGroupKind {
        Superatom => "SUP",
        StructureRepeatUnit => "SRU",
        Monomer => "MON",
        Mer => "MER",
        Copolymer => "COP",
        Crosslink => "CRO",
        Modification => "MOD",
        Graft => "GRA",
        Component => "COM",
        Mixture => "MIX",
        Formulation => "FOR",
        Data => "DAT",
        Any => "ANY",
        Generic => "GEN",
        Multiple => "MUL",
    }
);

mdl_codes!(
    /// Copolymer subtype, `M  SST`.
    SGroupSubtype {
        Alternating => "ALT",
        Random => "RAN",
        Block => "BLO",
    }
);

mdl_codes!(
    /// Repeat-unit connectivity, `M  SCN`.
    SGroupConnection {
        HeadToHead => "HH",
        HeadToTail => "HT",
        EitherUnknown => "EU",
    }
);

/// One S-group of the record. Member bonds are bond numbers, not atom
/// pairs; the importer resolves them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSGroup {
    pub id: i32,
    pub kind: SGroupKind,
    pub subtype: SGroupSubtype,
    pub conn: SGroupConnection,
    pub label: i32,
    pub bracket1: [f64; 4],
    pub bracket2: [f64; 4],
    pub smt: String,
    pub atoms: Vec<i32>,
    pub bonds: Vec<i32>,
}

impl TableSGroup {
    pub fn new(id: i32, kind: SGroupKind) -> Self {
        Self {
            id,
            kind,
            ..Self::default()
        }
    }
}

/// Extended-format data carried alongside the base tables.
///
/// Each haptic-bond list is laid out as `[bond type, non-star atom,
/// n, endpoint 1, ..., endpoint n]`; each stereo-group list as
/// `[group number, n, atom 1, ..., atom n]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableMetadata {
    pub n_collections: i32,
    pub n_haptic_bonds: i32,
    pub n_non_haptic_bonds: i32,
    pub n_sgroups: i32,
    pub n_non_star_atoms: i32,
    pub n_star_atoms: i32,
    pub n_steabs: i32,
    pub n_sterel: i32,
    pub n_sterac: i32,
    pub n_3d_constraints: i32,
    pub atom_index_orig: Option<Vec<i32>>,
    pub atom_index_fin: Option<Vec<i32>>,
    pub haptic_bonds: Vec<Vec<i32>>,
    pub steabs: Vec<Vec<i32>>,
    pub sterel: Vec<Vec<i32>>,
    pub sterac: Vec<Vec<i32>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRecord {
    pub atoms: Vec<TableAtom>,
    pub bonds: Vec<TableBond>,
    pub chiral: bool,
    pub sgroups: Vec<TableSGroup>,
    pub metadata: Option<TableMetadata>,
}

impl TableRecord {
    pub fn has_extensions(&self) -> bool {
        !self.sgroups.is_empty() || self.metadata.is_some()
    }

    /// Symbol of the atom with the given 1-based number.
    pub(crate) fn atom_symbol(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.atoms.get(i))
            .map(|atom| atom.symbol.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonics() {
        assert_eq!(SGroupKind::from_mdl("SRU"), Some(SGroupKind::StructureRepeatUnit));
        assert_eq!(SGroupKind::from_mdl("XYZ"), None);
        assert_eq!(SGroupKind::Superatom.code(), 1);
        assert_eq!(SGroupKind::StructureRepeatUnit.code(), 2);
        assert_eq!(SGroupKind::None.code(), 0);
        assert_eq!(SGroupConnection::from_mdl("HT"), Some(SGroupConnection::HeadToTail));
        assert_eq!(SGroupSubtype::Block.to_string(), "BLO");
    }

    #[test]
    fn test_record_lookup() {
        let mut record = TableRecord::default();
        assert!(!record.has_extensions());
        record.atoms.push(TableAtom::new("C"));
        record.atoms.push(TableAtom::new("H"));
        assert_eq!(record.atom_symbol(2), Some("H"));
        assert_eq!(record.atom_symbol(0), None);
        assert_eq!(record.atom_symbol(3), None);

        record.metadata = Some(TableMetadata::default());
        assert!(record.has_extensions());
    }
}
