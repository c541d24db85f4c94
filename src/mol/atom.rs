use crate::element::CARBON;
use crate::error::Result;
use crate::{BondId, MolError};

/// Maximum number of bonds a single atom may carry.
pub const MAX_ATOM_BONDS: usize = 20;

/// Added to an isotope mass difference to mark the atom as isotopic, so
/// that a difference of zero can still mean "enriched at the rounded
/// average mass".
pub const ISOTOPIC_SHIFT_FLAG: i32 = 10000;

/// Raw mass difference a connection table uses for an isotope whose mass
/// equals the rounded average atomic mass.
pub const ZERO_ATW_DIFF: i32 = 127;

/// Implicit hydrogen count meaning "work it out from the standard valence
/// model later".
pub const DEDUCE_HYDROGENS: i32 = -1;

/// Selects one of the per-isotope implicit hydrogen slots of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HydrogenIsotope {
    Unspecified = 0,
    Protium = 1,
    Deuterium = 2,
    Tritium = 3,
}

impl HydrogenIsotope {
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Unspecified),
            1 => Ok(Self::Protium),
            2 => Ok(Self::Deuterium),
            3 => Ok(Self::Tritium),
            _ => Err(MolError::UnknownHydrogenIsotope(code)),
        }
    }

    fn slot(self) -> usize {
        self as usize
    }

    /// Checks a count destined for this slot.
    pub fn validate_count(self, count: i32) -> Result<()> {
        match self {
            Self::Unspecified if count < DEDUCE_HYDROGENS => {
                Err(MolError::NegativeImplicitHydrogens(count))
            }
            Self::Protium | Self::Deuterium | Self::Tritium if count < 0 => {
                Err(MolError::NegativeIsotopicHydrogens(count))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Radical {
    #[default]
    None = 0,
    Singlet = 1,
    Doublet = 2,
    Triplet = 3,
}

impl Radical {
    /// Decodes the radical numbering connection tables use.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Singlet),
            2 => Ok(Self::Doublet),
            3 => Ok(Self::Triplet),
            _ => Err(MolError::UnknownRadical(code)),
        }
    }
}

/// One atom of the arena. The bond list has a fixed capacity; only the
/// first `bond_count` slots are meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) z: f64,
    pub(crate) atomic_number: u32,
    pub(crate) mass: i32,
    pub(crate) hydrogens: [i32; 4],
    pub(crate) radical: Radical,
    pub(crate) charge: i32,
    pub(crate) bonds: [BondId; MAX_ATOM_BONDS],
    pub(crate) bond_count: usize,
}

impl Default for Atom {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            atomic_number: CARBON,
            mass: 0,
            hydrogens: [0; 4],
            radical: Radical::None,
            charge: 0,
            bonds: [BondId::INVALID; MAX_ATOM_BONDS],
            bond_count: 0,
        }
    }
}

impl Atom {
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    pub fn mass(&self) -> i32 {
        self.mass
    }

    pub fn hydrogens(&self, isotope: HydrogenIsotope) -> i32 {
        self.hydrogens[isotope.slot()]
    }

    pub(crate) fn set_hydrogens(&mut self, isotope: HydrogenIsotope, count: i32) {
        self.hydrogens[isotope.slot()] = count;
    }

    pub fn radical(&self) -> Radical {
        self.radical
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Bonds in the order they were created.
    pub fn bonds(&self) -> &[BondId] {
        &self.bonds[..self.bond_count]
    }

    pub(crate) fn is_full(&self) -> bool {
        self.bond_count >= MAX_ATOM_BONDS
    }

    pub(crate) fn push_bond(&mut self, bond: BondId) {
        self.bonds[self.bond_count] = bond;
        self.bond_count += 1;
    }
}
