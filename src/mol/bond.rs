use crate::error::Result;
use crate::MolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondType {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondType {
    /// Decodes a connection-table bond type (1 through 4).
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(Self::Single),
            2 => Ok(Self::Double),
            3 => Ok(Self::Triple),
            4 => Ok(Self::Aromatic),
            _ => Err(MolError::UnknownBondType(code)),
        }
    }

    /// The contribution of this bond to its atoms' chemical bond valence.
    /// Aromatic bonds count as one; the ring correction is applied per atom.
    pub fn valence(self) -> i32 {
        match self {
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

/// A wedge drawn on a bond, seen from one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondWedge {
    #[default]
    None,
    Up,
    Down,
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DoubleBondConfig {
    /// Left for the identifier engine to work out from coordinates.
    #[default]
    Perceive,
    Even,
    Odd,
    Either,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bond {
    pub(crate) bond_type: BondType,
    pub(crate) config: DoubleBondConfig,
    pub(crate) wedge_from_atom1: BondWedge,
    pub(crate) wedge_from_atom2: BondWedge,
}

impl Bond {
    pub fn bond_type(&self) -> BondType {
        self.bond_type
    }

    pub fn config(&self) -> DoubleBondConfig {
        self.config
    }

    pub fn wedge_from_atom1(&self) -> BondWedge {
        self.wedge_from_atom1
    }

    pub fn wedge_from_atom2(&self) -> BondWedge {
        self.wedge_from_atom2
    }
}
