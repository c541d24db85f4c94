//! Stereo descriptors and the translation of drawn wedges into the stereo
//! markers the identifier engine reads.

use tracing::*;

use crate::error::Result;
use crate::{AtomId, BondId, BondType, BondWedge, HandleKind, MolError, Molecule, StereoId};

/// Arrangement of the four vertices around a stereo centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoTopology {
    /// Four neighbours around a central atom.
    Tetrahedron,
    /// Four neighbours around a central double bond.
    Rectangle,
    /// Four neighbours around the central atom of an allene-like chain.
    AntiRectangle,
}

impl StereoTopology {
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(Self::Tetrahedron),
            2 => Ok(Self::Rectangle),
            3 => Ok(Self::AntiRectangle),
            _ => Err(MolError::UnexpectedTopology(code)),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Tetrahedron => 1,
            Self::Rectangle => 2,
            Self::AntiRectangle => 3,
        }
    }

    pub fn is_bond_centred(self) -> bool {
        matches!(self, Self::Rectangle)
    }
}

/// Number of vertex atoms a descriptor of the given topology code carries.
pub fn vertex_count(topology: i32) -> Result<usize> {
    StereoTopology::from_code(topology).map(|_| 4)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StereoParity {
    #[default]
    None,
    Even,
    Odd,
    Unknown,
}

/// The entity a stereo descriptor is centred on. The variant is fixed by
/// the topology when the descriptor is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CentralEntity {
    Atom(AtomId),
    Bond(BondId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StereoCentre {
    pub(crate) topology: StereoTopology,
    pub(crate) central: CentralEntity,
    pub(crate) vertices: [AtomId; 4],
    pub(crate) parity: StereoParity,
}

impl StereoCentre {
    pub fn topology(&self) -> StereoTopology {
        self.topology
    }

    pub fn central(&self) -> CentralEntity {
        self.central
    }

    pub fn vertices(&self) -> &[AtomId; 4] {
        &self.vertices
    }

    pub fn parity(&self) -> StereoParity {
        self.parity
    }
}

/// Stereo marker of a bond as seen from one of its endpoints.
///
/// "1-sided" markers come from a wedge recorded at the reference atom,
/// "2-sided" ones from a wedge recorded at the other endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondStereo {
    None,
    Single1Up,
    Single1Either,
    Single1Down,
    Single2Up,
    Single2Either,
    Single2Down,
    DoubleEither,
}

impl BondStereo {
    /// Numeric marker used by the identifier engine.
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Single1Up => 1,
            Self::Single1Either => 4,
            Self::Single1Down => 6,
            Self::Single2Up => -1,
            Self::Single2Either => -4,
            Self::Single2Down => -6,
            Self::DoubleEither => 3,
        }
    }
}

/// Resolves the stereo marker of a bond from the wedge seen from the
/// reference atom (`direction`) and from the other endpoint
/// (`reverse_direction`).
pub fn resolve_bond_stereo(
    bond_type: BondType,
    direction: BondWedge,
    reverse_direction: BondWedge,
) -> BondStereo {
    if bond_type == BondType::Single {
        return match direction {
            BondWedge::Up => BondStereo::Single1Up,
            BondWedge::Down => BondStereo::Single1Down,
            BondWedge::Either => BondStereo::Single1Either,
            BondWedge::None => match reverse_direction {
                BondWedge::None => BondStereo::None,
                BondWedge::Up => BondStereo::Single2Up,
                BondWedge::Down => BondStereo::Single2Down,
                BondWedge::Either => BondStereo::Single2Either,
            },
        };
    }

    // Only the "either" marker exists for other bond types.
    match direction {
        BondWedge::None => BondStereo::None,
        _ => BondStereo::DoubleEither,
    }
}

impl Molecule {
    fn unpack_stereo(&self, stereo: StereoId) -> Result<usize> {
        stereo
            .index()
            .filter(|&i| i < self.stereos.len())
            .ok_or(MolError::InvalidHandle(HandleKind::Stereo))
    }

    fn stereo(&self, stereo: StereoId) -> Result<&StereoCentre> {
        let index = self.unpack_stereo(stereo)?;
        Ok(&self.stereos[index])
    }

    fn push_stereo(&mut self, centre: StereoCentre) -> Result<StereoId> {
        match centre.central {
            CentralEntity::Atom(atom) => {
                self.unpack_atom(atom)?;
            }
            CentralEntity::Bond(bond) => {
                self.unpack_bond(bond)?;
            }
        }
        for vertex in centre.vertices {
            self.unpack_atom(vertex)?;
        }

        self.stereos
            .try_reserve(1)
            .map_err(|_| MolError::OutOfMemory("creating a stereo descriptor"))?;
        let id = StereoId::from_index(self.stereos.len());
        trace!("created {:?} stereo descriptor {:?}", centre.topology, id);
        self.stereos.push(centre);
        Ok(id)
    }

    pub fn create_stereo_tetrahedron(
        &mut self,
        central_atom: AtomId,
        vertices: [AtomId; 4],
    ) -> Result<StereoId> {
        self.push_stereo(StereoCentre {
            topology: StereoTopology::Tetrahedron,
            central: CentralEntity::Atom(central_atom),
            vertices,
            parity: StereoParity::None,
        })
    }

    pub fn create_stereo_rectangle(
        &mut self,
        central_bond: BondId,
        vertices: [AtomId; 4],
    ) -> Result<StereoId> {
        self.push_stereo(StereoCentre {
            topology: StereoTopology::Rectangle,
            central: CentralEntity::Bond(central_bond),
            vertices,
            parity: StereoParity::None,
        })
    }

    pub fn create_stereo_antirectangle(
        &mut self,
        central_atom: AtomId,
        vertices: [AtomId; 4],
    ) -> Result<StereoId> {
        self.push_stereo(StereoCentre {
            topology: StereoTopology::AntiRectangle,
            central: CentralEntity::Atom(central_atom),
            vertices,
            parity: StereoParity::None,
        })
    }

    pub fn stereo_count(&self) -> usize {
        self.stereos.len()
    }

    /// The handle for a 0-based stereo index, or `StereoId::INVALID`.
    pub fn stereo_id(&self, index: usize) -> StereoId {
        if index < self.stereos.len() {
            StereoId::from_index(index)
        } else {
            StereoId::INVALID
        }
    }

    pub fn stereo_index(&self, stereo: StereoId) -> Result<usize> {
        self.unpack_stereo(stereo)
    }

    pub fn stereo_topology(&self, stereo: StereoId) -> Result<StereoTopology> {
        Ok(self.stereo(stereo)?.topology)
    }

    pub fn stereo_central_atom(&self, stereo: StereoId) -> Result<AtomId> {
        match self.stereo(stereo)?.central {
            CentralEntity::Atom(atom) => Ok(atom),
            CentralEntity::Bond(_) => Err(MolError::NoCentralAtom),
        }
    }

    pub fn stereo_central_bond(&self, stereo: StereoId) -> Result<BondId> {
        match self.stereo(stereo)?.central {
            CentralEntity::Bond(bond) => Ok(bond),
            CentralEntity::Atom(_) => Err(MolError::NoCentralBond),
        }
    }

    pub fn stereo_vertex_count(&self, stereo: StereoId) -> Result<usize> {
        vertex_count(self.stereo(stereo)?.topology.code())
    }

    pub fn stereo_vertex(&self, stereo: StereoId, vertex: usize) -> Result<AtomId> {
        let centre = self.stereo(stereo)?;
        if vertex >= vertex_count(centre.topology.code())? {
            return Err(MolError::VertexIndexOutOfRange(vertex));
        }
        Ok(centre.vertices[vertex])
    }

    pub fn set_stereo_parity(&mut self, stereo: StereoId, parity: StereoParity) -> Result<()> {
        let index = self.unpack_stereo(stereo)?;
        self.stereos[index].parity = parity;
        Ok(())
    }

    pub fn stereo_parity(&self, stereo: StereoId) -> Result<StereoParity> {
        Ok(self.stereo(stereo)?.parity)
    }

    /// Stereo marker of `bond` seen from `reference`, which must be one of
    /// its endpoints.
    pub fn bond_stereo(&self, bond: BondId, reference: AtomId) -> Result<BondStereo> {
        let other = self.bond_other_atom(bond, reference)?;
        let direction = self.bond_wedge(bond, reference)?;
        let reverse_direction = self.bond_wedge(bond, other)?;
        Ok(resolve_bond_stereo(self.bond_type(bond)?, direction, reverse_direction))
    }
}
