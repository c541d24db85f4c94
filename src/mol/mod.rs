use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::*;

use crate::element::{self, atomic_number, element_symbol};
use crate::error::Result;
use crate::extension::{Metadata, Polymer};
use crate::stereo::StereoCentre;
use crate::{AtomId, BondId, HandleKind, MolError, MoleculeGraph};

mod atom;
pub use atom::*;

mod bond;
pub use bond::*;

/// A chemical structure under construction: atoms, bonds, stereo
/// descriptors and the optional extension records, all reached through
/// 1-based handles that are checked on every call.
///
/// Atoms and bonds live in an undirected `petgraph` graph whose node and
/// edge indices are the handle values minus one. Nothing is ever removed,
/// so indices stay stable for the lifetime of the molecule.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    pub(crate) graph: MoleculeGraph,
    pub(crate) stereos: Vec<StereoCentre>,
    pub(crate) chiral: bool,
    pub(crate) polymer: Option<Polymer>,
    pub(crate) metadata: Option<Metadata>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every atom, bond, stereo descriptor and extension record,
    /// returning the molecule to its freshly created state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Read-only view of the connectivity.
    pub fn graph(&self) -> &MoleculeGraph {
        &self.graph
    }

    pub fn set_chiral(&mut self, chiral: bool) {
        self.chiral = chiral;
    }

    pub fn chiral(&self) -> bool {
        self.chiral
    }

    pub(crate) fn unpack_atom(&self, atom: AtomId) -> Result<NodeIndex> {
        atom.index()
            .filter(|&i| i < self.graph.node_count())
            .map(NodeIndex::new)
            .ok_or(MolError::InvalidHandle(HandleKind::Atom))
    }

    pub(crate) fn unpack_bond(&self, bond: BondId) -> Result<EdgeIndex> {
        bond.index()
            .filter(|&i| i < self.graph.edge_count())
            .map(EdgeIndex::new)
            .ok_or(MolError::InvalidHandle(HandleKind::Bond))
    }

    /// The atom behind a handle.
    pub fn atom(&self, atom: AtomId) -> Result<&Atom> {
        let node = self.unpack_atom(atom)?;
        Ok(&self.graph[node])
    }

    fn atom_mut(&mut self, atom: AtomId) -> Result<&mut Atom> {
        let node = self.unpack_atom(atom)?;
        Ok(&mut self.graph[node])
    }

    /// The bond behind a handle.
    pub fn bond(&self, bond: BondId) -> Result<&Bond> {
        let edge = self.unpack_bond(bond)?;
        Ok(&self.graph[edge])
    }

    fn bond_mut(&mut self, bond: BondId) -> Result<&mut Bond> {
        let edge = self.unpack_bond(bond)?;
        Ok(&mut self.graph[edge])
    }

    fn bond_atoms(&self, bond: BondId) -> Result<(AtomId, AtomId)> {
        let edge = self.unpack_bond(bond)?;
        let (a, b) = self
            .graph
            .edge_endpoints(edge)
            .ok_or(MolError::InvalidHandle(HandleKind::Bond))?;
        Ok((AtomId::from_index(a.index()), AtomId::from_index(b.index())))
    }

    // -----------------------------------------------------------------
    // Atoms
    // -----------------------------------------------------------------

    /// Appends a carbon atom at the origin and returns its handle.
    pub fn create_atom(&mut self) -> Result<AtomId> {
        if self.graph.node_count() >= u32::MAX as usize - 1 {
            return Err(MolError::OutOfMemory("creating an atom"));
        }
        let node = self.graph.add_node(Atom::default());
        Ok(AtomId::from_index(node.index()))
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The handle for a 0-based atom index, or `AtomId::INVALID`.
    pub fn atom_id(&self, index: usize) -> AtomId {
        if index < self.atom_count() {
            AtomId::from_index(index)
        } else {
            AtomId::INVALID
        }
    }

    pub fn atom_index(&self, atom: AtomId) -> Result<usize> {
        Ok(self.unpack_atom(atom)?.index())
    }

    pub fn atom_bond_count(&self, atom: AtomId) -> Result<usize> {
        Ok(self.atom(atom)?.bond_count)
    }

    /// The `n`th bond of `atom`, in creation order.
    pub fn atom_bond(&self, atom: AtomId, n: usize) -> Result<BondId> {
        self.atom(atom)?
            .bonds()
            .get(n)
            .copied()
            .ok_or(MolError::BondIndexOutOfRange(n))
    }

    pub fn set_atom_x(&mut self, atom: AtomId, x: f64) -> Result<()> {
        self.atom_mut(atom)?.x = x;
        Ok(())
    }

    pub fn set_atom_y(&mut self, atom: AtomId, y: f64) -> Result<()> {
        self.atom_mut(atom)?.y = y;
        Ok(())
    }

    pub fn set_atom_z(&mut self, atom: AtomId, z: f64) -> Result<()> {
        self.atom_mut(atom)?.z = z;
        Ok(())
    }

    pub fn atom_x(&self, atom: AtomId) -> Result<f64> {
        Ok(self.atom(atom)?.x)
    }

    pub fn atom_y(&self, atom: AtomId) -> Result<f64> {
        Ok(self.atom(atom)?.y)
    }

    pub fn atom_z(&self, atom: AtomId) -> Result<f64> {
        Ok(self.atom(atom)?.z)
    }

    /// Sets the element from its symbol. `D` and `T` are accepted as
    /// hydrogen.
    pub fn set_atom_element(&mut self, atom: AtomId, symbol: &str) -> Result<()> {
        let target = self.atom_mut(atom)?;
        let number =
            atomic_number(symbol).ok_or_else(|| MolError::UnknownElement(symbol.to_string()))?;
        target.atomic_number = number;
        Ok(())
    }

    pub fn atom_element(&self, atom: AtomId) -> Result<&'static str> {
        let number = self.atom(atom)?.atomic_number;
        element_symbol(number).ok_or(MolError::AtomicNumberOutOfRange(number as i64))
    }

    pub fn set_atom_atomic_number(&mut self, atom: AtomId, number: i64) -> Result<()> {
        let target = self.atom_mut(atom)?;
        if !element::is_valid_atomic_number(number) {
            return Err(MolError::AtomicNumberOutOfRange(number));
        }
        target.atomic_number = number as u32;
        Ok(())
    }

    pub fn atom_atomic_number(&self, atom: AtomId) -> Result<u32> {
        Ok(self.atom(atom)?.atomic_number)
    }

    /// Sets one implicit hydrogen slot. The unspecified slot also accepts
    /// `DEDUCE_HYDROGENS`.
    pub fn set_atom_hydrogens(
        &mut self,
        atom: AtomId,
        isotope: HydrogenIsotope,
        count: i32,
    ) -> Result<()> {
        let target = self.atom_mut(atom)?;
        isotope.validate_count(count)?;
        target.set_hydrogens(isotope, count);
        Ok(())
    }

    pub fn atom_hydrogens(&self, atom: AtomId, isotope: HydrogenIsotope) -> Result<i32> {
        Ok(self.atom(atom)?.hydrogens(isotope))
    }

    /// Sets the isotope encoding: 0 for natural abundance, otherwise a
    /// mass difference offset by `ISOTOPIC_SHIFT_FLAG`.
    pub fn set_atom_mass(&mut self, atom: AtomId, mass: i32) -> Result<()> {
        let target = self.atom_mut(atom)?;
        if mass < 0 {
            return Err(MolError::NegativeMass(mass));
        }
        target.mass = mass;
        Ok(())
    }

    pub fn atom_mass(&self, atom: AtomId) -> Result<i32> {
        Ok(self.atom(atom)?.mass)
    }

    pub fn set_atom_radical(&mut self, atom: AtomId, radical: Radical) -> Result<()> {
        self.atom_mut(atom)?.radical = radical;
        Ok(())
    }

    pub fn atom_radical(&self, atom: AtomId) -> Result<Radical> {
        Ok(self.atom(atom)?.radical)
    }

    pub fn set_atom_charge(&mut self, atom: AtomId, charge: i32) -> Result<()> {
        let target = self.atom_mut(atom)?;
        if i8::try_from(charge).is_err() {
            return Err(MolError::ChargeOutOfRange(charge));
        }
        target.charge = charge;
        Ok(())
    }

    pub fn atom_charge(&self, atom: AtomId) -> Result<i32> {
        Ok(self.atom(atom)?.charge)
    }

    // -----------------------------------------------------------------
    // Bonds
    // -----------------------------------------------------------------

    /// Joins two distinct atoms with a single bond and records the new
    /// bond on both of them.
    pub fn create_bond(&mut self, atom1: AtomId, atom2: AtomId) -> Result<BondId> {
        let n1 = self.unpack_atom(atom1)?;
        let n2 = self.unpack_atom(atom2)?;

        if self.graph[n1].is_full() || self.graph[n2].is_full() {
            return Err(MolError::TooManyBonds);
        }
        if n1 == n2 {
            return Err(MolError::SelfBond);
        }
        if self.graph.find_edge(n1, n2).is_some() {
            return Err(MolError::DuplicateBond);
        }
        if self.graph.edge_count() >= u32::MAX as usize - 1 {
            return Err(MolError::OutOfMemory("creating a bond"));
        }

        let edge = self.graph.add_edge(n1, n2, Bond::default());
        let bond = BondId::from_index(edge.index());
        self.graph[n1].push_bond(bond);
        self.graph[n2].push_bond(bond);
        trace!("created bond {:?} between {:?} and {:?}", bond, atom1, atom2);
        Ok(bond)
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The handle for a 0-based bond index, or `BondId::INVALID`.
    pub fn bond_id(&self, index: usize) -> BondId {
        if index < self.bond_count() {
            BondId::from_index(index)
        } else {
            BondId::INVALID
        }
    }

    pub fn bond_index(&self, bond: BondId) -> Result<usize> {
        Ok(self.unpack_bond(bond)?.index())
    }

    pub fn bond_atom1(&self, bond: BondId) -> Result<AtomId> {
        Ok(self.bond_atoms(bond)?.0)
    }

    pub fn bond_atom2(&self, bond: BondId) -> Result<AtomId> {
        Ok(self.bond_atoms(bond)?.1)
    }

    /// The endpoint of `bond` opposite `atom`.
    pub fn bond_other_atom(&self, bond: BondId, atom: AtomId) -> Result<AtomId> {
        match self.bond_atoms(bond)? {
            (a, b) if a == atom => Ok(b),
            (a, b) if b == atom => Ok(a),
            _ => Err(MolError::IllegalReferenceAtom),
        }
    }

    pub fn set_bond_type(&mut self, bond: BondId, bond_type: BondType) -> Result<()> {
        self.bond_mut(bond)?.bond_type = bond_type;
        Ok(())
    }

    pub fn bond_type(&self, bond: BondId) -> Result<BondType> {
        Ok(self.bond(bond)?.bond_type)
    }

    /// Records a wedge with its narrow end at `reference`, which must be
    /// one of the bond's endpoints.
    pub fn set_bond_wedge(
        &mut self,
        bond: BondId,
        reference: AtomId,
        wedge: BondWedge,
    ) -> Result<()> {
        let (atom1, atom2) = self.bond_atoms(bond)?;
        let target = self.bond_mut(bond)?;
        if reference == atom1 {
            target.wedge_from_atom1 = wedge;
        } else if reference == atom2 {
            target.wedge_from_atom2 = wedge;
        } else {
            return Err(MolError::IllegalReferenceAtom);
        }
        Ok(())
    }

    pub fn bond_wedge(&self, bond: BondId, reference: AtomId) -> Result<BondWedge> {
        let (atom1, atom2) = self.bond_atoms(bond)?;
        let target = self.bond(bond)?;
        if reference == atom1 {
            Ok(target.wedge_from_atom1)
        } else if reference == atom2 {
            Ok(target.wedge_from_atom2)
        } else {
            Err(MolError::IllegalReferenceAtom)
        }
    }

    pub fn set_double_bond_config(&mut self, bond: BondId, config: DoubleBondConfig) -> Result<()> {
        self.bond_mut(bond)?.config = config;
        Ok(())
    }

    pub fn double_bond_config(&self, bond: BondId) -> Result<DoubleBondConfig> {
        Ok(self.bond(bond)?.config)
    }

    /// The bond joining two atoms, if there is one.
    pub fn common_bond(&self, atom1: AtomId, atom2: AtomId) -> Result<Option<BondId>> {
        let n1 = self.unpack_atom(atom1)?;
        let n2 = self.unpack_atom(atom2)?;
        Ok(self
            .graph
            .find_edge(n1, n2)
            .map(|edge| BondId::from_index(edge.index())))
    }
}
