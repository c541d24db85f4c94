//! Polymer repeat units and extended-format metadata owned by a molecule.
//!
//! Both records are built in full before they are installed; if anything
//! fails part way through, the molecule ends up with neither.

use tracing::*;

use crate::ctab::{SGroupConnection, SGroupKind, SGroupSubtype, TableMetadata, TableRecord};
use crate::error::Result;
use crate::{MolError, Molecule};

const POLYMER_OOM: &str = "copying polymer data";
const METADATA_OOM: &str = "copying V3000 data";

/// One polymer S-group with its member bonds resolved to atom pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolymerUnit {
    pub id: i32,
    pub kind: SGroupKind,
    pub subtype: SGroupSubtype,
    pub conn: SGroupConnection,
    pub label: i32,
    pub bracket1: [f64; 4],
    pub bracket2: [f64; 4],
    pub smt: String,
    /// 1-based atom numbers.
    pub atoms: Vec<i32>,
    /// Endpoints of each crossing bond, 1-based.
    pub bonds: Vec<(i32, i32)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polymer {
    pub units: Vec<PolymerUnit>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
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

/// Where a self-describing list keeps its own length, and how many header
/// slots precede the payload.
#[derive(Debug, Clone, Copy)]
enum ListLayout {
    /// `[bond type, non-star atom, n, endpoints...]`
    Haptic,
    /// `[group number, n, atoms...]`
    StereoGroup,
}

impl ListLayout {
    fn required_len(self, list: &[i32]) -> Option<usize> {
        let (slot, header) = match self {
            Self::Haptic => (2, 3),
            Self::StereoGroup => (1, 2),
        };
        let n = usize::try_from(*list.get(slot)?).ok()?;
        n.checked_add(header)
    }
}

fn try_copy<T: Clone>(items: &[T], what: &'static str) -> Result<Vec<T>> {
    let mut copy = Vec::new();
    copy.try_reserve_exact(items.len())
        .map_err(|_| MolError::OutOfMemory(what))?;
    copy.extend_from_slice(items);
    Ok(copy)
}

fn try_copy_str(text: &str, what: &'static str) -> Result<String> {
    let mut copy = String::new();
    copy.try_reserve_exact(text.len())
        .map_err(|_| MolError::OutOfMemory(what))?;
    copy.push_str(text);
    Ok(copy)
}

/// Copies the first `count` lists, each cut to the length its header
/// declares.
fn copy_lists(
    lists: &[Vec<i32>],
    count: i32,
    layout: ListLayout,
    name: &str,
) -> Result<Vec<Vec<i32>>> {
    let count = usize::try_from(count).unwrap_or(0);
    let source = lists.get(..count).ok_or_else(|| {
        MolError::MalformedMetadata(format!(
            "{} {} lists declared but only {} present",
            count,
            name,
            lists.len()
        ))
    })?;

    let mut copies = Vec::new();
    copies
        .try_reserve_exact(source.len())
        .map_err(|_| MolError::OutOfMemory(METADATA_OOM))?;
    for (i, list) in source.iter().enumerate() {
        let len = layout
            .required_len(list)
            .filter(|&len| len <= list.len())
            .ok_or_else(|| {
                MolError::MalformedMetadata(format!("{} list {} is truncated", name, i + 1))
            })?;
        copies.push(try_copy(&list[..len], METADATA_OOM)?);
    }
    Ok(copies)
}

fn copy_remap(remap: Option<&Vec<i32>>, n_atoms: usize, name: &str) -> Result<Option<Vec<i32>>> {
    match remap {
        None => Ok(None),
        Some(remap) if remap.len() < n_atoms => Err(MolError::MalformedMetadata(format!(
            "{} covers {} of {} atoms",
            name,
            remap.len(),
            n_atoms
        ))),
        Some(remap) => Ok(Some(try_copy(&remap[..n_atoms], METADATA_OOM)?)),
    }
}

impl Polymer {
    /// Builds the polymer record for the S-groups of `record`, resolving
    /// each crossing bond number to its endpoints.
    pub fn from_record(record: &TableRecord) -> Result<Self> {
        let mut units = Vec::new();
        units
            .try_reserve_exact(record.sgroups.len())
            .map_err(|_| MolError::OutOfMemory(POLYMER_OOM))?;

        for group in &record.sgroups {
            let mut bonds = Vec::new();
            bonds
                .try_reserve_exact(group.bonds.len())
                .map_err(|_| MolError::OutOfMemory(POLYMER_OOM))?;
            for &number in &group.bonds {
                let bond = usize::try_from(number)
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| record.bonds.get(i))
                    .ok_or(MolError::PolymerInvalidBond(number))?;
                let endpoint = |atom: usize| {
                    i32::try_from(atom).map_err(|_| MolError::PolymerInvalidBond(number))
                };
                let (atom1, atom2) = (endpoint(bond.atom1)?, endpoint(bond.atom2)?);
                let symbol1 = record
                    .atom_symbol(bond.atom1)
                    .ok_or(MolError::PolymerInvalidBond(number))?;
                let symbol2 = record
                    .atom_symbol(bond.atom2)
                    .ok_or(MolError::PolymerInvalidBond(number))?;
                if symbol1 == "H" || symbol2 == "H" {
                    return Err(MolError::PolymerHydrogenEndGroup);
                }
                bonds.push((atom1, atom2));
            }

            units.push(PolymerUnit {
                id: group.id,
                kind: group.kind,
                subtype: group.subtype,
                conn: group.conn,
                label: group.label,
                bracket1: group.bracket1,
                bracket2: group.bracket2,
                smt: try_copy_str(&group.smt, POLYMER_OOM)?,
                atoms: try_copy(&group.atoms, POLYMER_OOM)?,
                bonds,
            });
        }
        Ok(Self { units })
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Metadata {
    /// Copies extended-format data for a record of `n_atoms` atoms.
    pub fn from_table(table: &TableMetadata, n_atoms: usize) -> Result<Self> {
        Ok(Self {
            n_collections: table.n_collections,
            n_haptic_bonds: table.n_haptic_bonds,
            n_non_haptic_bonds: table.n_non_haptic_bonds,
            n_sgroups: table.n_sgroups,
            n_non_star_atoms: table.n_non_star_atoms,
            n_star_atoms: table.n_star_atoms,
            n_steabs: table.n_steabs,
            n_sterel: table.n_sterel,
            n_sterac: table.n_sterac,
            n_3d_constraints: table.n_3d_constraints,
            atom_index_orig: copy_remap(table.atom_index_orig.as_ref(), n_atoms, "original atom index")?,
            atom_index_fin: copy_remap(table.atom_index_fin.as_ref(), n_atoms, "final atom index")?,
            haptic_bonds: copy_lists(
                &table.haptic_bonds,
                table.n_haptic_bonds,
                ListLayout::Haptic,
                "haptic bond",
            )?,
            steabs: copy_lists(&table.steabs, table.n_steabs, ListLayout::StereoGroup, "absolute stereo")?,
            sterel: copy_lists(&table.sterel, table.n_sterel, ListLayout::StereoGroup, "relative stereo")?,
            sterac: copy_lists(&table.sterac, table.n_sterac, ListLayout::StereoGroup, "racemic stereo")?,
        })
    }

    /// Checks a record built elsewhere against a molecule of `n_atoms`
    /// atoms.
    fn validate(&self, n_atoms: usize) -> Result<()> {
        copy_remap(self.atom_index_orig.as_ref(), n_atoms, "original atom index")?;
        copy_remap(self.atom_index_fin.as_ref(), n_atoms, "final atom index")?;
        copy_lists(&self.haptic_bonds, self.n_haptic_bonds, ListLayout::Haptic, "haptic bond")?;
        copy_lists(&self.steabs, self.n_steabs, ListLayout::StereoGroup, "absolute stereo")?;
        copy_lists(&self.sterel, self.n_sterel, ListLayout::StereoGroup, "relative stereo")?;
        copy_lists(&self.sterac, self.n_sterac, ListLayout::StereoGroup, "racemic stereo")?;
        Ok(())
    }
}

impl Molecule {
    pub fn polymer(&self) -> Option<&Polymer> {
        self.polymer.as_ref()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Drops both extension records together.
    pub fn clear_extensions(&mut self) {
        self.polymer = None;
        self.metadata = None;
    }

    /// Copies the S-groups and extended-format data of `record`.
    pub(crate) fn import_extensions(&mut self, record: &TableRecord) -> Result<()> {
        let built = Self::build_extensions(record);
        match built {
            Ok((polymer, metadata)) => {
                debug!(
                    "imported {} polymer units{}",
                    polymer.as_ref().map_or(0, Polymer::len),
                    if metadata.is_some() { " and V3000 data" } else { "" }
                );
                self.polymer = polymer;
                self.metadata = metadata;
                Ok(())
            }
            Err(e) => {
                self.clear_extensions();
                Err(e)
            }
        }
    }

    fn build_extensions(record: &TableRecord) -> Result<(Option<Polymer>, Option<Metadata>)> {
        let polymer = if record.sgroups.is_empty() {
            None
        } else {
            Some(Polymer::from_record(record)?)
        };
        let metadata = match &record.metadata {
            Some(table) => Some(Metadata::from_table(table, record.atoms.len())?),
            None => None,
        };
        Ok((polymer, metadata))
    }

    /// Installs extension records that were built elsewhere, replacing any
    /// present. A polymer without units is not kept.
    pub fn set_extensions(
        &mut self,
        polymer: Option<Polymer>,
        metadata: Option<Metadata>,
    ) -> Result<()> {
        if let Some(metadata) = &metadata {
            if let Err(e) = metadata.validate(self.atom_count()) {
                self.clear_extensions();
                return Err(e);
            }
        }
        self.polymer = polymer.filter(|p| !p.is_empty());
        self.metadata = metadata;
        Ok(())
    }
}
