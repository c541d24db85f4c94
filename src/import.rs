//! Turning a parsed connection table into a populated `Molecule`.

use tracing::*;

use crate::ctab::{
    TableAtom, TableBond, TableRecord, STEREO_DOUBLE_EITHER, STEREO_NONE, STEREO_SINGLE_DOWN,
    STEREO_SINGLE_EITHER, STEREO_SINGLE_UP, ZERO_VALENCE_CODE,
};
use crate::error::Result;
use crate::parse::parse_molfile;
use crate::{
    AtomId, BondType, BondWedge, DoubleBondConfig, HydrogenIsotope, MolError, Molecule, Radical,
    Status, DEDUCE_HYDROGENS, ISOTOPIC_SHIFT_FLAG, ZERO_ATW_DIFF,
};

/// What to do with atoms a table reports as singlet radicals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingletPolicy {
    Keep,
    AsTriplet,
}

/// Choices that change how a table is imported. Callers must pick a
/// singlet policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    pub singlet: SingletPolicy,
}

impl ImportOptions {
    pub fn new(singlet: SingletPolicy) -> Self {
        Self { singlet }
    }

    fn radical(&self, code: i32) -> Result<Radical> {
        match (code, self.singlet) {
            (1, SingletPolicy::AsTriplet) => Ok(Radical::Triplet),
            (code, _) => Radical::from_code(code),
        }
    }
}

/// Converts a table mass difference into the stored isotope encoding.
pub fn isotope_encoding(mass_difference: i32) -> i32 {
    match mass_difference {
        0 => 0,
        ZERO_ATW_DIFF => ISOTOPIC_SHIFT_FLAG,
        diff => diff + ISOTOPIC_SHIFT_FLAG,
    }
}

impl Molecule {
    /// Replaces the contents of this molecule with the structure described
    /// by `record`. On failure the error is also recorded in `status` and
    /// the molecule must be treated as invalid.
    pub fn read_table(
        &mut self,
        record: &TableRecord,
        options: &ImportOptions,
        status: &mut Status,
    ) -> Result<()> {
        let result = self.import_table(record, options);
        if let Err(e) = &result {
            status.push_error(e.to_string());
        }
        result
    }

    /// Parses a V2000 molfile and imports it. Reader warnings are copied
    /// into `status`.
    pub fn read_molfile(
        &mut self,
        text: &str,
        options: &ImportOptions,
        status: &mut Status,
    ) -> anyhow::Result<()> {
        let parsed = match parse_molfile(text) {
            Ok(parsed) => parsed,
            Err(e) => {
                status.push_error(format!("{:#}", e));
                return Err(e);
            }
        };
        for warning in parsed.warnings {
            status.push_warning(warning);
        }
        self.read_table(&parsed.record, options, status)?;
        Ok(())
    }

    fn import_table(&mut self, record: &TableRecord, options: &ImportOptions) -> Result<()> {
        self.clear();
        debug!(
            "importing table with {} atoms and {} bonds",
            record.atoms.len(),
            record.bonds.len()
        );

        for _ in &record.atoms {
            self.create_atom()?;
        }

        // Bonds first: hydrogen inference below looks at each atom's bonds.
        for bond in &record.bonds {
            self.import_bond(bond)?;
        }

        for (i, table_atom) in record.atoms.iter().enumerate() {
            let atom = self.atom_id(i);
            self.import_atom(atom, table_atom, options)?;
        }

        if record.chiral {
            self.set_chiral(true);
        }

        if record.has_extensions() {
            self.import_extensions(record)?;
        }
        Ok(())
    }

    /// The handle of a 1-based table atom number. Numbers outside the
    /// table give `AtomId::INVALID`, which the next call rejects.
    fn table_atom_id(&self, number: usize) -> AtomId {
        number
            .checked_sub(1)
            .map_or(AtomId::INVALID, |index| self.atom_id(index))
    }

    fn import_bond(&mut self, table_bond: &TableBond) -> Result<()> {
        let atom1 = self.table_atom_id(table_bond.atom1);
        let atom2 = self.table_atom_id(table_bond.atom2);
        let bond = self.create_bond(atom1, atom2)?;

        self.set_bond_type(bond, BondType::from_code(table_bond.bond_type)?)?;

        match table_bond.stereo {
            STEREO_DOUBLE_EITHER => self.set_double_bond_config(bond, DoubleBondConfig::Either),
            STEREO_SINGLE_UP => self.set_bond_wedge(bond, atom1, BondWedge::Up),
            STEREO_SINGLE_EITHER => self.set_bond_wedge(bond, atom1, BondWedge::Either),
            STEREO_SINGLE_DOWN => self.set_bond_wedge(bond, atom1, BondWedge::Down),
            STEREO_NONE => self.set_bond_wedge(bond, atom1, BondWedge::None),
            code => Err(MolError::UnknownBondStereo(code)),
        }
    }

    fn import_atom(
        &mut self,
        atom: AtomId,
        table_atom: &TableAtom,
        options: &ImportOptions,
    ) -> Result<()> {
        self.set_atom_element(atom, &table_atom.symbol)?;
        self.set_atom_mass(atom, isotope_encoding(table_atom.mass_difference))?;
        self.set_atom_charge(atom, table_atom.charge)?;
        self.set_atom_x(atom, table_atom.x)?;
        self.set_atom_y(atom, table_atom.y)?;
        self.set_atom_z(atom, table_atom.z)?;
        self.set_atom_radical(atom, options.radical(table_atom.radical)?)?;

        if let Some(count) = self.implicit_hydrogens(atom, table_atom)? {
            self.set_atom_hydrogens(atom, HydrogenIsotope::Unspecified, count)?;
        }
        Ok(())
    }

    /// Works out the implicit hydrogen count of a freshly bonded atom.
    /// `None` leaves the current count alone.
    fn implicit_hydrogens(&self, atom: AtomId, table_atom: &TableAtom) -> Result<Option<i32>> {
        let bond_count = self.atom_bond_count(atom)?;
        let valence = table_atom.valence;

        if valence != 0 && (valence != ZERO_VALENCE_CODE || bond_count != 0) {
            let mut bond_valence = 0;
            let mut aromatic = 0;
            for n in 0..bond_count {
                let bond_type = self.bond_type(self.atom_bond(atom, n)?)?;
                bond_valence += bond_type.valence();
                if bond_type == BondType::Aromatic {
                    aromatic += 1;
                }
            }
            match aromatic {
                0 => {}
                2 | 3 => bond_valence += 1,
                n => return Err(MolError::AromaticBondCount(n)),
            }
            trace!(
                "{:?}: declared valence {}, bond valence {}",
                atom,
                valence,
                bond_valence
            );
            Ok((valence >= bond_valence).then_some(valence - bond_valence))
        } else if table_atom.aliased {
            Ok(Some(0))
        } else if valence == ZERO_VALENCE_CODE && bond_count == 0 {
            Ok(Some(0))
        } else {
            Ok(Some(DEDUCE_HYDROGENS))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctab::{SGroupKind, TableMetadata, TableSGroup};
    use crate::{BondStereo, HandleKind};

    fn keep() -> ImportOptions {
        ImportOptions::new(SingletPolicy::Keep)
    }

    fn record(symbols: &[&str], bonds: &[(usize, usize, i32)]) -> TableRecord {
        TableRecord {
            atoms: symbols.iter().map(|&s| TableAtom::new(s)).collect(),
            bonds: bonds
                .iter()
                .map(|&(a, b, t)| TableBond::new(a, b, t))
                .collect(),
            ..TableRecord::default()
        }
    }

    fn import(record: &TableRecord) -> (Molecule, Status, Result<()>) {
        let mut mol = Molecule::new();
        let mut status = Status::new();
        let result = mol.read_table(record, &keep(), &mut status);
        (mol, status, result)
    }

    fn hydrogens(mol: &Molecule, index: usize) -> i32 {
        mol.atom_hydrogens(mol.atom_id(index), HydrogenIsotope::Unspecified)
            .unwrap()
    }

    #[test]
    fn test_propane_chain() {
        let (mol, status, result) = import(&record(&["C", "C", "C"], &[(1, 2, 1), (2, 3, 1)]));
        result.unwrap();
        assert!(status.is_empty());
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        for i in 0..3 {
            assert_eq!(hydrogens(&mol, i), DEDUCE_HYDROGENS);
        }
        assert!(!mol.chiral());
        assert!(mol.polymer().is_none());
    }

    #[test]
    fn test_declared_valence() {
        let mut rec = record(&["C", "C", "C"], &[(1, 2, 1), (2, 3, 1)]);
        rec.atoms[1].valence = 4;
        let (mol, _, result) = import(&rec);
        result.unwrap();
        assert_eq!(hydrogens(&mol, 1), 2);
        assert_eq!(hydrogens(&mol, 0), DEDUCE_HYDROGENS);
    }

    #[test]
    fn test_valence_below_bond_valence() {
        let mut rec = record(&["C", "O"], &[(1, 2, 3)]);
        rec.atoms[1].valence = 2;
        let (mol, _, result) = import(&rec);
        result.unwrap();
        assert_eq!(hydrogens(&mol, 1), 0);
    }

    #[test]
    fn test_aromatic_correction() {
        let mut rec = record(&["C", "C", "C"], &[(1, 2, 4), (2, 3, 4)]);
        rec.atoms[1].valence = 4;
        let (mol, _, result) = import(&rec);
        result.unwrap();
        assert_eq!(hydrogens(&mol, 1), 1);
    }

    #[test]
    fn test_three_aromatic_bonds() {
        let mut rec = record(&["C", "C", "C", "N"], &[(1, 2, 4), (2, 3, 4), (2, 4, 4)]);
        rec.atoms[1].valence = 5;
        let (mol, _, result) = import(&rec);
        result.unwrap();
        assert_eq!(hydrogens(&mol, 1), 1);
    }

    #[test]
    fn test_four_aromatic_bonds() {
        let bonds = [(1, 2, 4), (2, 3, 4), (2, 4, 4), (2, 5, 4)];
        let mut rec = record(&["C", "C", "C", "C", "C"], &bonds);
        rec.atoms[1].valence = 5;
        let (_, status, result) = import(&rec);
        assert_eq!(result, Err(MolError::AromaticBondCount(4)));
        assert!(status.has_error());
    }

    #[test]
    fn test_single_aromatic_bond() {
        let mut rec = record(&["C", "C"], &[(1, 2, 4)]);
        rec.atoms[0].valence = 4;
        let (_, status, result) = import(&rec);
        assert_eq!(result, Err(MolError::AromaticBondCount(1)));
        assert!(status.has_error());
        assert_eq!(status.messages()[0].message, "Atom cannot have 1 aromatic bonds");
    }

    #[test]
    fn test_zero_hydrogen_cases() {
        let mut rec = record(&["Na", "Cl", "C", "C"], &[(3, 4, 1)]);
        rec.atoms[0].valence = ZERO_VALENCE_CODE;
        rec.atoms[1].aliased = true;
        rec.atoms[2].valence = ZERO_VALENCE_CODE;
        let (mol, _, result) = import(&rec);
        result.unwrap();
        assert_eq!(hydrogens(&mol, 0), 0);
        assert_eq!(hydrogens(&mol, 1), 0);
        // A bonded atom with the zero-valence code goes through the sum.
        assert_eq!(hydrogens(&mol, 2), ZERO_VALENCE_CODE - 1);
        assert_eq!(hydrogens(&mol, 3), DEDUCE_HYDROGENS);
    }

    #[test]
    fn test_aliased_atom_with_valence() {
        // A declared valence wins over the alias flag.
        let mut rec = record(&["C"], &[]);
        rec.atoms[0].aliased = true;
        rec.atoms[0].valence = 3;
        let (mol, _, result) = import(&rec);
        result.unwrap();
        assert_eq!(hydrogens(&mol, 0), 3);
    }

    #[test]
    fn test_atom_properties() {
        let mut rec = record(&["N", "C", "C"], &[(1, 2, 1), (2, 3, 2)]);
        rec.atoms[0].charge = 1;
        rec.atoms[0].x = 1.5;
        rec.atoms[0].z = -0.5;
        rec.atoms[1].mass_difference = 1;
        rec.atoms[2].mass_difference = ZERO_ATW_DIFF;
        rec.atoms[2].radical = 2;
        rec.chiral = true;
        let (mol, _, result) = import(&rec);
        result.unwrap();

        let n = mol.atom_id(0);
        assert_eq!(mol.atom_element(n), Ok("N"));
        assert_eq!(mol.atom_charge(n), Ok(1));
        assert_eq!(mol.atom(n).unwrap().position(), [1.5, 0.0, -0.5]);
        assert_eq!(mol.atom_mass(n), Ok(0));
        assert_eq!(mol.atom_mass(mol.atom_id(1)), Ok(10001));
        assert_eq!(mol.atom_mass(mol.atom_id(2)), Ok(ISOTOPIC_SHIFT_FLAG));
        assert_eq!(mol.atom_radical(mol.atom_id(2)), Ok(Radical::Doublet));
        assert_eq!(mol.bond_type(mol.bond_id(1)), Ok(BondType::Double));
        assert!(mol.chiral());
    }

    #[test]
    fn test_singlet_policy() {
        let mut rec = record(&["C"], &[]);
        rec.atoms[0].radical = 1;
        let mut mol = Molecule::new();
        let mut status = Status::new();

        mol.read_table(&rec, &keep(), &mut status).unwrap();
        assert_eq!(mol.atom_radical(mol.atom_id(0)), Ok(Radical::Singlet));

        let options = ImportOptions::new(SingletPolicy::AsTriplet);
        mol.read_table(&rec, &options, &mut status).unwrap();
        assert_eq!(mol.atom_radical(mol.atom_id(0)), Ok(Radical::Triplet));
        assert_eq!(mol.atom_count(), 1);
    }

    #[test]
    fn test_bond_stereo_codes() {
        let mut rec = record(
            &["C", "C", "C", "C"],
            &[(1, 2, 1), (2, 3, 2), (3, 4, 1)],
        );
        rec.bonds[0].stereo = STEREO_SINGLE_UP;
        rec.bonds[1].stereo = STEREO_DOUBLE_EITHER;
        rec.bonds[2].stereo = STEREO_SINGLE_DOWN;
        let (mol, _, result) = import(&rec);
        result.unwrap();

        let (a1, a2) = (mol.atom_id(0), mol.atom_id(1));
        let first = mol.bond_id(0);
        assert_eq!(mol.bond_wedge(first, a1), Ok(BondWedge::Up));
        assert_eq!(mol.bond_stereo(first, a1), Ok(BondStereo::Single1Up));
        assert_eq!(mol.bond_stereo(first, a2), Ok(BondStereo::Single2Up));
        assert_eq!(mol.double_bond_config(mol.bond_id(1)), Ok(DoubleBondConfig::Either));
        assert_eq!(mol.bond_stereo(mol.bond_id(2), mol.atom_id(2)), Ok(BondStereo::Single1Down));
    }

    #[test]
    fn test_malformed_bonds() {
        let mut rec = record(&["C", "C"], &[(1, 2, 1)]);
        rec.bonds[0].stereo = 2;
        assert_eq!(import(&rec).2, Err(MolError::UnknownBondStereo(2)));

        let rec = record(&["C", "C"], &[(1, 2, 5)]);
        assert_eq!(import(&rec).2, Err(MolError::UnknownBondType(5)));

        for bad in [(0, 1, 1), (1, 3, 1)] {
            let rec = record(&["C", "C"], &[bad]);
            assert_eq!(import(&rec).2, Err(MolError::InvalidHandle(HandleKind::Atom)));
        }

        let rec = record(&["C", "C"], &[(1, 2, 1), (2, 1, 1)]);
        assert_eq!(import(&rec).2, Err(MolError::DuplicateBond));

        let rec = record(&["C", "Xx"], &[]);
        assert_eq!(
            import(&rec).2,
            Err(MolError::UnknownElement("Xx".to_string()))
        );
    }

    #[test]
    fn test_import_replaces_previous_contents() {
        let mut mol = Molecule::new();
        let mut status = Status::new();
        let big = record(&["C", "C", "C", "C"], &[(1, 2, 1)]);
        mol.read_table(&big, &keep(), &mut status).unwrap();
        let small = record(&["O"], &[]);
        mol.read_table(&small, &keep(), &mut status).unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn test_extensions_are_imported() {
        let mut rec = record(&["C", "C", "C"], &[(1, 2, 1), (2, 3, 1)]);
        let mut group = TableSGroup::new(1, SGroupKind::StructureRepeatUnit);
        group.atoms = vec![2];
        group.bonds = vec![1, 2];
        rec.sgroups.push(group);
        rec.metadata = Some(TableMetadata {
            n_steabs: 1,
            steabs: vec![vec![1, 1, 2]],
            ..TableMetadata::default()
        });
        let (mol, _, result) = import(&rec);
        result.unwrap();
        let polymer = mol.polymer().unwrap();
        assert_eq!(polymer.units[0].bonds, vec![(1, 2), (2, 3)]);
        assert_eq!(mol.metadata().unwrap().steabs, vec![vec![1, 1, 2]]);
    }

    #[test]
    fn test_hydrogen_end_group_is_rejected() {
        let mut rec = record(&["C", "H"], &[(1, 2, 1)]);
        let mut group = TableSGroup::new(1, SGroupKind::StructureRepeatUnit);
        group.bonds = vec![1];
        rec.sgroups.push(group);
        let (mol, status, result) = import(&rec);
        assert_eq!(result, Err(MolError::PolymerHydrogenEndGroup));
        assert!(mol.polymer().is_none());
        assert!(mol.metadata().is_none());
        assert!(status.has_error());
    }

    const POLYMER_MOLFILE: &str = "\
polystyrene fragment
  test

  4  3  0  0  0  0  0  0  0  0999 V2000
   -1.0000    0.0000    0.0000 *   0  0  0  0  0  0  0  0  0  0  0  0
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    2.0000    0.0000    0.0000 *   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
  2  3  1  0
  3  4  1  0
M  STY  1   1 SRU
M  SAL   1  2   2   3
M  SBL   1  2   1   3
M  SMT   1 n
M  ISO  2   2  13   3  12
M  APO  1   2   1
M  END
";

    #[test]
    fn test_read_molfile() {
        let mut mol = Molecule::new();
        let mut status = Status::new();
        mol.read_molfile(POLYMER_MOLFILE, &keep(), &mut status).unwrap();

        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.atom_element(mol.atom_id(0)), Ok("Zz"));
        let unit = &mol.polymer().unwrap().units[0];
        assert_eq!(unit.bonds, vec![(1, 2), (3, 4)]);
        assert_eq!(unit.smt, "n");

        assert_eq!(mol.atom_mass(mol.atom_id(1)), Ok(ISOTOPIC_SHIFT_FLAG + 1));
        assert_eq!(mol.atom_mass(mol.atom_id(2)), Ok(ISOTOPIC_SHIFT_FLAG));
        assert_eq!(mol.atom_mass(mol.atom_id(0)), Ok(0));

        // APO is read as an unsupported property.
        assert!(status.has_warning());
        assert!(!status.has_error());
    }

    #[test]
    fn test_read_molfile_reports_parse_errors() {
        let mut mol = Molecule::new();
        let mut status = Status::new();
        assert!(mol.read_molfile("only a name\n", &keep(), &mut status).is_err());
        assert!(status.has_error());
        assert!(status.messages()[0].message.contains("Failed to parse molfile"));
    }
}
