use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use molgraph::ctab::{SGroupKind, TableAtom, TableBond, TableMetadata, TableRecord, TableSGroup};
use molgraph::{ImportOptions, Metadata, Molecule, Polymer, SingletPolicy, Status};

/// Counts the bytes each thread currently holds, so tests running in
/// parallel don't see each other's allocations.
struct Counting;

thread_local! {
    static LIVE_BYTES: Cell<isize> = const { Cell::new(0) };
}

fn track(delta: isize) {
    let _ = LIVE_BYTES.try_with(|live| live.set(live.get() + delta));
}

fn live_bytes() -> isize {
    LIVE_BYTES.with(Cell::get)
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            track(layout.size() as isize);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            track(layout.size() as isize);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        track(-(layout.size() as isize));
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            track(new_size as isize - layout.size() as isize);
        }
        new_ptr
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

/// Ethylene oxide repeat unit with a haptic bond and a stereo group.
fn polymer_record() -> TableRecord {
    let mut record = TableRecord::default();
    for symbol in ["Zz", "C", "C", "O", "Zz"] {
        record.atoms.push(TableAtom::new(symbol));
    }
    for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 5)] {
        record.bonds.push(TableBond::new(a, b, 1));
    }

    let mut group = TableSGroup::new(1, SGroupKind::StructureRepeatUnit);
    group.smt = "n".to_string();
    group.atoms = vec![2, 3, 4];
    group.bonds = vec![1, 4];
    record.sgroups.push(group);

    record.metadata = Some(TableMetadata {
        n_haptic_bonds: 1,
        n_sterel: 1,
        atom_index_orig: Some(vec![1, 2, 3, 4, 5]),
        atom_index_fin: Some(vec![5, 4, 3, 2, 1]),
        haptic_bonds: vec![vec![9, 4, 2, 2, 3]],
        sterel: vec![vec![1, 2, 2, 3]],
        ..TableMetadata::default()
    });
    record
}

fn import(mol: &mut Molecule, record: &TableRecord) {
    let mut status = Status::new();
    mol.read_table(record, &ImportOptions::new(SingletPolicy::Keep), &mut status)
        .unwrap();
    assert!(mol.polymer().is_some());
    assert_eq!(mol.metadata().unwrap().haptic_bonds.len(), 1);
}

fn warm_up(record: &TableRecord) {
    // Lets one-time registrations (logging call sites and the like) happen
    // outside the measured window.
    let mut mol = Molecule::new();
    import(&mut mol, record);
}

#[test]
fn test_drop_releases_everything() {
    let record = polymer_record();
    warm_up(&record);

    let before = live_bytes();
    let mut mol = Molecule::new();
    import(&mut mol, &record);
    assert!(live_bytes() > before);
    drop(mol);
    assert_eq!(live_bytes(), before);
}

#[test]
fn test_clear_releases_everything() {
    let record = polymer_record();
    warm_up(&record);

    let mut mol = Molecule::new();
    let before = live_bytes();
    import(&mut mol, &record);
    mol.clear();
    assert_eq!(live_bytes(), before);
    assert_eq!(mol.atom_count(), 0);
    assert!(mol.polymer().is_none());
}

#[test]
fn test_failed_import_releases_partial_extensions() {
    let mut record = polymer_record();
    warm_up(&record);
    // The second relative stereo group is missing, so the metadata copy
    // fails after the polymer record has been built.
    if let Some(metadata) = record.metadata.as_mut() {
        metadata.n_sterel = 2;
    }

    let options = ImportOptions::new(SingletPolicy::Keep);
    let _ = Molecule::new().read_table(&record, &options, &mut Status::new());

    let mut mol = Molecule::new();
    let mut status = Status::new();
    let before = live_bytes();

    assert!(mol.read_table(&record, &options, &mut status).is_err());
    assert!(mol.polymer().is_none());
    assert!(mol.metadata().is_none());
    assert!(status.has_error());

    mol.clear();
    drop(status);
    assert_eq!(live_bytes(), before);
}

#[test]
fn test_installed_extensions_are_released() {
    let record = polymer_record();
    warm_up(&record);

    let mut mol = Molecule::new();
    import(&mut mol, &record);
    mol.clear_extensions();

    let before = live_bytes();
    let polymer = Polymer::from_record(&record).unwrap();
    let metadata = Metadata::from_table(record.metadata.as_ref().unwrap(), 5).unwrap();
    mol.set_extensions(Some(polymer), Some(metadata)).unwrap();
    assert!(live_bytes() > before);

    mol.clear_extensions();
    assert_eq!(live_bytes(), before);
}
