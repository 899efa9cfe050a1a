use super::small_slab;
use crate::{Column, ColumnRef, ColumnType, DirEntry, Slab, SlabOptions, Table, DIRECTORY_LEN};
use ringtab_base::{ErrorKind, Result};
use test_log::test;

#[test]
fn test_options() -> Result<()> {
    let slab = Slab::default();
    assert_eq!(slab.capacity(), 4096);
    assert_eq!(slab.mask(), 4095);
    assert_eq!(slab.slot_width(), 7);

    let bad_width = SlabOptions {
        slot_width: 8,
        ..SlabOptions::default()
    };
    assert_eq!(Slab::new(bad_width).map(|_| ()).map_err(|e| e.kind()), Err(ErrorKind::Precondition));
    let bad_cap = SlabOptions {
        capacity_log2: 30,
        ..SlabOptions::default()
    };
    assert!(Slab::new(bad_cap).is_err());
    Ok(())
}

#[test]
fn test_dir_entry_packing() -> Result<()> {
    let e = DirEntry::pack(ColumnType::Text, 5, 1234)?;
    assert_eq!(e.ty(), Some(ColumnType::Text));
    assert_eq!(e.count(), 5);
    assert_eq!(e.offset(), 1234);
    assert_eq!(e.packed(), 6 | (5 << 5) | (1234 << 8));
    assert!(DirEntry::default().is_empty());
    assert!(DirEntry::pack(ColumnType::Long, 8, 0).is_err());
    assert!(DirEntry::pack(ColumnType::Long, 1, 1 << 24).is_err());
    Ok(())
}

#[test]
fn test_runs_are_disjoint() -> Result<()> {
    let slab = small_slab()?;
    let mut tables = Vec::new();
    for i in 0..4i64 {
        let mut t = Table::new(&slab, 2)?;
        t.extend(Column::from(vec![i, i + 1]))?;
        t.extend(Column::from(vec!["a", "b"]))?;
        tables.push(t);
    }
    // 4 tables, 2 entries each, 4 cells per entry.
    assert_eq!(slab.claimed(), 32);
    for (i, t) in tables.iter().enumerate() {
        let i = i as i64;
        assert_eq!(t.column(ColumnRef::new(ColumnType::Long, 0))?, Column::from(vec![i, i + 1]));
    }
    drop(tables);
    assert_eq!(slab.claimed(), 0);
    Ok(())
}

#[test]
fn test_slab_exhaustion() -> Result<()> {
    let slab = Slab::new(SlabOptions {
        capacity_log2: 4,
        slot_width: 4,
    })?;
    let mut t = Table::new(&slab, 1)?;
    for ty in [
        Column::from(vec![true]),
        Column::from(vec![1i8]),
        Column::from(vec![1i16]),
        Column::from(vec![1i32]),
    ] {
        t.extend(ty)?;
    }
    assert_eq!(slab.claimed(), 16);
    let err = t.extend(Column::from(vec![1i64])).map_err(|e| e.kind());
    assert_eq!(err, Err(ErrorKind::Capacity));
    // The failed extend must not leave a half-made directory entry behind.
    assert_eq!(t.directory().len(), 4);

    let mut other = Table::new(&slab, 1)?;
    assert!(other.extend(Column::from(vec![1i64])).is_err());
    drop(t);
    other.extend(Column::from(vec![1i64]))?;
    Ok(())
}

#[test]
fn test_directory_overflow() -> Result<()> {
    let slab = Slab::new(SlabOptions {
        capacity_log2: 10,
        slot_width: 1,
    })?;
    let mut t = Table::new(&slab, 1)?;
    for i in 0..DIRECTORY_LEN {
        let r = t.extend(Column::from(vec![i as i64]))?;
        assert_eq!(r, ColumnRef::new(ColumnType::Long, i));
    }
    let err = t.extend(Column::from(vec![0i64])).map_err(|e| e.kind());
    assert_eq!(err, Err(ErrorKind::Capacity));
    assert_eq!(slab.claimed(), DIRECTORY_LEN);
    Ok(())
}

#[test]
fn test_mismatched_slabs() -> Result<()> {
    let a = small_slab()?;
    let b = Slab::default();
    let t = Table::with_columns(&a, [Column::from(vec![1i64, 2])])?;
    let mut u = Table::new(&b, 2)?;
    let err = t.export(&mut u, 0, 1).map_err(|e| e.kind());
    assert_eq!(err, Err(ErrorKind::Precondition));

    // Same geometry in a separate store is fine.
    let c = small_slab()?;
    let mut v = Table::new(&c, 2)?;
    t.export(&mut v, 0, 1)?;
    assert_eq!(v.column(ColumnRef::new(ColumnType::Long, 0))?, Column::from(vec![1i64, 2]));
    Ok(())
}
