use crate::{split_cell, Column, ColumnRef, ColumnType, Slab, SlabOptions, Table, DIRECTORY_LEN};
use ringtab_base::{ErrorKind, Result};
use test_log::test;

#[test]
fn test_split_cell() {
    assert_eq!(split_cell("a,b,c", ","), (vec!["a", "b", "c"], false));
    assert_eq!(split_cell("id,name,", ","), (vec!["id", "name"], true));
    assert_eq!(split_cell("a::b", "::"), (vec!["a", "b"], false));
    assert_eq!(split_cell("", ","), (vec![""], false));
    assert_eq!(split_cell("a,,b", ","), (vec!["a", "", "b"], false));
}

#[test]
fn test_split_column() -> Result<()> {
    let slab = Slab::default();
    let mut t = Table::with_columns(
        &slab,
        [Column::from(vec!["id;name;", "1;rex", "2", "3;tom;cat"])],
    )?;
    let split = t.split(ColumnRef::new(ColumnType::Text, 0), ";")?;
    assert_eq!(split.width(), 3);
    assert_eq!(split.header_rows, vec![0]);
    assert_eq!(split.first(), Some(ColumnRef::new(ColumnType::Text, 1)));
    assert_eq!(t.rows(), 4);
    assert_eq!(t.column(split.columns[0])?, Column::from(vec!["id", "1", "2", "3"]));
    assert_eq!(t.column(split.columns[1])?, Column::from(vec!["name", "rex", "", "tom"]));
    assert_eq!(t.column(split.columns[2])?, Column::from(vec!["", "", "", "cat"]));
    Ok(())
}

#[test]
fn test_split_needs_text() -> Result<()> {
    let slab = Slab::default();
    let mut t = Table::with_columns(&slab, [Column::from(vec![1i64])])?;
    let err = t.split(ColumnRef::new(ColumnType::Long, 0), ",").map(|_| ()).map_err(|e| e.kind());
    assert_eq!(err, Err(ErrorKind::Type));

    let mut t = Table::with_columns(&slab, [Column::from(vec!["a"])])?;
    let err = t.split(ColumnRef::new(ColumnType::Text, 0), "").map(|_| ()).map_err(|e| e.kind());
    assert_eq!(err, Err(ErrorKind::Precondition));
    Ok(())
}

#[test]
fn test_split_coded_column() -> Result<()> {
    let slab = Slab::default();
    let mut t = Table::with_columns(&slab, [Column::from(vec!["b,2", "a,1", "b,2"])])?;
    let r = ColumnRef::new(ColumnType::Text, 0);
    t.encode(r)?;
    let split = t.split(r, ",")?;
    assert_eq!(t.column(split.columns[0])?, Column::from(vec!["b", "a", "b"]));
    assert_eq!(t.column(split.columns[1])?, Column::from(vec!["2", "1", "2"]));
    Ok(())
}

#[test]
fn test_failed_split_leaves_table_unchanged() -> Result<()> {
    let slab = Slab::new(SlabOptions {
        capacity_log2: 6,
        slot_width: 1,
    })?;
    let mut t = Table::with_columns(&slab, [Column::from(vec!["a;b;c"])])?;
    for i in 0..14i64 {
        t.extend(Column::from(vec![i]))?;
    }
    assert_eq!(t.directory().len(), DIRECTORY_LEN - 1);
    let before = t.columns();

    let err = t.split(ColumnRef::new(ColumnType::Text, 0), ";").map(|_| ()).map_err(|e| e.kind());
    assert_eq!(err, Err(ErrorKind::Capacity));
    assert_eq!(t.directory().len(), DIRECTORY_LEN - 1);
    assert_eq!(t.columns(), before);
    assert_eq!(slab.claimed(), DIRECTORY_LEN - 1);
    let gone = t.column(ColumnRef::new(ColumnType::Text, 1)).map_err(|e| e.kind());
    assert_eq!(gone, Err(ErrorKind::MissingReference));

    // The freed entry is still there for a single column.
    t.extend(Column::from(vec!["d"]))?;
    assert_eq!(t.directory().len(), DIRECTORY_LEN);
    Ok(())
}
