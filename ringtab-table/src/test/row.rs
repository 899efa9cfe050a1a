use super::pets;
use crate::{
    default_of, register_default, Accessor, Column, ColumnRef, ColumnType, Combine, FromValue,
    Reduce, Row, Slab, Table, Value,
};
use ringtab_base::{ErrorKind, Result};
use test_log::test;

#[derive(Clone, Debug, PartialEq)]
struct Pet {
    id: i64,
    category: String,
}

impl Combine for Pet {
    fn combine(row: &impl Row) -> Result<Self> {
        Ok(Pet {
            id: row.get_long(0)?,
            category: row.get(0, ColumnType::Text)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Tally {
    category: String,
    total: i64,
}

impl Combine for Tally {
    fn combine(row: &impl Row) -> Result<Self> {
        Ok(Tally {
            category: row.get(0, ColumnType::Object)?,
            total: row.get_long(0)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Nickname(String);

#[derive(Clone, Debug, PartialEq)]
struct Weight(f64);

#[test]
fn test_combine_in_logical_order() -> Result<()> {
    let slab = Slab::default();
    let mut t = pets(&slab)?;
    t.sort_by(ColumnRef::new(ColumnType::Long, 0), &Accessor::long_with(|v| -v))?;
    let pets: Vec<Pet> = t.combine()?;
    assert_eq!(pets.len(), 8);
    assert_eq!(
        pets[0],
        Pet {
            id: 7,
            category: "dogs".into()
        }
    );
    assert_eq!(pets[7].id, 0);
    Ok(())
}

#[test]
fn test_combine_collected_groups() -> Result<()> {
    let slab = Slab::default();
    let mut t = pets(&slab)?;
    t.group_by(ColumnRef::new(ColumnType::Text, 0), &Accessor::obj())?;
    let out = t.collect(ColumnRef::new(ColumnType::Long, 0), Accessor::long(), Reduce::Sum)?;
    let tallies: Vec<Tally> = out.combine()?;
    let totals: Vec<(&str, i64)> = tallies
        .iter()
        .map(|t| (t.category.as_str(), t.total))
        .collect();
    assert_eq!(totals, vec![("cats", 1), ("dogs", 12), ("other", 15)]);
    Ok(())
}

#[test]
fn test_cursor_column_base() -> Result<()> {
    let slab = Slab::default();
    let t = Table::with_columns(
        &slab,
        [
            Column::from(vec![1i64]),
            Column::from(vec!["left"]),
            Column::from(vec![2i64]),
            Column::from(vec!["right"]),
        ],
    )?;
    let mut a = t.cursor();
    let mut b = t.cursor().with_base(1);
    assert!(a.advance() && b.advance());
    assert_eq!(a.get_long(0)?, 1);
    assert_eq!(b.get_long(0)?, 2);
    assert_eq!(b.get::<String>(0, ColumnType::Text)?, "right");
    assert_eq!(b.column_base(), 1);
    Ok(())
}

#[test]
fn test_from_value() -> Result<()> {
    assert_eq!(i32::from_value(Value::Long(7))?, 7);
    assert!(i32::from_value(Value::Long(i64::MAX)).is_err());
    assert!(bool::from_value(Value::Long(1))?);
    assert_eq!(f64::from_value(Value::Long(2))?, 2.0);
    assert_eq!(Option::<i64>::from_value(Value::Null)?, None);
    assert_eq!(
        Vec::<i64>::from_value(Value::List(vec![Value::Long(1), Value::Long(2)]))?,
        vec![1, 2]
    );
    let wrong = String::from_value(Value::Long(1)).map_err(|e| e.kind());
    assert_eq!(wrong, Err(ErrorKind::Type));
    Ok(())
}

#[test]
fn test_get_many() -> Result<()> {
    let slab = Slab::default();
    let nested = Column::nested(vec![Column::from(vec![1i64, 2]), Column::from(Vec::<i64>::new())])?;
    let t = Table::with_columns(&slab, [nested])?;
    let mut c = t.cursor();
    assert!(c.advance());
    assert_eq!(c.get_many::<i64>(0, ColumnType::Nested)?, vec![1, 2]);
    assert!(c.advance());
    assert!(c.get_many::<i64>(0, ColumnType::Nested)?.is_empty());
    Ok(())
}

#[test]
fn test_defaults_registry() -> Result<()> {
    assert_eq!(
        default_of::<Nickname>().map_err(|e| e.kind()),
        Err(ErrorKind::MissingReference)
    );
    register_default(Nickname("anon".into()))?;
    register_default(Nickname("anon".into()))?;
    let conflict = register_default(Nickname("someone".into())).map_err(|e| e.kind());
    assert_eq!(conflict, Err(ErrorKind::Type));
    assert_eq!(default_of::<Nickname>()?, Nickname("anon".into()));
    Ok(())
}

impl FromValue for Weight {
    fn from_value(v: Value) -> Result<Self> {
        f64::from_value(v).map(Weight)
    }
}

#[test]
fn test_get_or_default() -> Result<()> {
    register_default(Weight(1.0))?;
    let slab = Slab::default();
    let t = Table::with_columns(
        &slab,
        [Column::from(vec![Value::Null, Value::from(2.5)])],
    )?;
    let mut c = t.cursor();
    assert!(c.advance());
    assert_eq!(c.get_or_default::<Weight>(0, ColumnType::Object)?, Weight(1.0));
    // A column that does not exist falls back too.
    assert_eq!(c.get_or_default::<Weight>(0, ColumnType::Double)?, Weight(1.0));
    assert!(c.advance());
    assert_eq!(c.get_or_default::<Weight>(0, ColumnType::Object)?, Weight(2.5));
    Ok(())
}
