use crate::{
    Accessor, Column, ColumnRef, ColumnType, Combine, Reduce, Result, Row, Slab, SlabOptions, Table,
};
use test_log::test;

#[derive(Debug, PartialEq)]
struct Order {
    customer: String,
    items: Vec<String>,
}

impl Combine for Order {
    fn combine(row: &impl Row) -> Result<Self> {
        Ok(Order {
            customer: row.get(2, ColumnType::Text)?,
            items: row.get_many(0, ColumnType::Nested)?,
        })
    }
}

#[test]
fn test_load_join_group() -> Result<()> {
    let slab = Slab::new(SlabOptions::default())?;
    let long = |n| ColumnRef::new(ColumnType::Long, n);
    let text = |n| ColumnRef::new(ColumnType::Text, n);

    let mut customers = Table::with_columns(&slab, [Column::from(vec!["2;bea", "1;al", "3;cy"])])?;
    let split = customers.split(text(0), ";")?;
    assert_eq!(split.width(), 2);
    let ids: Vec<i64> = customers
        .column(text(1))?
        .as_texts()
        .map(|v| v.iter().filter_map(|s| s.parse().ok()).collect())
        .unwrap_or_default();
    customers.extend(Column::from(ids))?;
    customers.set_primary_key(long(0), &Accessor::long())?;

    let mut lines = Table::with_columns(
        &slab,
        [
            Column::from(vec![1i64, 2, 1, 3, 1]),
            Column::from(vec!["pen", "ink", "pad", "nib", "cap"]),
            Column::from(vec![3i64, 1, 2, 5, 1]),
        ],
    )?;
    lines.set_foreign_key(long(0), &Accessor::long())?;

    let items = customers.join_many(&lines, text(0))?;
    assert_eq!(items, ColumnRef::new(ColumnType::Nested, 0));
    let orders: Vec<Order> = customers.combine()?;
    assert_eq!(
        orders[0],
        Order {
            customer: "al".into(),
            items: vec!["pen".into(), "pad".into(), "cap".into()],
        }
    );

    lines.group_by(long(0), &Accessor::long())?;
    let totals = lines.collect(long(1), Accessor::long(), Reduce::Sum)?;
    assert_eq!(totals.column(long(1))?, Column::from(vec![6i64, 1, 5]));

    lines.set_foreign_key(long(0), &Accessor::long())?;
    let per_customer = customers.join_many(&lines, long(1))?;
    assert_eq!(customers.column(per_customer)?.len(), 3);
    Ok(())
}
