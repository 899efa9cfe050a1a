use crate::{Accessor, Column, Keys, Value};
use ringtab_base::{ErrorKind, Result};
use test_log::test;

#[test]
fn test_keys_gather() -> Result<()> {
    let keys = Accessor::long_with(|v| v * 10).keys(&Column::from(vec![3i64, 1, 2]))?;
    assert_eq!(keys, Keys::Longs(vec![30, 10, 20]));
    assert_eq!(keys.gather(&[2, 0])?, Column::from(vec![20i64, 30]));

    let objs = Accessor::obj().keys(&Column::from(vec!["x", "y"]))?;
    assert_eq!(objs.gather(&[1])?, Column::from(vec![Value::from("y")]));
    Ok(())
}

#[test]
fn test_keys_gather_out_of_range() -> Result<()> {
    let keys = Accessor::long().keys(&Column::from(vec![1i64, 2]))?;
    let err = keys.gather(&[0, 2]).map_err(|e| e.kind());
    assert_eq!(err, Err(ErrorKind::Capacity));
    Ok(())
}
