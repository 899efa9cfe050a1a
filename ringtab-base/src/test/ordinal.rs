use crate::{from_label, ordinal, to_label, ErrorKind, Extent, Ordinal, Result, OMEGA};
use test_log::test;

#[test]
fn test_labels() {
    assert_eq!(to_label(0), "A");
    assert_eq!(to_label(25), "Z");
    assert_eq!(to_label(26), "AA");
    assert_eq!(to_label(27), "AB");
    assert_eq!(to_label(51), "AZ");
    assert_eq!(to_label(52), "BA");
    assert_eq!(to_label(701), "ZZ");
    assert_eq!(to_label(702), "AAA");
    for i in [0, 1, 25, 26, 100, 701, 702, 18277, OMEGA - 1] {
        assert_eq!(from_label(&to_label(i)), Some(i));
    }
    assert_eq!(from_label(""), None);
    assert_eq!(from_label("a"), None);
}

#[test]
fn test_ordinal_range() -> Result<()> {
    assert_eq!(ordinal(0)?.get(), 0);
    assert_eq!(ordinal(OMEGA - 1)?.get(), OMEGA - 1);
    let e = ordinal(OMEGA).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Capacity);
    assert!(Ordinal::OMEGA.is_omega());
    assert_eq!(Ordinal::OMEGA.get(), OMEGA);
    assert_eq!(Ordinal::upto(3).map(|o| o.get()).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(ordinal(27)?.label(), "AB");
    Ok(())
}

#[test]
fn test_extent_packing() -> Result<()> {
    let e = ordinal(3)?.index(ordinal(1000)?);
    assert_eq!(e.amount(), 3);
    assert_eq!(e.size(), 1000);
    assert_eq!(e.packed() as usize, 3 * OMEGA + 1000);
    let e = Extent::new(0, OMEGA - 1)?;
    assert_eq!((e.amount(), e.size()), (0, OMEGA - 1));
    let e = e.with_amount(16)?;
    assert_eq!((e.amount(), e.size()), (16, OMEGA - 1));
    assert!(Extent::new(0, OMEGA).is_err());
    Ok(())
}
