use crate::{CompactIndex, Width};
use ringtab_base::{ErrorKind, Result};
use test_log::test;

#[test]
fn test_width_minimality() -> Result<()> {
    let narrow = CompactIndex::with_max(4, 127)?;
    assert!(narrow.as_narrow().is_some());
    assert!(narrow.as_wide().is_none());
    assert_eq!(narrow.width(), Some(Width::Narrow));

    let wide = CompactIndex::with_max(4, 128)?;
    assert!(wide.as_narrow().is_none());
    assert!(wide.as_wide().is_some());

    let widest = CompactIndex::with_max(4, 32767)?;
    assert_eq!(widest.width(), Some(Width::Wide));

    let too_big = CompactIndex::with_max(4, 32768);
    assert_eq!(too_big.map(|_| ()).map_err(|e| e.kind()), Err(ErrorKind::Capacity));
    Ok(())
}

#[test]
fn test_bounds_checked() -> Result<()> {
    let mut idx = CompactIndex::with_max(3, 100)?;
    idx.set(2, 100)?;
    assert_eq!(idx.get(2)?, 100);
    assert_eq!(idx.get(3).map_err(|e| e.kind()), Err(ErrorKind::Capacity));
    assert_eq!(idx.set(3, 1).map_err(|e| e.kind()), Err(ErrorKind::Capacity));
    // Stored values must fit the chosen width.
    assert_eq!(idx.set(0, 200).map_err(|e| e.kind()), Err(ErrorKind::Capacity));
    Ok(())
}

#[test]
fn test_natural_sentinel() -> Result<()> {
    let mut idx = CompactIndex::natural(200);
    assert!(idx.is_natural());
    assert_eq!(idx.width(), None);
    assert_eq!(idx.get(199)?, 199);
    assert!(idx.is_permutation());

    idx.set(0, 1)?;
    idx.set(1, 0)?;
    assert!(!idx.is_natural());
    assert_eq!(idx.width(), Some(Width::Wide));
    assert_eq!(&idx.to_vec()[..4], &[1, 0, 2, 3]);
    assert!(idx.is_permutation());
    Ok(())
}

#[test]
fn test_sort_range_is_stable() -> Result<()> {
    let keys = [3, 1, 2, 1, 3, 0];
    let mut idx = CompactIndex::natural(keys.len());
    idx.sort_range_by(0..keys.len(), |a, b| keys[a].cmp(&keys[b]))?;
    assert_eq!(idx.to_vec(), vec![5, 1, 3, 2, 0, 4]);

    let mut part = CompactIndex::natural(keys.len());
    part.sort_range_by(2..5, |a, b| keys[a].cmp(&keys[b]))?;
    assert_eq!(part.to_vec(), vec![0, 1, 3, 2, 4, 5]);
    assert!(part.sort_range_by(4..7, |a, b| a.cmp(&b)).is_err());
    Ok(())
}

#[test]
fn test_from_values() -> Result<()> {
    let idx = CompactIndex::from_values(&[0, 5, 300])?;
    assert_eq!(idx.width(), Some(Width::Wide));
    assert_eq!(idx.last(), Some(300));
    assert!(!idx.is_permutation());
    assert_eq!(CompactIndex::from_values(&[])?.last(), None);
    Ok(())
}
