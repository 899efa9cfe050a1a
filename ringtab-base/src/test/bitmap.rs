use crate::Bitmap;
use test_log::test;

#[test]
fn test_rank() {
    let mut bm = Bitmap::new(256);
    for i in 0..256 {
        bm.set(i, true);
        assert_eq!(bm.rank(i), i + 1);
    }
    assert_eq!(bm.rank(255), 256);
    for i in 0..128 {
        assert_eq!(bm.rank(255), 256 - i);
        bm.set(i * 2, false);
    }
    assert_eq!(bm.count(), 128);
}

#[test]
fn test_circular_runs() {
    let mut bm = Bitmap::new(16);
    assert!(bm.is_empty());
    bm.set_run(14, 4, true);
    assert!(bm.get(14) && bm.get(15) && bm.get(0) && bm.get(1));
    assert!(!bm.get(2));
    assert_eq!(bm.count(), 4);
    assert!(!bm.run_is_clear(12, 3));
    assert!(bm.run_is_clear(2, 12));
    assert!(!bm.run_is_clear(2, 13));
    bm.set_run(14, 4, false);
    assert!(!bm.any());
}

#[test]
fn test_out_of_range_get_is_false() {
    let bm = Bitmap::new(70);
    assert_eq!(bm.len(), 70);
    assert!(!bm.get(70));
    assert!(!bm.get(1000));
}

#[test]
fn test_rank_past_end() {
    let mut bm = Bitmap::new(70);
    bm.set(3, true);
    bm.set(69, true);
    assert_eq!(bm.rank(69), 2);
    assert_eq!(bm.rank(70), 2);
    assert_eq!(bm.rank(10_000), 2);
    assert_eq!(Bitmap::new(0).rank(0), 0);
}
