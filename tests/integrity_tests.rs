use proptest::prelude::*;
use rand::Rng;
use signal_chart::query::scan_minmax;
use signal_chart::{SegmentTree, SignalSeries};

fn brute_minmax(samples: &[f64], l: usize, r: usize) -> (f64, f64) {
    let mut lo = f64::MAX;
    let mut hi = f64::MIN;
    for &v in &samples[l..=r] {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    (lo, hi)
}

#[test]
fn test_range_query_scenario() {
    let mut series = SignalSeries::new(vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0], 1.0).unwrap();
    assert_eq!(series.range_minmax(2, 5).unwrap(), (1.0, 9.0));

    series.update_point(5, 0.0).unwrap();
    assert_eq!(series.range_minmax(2, 5).unwrap(), (0.0, 4.0));
}

#[test]
fn test_range_update_scenario() {
    let mut series = SignalSeries::new(vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0], 1.0).unwrap();
    series.update_range(0, &[10.0, 10.0, 10.0, 10.0]).unwrap();
    assert_eq!(series.range_minmax(0, 3).unwrap(), (10.0, 10.0));
    // The untouched tail still answers from the original data.
    assert_eq!(series.range_minmax(4, 7).unwrap(), (2.0, 9.0));
}

#[test]
fn test_integer_series() {
    let mut series = SignalSeries::new(vec![3i32, 1, 4, 1, 5, 9, 2, 6], 1.0).unwrap();
    assert_eq!(series.range_minmax(2, 5).unwrap(), (1, 9));
    series.update_point(5, -7).unwrap();
    assert_eq!(series.range_minmax(0, 7).unwrap(), (-7, 6));
}

#[test]
fn test_million_point_queries_match_brute_force() {
    let mut rng = rand::rng();
    let samples: Vec<f64> = (0..1_000_000).map(|_| rng.random_range(-1e6..1e6)).collect();
    let series = SignalSeries::new(samples.clone(), 1.0).unwrap();

    for _ in 0..1000 {
        let a = rng.random_range(0..samples.len());
        let b = rng.random_range(0..samples.len());
        let (l, r) = if a <= b { (a, b) } else { (b, a) };
        assert_eq!(
            series.range_minmax(l, r).unwrap(),
            brute_minmax(&samples, l, r),
            "tree disagrees with brute force on ({l}, {r})"
        );
    }
}

#[test]
fn test_point_update_leaves_disjoint_ranges_untouched() {
    let mut rng = rand::rng();
    let samples: Vec<f64> = (0..513).map(|_| rng.random_range(-100.0..100.0)).collect();
    let mut series = SignalSeries::new(samples.clone(), 1.0).unwrap();

    let before_left = series.range_minmax(0, 199).unwrap();
    let before_right = series.range_minmax(201, 512).unwrap();

    series.update_point(200, 1e9).unwrap();

    // Every range containing the index reflects the write.
    assert_eq!(series.range_minmax(150, 250).unwrap().1, 1e9);
    assert_eq!(series.range_minmax(200, 200).unwrap(), (1e9, 1e9));
    assert_eq!(series.range_minmax(0, 512).unwrap().1, 1e9);
    // Ranges not containing it are bit-for-bit unchanged.
    assert_eq!(series.range_minmax(0, 199).unwrap(), before_left);
    assert_eq!(series.range_minmax(201, 512).unwrap(), before_right);
}

#[test]
fn test_bulk_update_equals_rebuild() {
    let mut rng = rand::rng();
    for len in [5usize, 64, 100, 1023] {
        let mut samples: Vec<f64> = (0..len).map(|_| rng.random_range(-50.0..50.0)).collect();
        let mut tree = SegmentTree::build(&samples).unwrap();

        let from = rng.random_range(0..len);
        let to = rng.random_range(from..=len);
        for v in &mut samples[from..to] {
            *v = rng.random_range(-500.0..500.0);
        }
        tree.range_update(&samples, from, to);

        let rebuilt = SegmentTree::build(&samples).unwrap();
        assert_eq!(
            tree, rebuilt,
            "incremental range update diverged from a fresh rebuild (len {len}, range {from}..{to})"
        );
    }
}

#[test]
fn test_build_is_idempotent() {
    let samples: Vec<f64> = (0..777).map(|i| ((i * 31) % 97) as f64).collect();
    let a = SegmentTree::build(&samples).unwrap();
    let b = SegmentTree::build(&samples).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_full_buffer_replacement() {
    let mut series = SignalSeries::new(vec![1.0f64; 16], 1.0).unwrap();
    let replacement: Vec<f64> = (0..16).map(|i| i as f64).collect();
    series.update_all(&replacement).unwrap();
    assert_eq!(series.range_minmax(0, 15).unwrap(), (0.0, 15.0));
}

proptest! {
    #[test]
    fn prop_tree_matches_scan(
        (samples, l, r) in proptest::collection::vec(-1.0e9f64..1.0e9, 1..256)
            .prop_flat_map(|v| {
                let len = v.len();
                (Just(v), 0..len, 0..len)
            })
            .prop_map(|(v, a, b)| if a <= b { (v, a, b) } else { (v, b, a) })
    ) {
        let tree = SegmentTree::build(&samples).unwrap();
        prop_assert_eq!(
            tree.range_query(&samples, l, r),
            scan_minmax(&samples, l, r)
        );
    }
}
