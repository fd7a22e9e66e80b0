use std::time::Instant;

use rand::Rng;
use signal_chart::{RenderMode, SignalSeries, ViewWindow};

#[test]
fn test_tree_queries_beat_linear_scans() {
    let count = 1_000_000;
    let mut rng = rand::rng();
    let samples: Vec<f64> = (0..count).map(|_| rng.random_range(-1e3..1e3)).collect();

    let start_build = Instant::now();
    let series = SignalSeries::new(samples.clone(), 1.0).unwrap();
    println!("Tree build over {} points: {:?}", count, start_build.elapsed());

    let ranges: Vec<(usize, usize)> = (0..1000)
        .map(|_| {
            let a = rng.random_range(0..count);
            let b = rng.random_range(0..count);
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        })
        .collect();

    let start_tree = Instant::now();
    for &(l, r) in &ranges {
        let _ = series.range_minmax(l, r).unwrap();
    }
    let tree_elapsed = start_tree.elapsed();
    println!("1000 tree queries: {:?}", tree_elapsed);

    let start_scan = Instant::now();
    for &(l, r) in &ranges {
        let mut lo = f64::MAX;
        let mut hi = f64::MIN;
        for &v in &samples[l..=r] {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        std::hint::black_box((lo, hi));
    }
    let scan_elapsed = start_scan.elapsed();
    println!("1000 linear scans: {:?}", scan_elapsed);

    assert!(
        tree_elapsed < scan_elapsed,
        "O(log n) queries should beat O(n) scans on a million points ({tree_elapsed:?} vs {scan_elapsed:?})"
    );
}

#[test]
fn test_render_pass_is_sublinear_in_sample_count() {
    let count = 2_000_000;
    let samples: Vec<f64> = (0..count).map(|i| (i as f64 * 0.0001).sin()).collect();
    let series = SignalSeries::new(samples, 1.0).unwrap();
    let view = ViewWindow::new((0.0, count as f64), (-1.5, 1.5), 1920, 1080);

    // Warm-up pass so the measured one reuses the vertex allocation.
    let mut geometry = series.visible_geometry(&view);

    let start = Instant::now();
    for _ in 0..30 {
        series.visible_geometry_into(&view, &mut geometry);
    }
    let per_frame = start.elapsed() / 30;
    println!(
        "Render pass over {} points into {} vertices: {:?}",
        count,
        geometry.vertices.len(),
        per_frame
    );

    assert_eq!(geometry.mode, RenderMode::HighDensity);
    assert!(geometry.vertices.len() <= 2 * 1920);
    assert!(
        per_frame.as_millis() < 250,
        "a pixel-bounded frame should not take {per_frame:?}"
    );
}
