use eyre::Result;
use rand::Rng;
use signal_chart::{SeriesConfig, SignalSeries, TreeMode, TreeState, ViewWindow};

/// Walks a noisy 2M-point signal through the three render strategies and
/// prints what an attached rasterizer would receive.
fn main() -> Result<()> {
    let count = 2_000_000;
    let mut rng = rand::rng();
    let mut level: f64 = 0.0;
    let samples: Vec<f64> = (0..count)
        .map(|_| {
            level += rng.random_range(-1.0..1.0);
            level
        })
        .collect();

    let mut series = SignalSeries::with_config(
        samples,
        SeriesConfig {
            sample_period: 0.001,
            tree: TreeMode::Background,
            ..SeriesConfig::default()
        },
    )?;

    while series.tree_state() == TreeState::Building {
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    println!("{series}");

    let (x_min, x_max, y_min, y_max) = series.bounds();
    println!("bounds: x [{x_min:.1}, {x_max:.1}], y [{y_min:.1}, {y_max:.1}]");

    let zooms = [
        ("full series", (x_min, x_max)),
        ("1% window", (x_min, x_min + (x_max - x_min) * 0.01)),
        ("40 samples", (x_min, x_min + 0.040)),
    ];
    for (label, (x0, x1)) in zooms {
        let view = ViewWindow::new((x0, x1), (y_min, y_max), 1280, 720);
        let geometry = series.visible_geometry(&view);
        println!(
            "{label}: {:?}, {} vertices, markers {}",
            geometry.mode,
            geometry.vertices.len(),
            if geometry.markers_visible() { "on" } else { "off" }
        );
    }

    // Live update: stomp a spike into the middle and re-render the overview.
    series.update_point(count / 2, level.abs() * 10.0 + 100.0)?;
    let view = ViewWindow::new((x_min, x_max), (y_min, y_max), 1280, 720);
    let after = series.visible_geometry(&view);
    println!(
        "after spike: {:?}, {} vertices",
        after.mode,
        after.vertices.len()
    );

    Ok(())
}
