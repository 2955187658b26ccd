use std::error::Error;
use std::path::Path;

use plotters::{
    backend::BitMapBackend,
    chart::ChartBuilder,
    drawing::IntoDrawingArea,
    element::Circle,
    style::{Color, IntoFont, BLACK, WHITE},
};
use rand::Rng;

use crate::engine::BanditEngine;

/// Scatter the true mean reward of each arm
///
/// Presentation only: reads the engine's read-only views and never
/// touches simulation state.
pub fn reward_means<R: Rng>(
    engine: &BanditEngine<R>,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn Error>> {
    let means = engine.reward_means();
    let (lo, hi) = padded_bounds(means);

    let root = BitMapBackend::new(path.as_ref(), (800, 300)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(-0.5..means.len() as f64 - 0.5, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("Arm")
        .y_desc("Reward mean")
        .draw()?;

    chart.draw_series(
        means
            .iter()
            .enumerate()
            .map(|(arm, &mean)| Circle::new((arm as f64, mean), 4, BLACK.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Scatter average reward against iteration count
///
/// `points` pairs an iteration count with the average reward a finished
/// run produced at that count. The caller builds it by running multiple
/// simulations; the engine does not aggregate across runs.
pub fn average_reward(
    points: &[(usize, f64)],
    epsilon: f64,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn Error>> {
    let max_iterations = points.iter().map(|&(n, _)| n).max().unwrap_or(0);
    let rewards = points.iter().map(|&(_, r)| r).collect::<Vec<_>>();
    let (lo, hi) = padded_bounds(&rewards);

    let root = BitMapBackend::new(path.as_ref(), (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("\u{03b5} greedy armed bandit, \u{03b5} = {epsilon}"),
            ("sans-serif", 30).into_font(),
        )
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..max_iterations as f64 * 1.05, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("Number of iterations")
        .y_desc("Average reward")
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(n, reward)| Circle::new((n as f64, reward), 4, BLACK.filled())),
    )?;

    root.present()?;
    Ok(())
}

fn padded_bounds(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((hi - lo) * 0.1).max(0.5);
    (lo - pad, hi + pad)
}
