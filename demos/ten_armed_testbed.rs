use std::error::Error;
use std::fs;

use bandit::{plot, BanditConfig, BanditEngine};

const EPSILON: f64 = 0.1;

fn main() -> Result<(), Box<dyn Error>> {
    let mut points = Vec::new();
    let mut last_engine = None;
    for iterations in (100..=2000).step_by(100) {
        let mut engine = BanditEngine::new(BanditConfig {
            arms: 10,
            epsilon: EPSILON,
            iterations,
            ..BanditConfig::default()
        })?;
        engine.run();
        points.push((iterations, engine.average_reward()));
        last_engine = Some(engine);
    }

    let engine = last_engine.expect("at least one run");
    println!(
        "final run: {} rounds, total reward {:.2}, best possible {:.2}",
        engine.rounds(),
        engine.total_reward(),
        engine.best_possible_reward(),
    );

    fs::create_dir_all("local")?;
    plot::reward_means(&engine, "local/reward_means.png")?;
    plot::average_reward(&points, EPSILON, "local/average_reward.png")?;

    Ok(())
}
