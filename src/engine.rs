use log::debug;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::{
    error::BanditError,
    exploration::{Choice, EpsilonGreedy},
    util::argmax,
};

/// Configuration for a [`BanditEngine`]
#[derive(Debug, Clone)]
pub struct BanditConfig {
    /// Number of arms (actions), `k`
    ///
    /// **Default**: `10`
    pub arms: usize,
    /// Exploration rate for the epsilon greedy policy
    ///
    /// The intended domain is `[0,1]`, but out-of-range values are
    /// accepted: above 1 every round explores, below 0 every round
    /// exploits. See [`EpsilonGreedy`].
    ///
    /// **Default**: `0.1`
    pub epsilon: f64,
    /// Number of decision rounds per [`run`](BanditEngine::run)
    ///
    /// **Default**: `1000`
    pub iterations: usize,
    /// Initial action-value estimate for every arm
    ///
    /// **Default**: `0.0`
    pub initial_value: f64,
    /// True mean reward per arm
    ///
    /// Must have one entry per arm. When `None`, each mean is drawn
    /// independently from the standard normal at construction.
    ///
    /// **Default**: `None`
    pub reward_means: Option<Vec<f64>>,
    /// Reward standard deviation per arm
    ///
    /// Must have one non-negative entry per arm. A zero entry makes
    /// that arm's reward deterministic. When `None`, every arm uses a
    /// standard deviation of 1.
    ///
    /// **Default**: `None`
    pub reward_stddevs: Option<Vec<f64>>,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            arms: 10,
            epsilon: 0.1,
            iterations: 1000,
            initial_value: 0.0,
            reward_means: None,
            reward_stddevs: None,
        }
    }
}

/// Stationary k-armed bandit simulation engine
///
/// Each arm pays out from a normal distribution whose parameters are
/// fixed for the lifetime of the engine. Rounds are played with an
/// epsilon greedy policy, and each arm's estimate is the running sample
/// mean of the rewards it has paid. All randomness flows through the
/// injected source `R`, so a seeded source makes a run fully
/// reproducible.
///
/// An engine is single-owner, single-threaded state; concurrent
/// simulations should each construct their own engine with an
/// independent source.
#[derive(Debug)]
pub struct BanditEngine<R: Rng = SmallRng> {
    exploration: EpsilonGreedy,
    iterations: usize,
    arms: Vec<Normal<f64>>,
    reward_means: Vec<f64>,
    reward_stddevs: Vec<f64>,
    action_values: Vec<f64>,
    pull_counts: Vec<u64>,
    total_reward: f64,
    rng: R,
}

impl BanditEngine<SmallRng> {
    /// Construct an engine with a fresh entropy-seeded random source
    ///
    /// Use [`with_rng`](Self::with_rng) to inject a seeded source when
    /// reproducibility matters.
    pub fn new(config: BanditConfig) -> Result<Self, BanditError> {
        Self::with_rng(config, SmallRng::from_entropy())
    }
}

impl<R: Rng> BanditEngine<R> {
    /// Construct an engine over an injected random source
    ///
    /// Validation is fail fast: zero arms, zero iterations, a per-arm
    /// array of the wrong length, or a negative standard deviation all
    /// reject the configuration and no engine is produced.
    pub fn with_rng(config: BanditConfig, mut rng: R) -> Result<Self, BanditError> {
        let BanditConfig {
            arms: k,
            epsilon,
            iterations,
            initial_value,
            reward_means,
            reward_stddevs,
        } = config;

        if k == 0 {
            return Err(BanditError::NoArms);
        }
        if iterations == 0 {
            return Err(BanditError::NoIterations);
        }

        let reward_means = match reward_means {
            Some(means) if means.len() != k => {
                return Err(BanditError::LengthMismatch {
                    field: "reward_means",
                    expected: k,
                    actual: means.len(),
                })
            }
            Some(means) => means,
            None => {
                let standard = Normal::new(0.0, 1.0).unwrap();
                (0..k).map(|_| standard.sample(&mut rng)).collect()
            }
        };

        let reward_stddevs = match reward_stddevs {
            Some(stddevs) if stddevs.len() != k => {
                return Err(BanditError::LengthMismatch {
                    field: "reward_stddevs",
                    expected: k,
                    actual: stddevs.len(),
                })
            }
            Some(stddevs) => stddevs,
            None => vec![1.0; k],
        };

        let arms = reward_means
            .iter()
            .zip(&reward_stddevs)
            .enumerate()
            .map(|(i, (&mean, &stddev))| {
                Normal::new(mean, stddev).map_err(|_| BanditError::InvalidStdDev {
                    index: i,
                    value: stddev,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("initialized {k}-armed bandit, epsilon {epsilon}, {iterations} iterations per run");

        Ok(Self {
            exploration: EpsilonGreedy::new(epsilon),
            iterations,
            arms,
            reward_means,
            reward_stddevs,
            action_values: vec![initial_value; k],
            pull_counts: vec![0; k],
            total_reward: 0.0,
            rng,
        })
    }

    /// Choose an arm for the next round
    ///
    /// Explores with probability epsilon, picking an arm uniformly at
    /// random regardless of the current estimates; otherwise exploits
    /// the arm with the highest estimate, ties broken to the lowest
    /// index. Consumes randomness but mutates no other state.
    pub fn select_action(&mut self) -> usize {
        match self.exploration.choose(&mut self.rng) {
            Choice::Explore => self.rng.gen_range(0..self.arms.len()),
            Choice::Exploit => argmax(&self.action_values),
        }
    }

    /// Sample a reward from the chosen arm's distribution
    ///
    /// The sample is added to the cumulative total and returned.
    ///
    /// **Panics** if `arm` is out of range.
    pub fn observe_reward(&mut self, arm: usize) -> f64 {
        assert!(arm < self.arms.len(), "Invalid arm: {}", arm);
        let reward = self.arms[arm].sample(&mut self.rng);
        self.total_reward += reward;
        reward
    }

    /// Fold an observed reward into the chosen arm's estimate
    ///
    /// Increments the arm's pull count `n` and applies the sample
    /// average update `Q ← Q + (R − Q) / n`, which keeps the estimate
    /// equal to the exact arithmetic mean of the rewards observed for
    /// the arm.
    ///
    /// **Panics** if `arm` is out of range.
    pub fn update_action_value(&mut self, arm: usize, reward: f64) {
        assert!(arm < self.arms.len(), "Invalid arm: {}", arm);
        self.pull_counts[arm] += 1;
        self.action_values[arm] += (reward - self.action_values[arm]) / self.pull_counts[arm] as f64;
    }

    /// Play `iterations` rounds of select, observe, update
    ///
    /// Returns the cumulative reward over every round executed so far.
    /// Calling `run` again plays further rounds on top of the
    /// accumulated state; there is no reset, a fresh simulation is a
    /// fresh engine.
    pub fn run(&mut self) -> f64 {
        for _ in 0..self.iterations {
            let arm = self.select_action();
            let reward = self.observe_reward(arm);
            self.update_action_value(arm, reward);
        }
        debug!(
            "{} rounds executed, total reward {:.4}",
            self.rounds(),
            self.total_reward
        );
        self.total_reward
    }

    /// Number of arms, `k`
    pub fn arm_count(&self) -> usize {
        self.arms.len()
    }

    /// The exploration rate
    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon()
    }

    /// Rounds played per [`run`](Self::run)
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Running sample-mean reward estimate per arm
    pub fn action_values(&self) -> &[f64] {
        &self.action_values
    }

    /// Times each arm has been selected
    pub fn pull_counts(&self) -> &[u64] {
        &self.pull_counts
    }

    /// True mean reward per arm
    pub fn reward_means(&self) -> &[f64] {
        &self.reward_means
    }

    /// Reward standard deviation per arm
    pub fn reward_stddevs(&self) -> &[f64] {
        &self.reward_stddevs
    }

    /// Cumulative reward over every round executed
    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    /// Rounds executed so far
    pub fn rounds(&self) -> u64 {
        self.pull_counts.iter().sum()
    }

    /// Mean reward per round executed, `NaN` before the first round
    pub fn average_reward(&self) -> f64 {
        self.total_reward / self.rounds() as f64
    }

    /// Reward a clairvoyant player would have collected over the rounds
    /// executed so far by always pulling the arm with the highest true
    /// mean
    ///
    /// The policy itself never sees the true means; this exists to
    /// benchmark a run against the optimum.
    pub fn best_possible_reward(&self) -> f64 {
        let rounds = self.rounds();
        if rounds == 0 {
            return 0.0;
        }
        let best_mean = self
            .reward_means
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        rounds as f64 * best_mean
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use statrs::distribution::{ChiSquared, ContinuousCDF};

    use super::*;

    fn seeded(config: BanditConfig, seed: u64) -> BanditEngine<SmallRng> {
        BanditEngine::with_rng(config, SmallRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let err = BanditEngine::new(BanditConfig {
            arms: 0,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, BanditError::NoArms);

        let err = BanditEngine::new(BanditConfig {
            iterations: 0,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, BanditError::NoIterations);

        let err = BanditEngine::new(BanditConfig {
            arms: 3,
            reward_means: Some(vec![1.0]),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            err,
            BanditError::LengthMismatch {
                field: "reward_means",
                expected: 3,
                actual: 1,
            }
        );
        assert!(err.to_string().contains("reward_means"), "names the field");

        let err = BanditEngine::new(BanditConfig {
            arms: 2,
            reward_stddevs: Some(vec![1.0, 1.0, 1.0]),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            err,
            BanditError::LengthMismatch {
                field: "reward_stddevs",
                expected: 2,
                actual: 3,
            }
        );

        let err = BanditEngine::new(BanditConfig {
            arms: 2,
            reward_stddevs: Some(vec![1.0, -0.5]),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, BanditError::InvalidStdDev { index: 1, value: -0.5 });
    }

    #[test]
    fn default_parameters_are_drawn_at_construction() {
        let engine = seeded(
            BanditConfig {
                arms: 8,
                ..Default::default()
            },
            1,
        );
        assert_eq!(engine.reward_means().len(), 8);
        assert!(engine.reward_means().iter().all(|m| m.is_finite()));
        assert_eq!(engine.reward_stddevs(), &[1.0; 8]);
        assert_eq!(engine.action_values(), &[0.0; 8]);
        assert_eq!(engine.pull_counts(), &[0; 8]);
        assert_eq!(engine.best_possible_reward(), 0.0);
    }

    #[test]
    fn action_value_is_exact_sample_mean() {
        let mut engine = seeded(
            BanditConfig {
                arms: 2,
                ..Default::default()
            },
            5,
        );
        let rewards = [2.0, -1.0, 0.5, 10.0];
        for reward in rewards {
            engine.update_action_value(0, reward);
        }
        assert_abs_diff_eq!(
            engine.action_values()[0],
            rewards.iter().sum::<f64>() / rewards.len() as f64,
            epsilon = 1e-9
        );
        assert_eq!(engine.pull_counts(), &[4, 0]);
        assert_eq!(engine.rounds(), 4);
    }

    #[test]
    fn zero_epsilon_always_exploits_best_arm() {
        let mut engine = seeded(
            BanditConfig {
                arms: 3,
                epsilon: 0.0,
                ..Default::default()
            },
            3,
        );
        engine.update_action_value(1, 5.0);
        for _ in 0..100 {
            assert_eq!(engine.select_action(), 1);
        }
    }

    #[test]
    fn exploit_ties_break_to_first_arm() {
        let mut engine = seeded(
            BanditConfig {
                arms: 4,
                epsilon: 0.0,
                ..Default::default()
            },
            13,
        );
        for _ in 0..100 {
            assert_eq!(engine.select_action(), 0);
        }
    }

    #[test]
    fn full_exploration_is_uniform() {
        let k = 4;
        let draws = 8000;
        let mut engine = seeded(
            BanditConfig {
                arms: k,
                epsilon: 1.0,
                ..Default::default()
            },
            7,
        );
        let mut observed = vec![0u64; k];
        for _ in 0..draws {
            observed[engine.select_action()] += 1;
        }

        let expected = draws as f64 / k as f64;
        let statistic: f64 = observed
            .iter()
            .map(|&o| (o as f64 - expected).powi(2) / expected)
            .sum();
        let critical = ChiSquared::new((k - 1) as f64).unwrap().inverse_cdf(0.999);
        assert!(
            statistic < critical,
            "chi-square statistic {statistic} exceeds critical value {critical}"
        );
    }

    #[test]
    fn observe_reward_accumulates_total() {
        let mut engine = seeded(
            BanditConfig {
                arms: 1,
                reward_means: Some(vec![3.0]),
                reward_stddevs: Some(vec![0.0]),
                ..Default::default()
            },
            2,
        );
        assert_abs_diff_eq!(engine.observe_reward(0), 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(engine.observe_reward(0), 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(engine.total_reward(), 6.0, epsilon = 1e-9);
    }

    #[test]
    #[should_panic(expected = "Invalid arm")]
    fn observe_reward_rejects_out_of_range_arm() {
        let mut engine = seeded(
            BanditConfig {
                arms: 2,
                ..Default::default()
            },
            1,
        );
        engine.observe_reward(2);
    }

    #[test]
    fn run_executes_exactly_iteration_count_rounds() {
        let mut engine = seeded(
            BanditConfig {
                arms: 5,
                iterations: 250,
                ..Default::default()
            },
            19,
        );
        engine.run();
        assert_eq!(engine.rounds(), 250);
        assert_eq!(engine.action_values().len(), 5);
        assert_eq!(engine.pull_counts().len(), 5);

        // a second run compounds on top of the first
        engine.run();
        assert_eq!(engine.rounds(), 500);
    }

    #[test]
    fn deterministic_two_arm_scenario() {
        let mut engine = seeded(
            BanditConfig {
                arms: 2,
                epsilon: 0.0,
                iterations: 3,
                initial_value: 0.0,
                reward_means: Some(vec![5.0, -5.0]),
                reward_stddevs: Some(vec![0.0, 0.0]),
            },
            11,
        );
        let total = engine.run();
        assert_abs_diff_eq!(total, 15.0, epsilon = 1e-9);
        assert_eq!(engine.pull_counts(), &[3, 0]);
        assert_abs_diff_eq!(engine.action_values()[0], 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(engine.average_reward(), 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(engine.best_possible_reward(), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let config = BanditConfig {
            arms: 5,
            iterations: 500,
            ..Default::default()
        };
        let mut a = seeded(config.clone(), 42);
        let mut b = seeded(config, 42);
        assert_eq!(a.run(), b.run());
        assert_eq!(a.reward_means(), b.reward_means());
        assert_eq!(a.action_values(), b.action_values());
        assert_eq!(a.pull_counts(), b.pull_counts());
    }
}
