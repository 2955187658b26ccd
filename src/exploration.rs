use rand::Rng;

/// Exploration policy result
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with a fixed epsilon threshold
///
/// Each decision draws one uniform value in `[0,1)`; a draw at or below
/// the threshold explores, anything above it exploits. Epsilon is not
/// clamped to `[0,1]`: values above 1 always explore and values below 0
/// always exploit, which is accepted behavior rather than an error.
#[derive(Debug)]
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Initialize epsilon greedy policy from an exploration rate
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// The exploration rate
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Invoke epsilon greedy policy with the provided random source
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        if rng.gen::<f64>() > self.epsilon {
            Choice::Exploit
        } else {
            Choice::Explore
        }
    }
}
