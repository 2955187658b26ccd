/// The bandit simulation engine
pub mod engine;

/// Configuration errors
pub mod error;

/// Exploration policies
pub mod exploration;

/// Plotting collaborators for finished runs
#[cfg(feature = "plot")]
pub mod plot;

mod util;

pub use engine::{BanditConfig, BanditEngine};
pub use error::BanditError;
