use thiserror::Error;

/// Configuration errors surfaced when constructing a
/// [`BanditEngine`](crate::BanditEngine)
///
/// Construction fails fast: a misconfigured engine is never produced.
#[derive(Debug, Error, PartialEq)]
pub enum BanditError {
    #[error("`arms` must be positive")]
    NoArms,

    #[error("`iterations` must be positive")]
    NoIterations,

    #[error("`{field}` must have length {expected}, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("`reward_stddevs[{index}]` must be a non-negative scale, got {value}")]
    InvalidStdDev { index: usize, value: f64 },
}
