use thiserror::Error;

/// Malformed or missing input. Surfaced to the caller, never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invention description is empty")]
    EmptyDescription,

    #[error("invention description is too short ({chars} characters, minimum {min})")]
    DescriptionTooShort { chars: usize, min: usize },

    #[error("temperature {0} is outside 0.0..=2.0")]
    TemperatureOutOfRange(f32),

    #[error("max_tokens {0} is outside 100..=4096")]
    MaxTokensOutOfRange(u32),

    #[error("unknown generation mode {0:?} (expected \"fast\" or \"detailed\")")]
    UnknownMode(String),
}
