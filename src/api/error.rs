use thiserror::Error;

/// Rejected calculator input, named by the CLI flag it came from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{flag} must be a finite number")]
    NotFinite { flag: &'static str },

    #[error("{flag} {reason}")]
    OutOfRange { flag: &'static str, reason: String },

    #[error("invalid API payload: {0}")]
    Payload(String),
}

impl InputError {
    pub fn out_of_range(flag: &'static str, reason: impl Into<String>) -> Self {
        InputError::OutOfRange {
            flag,
            reason: reason.into(),
        }
    }
}

pub(crate) fn ensure_finite(flag: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NotFinite { flag })
    }
}
