use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid byte `{token}`: not a number")]
    NotANumber { token: String },
    #[error("invalid byte `{token}`: out of range 0..=255")]
    OutOfRange { token: String },
}
