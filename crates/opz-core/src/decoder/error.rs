use thiserror::Error;

use crate::dictionary::LookupError;

/// A message that could not be resolved against the dictionary.
///
/// # Examples
/// ```
/// use opz_core::{DecodeError, Decoder};
///
/// let decoder = Decoder::bundled()?;
/// let err = decoder.try_decode(&[1, 2, 3]).unwrap_err();
/// assert_eq!(err.message(), &[1, 2, 3]);
/// assert!(err.to_string().contains("untracked"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("untracked MIDI message {message:?}: {source}")]
    Untracked {
        message: Vec<u8>,
        #[source]
        source: LookupError,
    },
}

impl DecodeError {
    pub fn message(&self) -> &[u8] {
        match self {
            DecodeError::Untracked { message, .. } => message,
        }
    }

    pub fn lookup(&self) -> &LookupError {
        match self {
            DecodeError::Untracked { source, .. } => source,
        }
    }
}
