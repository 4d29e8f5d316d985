use thiserror::Error;

/// Errors returned while loading a dictionary.
///
/// # Examples
/// ```
/// use opz_core::{Dictionary, DictionaryError};
///
/// let err = Dictionary::from_json_str("[]").unwrap_err();
/// assert!(matches!(err, DictionaryError::NotAnObject));
/// ```
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid dictionary JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("dictionary root must be a JSON object")]
    NotAnObject,
}

/// Errors returned by a dictionary key-path lookup.
///
/// `path` is the dotted key path up to and including the step that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("untracked value at `{path}`")]
    Untracked { path: String },
    #[error("value at `{path}` is not text")]
    NotText { path: String },
}

impl LookupError {
    pub fn path(&self) -> &str {
        match self {
            LookupError::Untracked { path } | LookupError::NotText { path } => path,
        }
    }
}
