use std::io::Read;

use serde_json::Value;

use super::error::{DictionaryError, LookupError};
use super::layout;

/// Immutable reference tables consulted by the decoder.
///
/// # Examples
/// ```
/// use opz_core::Dictionary;
///
/// let dictionary = Dictionary::bundled()?;
/// assert_eq!(dictionary.get_str(&["track", "144"])?, "kick");
/// assert_eq!(dictionary.get_str(&["notes", "1"])?, "C#");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    root: Value,
}

impl Dictionary {
    /// Parse the reference data shipped with this crate.
    pub fn bundled() -> Result<Self, DictionaryError> {
        Self::from_json_str(layout::BUNDLED_JSON)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DictionaryError> {
        Self::from_value(serde_json::from_reader(reader)?)
    }

    pub fn from_value(root: Value) -> Result<Self, DictionaryError> {
        if !root.is_object() {
            return Err(DictionaryError::NotAnObject);
        }
        Ok(Self { root })
    }

    /// Walk the tables by successive keys.
    ///
    /// Every step must land on a truthy value: absent keys, `null`, `false`,
    /// `0` and `""` all fail with [`LookupError::Untracked`].
    pub fn get(&self, path: &[&str]) -> Result<&Value, LookupError> {
        let mut current = &self.root;
        for (depth, key) in path.iter().enumerate() {
            current = current
                .as_object()
                .and_then(|table| table.get(*key))
                .filter(|value| is_truthy(value))
                .ok_or_else(|| LookupError::Untracked {
                    path: join_path(&path[..=depth]),
                })?;
        }
        Ok(current)
    }

    pub fn get_str(&self, path: &[&str]) -> Result<&str, LookupError> {
        self.get(path)?.as_str().ok_or_else(|| LookupError::NotText {
            path: join_path(path),
        })
    }

    /// Track names declared by the reference data, sorted.
    pub fn tracks(&self) -> Vec<&str> {
        self.names(layout::NAMES_TRACK)
    }

    /// Color names declared by the reference data, sorted.
    pub fn colors(&self) -> Vec<&str> {
        self.names(layout::NAMES_COLOR)
    }

    fn names(&self, section: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .get(&[layout::NAMES, section])
            .ok()
            .and_then(Value::as_object)
            .map(|table| table.values().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names.dedup();
        names
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn join_path(path: &[&str]) -> String {
    path.join(layout::PATH_SEPARATOR)
}
