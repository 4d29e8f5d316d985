//! OP-Z reference tables.
//!
//! The dictionary is a nested JSON object keyed by stringified byte values
//! and by track/action names. Lookups walk it by key path and fail on any
//! absent or falsy step. Key names live in `layout`; the lookup contract and
//! loaders live in `reader`.

pub mod error;
pub mod layout;
pub mod reader;

pub use error::{DictionaryError, LookupError};
pub use reader::Dictionary;
