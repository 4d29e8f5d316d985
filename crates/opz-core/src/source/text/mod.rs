//! Plain-text message logs.
//!
//! One message per line, bytes separated by whitespace or commas, each byte
//! decimal or `0x`-prefixed hex. Everything after `#` is a comment; lines
//! with no bytes are skipped. The source reads from any `BufRead` and never
//! opens files itself.

pub mod error;
pub mod layout;
pub mod parser;

pub use error::TokenError;
pub use parser::{TextLogSource, parse_message_line};
