//! OP-Z message decoding.
//!
//! A message is classified by length: one byte is a system control (clock,
//! start, stop), two bytes is an unsupported shape, anything else is a
//! channel event whose status byte selects the track and action category.
//! Channel values are decoded per category (note, dial, pitch bend).
//!
//! Lookup failures surface as [`DecodeError`] from `try_decode`; `decode`
//! is the single recovery point that logs them and drops the message.
//! Byte offsets and constants live in `layout`, safe byte access in `reader`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::DecodeError;
pub use parser::{Decoder, pitch, report_untracked, velocity};
