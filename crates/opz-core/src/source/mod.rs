mod text;

pub use text::{TextLogSource, TokenError, parse_message_line};

use thiserror::Error;

/// One raw MIDI message read from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// 1-based position of the message in its source (line number for logs).
    pub line: u64,
    pub bytes: Vec<u8>,
}

pub trait MessageSource {
    fn next_message(&mut self) -> Result<Option<MessageEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error at line {line}: {message}")]
    Parse { line: u64, message: String },
}
