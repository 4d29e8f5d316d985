use std::io::BufRead;
use std::num::IntErrorKind;

use crate::source::{MessageEvent, MessageSource, SourceError};

use super::error::TokenError;
use super::layout;

pub struct TextLogSource<R> {
    reader: R,
    line: u64,
    buf: String,
}

impl<R: BufRead> TextLogSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> MessageSource for TextLogSource<R> {
    fn next_message(&mut self) -> Result<Option<MessageEvent>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let parsed = parse_message_line(&self.buf).map_err(|err| SourceError::Parse {
                line: self.line,
                message: err.to_string(),
            })?;
            if let Some(bytes) = parsed {
                return Ok(Some(MessageEvent {
                    line: self.line,
                    bytes,
                }));
            }
        }
    }
}

/// Parse one log line into message bytes; `None` for blank or comment lines.
///
/// # Examples
/// ```
/// use opz_core::parse_message_line;
///
/// assert_eq!(parse_message_line("144 60 100").unwrap(), Some(vec![144, 60, 100]));
/// assert_eq!(parse_message_line("0xF8 # clock").unwrap(), Some(vec![248]));
/// assert_eq!(parse_message_line("   ").unwrap(), None);
/// ```
pub fn parse_message_line(line: &str) -> Result<Option<Vec<u8>>, TokenError> {
    let content = line
        .split_once(layout::COMMENT_PREFIX)
        .map_or(line, |(before, _)| before);
    let bytes = content
        .split(layout::is_separator)
        .filter(|token| !token.is_empty())
        .map(parse_byte)
        .collect::<Result<Vec<u8>, TokenError>>()?;
    Ok(if bytes.is_empty() { None } else { Some(bytes) })
}

fn parse_byte(token: &str) -> Result<u8, TokenError> {
    let (digits, radix) = layout::HEX_PREFIXES
        .iter()
        .find_map(|prefix| token.strip_prefix(*prefix))
        .map_or((token, layout::DECIMAL_RADIX), |hex| (hex, layout::HEX_RADIX));
    u8::from_str_radix(digits, radix).map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => TokenError::OutOfRange {
            token: token.to_string(),
        },
        _ => TokenError::NotANumber {
            token: token.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{TextLogSource, parse_message_line};
    use crate::source::text::error::TokenError;
    use crate::source::{MessageSource, SourceError};

    #[test]
    fn parses_mixed_separators_and_radixes() {
        let parsed = parse_message_line("0xb1, 5,\t10\n").unwrap();
        assert_eq!(parsed, Some(vec![177, 5, 10]));
    }

    #[test]
    fn skips_comment_only_lines() {
        assert_eq!(parse_message_line("# header").unwrap(), None);
        assert_eq!(parse_message_line("\n").unwrap(), None);
    }

    #[test]
    fn rejects_out_of_range_byte() {
        let err = parse_message_line("144 256").unwrap_err();
        assert_eq!(
            err,
            TokenError::OutOfRange {
                token: "256".to_string()
            }
        );
    }

    #[test]
    fn rejects_garbage_token() {
        let err = parse_message_line("144 note").unwrap_err();
        assert!(matches!(err, TokenError::NotANumber { .. }));
        let err = parse_message_line("0x").unwrap_err();
        assert!(matches!(err, TokenError::NotANumber { .. }));
    }

    #[test]
    fn source_tracks_line_numbers() {
        let log = "# capture\n248\n\n144 60 100\n";
        let mut source = TextLogSource::new(Cursor::new(log));

        let first = source.next_message().unwrap().unwrap();
        assert_eq!((first.line, first.bytes), (2, vec![248]));
        let second = source.next_message().unwrap().unwrap();
        assert_eq!((second.line, second.bytes), (4, vec![144, 60, 100]));
        assert!(source.next_message().unwrap().is_none());
    }

    #[test]
    fn source_reports_parse_errors_with_line() {
        let mut source = TextLogSource::new(Cursor::new("248\n1 2 x\n"));
        source.next_message().unwrap();
        let err = source.next_message().unwrap_err();
        assert!(matches!(err, SourceError::Parse { line: 2, .. }));
        assert!(err.to_string().contains("`x`"));
    }
}
