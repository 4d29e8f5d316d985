use thiserror::Error;
use tracing::info;

use crate::decoder::{Decoder, report_untracked};
use crate::source::{MessageEvent, MessageSource, SourceError};
use crate::{DecodeSummary, EventRecord, Report, UntrackedRecord, make_stub_report};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Decode every message of `source` into a report.
///
/// Untracked messages are logged like [`Decoder::decode`] does and listed in
/// the report instead of aborting the run; only source failures are errors.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use opz_core::{Decoder, TextLogSource, decode_source};
///
/// let decoder = Decoder::bundled()?;
/// let log = "248\n144 60 100\n1 2\n";
/// let report = decode_source("session.txt", log.len() as u64, TextLogSource::new(Cursor::new(log)), &decoder)?;
/// assert_eq!(report.summary.decoded, 2);
/// assert_eq!(report.summary.malformed, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode_source<S: MessageSource>(
    input_path: &str,
    input_bytes: u64,
    mut source: S,
    decoder: &Decoder,
) -> Result<Report, BatchError> {
    let mut report = make_stub_report(input_path, input_bytes);
    let mut summary = DecodeSummary::default();

    while let Some(MessageEvent { line, bytes }) = source.next_message()? {
        summary.messages_total += 1;
        match decoder.try_decode(&bytes) {
            Ok(Some(event)) => {
                summary.decoded += 1;
                report.events.push(EventRecord { line, bytes, event });
            }
            Ok(None) => summary.malformed += 1,
            Err(err) => {
                summary.untracked += 1;
                report_untracked(&err);
                report.untracked.push(UntrackedRecord {
                    line,
                    reason: err.lookup().to_string(),
                    bytes,
                });
            }
        }
    }

    info!(
        total = summary.messages_total,
        decoded = summary.decoded,
        malformed = summary.malformed,
        untracked = summary.untracked,
        "decoded message log {input_path}"
    );
    report.summary = summary;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::io::{self, BufRead, Cursor, Read};

    use super::{BatchError, decode_source};
    use crate::{DecodedEvent, Decoder, TextLogSource};

    fn run(log: &str) -> crate::Report {
        let decoder = Decoder::bundled().unwrap();
        let source = TextLogSource::new(Cursor::new(log.to_string()));
        decode_source("log.txt", log.len() as u64, source, &decoder).unwrap()
    }

    #[test]
    fn counts_every_outcome() {
        let report = run("248\n250\n144 60 100\n176 1\n1 2 3\n252\n");
        assert_eq!(report.summary.messages_total, 6);
        assert_eq!(report.summary.decoded, 4);
        assert_eq!(report.summary.malformed, 1);
        assert_eq!(report.summary.untracked, 1);
        assert_eq!(report.input.bytes, 35);
    }

    #[test]
    fn keeps_line_numbers_on_records() {
        let report = run("# header\n248\n\n9 9 9\n");
        assert_eq!(report.events[0].line, 2);
        assert!(matches!(report.events[0].event, DecodedEvent::Control(_)));
        assert_eq!(report.untracked[0].line, 4);
        assert_eq!(report.untracked[0].bytes, vec![9, 9, 9]);
        assert_eq!(report.untracked[0].reason, "untracked value at `track.9`");
    }

    #[test]
    fn empty_log_has_empty_summary() {
        let report = run("");
        assert_eq!(report.summary.messages_total, 0);
        assert!(report.events.is_empty());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device unplugged"))
        }
    }

    impl BufRead for FailingReader {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            Err(io::Error::other("device unplugged"))
        }

        fn consume(&mut self, _amt: usize) {}
    }

    #[test]
    fn source_errors_abort_the_run() {
        let decoder = Decoder::bundled().unwrap();
        let err = decode_source("log.txt", 0, TextLogSource::new(FailingReader), &decoder)
            .unwrap_err();
        assert!(matches!(err, BatchError::Source(_)));
    }
}
