//! OP-Z MIDI decoding library.
//!
//! This crate turns raw MIDI messages emitted by a Teenage Engineering OP-Z
//! into labeled events: the originating track, the action category (keys,
//! dial, pitch bend, or a transport control) and a value payload decoded per
//! category. Decoding is pure and stateless; the reference tables are an
//! injected [`Dictionary`] so alternate or reduced tables can be swapped in.
//!
//! Invariants:
//! - One message in, at most one event out; no state carries across calls.
//! - Any failed dictionary lookup drops the whole message, never part of it.
//! - [`Decoder::decode`] is the only place that recovers from lookup
//!   failures, emitting a single `tracing` warning per dropped message.
//!
//! Message logs can be decoded in bulk through a [`MessageSource`] into a
//! deterministic [`Report`]. The crate never touches devices or files; I/O
//! belongs to callers.
//!
//! # Examples
//! ```
//! use opz_core::{DecodedEvent, Decoder, EventValue};
//!
//! let decoder = Decoder::bundled()?;
//! let event = decoder.decode(&[144, 60, 100]).expect("note event");
//! match event {
//!     DecodedEvent::Channel(channel) => {
//!         assert_eq!(channel.track.as_deref(), Some("kick"));
//!         assert!(matches!(channel.value, Some(EventValue::Note(_))));
//!     }
//!     DecodedEvent::Control(_) => unreachable!(),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod batch;
pub mod decoder;
pub mod dictionary;
mod source;

pub use batch::{BatchError, decode_source};
pub use decoder::{DecodeError, Decoder, pitch, report_untracked, velocity};
pub use dictionary::{Dictionary, DictionaryError, LookupError};
pub use source::{
    MessageEvent, MessageSource, SourceError, TextLogSource, TokenError, parse_message_line,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the caller does not stamp the report.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Result of decoding one message.
///
/// Serializes to the uniform `{track, action, velocity, value}` shape.
///
/// # Examples
/// ```
/// use opz_core::Decoder;
///
/// let decoder = Decoder::bundled()?;
/// let event = decoder.decode(&[248]).expect("clock");
/// let json = serde_json::to_value(&event)?;
/// assert_eq!(
///     json,
///     serde_json::json!({"track": "clock", "action": "clock", "velocity": -1, "value": {}})
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecodedEvent {
    Control(ControlEvent),
    Channel(ChannelEvent),
}

impl DecodedEvent {
    pub fn track(&self) -> Option<&str> {
        match self {
            DecodedEvent::Control(event) => Some(&event.track),
            DecodedEvent::Channel(event) => event.track.as_deref(),
        }
    }

    pub fn action(&self) -> Option<&str> {
        match self {
            DecodedEvent::Control(event) => Some(&event.action),
            DecodedEvent::Channel(event) => event.action.as_deref(),
        }
    }

    pub fn velocity(&self) -> i16 {
        match self {
            DecodedEvent::Control(event) => event.velocity,
            DecodedEvent::Channel(event) => event.velocity,
        }
    }
}

/// Single-byte system message (clock, start, stop).
///
/// There is no track for system messages, so `track` repeats `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEvent {
    pub track: String,
    pub action: String,
    /// Always `-1`: system messages carry no velocity byte.
    pub velocity: i16,
    pub value: EmptyValue,
}

/// Channel message (keys, dial, pitch bend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEvent {
    pub track: Option<String>,
    pub action: Option<String>,
    /// Third byte verbatim, or `-1` when absent.
    pub velocity: i16,
    pub value: Option<EventValue>,
}

/// Value payload, shaped by the action category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Note(NoteValue),
    Dial(DialValue),
    Pitch(PitchValue),
    /// Action category with no further decoding.
    Empty(EmptyValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteValue {
    /// Raw note number.
    pub value: u8,
    /// Pitch-class name of `value % 12` (e.g. `C#`).
    pub note: String,
}

/// Dial turn decoded into knob, page and the two palette colors.
///
/// # Examples
/// ```
/// use opz_core::DialValue;
///
/// let dial = DialValue {
///     dial: 0,
///     dial_color: "green".to_string(),
///     page: 1,
///     page_color: "green".to_string(),
/// };
/// let json = serde_json::to_value(&dial).unwrap();
/// assert_eq!(json["dialColor"], "green");
/// assert_eq!(json["pageColor"], "green");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialValue {
    /// Knob index within its page (0-3 for dial numbers 1-16).
    pub dial: i16,
    pub dial_color: String,
    /// Page index (0-3 for dial numbers 1-16).
    pub page: i16,
    pub page_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchValue {
    pub absolute: u8,
    pub relative: u8,
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmptyValue {}

/// Batch decoding report with messages in source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,
    pub input: InputInfo,
    pub summary: DecodeSummary,
    /// Decoded events in source order.
    pub events: Vec<EventRecord>,
    /// Dropped messages in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub untracked: Vec<UntrackedRecord>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input log metadata embedded in reports.
///
/// # Examples
/// ```
/// use opz_core::InputInfo;
///
/// let input = InputInfo {
///     path: "session.txt".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided by the caller.
    pub path: String,
    pub bytes: u64,
}

/// Message counts per decoding outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeSummary {
    pub messages_total: u64,
    pub decoded: u64,
    /// Two-byte messages, skipped without diagnostics.
    pub malformed: u64,
    pub untracked: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub line: u64,
    pub bytes: Vec<u8>,
    pub event: DecodedEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UntrackedRecord {
    pub line: u64,
    pub bytes: Vec<u8>,
    /// Failed lookup, e.g. ``untracked value at `track.1` ``.
    pub reason: String,
}

/// Build a report with base fields filled and nothing decoded yet.
///
/// # Examples
/// ```
/// use opz_core::make_stub_report;
///
/// let report = make_stub_report("session.txt", 123);
/// assert_eq!(report.report_version, opz_core::REPORT_VERSION);
/// assert!(report.events.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "opz".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        summary: DecodeSummary::default(),
        events: vec![],
        untracked: vec![],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn channel_event_serializes_nulls() {
        let event = DecodedEvent::Channel(ChannelEvent {
            track: None,
            action: None,
            velocity: -1,
            value: None,
        });
        let value = serde_json::to_value(&event).expect("event json");
        assert_eq!(
            value,
            json!({"track": null, "action": null, "velocity": -1, "value": null})
        );
    }

    #[test]
    fn value_variants_serialize_flat() {
        let note = EventValue::Note(NoteValue {
            value: 60,
            note: "C".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&note).unwrap(),
            json!({"value": 60, "note": "C"})
        );
        let pitch = EventValue::Pitch(PitchValue {
            absolute: 3,
            relative: 64,
        });
        assert_eq!(
            serde_json::to_value(&pitch).unwrap(),
            json!({"absolute": 3, "relative": 64})
        );
        let empty = EventValue::Empty(EmptyValue {});
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));
    }

    #[test]
    fn events_round_trip_through_json() {
        let events = [
            json!({"track": "clock", "action": "clock", "velocity": -1, "value": {}}),
            json!({"track": "kick", "action": "keys", "velocity": 100,
                   "value": {"value": 60, "note": "C"}}),
            json!({"track": "snare", "action": "dial", "velocity": 10,
                   "value": {"dial": 0, "dialColor": "green", "page": 1, "pageColor": "green"}}),
        ];
        for expected in events {
            let event: DecodedEvent = serde_json::from_value(expected.clone()).unwrap();
            assert_eq!(serde_json::to_value(&event).unwrap(), expected);
        }
    }

    #[test]
    fn report_omits_untracked_when_empty() {
        let report = make_stub_report("session.txt", 1);
        let value = serde_json::to_value(&report).expect("report json");
        assert!(value.get("untracked").is_none());
        assert_eq!(value["summary"]["messages_total"], 0);
        assert_eq!(value["tool"]["name"], "opz");
    }
}
