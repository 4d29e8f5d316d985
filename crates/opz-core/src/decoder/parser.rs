use tracing::{debug, warn};

use crate::dictionary::layout as keys;
use crate::dictionary::{Dictionary, DictionaryError, LookupError};
use crate::{
    ChannelEvent, ControlEvent, DecodedEvent, DialValue, EmptyValue, EventValue, NoteValue,
    PitchValue,
};

use super::error::DecodeError;
use super::layout;
use super::reader::MessageReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    Keys,
    Dial,
    PitchBend,
    Other,
}

impl ActionKind {
    fn from_name(name: &str) -> Self {
        match name {
            keys::ACTION_KEYS => ActionKind::Keys,
            keys::ACTION_DIAL => ActionKind::Dial,
            keys::ACTION_PITCH_BEND => ActionKind::PitchBend,
            _ => ActionKind::Other,
        }
    }
}

/// Stateless OP-Z message decoder over an injected [`Dictionary`].
///
/// Every sub-decoder returns `Ok(None)` when the message is too short for it
/// and propagates lookup failures untouched; only [`Decoder::decode`]
/// recovers from them.
#[derive(Debug, Clone)]
pub struct Decoder {
    dictionary: Dictionary,
}

impl Decoder {
    pub fn new(dictionary: Dictionary) -> Self {
        Self { dictionary }
    }

    pub fn bundled() -> Result<Self, DictionaryError> {
        Ok(Self::new(Dictionary::bundled()?))
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn track(&self, message: &[u8]) -> Result<Option<String>, LookupError> {
        MessageReader::new(message)
            .status()
            .map(|status| self.lookup_status(keys::TRACK, status))
            .transpose()
    }

    pub fn action(&self, message: &[u8]) -> Result<Option<String>, LookupError> {
        MessageReader::new(message)
            .status()
            .map(|status| self.lookup_status(keys::ACTION, status))
            .transpose()
    }

    pub fn note(&self, message: &[u8]) -> Result<Option<NoteValue>, LookupError> {
        let Some(value) = MessageReader::new(message).data1() else {
            return Ok(None);
        };
        let residue = (value % layout::PITCH_CLASSES).to_string();
        let note = self.dictionary.get_str(&[keys::NOTES, &residue])?;
        Ok(Some(NoteValue {
            value,
            note: note.to_string(),
        }))
    }

    /// Decode a dial turn.
    ///
    /// Knob position and page come from the raw dial number; the two colors
    /// are looked up with the number reduced modulo 100, the page color in a
    /// per-track palette.
    pub fn dial(&self, message: &[u8]) -> Result<Option<DialValue>, LookupError> {
        let Some((status, number)) = MessageReader::new(message).status_and_data1() else {
            return Ok(None);
        };
        let position = i16::from(number) - 1;
        let key = (number % layout::DIAL_KEY_MODULUS).to_string();

        let dial_color = self
            .dictionary
            .get_str(&[keys::DIAL, keys::DIAL_COLOR, &key])?
            .to_string();
        let track = self.lookup_status(keys::TRACK, status)?;
        let page_color = self
            .dictionary
            .get_str(&[keys::DIAL, keys::DIAL_PAGE, &track, &key])?
            .to_string();

        Ok(Some(DialValue {
            dial: position % layout::DIALS_PER_PAGE,
            dial_color,
            page: position.div_euclid(layout::DIALS_PER_PAGE),
            page_color,
        }))
    }

    pub fn value(&self, message: &[u8]) -> Result<Option<EventValue>, LookupError> {
        if !MessageReader::new(message).has_len(layout::CHANNEL_LEN) {
            return Ok(None);
        }
        let kind = self
            .action(message)?
            .as_deref()
            .map_or(ActionKind::Other, ActionKind::from_name);
        let value = match kind {
            ActionKind::Keys => self.note(message)?.map(EventValue::Note),
            ActionKind::Dial => self.dial(message)?.map(EventValue::Dial),
            ActionKind::PitchBend => pitch(message).map(EventValue::Pitch),
            ActionKind::Other => Some(EventValue::Empty(EmptyValue {})),
        };
        Ok(value)
    }

    /// Decode a single-byte system message (clock, start, stop).
    pub fn control(&self, message: &[u8]) -> Result<ControlEvent, LookupError> {
        let status = MessageReader::new(message)
            .status()
            .ok_or_else(|| LookupError::Untracked {
                path: keys::CONTROL.to_string(),
            })?;
        let name = self.lookup_status(keys::CONTROL, status)?;
        Ok(ControlEvent {
            track: name.clone(),
            action: name,
            velocity: velocity(message),
            value: EmptyValue {},
        })
    }

    /// Decode one message, keeping lookup failures as errors.
    ///
    /// `Ok(None)` is the unsupported two-byte shape.
    pub fn try_decode(&self, message: &[u8]) -> Result<Option<DecodedEvent>, DecodeError> {
        self.classify(message)
            .map_err(|source| DecodeError::Untracked {
                message: message.to_vec(),
                source,
            })
    }

    /// Decode one message, dropping it with a diagnostic when any lookup
    /// fails.
    ///
    /// # Examples
    /// ```
    /// use opz_core::Decoder;
    ///
    /// let decoder = Decoder::bundled()?;
    /// let event = decoder.decode(&[144, 60, 100]).expect("note event");
    /// assert_eq!(event.track(), Some("kick"));
    /// assert_eq!(event.action(), Some("keys"));
    /// assert_eq!(event.velocity(), 100);
    ///
    /// assert!(decoder.decode(&[1, 2]).is_none());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn decode(&self, message: &[u8]) -> Option<DecodedEvent> {
        match self.try_decode(message) {
            Ok(event) => event,
            Err(err) => {
                report_untracked(&err);
                None
            }
        }
    }

    fn classify(&self, message: &[u8]) -> Result<Option<DecodedEvent>, LookupError> {
        match message.len() {
            layout::CONTROL_LEN => Ok(Some(DecodedEvent::Control(self.control(message)?))),
            layout::UNSUPPORTED_LEN => {
                debug!(bytes = ?message, "skipping two-byte message");
                Ok(None)
            }
            _ => Ok(Some(DecodedEvent::Channel(ChannelEvent {
                track: self.track(message)?,
                action: self.action(message)?,
                velocity: velocity(message),
                value: self.value(message)?,
            }))),
        }
    }

    fn lookup_status(&self, table: &str, status: u8) -> Result<String, LookupError> {
        let key = status.to_string();
        Ok(self.dictionary.get_str(&[table, &key])?.to_string())
    }
}

/// Raw pitch-bend pair, untouched.
pub fn pitch(message: &[u8]) -> Option<PitchValue> {
    let reader = MessageReader::new(message);
    if !reader.has_len(layout::CHANNEL_LEN) {
        return None;
    }
    let (absolute, relative) = reader.data_pair()?;
    Some(PitchValue { absolute, relative })
}

/// Third byte of a channel message, or `-1` when the message is shorter.
///
/// # Examples
/// ```
/// use opz_core::velocity;
///
/// assert_eq!(velocity(&[144, 60, 100]), 100);
/// assert_eq!(velocity(&[248]), -1);
/// ```
pub fn velocity(message: &[u8]) -> i16 {
    let reader = MessageReader::new(message);
    if !reader.has_len(layout::CHANNEL_LEN) {
        return layout::VELOCITY_ABSENT;
    }
    reader
        .data2()
        .map_or(layout::VELOCITY_ABSENT, i16::from)
}

/// Emit the diagnostic for a dropped message.
pub fn report_untracked(err: &DecodeError) {
    warn!(
        bytes = ?err.message(),
        reason = %err.lookup(),
        "untracked MIDI value {:?}; please report it at {}",
        err.message(),
        layout::ISSUE_TRACKER_URL
    );
}
