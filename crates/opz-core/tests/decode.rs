use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use opz_core::{DecodedEvent, Decoder, DialValue, Dictionary, EventValue, PitchValue};
use serde_json::json;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

fn decoder() -> Decoder {
    Decoder::bundled().expect("bundled dictionary")
}

struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(count.clone()));
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, count.load(Ordering::SeqCst))
}

fn channel_value(event: Option<DecodedEvent>) -> EventValue {
    match event {
        Some(DecodedEvent::Channel(channel)) => channel.value.expect("channel value"),
        other => panic!("expected channel event, got {other:?}"),
    }
}

#[test]
fn transport_messages_decode_to_control_events() {
    let decoder = decoder();
    for (status, name) in [(248u8, "clock"), (250, "start"), (252, "stop")] {
        let event = decoder.decode(&[status]).expect("control event");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"track": name, "action": name, "velocity": -1, "value": {}})
        );
    }
}

#[test]
fn two_byte_messages_are_unsupported() {
    let decoder = decoder();
    for status in 0..=255u8 {
        for data in [0u8, 1, 60, 127, 255] {
            assert_eq!(decoder.try_decode(&[status, data]).unwrap(), None);
        }
    }
}

#[test]
fn keys_range_names_pitch_class() {
    let decoder = decoder();
    for status in 128..=159u8 {
        for note in 0..=127u8 {
            let event = decoder.decode(&[status, note, 90]).expect("keys event");
            assert_eq!(event.action(), Some("keys"));
            match channel_value(Some(event)) {
                EventValue::Note(value) => {
                    assert_eq!(value.value, note);
                    assert_eq!(value.note, NOTE_NAMES[usize::from(note % 12)]);
                }
                other => panic!("expected note value, got {other:?}"),
            }
        }
    }
}

#[test]
fn dial_range_splits_knob_and_page() {
    let decoder = decoder();
    for status in 176..=191u8 {
        for number in 1..=16u8 {
            let event = decoder.decode(&[status, number, 42]);
            match channel_value(event) {
                EventValue::Dial(dial) => {
                    assert_eq!(dial.dial, i16::from((number - 1) % 4));
                    assert_eq!(dial.page, i16::from((number - 1) / 4));
                    assert!((0..=3).contains(&dial.dial));
                    assert!((0..=3).contains(&dial.page));
                }
                other => panic!("expected dial value, got {other:?}"),
            }
        }
    }
}

#[test]
fn pitch_bend_range_passes_bytes_through() {
    let decoder = decoder();
    for status in 224..=239u8 {
        for (absolute, relative) in [(0u8, 0u8), (0, 64), (127, 127), (3, 200)] {
            let value = channel_value(decoder.decode(&[status, absolute, relative]));
            assert_eq!(value, EventValue::Pitch(PitchValue { absolute, relative }));
        }
    }
}

#[test]
fn note_on_example() {
    let event = decoder().decode(&[144, 60, 100]).unwrap();
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({
            "track": "kick",
            "action": "keys",
            "velocity": 100,
            "value": {"value": 60, "note": "C"}
        })
    );
}

#[test]
fn two_byte_example_is_none() {
    let (event, warnings) = count_warnings(|| decoder().decode(&[1, 2]));
    assert!(event.is_none());
    assert_eq!(warnings, 0);
}

#[test]
fn dial_example_with_kick_on_177() {
    let dictionary = Dictionary::from_value(json!({
        "action": { "177": "dial" },
        "track": { "177": "kick" },
        "dial": {
            "color": { "5": "green" },
            "page": { "kick": { "5": "green" } }
        }
    }))
    .unwrap();
    let value = channel_value(Decoder::new(dictionary).decode(&[177, 5, 10]));
    assert_eq!(
        value,
        EventValue::Dial(DialValue {
            dial: 0,
            dial_color: "green".to_string(),
            page: 1,
            page_color: "green".to_string(),
        })
    );
}

#[test]
fn dial_example_with_bundled_tables() {
    let event = decoder().decode(&[177, 5, 10]).unwrap();
    assert_eq!(event.track(), Some("snare"));
    assert_eq!(
        serde_json::to_value(&event).unwrap()["value"],
        json!({"dial": 0, "dialColor": "green", "page": 1, "pageColor": "green"})
    );
}

#[test]
fn unknown_status_drops_event_with_one_diagnostic() {
    let decoder = decoder();
    for message in [&[1u8][..], &[1, 2, 3], &[249], &[176, 0, 5]] {
        let (event, warnings) = count_warnings(|| decoder.decode(message));
        assert!(event.is_none(), "{message:?}");
        assert_eq!(warnings, 1, "{message:?}");
    }
}

#[test]
fn decoded_messages_emit_no_diagnostics() {
    let decoder = decoder();
    let (events, warnings) = count_warnings(|| {
        [&[248u8][..], &[144, 60, 100], &[224, 0, 64]]
            .iter()
            .map(|message| decoder.decode(message))
            .collect::<Vec<_>>()
    });
    assert!(events.iter().all(Option::is_some));
    assert_eq!(warnings, 0);
}

#[test]
fn decoder_is_shareable_across_threads() {
    let decoder = Arc::new(decoder());
    let handles: Vec<_> = (0..4u8)
        .map(|offset| {
            let decoder = Arc::clone(&decoder);
            std::thread::spawn(move || decoder.decode(&[144 + offset, 61, 1]))
        })
        .collect();
    for handle in handles {
        let event = handle.join().expect("thread").expect("event");
        assert_eq!(event.action(), Some("keys"));
    }
}
