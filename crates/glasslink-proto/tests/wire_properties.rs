//! Property-based tests for the wire grammar.
//!
//! These verify the framing contract for ALL valid inputs, not just
//! examples: round-trip identity, recovery after arbitrary garbage, and
//! independence from transport chunk boundaries.

use glasslink_proto::{
    encode, DataBlock, DataTag, Decoder, EventTag, HostEvent, Message, PumpStatus, SensorKind,
    TouchAction,
};
use proptest::prelude::*;

/// Opcodes that never carry a data block.
fn fixed_opcode() -> impl Strategy<Value = u8> {
    prop_oneof![0x08..=0x3Fu8, 0x40..=0x5Fu8, Just(0x7Fu8)]
}

/// Opcodes whose messages end with a data block.
fn data_opcode() -> impl Strategy<Value = u8> {
    prop_oneof![0x60..=0x6Fu8, 0x70..=0x77u8, 0x78..=0x7Eu8]
}

fn arbitrary_message() -> impl Strategy<Value = Message> {
    let fixed = (fixed_opcode(), prop::collection::vec(any::<u16>(), 0..12))
        .prop_map(|(opcode, params)| Message::new(opcode, params));

    let with_data = (
        data_opcode(),
        prop::collection::vec(any::<u16>(), 0..12),
        prop::collection::vec(any::<u8>(), 0..256),
    )
        .prop_map(|(opcode, params, data)| {
            Message::with_data(opcode, params, DataBlock::new(DataTag::Byte, data))
        });

    prop_oneof![fixed, with_data]
}

fn arbitrary_event() -> impl Strategy<Value = HostEvent> {
    prop_oneof![
        (any::<u16>(), any::<u16>(), 0u8..5).prop_map(|(x, y, pointer)| HostEvent::Touch {
            action: TouchAction::Move,
            x,
            y,
            pointer,
        }),
        (any::<u16>(), any::<u32>(), any::<u32>()).prop_map(|(index, callback, value)| {
            HostEvent::ButtonCallback { index, callback, value }
        }),
        (any::<u16>(), any::<u32>(), any::<u32>()).prop_map(|(index, callback, value)| {
            HostEvent::SliderCallback { index, callback, value }
        }),
        (any::<bool>(), any::<u16>(), any::<u16>(), any::<i16>(), any::<i16>()).prop_map(
            |(horizontal, start_x, start_y, delta_x, delta_y)| HostEvent::Swipe {
                horizontal,
                start_x,
                start_y,
                delta_x,
                delta_y,
            }
        ),
        (any::<u16>(), any::<u16>()).prop_map(|(x, y)| HostEvent::LongTouchDown { x, y }),
        (any::<u32>(), any::<u32>()).prop_map(|(callback, bits)| HostEvent::NumberResult {
            callback,
            value: f32::from_bits(bits),
        }),
        (any::<u32>(), prop::collection::vec(any::<u8>(), 0..48)).prop_map(|(callback, text)| {
            HostEvent::TextResult { callback, text }
        }),
        (any::<u32>(), any::<u32>(), any::<u32>()).prop_map(|(x, y, z)| HostEvent::Sensor {
            kind: SensorKind::Accelerometer,
            x: f32::from_bits(x),
            y: f32::from_bits(y),
            z: f32::from_bits(z),
        }),
        (any::<u16>(), any::<u16>(), any::<u32>()).prop_map(|(width, height, timestamp)| {
            HostEvent::CanvasSize { width, height, timestamp }
        }),
    ]
}

fn decode_all(wire: &[u8]) -> Vec<Message> {
    let mut decoder = Decoder::new();
    decoder.extend(wire);
    let mut out = Vec::new();
    loop {
        match decoder.pump(16, |m| out.push(m)) {
            PumpStatus::MoreReady => {},
            PumpStatus::WaitForMoreBytes | PumpStatus::Nothing => break,
        }
    }
    out
}

#[test]
fn prop_message_round_trip() {
    proptest!(|(message in arbitrary_message())| {
        let mut wire = Vec::new();
        encode::write_message(&message, &mut wire).expect("encode should succeed");

        let decoded = decode_all(&wire);
        prop_assert_eq!(decoded, vec![message]);
    });
}

#[test]
fn prop_message_sequence_round_trip() {
    proptest!(|(messages in prop::collection::vec(arbitrary_message(), 0..8))| {
        let mut wire = Vec::new();
        for message in &messages {
            encode::write_message(message, &mut wire).expect("encode should succeed");
        }

        let decoded = decode_all(&wire);
        prop_assert_eq!(decoded, messages);
    });
}

#[test]
fn prop_garbage_prefix_never_loses_the_message() {
    // Sync tokens inside line noise can start a bogus frame whose advertised
    // length swallows real bytes; recovery is then only eventual. For noise
    // without embedded sync tokens the guarantee is exact, so that is the
    // property we pin down.
    let noise_byte = any::<u8>().prop_filter("no sync token", |b| *b != 0xA5);
    proptest!(|(
        garbage in prop::collection::vec(noise_byte, 0..64),
        message in arbitrary_message(),
    )| {
        let mut wire = garbage;
        encode::write_message(&message, &mut wire).expect("encode should succeed");

        let decoded = decode_all(&wire);
        prop_assert_eq!(decoded, vec![message]);
    });
}

#[test]
fn prop_chunk_boundaries_do_not_matter() {
    proptest!(|(
        messages in prop::collection::vec(arbitrary_message(), 1..5),
        split_seed in any::<u64>(),
    )| {
        let mut wire = Vec::new();
        for message in &messages {
            encode::write_message(message, &mut wire).expect("encode should succeed");
        }

        // deterministic pseudo-random chunking from the seed
        let mut decoder = Decoder::new();
        let mut out = Vec::new();
        let mut offset = 0usize;
        let mut state = split_seed | 1;
        while offset < wire.len() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let chunk = 1 + (state % 7) as usize;
            let end = (offset + chunk).min(wire.len());
            decoder.extend(&wire[offset..end]);
            while decoder.pump(16, |m| out.push(m)) == PumpStatus::MoreReady {}
            offset = end;
        }

        prop_assert_eq!(out, messages);
    });
}

#[test]
fn prop_events_parse_back_through_the_inbound_grammar() {
    proptest!(|(event in arbitrary_event())| {
        let mut wire = Vec::new();
        event.encode(&mut wire).expect("encode should succeed");

        // the channel is symmetric: an event frame has the same shape as a
        // command frame, so the event tag sits where an opcode would
        let tag = EventTag::from_u8(wire[1]).expect("tag should parse");
        let param_len = usize::from(u16::from_le_bytes([wire[2], wire[3]]));
        let params: Vec<u16> = wire[4..4 + param_len]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        let data = if wire.len() > 4 + param_len {
            &wire[4 + param_len + 4..]
        } else {
            &[][..]
        };

        let decoded = HostEvent::decode(tag, &params, data).expect("shape should match");
        // NaN bit patterns survive encode/decode but NaN != NaN, so compare
        // through the re-encoded parameter lists.
        prop_assert_eq!(decoded.params(), event.params());
        prop_assert_eq!(decoded.tag(), event.tag());
    });
}

#[test]
fn prop_decoder_never_panics_on_noise() {
    proptest!(|(noise in prop::collection::vec(any::<u8>(), 0..512))| {
        let mut decoder = Decoder::new();
        decoder.extend(&noise);
        let mut sink = Vec::new();
        while decoder.pump(16, |m| sink.push(m)) == PumpStatus::MoreReady {}
        // PROPERTY: every surfaced message respects the size bounds
        for message in &sink {
            prop_assert!(message.params.len() <= glasslink_proto::MAX_PARAMS);
            prop_assert!(message.data_bytes().len() <= glasslink_proto::MAX_DATA_LEN);
        }
    });
}
