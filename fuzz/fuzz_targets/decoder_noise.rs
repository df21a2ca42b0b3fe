//! Fuzz target for the host pull decoder.
//!
//! Arbitrary bytes in arbitrary chunk sizes must never panic, never loop
//! forever and never surface a message outside the wire limits. The first
//! input byte seeds the chunking so boundary handling gets exercised too.

#![no_main]

use glasslink_proto::{Decoder, PumpStatus, MAX_DATA_LEN, MAX_PARAMS};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&seed, stream)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(seed % 16) + 1;

    let mut decoder = Decoder::new();
    for piece in stream.chunks(chunk) {
        decoder.extend(piece);
        loop {
            let mut out = Vec::new();
            let status = decoder.pump(8, |message| out.push(message));
            for message in &out {
                assert!(message.params.len() <= MAX_PARAMS);
                assert!(message.data_bytes().len() <= MAX_DATA_LEN);
            }
            if status != PumpStatus::MoreReady {
                break;
            }
        }
    }
});
