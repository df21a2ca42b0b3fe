//! Fuzz target for the whole inbound pipeline.
//!
//! Bytes go through the decoder into a live session with recording
//! capabilities. One bad command must never halt the interpreter, so this
//! must not panic no matter what the stream decodes to.

#![no_main]

use glasslink_core::{DisplaySession, SessionConfig};
use glasslink_harness::{FixedClock, RecordingRenderer, SimTimers};
use glasslink_proto::{Decoder, PumpStatus};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut session = DisplaySession::new(SessionConfig::default());
    let mut gfx = RecordingRenderer::new();
    let mut timers = SimTimers::new();
    let clock = FixedClock::new();

    let mut decoder = Decoder::new();
    decoder.extend(data);
    loop {
        let (status, _) = session.pump(&mut decoder, &mut gfx, &mut timers, &clock);
        if status != PumpStatus::MoreReady {
            break;
        }
    }
});
