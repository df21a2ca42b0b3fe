//! Fuzz target for the embedded-side event receiver.
//!
//! The receiver runs in an interrupt handler on real hardware, so it must
//! digest any byte stream without panicking and every event it surfaces
//! must respect its tag's fixed shape.

#![no_main]

use glasslink_proto::EventReceiver;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut receiver = EventReceiver::new();
    for &byte in data {
        if let Some(event) = receiver.feed(byte) {
            assert_eq!(event.params.len(), event.tag.param_count());
            if !event.tag.expects_data() {
                assert!(event.data.is_empty());
            }
        }
    }
});
