//! Embedded-side event receiver.
//!
//! This is the client half of the framer: a byte-at-a-time state machine
//! meant to be driven from a UART receive interrupt. It only fills fixed
//! buffers and hands out one complete event at a time.
//!
//! # ISR safety
//!
//! `feed` never allocates, never logs and never touches anything outside
//! the receiver itself. Anomalies are recorded as a counter and a latch;
//! reporting them is the application loop's business.
//!
//! # Recovery
//!
//! Any byte that breaks an expectation (unknown tag, parameter length that
//! does not match the tag's fixed shape, oversized data block) latches the
//! receiver out of sync. It then discards input until a sync token appears
//! and restarts; only the malformed event is lost.

use heapless::Vec;

use crate::{
    event::EventTag,
    message::{DataTag, SYNC_TOKEN},
};

/// Parameter buffer capacity in bytes (largest event shape is 8 params).
const PARAM_CAPACITY: usize = 16;

/// Data buffer capacity in bytes (text results are clipped by the host to
/// fit the client's modest line buffers).
const DATA_CAPACITY: usize = 64;

/// One completely received event, still in wire terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedEvent {
    /// Event tag
    pub tag: EventTag,
    /// Fixed parameters
    pub params: Vec<u16, 8>,
    /// Data block payload (text results), empty otherwise
    pub data: Vec<u8, DATA_CAPACITY>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Waiting for a sync token
    AwaitSync,
    /// Sync seen, next byte is the event tag
    Tag,
    /// Collecting the two header length bytes
    LenLo,
    LenHi,
    /// Collecting parameter bytes
    Params,
    /// Expecting the data block sync token
    DataSync,
    /// Expecting the data tag byte
    DataTag,
    /// Collecting the two data length bytes
    DataLenLo,
    DataLenHi,
    /// Collecting data bytes
    Data,
}

/// Byte-at-a-time receiver for host events.
#[derive(Debug)]
pub struct EventReceiver {
    state: State,
    out_of_sync: bool,
    resyncs: u32,
    tag: Option<EventTag>,
    expected_param_bytes: usize,
    param_bytes: Vec<u8, PARAM_CAPACITY>,
    expected_data_bytes: usize,
    data: Vec<u8, DATA_CAPACITY>,
    len_lo: u8,
}

impl Default for EventReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl EventReceiver {
    /// Create a receiver waiting for the first sync token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::AwaitSync,
            out_of_sync: false,
            resyncs: 0,
            tag: None,
            expected_param_bytes: 0,
            param_bytes: Vec::new(),
            expected_data_bytes: 0,
            data: Vec::new(),
            len_lo: 0,
        }
    }

    /// True while the receiver is discarding bytes after corruption.
    #[must_use]
    pub fn is_out_of_sync(&self) -> bool {
        self.out_of_sync
    }

    /// Number of resynchronizations since creation.
    #[must_use]
    pub fn resync_count(&self) -> u32 {
        self.resyncs
    }

    /// Latch out of sync and start scanning for the next frame.
    fn lose_sync(&mut self) {
        self.out_of_sync = true;
        self.resyncs = self.resyncs.wrapping_add(1);
        self.state = State::AwaitSync;
        self.param_bytes.clear();
        self.data.clear();
        self.tag = None;
    }

    /// Feed one received byte; returns a complete event when one finishes.
    pub fn feed(&mut self, byte: u8) -> Option<ReceivedEvent> {
        match self.state {
            State::AwaitSync => {
                if byte == SYNC_TOKEN {
                    self.out_of_sync = false;
                    self.state = State::Tag;
                }
                None
            }
            State::Tag => {
                match EventTag::from_u8(byte) {
                    Some(tag) => {
                        self.tag = Some(tag);
                        self.expected_param_bytes = tag.param_count() * 2;
                        self.param_bytes.clear();
                        self.data.clear();
                        self.state = State::LenLo;
                    }
                    None => self.lose_sync(),
                }
                None
            }
            State::LenLo => {
                self.len_lo = byte;
                self.state = State::LenHi;
                None
            }
            State::LenHi => {
                let advertised = usize::from(u16::from_le_bytes([self.len_lo, byte]));
                if advertised != self.expected_param_bytes {
                    self.lose_sync();
                } else if advertised == 0 {
                    return self.finish_params();
                } else {
                    self.state = State::Params;
                }
                None
            }
            State::Params => {
                // capacity covers every fixed shape; a mismatch was already
                // rejected at the length check
                let _ = self.param_bytes.push(byte);
                if self.param_bytes.len() == self.expected_param_bytes {
                    return self.finish_params();
                }
                None
            }
            State::DataSync => {
                if byte == SYNC_TOKEN {
                    self.state = State::DataTag;
                } else {
                    self.lose_sync();
                }
                None
            }
            State::DataTag => {
                if byte == DataTag::Byte.to_u8() {
                    self.state = State::DataLenLo;
                } else {
                    self.lose_sync();
                }
                None
            }
            State::DataLenLo => {
                self.len_lo = byte;
                self.state = State::DataLenHi;
                None
            }
            State::DataLenHi => {
                let advertised = usize::from(u16::from_le_bytes([self.len_lo, byte]));
                if advertised > DATA_CAPACITY {
                    self.lose_sync();
                } else if advertised == 0 {
                    return self.emit();
                } else {
                    self.expected_data_bytes = advertised;
                    self.state = State::Data;
                }
                None
            }
            State::Data => {
                let _ = self.data.push(byte);
                if self.data.len() == self.expected_data_bytes {
                    return self.emit();
                }
                None
            }
        }
    }

    /// All parameter bytes collected; emit or continue into the data block.
    fn finish_params(&mut self) -> Option<ReceivedEvent> {
        let expects_data = self.tag.is_some_and(EventTag::expects_data);
        if expects_data {
            self.state = State::DataSync;
            None
        } else {
            self.emit()
        }
    }

    /// Assemble the completed event and reset for the next frame.
    fn emit(&mut self) -> Option<ReceivedEvent> {
        let tag = self.tag.take()?;
        let mut params: Vec<u16, 8> = Vec::new();
        for pair in self.param_bytes.chunks_exact(2) {
            let _ = params.push(u16::from_le_bytes([pair[0], pair[1]]));
        }
        let event = ReceivedEvent { tag, params, data: self.data.clone() };
        self.param_bytes.clear();
        self.data.clear();
        self.state = State::AwaitSync;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{HostEvent, TouchAction};

    fn feed_all(receiver: &mut EventReceiver, bytes: &[u8]) -> std::vec::Vec<ReceivedEvent> {
        bytes.iter().filter_map(|&b| receiver.feed(b)).collect()
    }

    fn wire_for(event: &HostEvent) -> std::vec::Vec<u8> {
        let mut wire = std::vec::Vec::new();
        event.encode(&mut wire).unwrap();
        wire
    }

    #[test]
    fn receives_touch_event() {
        let event = HostEvent::Touch { action: TouchAction::Down, x: 120, y: 80, pointer: 0 };
        let mut receiver = EventReceiver::new();

        let received = feed_all(&mut receiver, &wire_for(&event));
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].tag, EventTag::Touch(TouchAction::Down));
        assert_eq!(received[0].params.as_slice(), &[120, 80, 0]);
    }

    #[test]
    fn resyncs_after_garbage() {
        let event = HostEvent::Redraw { width: 320, height: 240 };
        let mut receiver = EventReceiver::new();

        // garbage that includes a stray sync token and a bogus tag
        assert!(feed_all(&mut receiver, &[0x42, SYNC_TOKEN, 0x7E, 0x00]).is_empty());
        assert!(receiver.is_out_of_sync());

        let received = feed_all(&mut receiver, &wire_for(&event));
        assert_eq!(received.len(), 1);
        assert!(!receiver.is_out_of_sync());
        assert!(receiver.resync_count() >= 1);
    }

    #[test]
    fn length_not_matching_tag_shape_is_rejected() {
        let mut receiver = EventReceiver::new();
        // Redraw advertises 6 parameter bytes instead of its fixed 4
        assert!(feed_all(&mut receiver, &[SYNC_TOKEN, 0x11, 0x06, 0x00]).is_empty());
        assert!(receiver.is_out_of_sync());
    }

    #[test]
    fn text_result_collects_its_data_block() {
        let event = HostEvent::TextResult { callback: 0x1234, text: b"ok".to_vec() };
        let mut receiver = EventReceiver::new();

        let received = feed_all(&mut receiver, &wire_for(&event));
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].data.as_slice(), b"ok");
    }

    #[test]
    fn callback_event_decodes_back_to_host_event() {
        let event = HostEvent::ButtonCallback { index: 2, callback: 0x0001_0400, value: 1 };
        let mut receiver = EventReceiver::new();

        let received = feed_all(&mut receiver, &wire_for(&event)).remove(0);
        let decoded =
            HostEvent::decode(received.tag, received.params.as_slice(), &received.data).unwrap();
        assert_eq!(decoded, event);
    }
}
