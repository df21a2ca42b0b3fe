//! Host-side pull decoder.
//!
//! The transport hands over chunks whose boundaries have nothing to do with
//! message boundaries; the decoder accumulates them and surfaces complete
//! [`Message`]s on demand. Work per [`Decoder::pump`] call is bounded so a
//! render-loop caller can interleave decoding with presentation instead of
//! draining a large backlog in one pass.
//!
//! # Sync-loss recovery
//!
//! A frame whose header fails validation (no sync token, data-tag byte in
//! the opcode position, impossible length, missing data-block sync) is
//! abandoned: one byte is discarded and scanning restarts at the next sync
//! token. Only the malformed message is lost; the connection never needs to
//! be re-established. Discarded bytes are counted so the session can report
//! them.

use bytes::{Buf, BytesMut};

use crate::{
    message::{DataBlock, DataTag, Message, LAST_DATA_TAG, MAX_DATA_LEN, MAX_PARAMS, SYNC_TOKEN},
    opcode,
};

/// Result of one [`Decoder::pump`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// The pass budget was used up and buffered bytes remain; call again
    /// (after presenting) instead of blocking.
    MoreReady,
    /// A frame has started but its bytes have not all arrived. The caller
    /// should back off (bounded sleep / next transport notification) rather
    /// than spin, and escalate to a warning if no new bytes arrive for a
    /// stall threshold.
    WaitForMoreBytes,
    /// Nothing buffered; wait for the next transport notification.
    Nothing,
}

/// Outcome of a single frame-extraction attempt.
enum Step {
    Message(Message),
    NeedMore,
    Empty,
}

/// Accumulating message decoder with self-healing resynchronization.
#[derive(Debug, Default)]
pub struct Decoder {
    buf: BytesMut,
    skipped: u64,
}

impl Decoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk read from the transport.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Bytes currently buffered and not yet decoded.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Total bytes discarded during resynchronization since creation.
    ///
    /// The session polls this between passes and logs the delta; the decoder
    /// itself stays silent.
    #[must_use]
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped
    }

    /// Decode up to `budget` complete messages into `sink`.
    ///
    /// Decoding stops early when the buffer runs out of complete frames.
    /// The returned status tells the caller how to proceed; see
    /// [`PumpStatus`].
    pub fn pump(&mut self, budget: usize, mut sink: impl FnMut(Message)) -> PumpStatus {
        for _ in 0..budget.max(1) {
            match self.try_next() {
                Step::Message(message) => sink(message),
                Step::NeedMore => return PumpStatus::WaitForMoreBytes,
                Step::Empty => return PumpStatus::Nothing,
            }
        }
        if self.buf.is_empty() { PumpStatus::Nothing } else { PumpStatus::MoreReady }
    }

    /// Drop one leading byte as line noise and keep scanning.
    fn skip_one(&mut self) {
        self.buf.advance(1);
        self.skipped += 1;
    }

    /// Try to extract one complete message from the front of the buffer.
    fn try_next(&mut self) -> Step {
        loop {
            // scan to the next sync token
            while !self.buf.is_empty() && self.buf[0] != SYNC_TOKEN {
                self.skip_one();
            }
            if self.buf.is_empty() {
                return Step::Empty;
            }
            if self.buf.len() < 4 {
                return Step::NeedMore;
            }

            let opcode = self.buf[1];
            if opcode <= LAST_DATA_TAG {
                // data block with no preceding command, or corruption that
                // landed on a stray sync byte
                self.skip_one();
                continue;
            }

            let param_len = usize::from(u16::from_le_bytes([self.buf[2], self.buf[3]]));
            if param_len % 2 != 0 || param_len > MAX_PARAMS * 2 {
                self.skip_one();
                continue;
            }
            let params_end = 4 + param_len;
            if self.buf.len() < params_end {
                return Step::NeedMore;
            }

            if !opcode::expects_data(opcode) {
                let frame = self.buf.split_to(params_end);
                return Step::Message(Message::new(opcode, read_params(&frame[4..params_end])));
            }

            // variable-data opcode: the data block is part of the message
            if self.buf.len() < params_end + 4 {
                return Step::NeedMore;
            }
            if self.buf[params_end] != SYNC_TOKEN {
                self.skip_one();
                continue;
            }
            let Ok(tag) = DataTag::from_u8(self.buf[params_end + 1]) else {
                self.skip_one();
                continue;
            };
            let data_len =
                usize::from(u16::from_le_bytes([self.buf[params_end + 2], self.buf[params_end + 3]]));
            if data_len > MAX_DATA_LEN {
                self.skip_one();
                continue;
            }
            let total = params_end + 4 + data_len;
            if self.buf.len() < total {
                return Step::NeedMore;
            }

            let frame = self.buf.split_to(total);
            let params = read_params(&frame[4..params_end]);
            let data = frame.freeze().split_off(params_end + 4);
            return Step::Message(Message::with_data(opcode, params, DataBlock::new(tag, data)));
        }
    }
}

/// Reassemble little-endian u16 parameters. `raw` has even length by
/// construction (the header check rejects odd parameter lengths).
fn read_params(raw: &[u8]) -> Vec<u16> {
    raw.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode;

    fn wire_for(message: &Message) -> Vec<u8> {
        let mut wire = Vec::new();
        encode::write_message(message, &mut wire).unwrap();
        wire
    }

    fn collect(decoder: &mut Decoder, budget: usize) -> (Vec<Message>, PumpStatus) {
        let mut out = Vec::new();
        let status = decoder.pump(budget, |m| out.push(m));
        (out, status)
    }

    #[test]
    fn decodes_single_message() {
        let msg = Message::new(0x21, vec![0, 0, 100, 100, 0xF800]);
        let mut decoder = Decoder::new();
        decoder.extend(&wire_for(&msg));

        let (out, status) = collect(&mut decoder, 10);
        assert_eq!(out, vec![msg]);
        assert_eq!(status, PumpStatus::Nothing);
    }

    #[test]
    fn tolerates_arbitrary_chunk_boundaries() {
        let msg = Message::with_data(
            0x60,
            vec![10, 20, 11, 0, 0xFFFE],
            DataBlock::new(DataTag::Byte, b"hello".to_vec()),
        );
        let wire = wire_for(&msg);

        for split in 1..wire.len() {
            let mut decoder = Decoder::new();
            decoder.extend(&wire[..split]);
            let (out, status) = collect(&mut decoder, 10);
            if out.is_empty() {
                assert_eq!(status, PumpStatus::WaitForMoreBytes, "split at {split}");
            }
            decoder.extend(&wire[split..]);
            let (mut rest, _) = collect(&mut decoder, 10);
            let mut all = out;
            all.append(&mut rest);
            assert_eq!(all, vec![msg.clone()], "split at {split}");
        }
    }

    #[test]
    fn recovers_after_garbage_prefix() {
        let msg = Message::new(0x10, vec![0xFFFF]);
        let mut decoder = Decoder::new();
        decoder.extend(&[0x00, 0x13, 0x37, 0xA5, 0x01, 0xFF]); // noise incl. stray sync+tag
        decoder.extend(&wire_for(&msg));

        let (out, _) = collect(&mut decoder, 10);
        assert_eq!(out, vec![msg]);
        assert!(decoder.skipped_bytes() > 0);
    }

    #[test]
    fn budget_bounds_work_per_pass() {
        let msg = Message::new(0x7F, vec![]);
        let mut decoder = Decoder::new();
        for _ in 0..5 {
            decoder.extend(&wire_for(&msg));
        }

        let (out, status) = collect(&mut decoder, 2);
        assert_eq!(out.len(), 2);
        assert_eq!(status, PumpStatus::MoreReady);

        let (out, status) = collect(&mut decoder, 10);
        assert_eq!(out.len(), 3);
        assert_eq!(status, PumpStatus::Nothing);
    }

    #[test]
    fn insane_param_length_resyncs_instead_of_allocating() {
        let mut decoder = Decoder::new();
        decoder.extend(&[SYNC_TOKEN, 0x21, 0xFF, 0xFF]); // 65535-byte params
        let msg = Message::new(0x11, vec![]);
        decoder.extend(&wire_for(&msg));

        let (out, _) = collect(&mut decoder, 10);
        assert_eq!(out, vec![msg]);
    }

    #[test]
    fn variable_data_opcode_waits_for_its_block() {
        let msg = Message::with_data(
            0x68,
            vec![0x07E0, 2],
            DataBlock::new(DataTag::Int, vec![0u8; 16]),
        );
        let wire = wire_for(&msg);
        let mut decoder = Decoder::new();
        // everything except the last data byte
        decoder.extend(&wire[..wire.len() - 1]);

        let (out, status) = collect(&mut decoder, 10);
        assert!(out.is_empty());
        assert_eq!(status, PumpStatus::WaitForMoreBytes);

        decoder.extend(&wire[wire.len() - 1..]);
        let (out, _) = collect(&mut decoder, 10);
        assert_eq!(out, vec![msg]);
    }
}
