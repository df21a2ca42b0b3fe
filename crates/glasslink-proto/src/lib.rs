//! Wire grammar and codecs for the GlassLink remote display protocol.
//!
//! An embedded client (Arduino/ARM class) draws a minimal GUI on a host
//! screen over a serial byte stream. Both directions share one framing
//! grammar:
//!
//! ```text
//! SYNC_TOKEN(0xA5) OPCODE(1B) PARAM_BYTE_LEN(u16 LE) [u16 LE] x n
//! [ SYNC_TOKEN DATA_TAG(1B) DATA_BYTE_LEN(u16 LE) <raw bytes> ]
//! ```
//!
//! Values 0x01..=0x07 are reserved for data tags, so the byte after a sync
//! token is unambiguous: a data block continues the current message, any
//! other value starts the next one.
//!
//! This crate provides the pieces of that grammar and nothing above it:
//! - [`Message`]: a decoded client command (opcode, u16 params, data block)
//! - [`Decoder`]: the host-side pull decoder with sync-loss recovery
//! - [`EventReceiver`]: the embedded-side byte-at-a-time receiver, safe to
//!   drive from an interrupt handler (fixed buffers, no allocation, no
//!   logging)
//! - [`HostEvent`]: host-generated events and their outbound encoding
//! - [`color`]: RGB565 wire color to internal ARGB conversion
//!
//! Interpretation of messages (widgets, touch routing, timers) lives in
//! `glasslink-core`.

pub mod color;
pub mod decode;
pub mod encode;
pub mod errors;
pub mod event;
pub mod message;
pub mod opcode;
pub mod receiver;

pub use decode::{Decoder, PumpStatus};
pub use errors::ProtocolError;
pub use event::{EventTag, HostEvent, SensorKind, TouchAction};
pub use message::{DataBlock, DataTag, Message, MAX_DATA_LEN, MAX_PARAMS, SYNC_TOKEN};
pub use opcode::CommandClass;
pub use receiver::{EventReceiver, ReceivedEvent};
