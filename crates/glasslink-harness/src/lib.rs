//! Deterministic test support for GlassLink.
//!
//! Everything the session treats as a capability has a recording or
//! virtual-time implementation here, so protocol behavior can be tested
//! end to end without a display, a transport or real timers:
//!
//! - [`RecordingRenderer`] captures draw calls for assertions
//! - [`SimTimers`] is a virtual timer queue; tests advance it explicitly
//!   and feed due fires back into the session
//! - [`FixedClock`] is a frozen wall clock for time query results
//! - [`wire`] builds client command byte streams with the production
//!   encoder, so tests exercise the full decode path

pub mod clock;
pub mod recording;
pub mod wire;

pub use clock::{FixedClock, SimTimers};
pub use recording::{DrawOp, RecordingRenderer};
