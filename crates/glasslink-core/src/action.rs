//! Session side-effects and intents.
//!
//! The session is a state machine: it consumes messages, pointer input and
//! timer fires, and produces `SessionAction` instructions for the runtime
//! to execute. Drawing and timers go through their own capabilities
//! ([`crate::Renderer`], [`crate::Timer`]); everything else the host must
//! do on the session's behalf is an action.

use glasslink_proto::{HostEvent, SensorKind};

/// Actions produced by the display session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Encode this event and write it to the transport.
    Emit(HostEvent),

    /// Present the canvas (the client asked for a frame, or widget state
    /// changed visibly).
    Invalidate,

    /// Open the host options menu (out-of-canvas tap, edge swipe).
    OpenMenu,

    /// Play a tone.
    PlayTone {
        /// Host tone index
        index: u8,
        /// Duration in ms; -1 plays until the tone ends on its own
        duration_millis: i32,
        /// Absolute volume 0..=100, or `None` for the system volume
        volume: Option<u16>,
    },

    /// Show a number or text input dialog; the runtime answers with a
    /// `NumberResult`/`TextResult` event when the user confirms, or nothing
    /// on cancel.
    RequestInput {
        /// Which dialog to show
        kind: InputKind,
        /// Callback token to echo in the result event
        callback: u32,
        /// Prompt text, possibly empty
        prompt: String,
        /// Value to prefill (number dialogs only)
        initial: Option<f32>,
    },

    /// Lock or unlock the screen orientation.
    SetOrientationLock(OrientationLock),

    /// Enable or disable one host sensor.
    SetSensor {
        /// Which sensor
        kind: SensorKind,
        /// Enable or disable
        enable: bool,
        /// Requested update rate (platform units, echoed verbatim)
        rate: u16,
        /// Averaging filter selector
        filter: u16,
    },

    /// Disable every sensor (session reset).
    DisableSensors,

    /// Surface a client debug string to the user.
    ShowDebug(String),
}

/// Which input dialog [`SessionAction::RequestInput`] asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Numeric entry, result is a `NumberResult` event
    Number,
    /// Text entry, result is a `TextResult` event
    Text,
}

/// Orientation lock requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationLock {
    /// Lock to landscape
    Landscape,
    /// Lock to portrait
    Portrait,
    /// Lock to the orientation currently shown
    Current,
    /// Release any lock
    Unlock,
}
