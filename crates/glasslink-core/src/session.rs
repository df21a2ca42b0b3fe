//! The display session.
//!
//! One owned [`DisplaySession`] per connection holds everything the
//! protocol calls global: the widget store, session flags, scale factor,
//! pointer slots, the single autorepeat chain and the print-emulation
//! cursor. The protocol has no multi-session concept, so there are no
//! statics and no locks; exactly one processing context touches a session.
//!
//! The session is driven from three entry points, all returning
//! [`SessionAction`]s for the runtime to execute:
//! - [`DisplaySession::pump`] / [`DisplaySession::process_message`] for
//!   decoded client commands,
//! - [`DisplaySession::handle_pointer`] for raw pointer input,
//! - [`DisplaySession::handle_timer`] for timer fires, which re-enter the
//!   processing context instead of mutating state from a timer thread.

use std::time::Duration;

use glasslink_proto::{
    color, CommandClass, Decoder, HostEvent, Message, PumpStatus,
};
use tracing::{debug, error, trace, warn};

use crate::{
    error::{DispatchError, DispatchResult},
    timer::{Timer, TimerId, WallClock},
    widgets::{Button, Slider, WidgetStore},
    Renderer, SessionAction,
};

/// Pointer slots tracked concurrently (matches common touch hardware).
pub const MAX_POINTERS: usize = 5;

/// Chart trace slots addressable by the chart commands.
pub(crate) const CHART_SLOTS: usize = 4;

/// Default host tone index for touch feedback.
pub(crate) const DEFAULT_BEEP_TONE: u8 = 89;

/// Highest valid host tone index.
pub(crate) const MAX_TONE_INDEX: u16 = 98;

/// Session construction parameters.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Physical view width available for the canvas
    pub view_width: u16,
    /// Physical view height available for the canvas
    pub view_height: u16,
    /// Initial logical canvas width (clients normally set their own)
    pub canvas_width: u16,
    /// Initial logical canvas height
    pub canvas_height: u16,
    /// Long-touch recognition delay until a client configures one
    pub long_touch_timeout: Duration,
    /// Messages decoded per pump pass; bounds per-frame latency
    pub pump_budget: usize,
    /// Consecutive stalled passes before escalating to an error log
    pub stall_warn_passes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            view_width: 640,
            view_height: 480,
            canvas_width: 320,
            canvas_height: 240,
            long_touch_timeout: Duration::from_millis(800),
            pump_budget: 32,
            stall_warn_passes: 5,
        }
    }
}

/// Touch tone configuration shared by all beeping buttons.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BeepSettings {
    pub(crate) index: u8,
    pub(crate) duration_millis: i32,
    pub(crate) volume: Option<u16>,
}

impl Default for BeepSettings {
    fn default() -> Self {
        Self { index: DEFAULT_BEEP_TONE, duration_millis: -1, volume: None }
    }
}

/// Print-emulation state (WRITE_STRING and friends).
#[derive(Debug, Clone, Copy)]
pub(crate) struct PrintState {
    pub(crate) size: u16,
    pub(crate) color: u32,
    pub(crate) background: u32,
    pub(crate) clear_on_wrap: bool,
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl Default for PrintState {
    fn default() -> Self {
        Self {
            size: 12,
            color: 0xFF88_8888,
            background: color::BLACK,
            clear_on_wrap: true,
            x: 0,
            y: 0,
        }
    }
}

/// Text style remembered between DRAW_STRING commands so short-arity
/// follow-ups can reuse it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LastTextStyle {
    pub(crate) size: u16,
    pub(crate) color: u16,
    pub(crate) background: u16,
}

impl Default for LastTextStyle {
    fn default() -> Self {
        Self { size: 12, color: 0x0000, background: color::NO_BACKGROUND }
    }
}

/// Per-pointer gesture state.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PointerState {
    pub(crate) active: bool,
    pub(crate) down_x: f32,
    pub(crate) down_y: f32,
    pub(crate) last_x: f32,
    pub(crate) last_y: f32,
    /// Button the gesture started on
    pub(crate) on_button: Option<usize>,
    /// Slider that captured the gesture on touch down
    pub(crate) on_slider: Option<usize>,
    /// A down-triggered button already fired; ignore until up
    pub(crate) suppress_until_up: bool,
    /// A swipe was emitted for this gesture; suppress the up event
    pub(crate) swipe_consumed: bool,
    /// Last coordinates sent in a move event, for zero-move suppression
    pub(crate) last_sent_move: Option<(i32, i32)>,
}

/// Phase of the single global autorepeat chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AutorepeatPhase {
    Idle,
    FirstPeriod { remaining: u16 },
    SecondPeriod,
}

/// The one autorepeat chain; only one button repeats at a time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AutorepeatState {
    pub(crate) phase: AutorepeatPhase,
    pub(crate) owner: usize,
}

impl Default for AutorepeatState {
    fn default() -> Self {
        Self { phase: AutorepeatPhase::Idle, owner: 0 }
    }
}

/// Owned per-connection interpreter state.
#[derive(Debug)]
pub struct DisplaySession {
    pub(crate) config: SessionConfig,
    /// Logical canvas size requested by the client
    pub(crate) requested_width: u16,
    pub(crate) requested_height: u16,
    /// Physical view size
    pub(crate) view_width: u16,
    pub(crate) view_height: u16,
    pub(crate) scale: f32,
    pub(crate) max_scale: f32,
    pub(crate) use_max_size: bool,
    pub(crate) touch_scale: f32,
    pub(crate) touch_basic_enable: bool,
    pub(crate) touch_move_enable: bool,
    pub(crate) long_touch_enabled: bool,
    pub(crate) long_touch_timeout: Duration,
    pub(crate) use_up_events_for_buttons: bool,
    /// Suppress the next button-up once (mode switch mid-gesture, or a
    /// long-touch fire that already was the semantic action)
    pub(crate) disable_button_up_once: bool,
    pub(crate) long_touch_pending: bool,
    pub(crate) long_touch_fired: bool,
    pub(crate) long_touch_pointer: usize,
    pub(crate) pointers: [PointerState; MAX_POINTERS],
    /// Distance between the first two pointers at the last pinch step
    pub(crate) pinch_distance: Option<f32>,
    pub(crate) store: WidgetStore,
    pub(crate) autorepeat: AutorepeatState,
    pub(crate) beep: BeepSettings,
    /// Mapping of character codes 0x80..=0xFF
    pub(crate) char_map: [char; 128],
    pub(crate) print: PrintState,
    pub(crate) last_text: LastTextStyle,
    pub(crate) charts: [Vec<(i32, i32)>; CHART_SLOTS],
    skipped_seen: u64,
    stall_passes: u32,
    last_buffered: usize,
}

/// Identity mapping for the high half of the character table.
fn default_char_map() -> [char; 128] {
    let mut map = ['\0'; 128];
    for (i, slot) in map.iter_mut().enumerate() {
        if let Some(c) = char::from_u32(0x80 + i as u32) {
            *slot = c;
        }
    }
    map
}

impl DisplaySession {
    /// Create a session for one connection.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let mut session = Self {
            requested_width: config.canvas_width,
            requested_height: config.canvas_height,
            view_width: config.view_width,
            view_height: config.view_height,
            scale: 1.0,
            max_scale: 1.0,
            use_max_size: true,
            touch_scale: 1.0,
            touch_basic_enable: true,
            touch_move_enable: true,
            long_touch_enabled: false,
            long_touch_timeout: config.long_touch_timeout,
            use_up_events_for_buttons: false,
            disable_button_up_once: false,
            long_touch_pending: false,
            long_touch_fired: false,
            long_touch_pointer: 0,
            pointers: [PointerState::default(); MAX_POINTERS],
            pinch_distance: None,
            store: WidgetStore::new(),
            autorepeat: AutorepeatState::default(),
            beep: BeepSettings::default(),
            char_map: default_char_map(),
            print: PrintState::default(),
            last_text: LastTextStyle::default(),
            charts: std::array::from_fn(|_| Vec::new()),
            skipped_seen: 0,
            stall_passes: 0,
            last_buffered: 0,
            config,
        };
        session.update_max_scale();
        session
    }

    /// Current scale factor from logical to physical coordinates.
    #[must_use]
    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    /// Logical canvas size requested by the client.
    #[must_use]
    pub fn requested_canvas_size(&self) -> (u16, u16) {
        (self.requested_width, self.requested_height)
    }

    /// Physical canvas size currently drawn (requested x scale).
    #[must_use]
    pub fn current_canvas_size(&self) -> (u16, u16) {
        (
            (f32::from(self.requested_width) * self.scale) as u16,
            (f32::from(self.requested_height) * self.scale) as u16,
        )
    }

    /// Button at `index`, if created.
    #[must_use]
    pub fn button(&self, index: usize) -> Option<&Button> {
        self.store.buttons.get(index)
    }

    /// Slider at `index`, if created.
    #[must_use]
    pub fn slider(&self, index: usize) -> Option<&Slider> {
        self.store.sliders.get(index)
    }

    /// Number of buttons ever created (reset only by RESET_ALL).
    #[must_use]
    pub fn button_count(&self) -> usize {
        self.store.buttons.len()
    }

    pub(crate) fn update_max_scale(&mut self) {
        let height_factor = f32::from(self.view_height) / f32::from(self.requested_height);
        let width_factor = f32::from(self.view_width) / f32::from(self.requested_width);
        self.max_scale = height_factor.min(width_factor);
        debug!(max_scale = self.max_scale, "max scale factor");
    }

    /// Clamp and apply a new scale factor.
    ///
    /// Returns true when the canvas size changed. A change invalidates the
    /// canvas and, when `send_to_client` is set, notifies the client with a
    /// redraw event (the client repaints into the new geometry).
    pub(crate) fn set_scale_factor(
        &mut self,
        factor: f32,
        send_to_client: bool,
        actions: &mut Vec<SessionAction>,
    ) -> bool {
        let old = self.scale;
        self.scale = if self.use_max_size {
            self.max_scale
        } else if factor <= 1.0 {
            1.0
        } else {
            factor.min(self.max_scale)
        };

        if (old - self.scale).abs() > f32::EPSILON {
            self.touch_scale = self.scale;
            debug!(requested = factor, resulting = self.scale, "scale factor changed");
            actions.push(SessionAction::Invalidate);
            if send_to_client {
                let (width, height) = self.current_canvas_size();
                actions.push(SessionAction::Emit(HostEvent::Redraw { width, height }));
            }
            true
        } else {
            debug!(requested = factor, resulting = self.scale, "scale factor unchanged");
            false
        }
    }

    /// The view was resized or rotated. Reports the new maximum to the
    /// client; the client answers with its own redraw sequence.
    pub fn view_resized(
        &mut self,
        width: u16,
        height: u16,
        clock: &dyn WallClock,
    ) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        self.view_width = width;
        self.view_height = height;
        self.update_max_scale();
        actions.push(SessionAction::Emit(HostEvent::Reorientation {
            width,
            height,
            timestamp: clock.now().unix_seconds,
        }));
        let factor = self.scale;
        self.set_scale_factor(factor, false, &mut actions);
        actions
    }

    /// Reset session flags to their power-on state.
    pub(crate) fn reset_flags(&mut self) {
        self.use_max_size = true;
        self.touch_basic_enable = true;
        self.touch_move_enable = true;
        self.long_touch_enabled = false;
        self.use_up_events_for_buttons = false;
    }

    /// RESET_ALL: destroy the widget stores and global toggles. The only
    /// operation that frees widget handles for reuse.
    pub(crate) fn reset_all(&mut self, timers: &mut dyn Timer, actions: &mut Vec<SessionAction>) {
        self.store.clear();
        self.beep = BeepSettings::default();
        self.char_map = default_char_map();
        self.reset_flags();
        self.autorepeat = AutorepeatState::default();
        self.long_touch_pending = false;
        self.long_touch_fired = false;
        timers.cancel(TimerId::Autorepeat);
        timers.cancel(TimerId::LongTouch);
        for chart in &mut self.charts {
            chart.clear();
        }
        actions.push(SessionAction::DisableSensors);
        debug!("reset all");
    }

    /// Map one client character code through the session character table.
    pub(crate) fn convert_char(&self, byte: u8) -> char {
        if byte < 0x80 {
            char::from(byte)
        } else {
            self.char_map[usize::from(byte - 0x80)]
        }
    }

    /// Decode client text bytes through the character table.
    #[must_use]
    pub(crate) fn convert_text(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| self.convert_char(b)).collect()
    }

    /// Decode and process up to one pass worth of messages.
    ///
    /// Returns the decoder status so the runtime can re-trigger itself on
    /// [`PumpStatus::MoreReady`] or back off on
    /// [`PumpStatus::WaitForMoreBytes`]. A decode stall (waiting passes
    /// without new bytes) escalates to an error log once.
    pub fn pump(
        &mut self,
        decoder: &mut Decoder,
        gfx: &mut dyn Renderer,
        timers: &mut dyn Timer,
        clock: &dyn WallClock,
    ) -> (PumpStatus, Vec<SessionAction>) {
        let mut messages = Vec::new();
        let status = decoder.pump(self.config.pump_budget, |message| messages.push(message));

        let mut actions = Vec::new();
        let processed = messages.len();
        for message in &messages {
            actions.extend(self.process_message(message, gfx, timers, clock));
        }

        let skipped = decoder.skipped_bytes();
        if skipped > self.skipped_seen {
            warn!(dropped = skipped - self.skipped_seen, "discarded bytes while resynchronizing");
            self.skipped_seen = skipped;
        }

        if status == PumpStatus::WaitForMoreBytes
            && processed == 0
            && decoder.buffered() == self.last_buffered
        {
            self.stall_passes += 1;
            if self.stall_passes == self.config.stall_warn_passes {
                error!(
                    buffered = decoder.buffered(),
                    passes = self.stall_passes,
                    "no new bytes for a partially received message"
                );
            }
        } else {
            self.stall_passes = 0;
        }
        self.last_buffered = decoder.buffered();

        (status, actions)
    }

    /// Interpret one message.
    ///
    /// This is the dispatch boundary: a failing handler is logged with its
    /// opcode and length context and the stream continues with the next
    /// message. One bad command never halts the interpreter.
    pub fn process_message(
        &mut self,
        message: &Message,
        gfx: &mut dyn Renderer,
        timers: &mut dyn Timer,
        clock: &dyn WallClock,
    ) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        trace!(
            opcode = format_args!("{:#04x}", message.opcode),
            params = message.param_count(),
            data_len = message.data_bytes().len(),
            "command"
        );

        let result: DispatchResult = match CommandClass::of(message.opcode) {
            Some(CommandClass::Global) => self.handle_global(message, timers, clock, &mut actions),
            Some(CommandClass::Display | CommandClass::DisplayWithData) => {
                self.handle_display(message, gfx, &mut actions)
            }
            Some(CommandClass::Button | CommandClass::ButtonWithData) => {
                self.handle_button_command(message, gfx)
            }
            Some(CommandClass::Slider | CommandClass::SliderWithData) => {
                self.handle_slider_command(message, gfx)
            }
            Some(CommandClass::Nop) => {
                debug!(
                    params = message.param_count(),
                    data_len = message.data_bytes().len(),
                    "NOP received"
                );
                Ok(())
            }
            None => Err(DispatchError::UnknownOpcode { opcode: message.opcode }),
        };

        if let Err(dispatch_error) = result {
            error!(
                opcode = format_args!("{:#04x}", message.opcode),
                params = message.param_count(),
                data_len = message.data_bytes().len(),
                error = %dispatch_error,
                "command failed, continuing with next message"
            );
        }
        actions
    }

    /// A scheduled timer fired. Runs in the single processing context; the
    /// runtime calls this from its loop, never from the timer thread.
    pub fn handle_timer(&mut self, id: TimerId, timers: &mut dyn Timer) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        match id {
            TimerId::LongTouch => self.handle_long_touch_fire(&mut actions),
            TimerId::Autorepeat => self.handle_autorepeat_fire(timers, &mut actions),
        }
        actions
    }

    /// Long-touch delay elapsed with no disqualifying move: the fire itself
    /// is the semantic action, so the coming button-up must be ignored.
    fn handle_long_touch_fire(&mut self, actions: &mut Vec<SessionAction>) {
        if !self.long_touch_pending {
            return;
        }
        self.long_touch_pending = false;
        self.long_touch_fired = true;
        self.disable_button_up_once = true;
        let pointer = &self.pointers[self.long_touch_pointer];
        actions.push(SessionAction::Emit(HostEvent::LongTouchDown {
            x: self.to_logical(pointer.down_x).max(0) as u16,
            y: self.to_logical(pointer.down_y).max(0) as u16,
        }));
    }

    /// Raw (physical) to logical coordinate conversion.
    pub(crate) fn to_logical(&self, raw: f32) -> i32 {
        (raw / self.scale + 0.5) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_uses_max_scale() {
        let session = DisplaySession::new(SessionConfig::default());
        // 640/320 = 2.0, 480/240 = 2.0
        assert!((session.max_scale - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn current_canvas_follows_scale() {
        let mut session = DisplaySession::new(SessionConfig::default());
        let mut actions = Vec::new();
        session.use_max_size = false;
        session.scale = 1.0;
        assert!(session.set_scale_factor(2.0, true, &mut actions));
        assert_eq!(session.current_canvas_size(), (640, 480));
        assert!(actions
            .iter()
            .any(|a| matches!(a, SessionAction::Emit(HostEvent::Redraw { width: 640, height: 480 }))));
    }

    #[test]
    fn scale_clamps_to_max() {
        let mut session = DisplaySession::new(SessionConfig::default());
        session.use_max_size = false;
        let mut actions = Vec::new();
        session.set_scale_factor(99.0, false, &mut actions);
        assert!((session.scale - session.max_scale).abs() < f32::EPSILON);
    }

    #[test]
    fn char_map_defaults_to_identity() {
        let session = DisplaySession::new(SessionConfig::default());
        assert_eq!(session.convert_char(b'A'), 'A');
        assert_eq!(session.convert_char(0x80), '\u{80}');
        assert_eq!(session.convert_char(0xFF), '\u{FF}');
    }
}
