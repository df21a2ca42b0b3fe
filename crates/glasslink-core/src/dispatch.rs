//! Global and miscellaneous command handlers (opcode range 0x08..=0x0F).
//!
//! These commands configure the session (flags, canvas size, character
//! mapping, timeouts) or query the host (canvas size, time, user input).
//! Queries answer through outbound events; host-side effects that this
//! crate cannot perform (orientation, sensors, tones, dialogs) become
//! [`SessionAction`]s.

use glasslink_proto::{
    opcode::{cmd, global, info as info_sub},
    HostEvent, Message, SensorKind,
};
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    action::{InputKind, OrientationLock},
    error::{DispatchError, DispatchResult},
    session::{DisplaySession, DEFAULT_BEEP_TONE, MAX_TONE_INDEX},
    timer::{Timer, WallClock},
    SessionAction,
};

impl DisplaySession {
    /// Route one global-range command.
    pub(crate) fn handle_global(
        &mut self,
        message: &Message,
        timers: &mut dyn Timer,
        clock: &dyn WallClock,
        actions: &mut Vec<SessionAction>,
    ) -> DispatchResult {
        match message.opcode {
            cmd::GLOBAL_SETTINGS => self.global_settings(message, timers, actions),
            cmd::REQUEST_MAX_CANVAS_SIZE => {
                info!(
                    width = self.view_width,
                    height = self.view_height,
                    "requested max canvas size"
                );
                actions.push(SessionAction::Emit(HostEvent::CanvasSize {
                    width: self.view_width,
                    height: self.view_height,
                    timestamp: clock.now().unix_seconds,
                }));
                Ok(())
            }
            cmd::SENSOR_SETTINGS => {
                let raw_kind = message.param(0)?;
                let enable = message.param(1)? != 0;
                let rate = message.param(2)?;
                let filter = if message.param_count() == 4 { message.param(3)? } else { 0 };
                match SensorKind::from_u8(raw_kind as u8) {
                    Some(kind) => {
                        actions.push(SessionAction::SetSensor { kind, enable, rate, filter });
                        Ok(())
                    }
                    None => {
                        warn!(kind = raw_kind, "unsupported sensor requested");
                        Ok(())
                    }
                }
            }
            cmd::GET_NUMBER => self.request_input(message, InputKind::Number, actions),
            cmd::GET_TEXT => self.request_input(message, InputKind::Text, actions),
            cmd::GET_INFO => self.get_info(message, clock, actions),
            cmd::PLAY_TONE => self.play_tone(message, actions),
            other => Err(DispatchError::UnknownOpcode { opcode: other }),
        }
    }

    /// GLOBAL_SETTINGS subcommands.
    fn global_settings(
        &mut self,
        message: &Message,
        timers: &mut dyn Timer,
        actions: &mut Vec<SessionAction>,
    ) -> DispatchResult {
        let subcommand = message.param(0)?;
        match subcommand {
            global::SET_FLAGS_AND_SIZE => {
                let flags = message.param(1)?;
                let width = message.param(2)?;
                let height = message.param(3)?;
                if width < 10 || height < 10 {
                    warn!(width, height, "canvas size too small, ignoring");
                    return Ok(());
                }
                info!(flags = format_args!("{flags:#04x}"), width, height, "set flags and size");
                self.requested_width = width;
                self.requested_height = height;
                self.update_max_scale();
                self.set_flags(flags, timers, actions);
                Ok(())
            }
            global::SET_CODEPAGE => {
                let page = message.param(1)?;
                // ISO-8859-1 maps the high half onto itself; other pages
                // need explicit per-character mappings
                if page == 1 {
                    info!("codepage ISO-8859-1");
                } else {
                    warn!(page, "unsupported codepage, falling back to per-character mapping");
                }
                Ok(())
            }
            global::SET_CHARACTER_MAPPING => {
                let code = message.param(1)?;
                let target = message.param(2)?;
                if !(0x80..=0xFF).contains(&code) {
                    return Err(DispatchError::InvalidParameter {
                        reason: "character mapping index must be 0x80..=0xFF",
                    });
                }
                let Some(mapped) = char::from_u32(u32::from(target)) else {
                    return Err(DispatchError::InvalidParameter {
                        reason: "character mapping target is not a char",
                    });
                };
                info!(
                    code = format_args!("{code:#04x}"),
                    target = format_args!("{target:#06x}"),
                    "set character mapping"
                );
                self.char_map[usize::from(code - 0x80)] = mapped;
                Ok(())
            }
            global::SET_LONG_TOUCH_DOWN_TIMEOUT => {
                let millis = message.param(1)?;
                if millis == 0 {
                    self.long_touch_enabled = false;
                } else {
                    self.long_touch_timeout = Duration::from_millis(u64::from(millis));
                    self.long_touch_enabled = true;
                }
                info!(millis, enabled = self.long_touch_enabled, "long touch timeout");
                Ok(())
            }
            global::SET_SCREEN_ORIENTATION_LOCK => {
                let lock = match message.param(1)? {
                    global::orientation::LANDSCAPE => OrientationLock::Landscape,
                    global::orientation::PORTRAIT => OrientationLock::Portrait,
                    global::orientation::CURRENT => OrientationLock::Current,
                    global::orientation::UNLOCK => OrientationLock::Unlock,
                    unknown => {
                        warn!(value = unknown, "unknown orientation lock value");
                        return Ok(());
                    }
                };
                info!(?lock, "orientation lock");
                actions.push(SessionAction::SetOrientationLock(lock));
                Ok(())
            }
            unknown => Err(DispatchError::UnknownSubcommand { subcommand: unknown }),
        }
    }

    /// Apply the SET_FLAGS_AND_SIZE flag word.
    fn set_flags(&mut self, flags: u16, timers: &mut dyn Timer, actions: &mut Vec<SessionAction>) {
        use global::flags as f;

        let was_reset = flags & f::RESET_ALL != 0;
        if was_reset {
            self.reset_all(timers, actions);
        }
        self.touch_basic_enable = flags & f::TOUCH_BASIC_DISABLE == 0;
        self.touch_move_enable = flags & f::TOUCH_MOVE_DISABLE == 0;
        self.long_touch_enabled = flags & f::LONG_TOUCH_ENABLE != 0;

        // force a canvas rebuild even if the factor comes out the same
        self.scale = -1.0;
        if flags & f::USE_MAX_SIZE != 0 {
            self.use_max_size = true;
            self.set_scale_factor(10.0, false, actions);
        } else {
            self.use_max_size = false;
            self.set_scale_factor(1.0, false, actions);
        }
        info!(
            after_reset = was_reset,
            touch_move = self.touch_move_enable,
            long_touch = self.long_touch_enabled,
            use_max_size = self.use_max_size,
            "flags applied"
        );
    }

    /// GET_NUMBER / GET_TEXT, with and without prompt data.
    ///
    /// Arity selects the callback width: 2 or 4 parameters mean a 32-bit
    /// callback; 3 or 4 append an f32 initial value.
    pub(crate) fn request_input(
        &mut self,
        message: &Message,
        kind: InputKind,
        actions: &mut Vec<SessionAction>,
    ) -> DispatchResult {
        let count = message.param_count();
        let (callback, value_index) = if count == 2 || count == 4 {
            (message.param_u32(0)?, 2)
        } else {
            (u32::from(message.param(0)?), 1)
        };
        let initial = if count > 2 { Some(message.param_f32(value_index)?) } else { None };
        let prompt = self.convert_text(message.data_bytes());

        info!(
            ?kind,
            callback = format_args!("{callback:#x}"),
            prompt = %prompt,
            ?initial,
            "input requested"
        );
        actions.push(SessionAction::RequestInput { kind, callback, prompt, initial });
        Ok(())
    }

    /// GET_INFO time subfunctions, answered immediately.
    fn get_info(
        &mut self,
        message: &Message,
        clock: &dyn WallClock,
        actions: &mut Vec<SessionAction>,
    ) -> DispatchResult {
        let subfunction = message.param(0)?;
        let callback = if message.param_count() == 3 {
            message.param_u32(1)?
        } else {
            u32::from(message.param(1)?)
        };

        match subfunction {
            info_sub::LOCAL_TIME | info_sub::UTC_TIME => {
                let now = clock.now();
                let mut timestamp = i64::from(now.unix_seconds);
                if subfunction == info_sub::LOCAL_TIME {
                    timestamp += i64::from(now.utc_offset_millis) / 1000;
                }
                info!(
                    subfunction,
                    callback = format_args!("{callback:#x}"),
                    "time info requested"
                );
                actions.push(SessionAction::Emit(HostEvent::InfoResult {
                    subfunction,
                    callback,
                    uses_daylight_time: now.uses_daylight_time,
                    utc_offset_millis: now.utc_offset_millis,
                    timestamp: timestamp.max(0) as u32,
                }));
                Ok(())
            }
            unknown => Err(DispatchError::UnknownSubcommand { subcommand: unknown }),
        }
    }

    /// PLAY_TONE with its optional duration and volume parameters.
    fn play_tone(&mut self, message: &Message, actions: &mut Vec<SessionAction>) -> DispatchResult {
        let mut index = DEFAULT_BEEP_TONE;
        let mut duration_millis = -1;
        let mut volume = None;

        if message.param_count() > 0 {
            let requested = message.param(0)?;
            if (1..MAX_TONE_INDEX).contains(&requested) {
                index = requested as u8;
            }
            if message.param_count() > 1 {
                duration_millis = i32::from(message.param_i16(1)?);
                // only -1 means "until the tone ends"; other negative values
                // are unsigned durations from 16-bit clients
                if duration_millis < -1 {
                    duration_millis += 0x10000;
                }
                if message.param_count() > 2 {
                    volume = Some(message.param(2)?);
                }
            }
        }
        info!(index, duration_millis, "play tone");
        actions.push(SessionAction::PlayTone { index, duration_millis, volume });
        Ok(())
    }
}
