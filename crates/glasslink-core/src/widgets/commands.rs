//! Button and slider command handling and touch entry points.
//!
//! Addressed commands resolve their widget first: the index must name an
//! existing widget except for INIT, which creates (replace-at-index when
//! the slot exists, append otherwise). Violations are logged and ignored
//! at the dispatch boundary; they never fail the stream.

use std::time::Duration;

use glasslink_proto::{
    color, opcode,
    HostEvent, Message,
};
use tracing::{debug, info, warn};

use crate::{
    error::{DispatchError, DispatchResult},
    session::{AutorepeatPhase, AutorepeatState, DisplaySession, MAX_TONE_INDEX},
    timer::{Timer, TimerId},
    widgets::{AutorepeatTiming, Button, ButtonFlags, Slider, SliderFlags},
    Renderer, SessionAction,
};

impl DisplaySession {
    /// Route one button-range command.
    pub(crate) fn handle_button_command(
        &mut self,
        message: &Message,
        gfx: &mut dyn Renderer,
    ) -> DispatchResult {
        use opcode::button as op;

        match message.opcode {
            op::ACTIVATE_ALL => {
                debug!("activate all buttons");
                self.store.set_all_buttons_active(true);
                Ok(())
            }
            op::DEACTIVATE_ALL => {
                debug!("deactivate all buttons");
                self.store.set_all_buttons_active(false);
                Ok(())
            }
            op::GLOBAL_SETTINGS => self.button_global_settings(message),
            op::INIT => self.button_init(message),
            _ => {
                let index = usize::from(message.param(0)?);
                match message.opcode {
                    op::DRAW => {
                        self.store.button_mut(index)?.draw(gfx);
                        Ok(())
                    }
                    op::DRAW_CAPTION => {
                        self.store.button_mut(index)?.draw_caption(gfx);
                        Ok(())
                    }
                    op::REMOVE => {
                        let background = color::rgb565_to_argb(message.param(1)?);
                        self.store.button_mut(index)?.remove(background, gfx);
                        Ok(())
                    }
                    op::SET_CAPTION | op::SET_CAPTION_AND_DRAW => {
                        let caption = self.convert_text(message.data_bytes());
                        let button = self.store.button_mut(index)?;
                        button.set_caption(caption);
                        info!(caption = %button.escaped_caption(), index, "set caption");
                        if message.opcode == op::SET_CAPTION_AND_DRAW {
                            button.draw(gfx);
                        }
                        Ok(())
                    }
                    op::SET_CAPTION_FOR_VALUE_TRUE => {
                        let caption = self.convert_text(message.data_bytes());
                        self.store.button_mut(index)?.set_caption_for_value_true(caption);
                        Ok(())
                    }
                    op::SETTINGS => self.button_settings(index, message, gfx),
                    other => Err(DispatchError::UnknownOpcode { opcode: other }),
                }
            }
        }
    }

    /// BUTTON_GLOBAL_SETTINGS: trigger mode and beep tone.
    fn button_global_settings(&mut self, message: &Message) -> DispatchResult {
        use opcode::button::{GLOBAL_FLAG_SET_BEEP_TONE, GLOBAL_FLAG_USE_UP_EVENTS};

        let flags = message.param(0)?;
        if flags & GLOBAL_FLAG_USE_UP_EVENTS != 0 {
            if self.pointers[0].active && !self.use_up_events_for_buttons {
                // mode switched while a button is held; its release must not
                // double-fire
                self.disable_button_up_once = true;
            }
            self.use_up_events_for_buttons = true;
        } else {
            self.use_up_events_for_buttons = false;
        }

        if flags & GLOBAL_FLAG_SET_BEEP_TONE != 0 && message.param_count() > 1 {
            if message.param_count() > 2 {
                self.beep.duration_millis = i32::from(message.param_i16(2)?);
                self.beep.volume =
                    if message.param_count() > 3 { Some(message.param(3)?) } else { None };
            }
            let tone = message.param(1)?;
            if (1..MAX_TONE_INDEX).contains(&tone) {
                self.beep.index = tone as u8;
            }
        }
        info!(
            flags = format_args!("{flags:#04x}"),
            use_up_events = self.use_up_events_for_buttons,
            tone = self.beep.index,
            "button global settings"
        );
        Ok(())
    }

    /// Per-field button settings.
    fn button_settings(
        &mut self,
        index: usize,
        message: &Message,
        gfx: &mut dyn Renderer,
    ) -> DispatchResult {
        use opcode::button::set as sub;

        let canvas_width = i32::from(self.requested_width);
        let canvas_height = i32::from(self.requested_height);
        let subcommand = message.param(1)?;
        let button = self.store.button_mut(index)?;

        match subcommand {
            sub::BUTTON_COLOR | sub::BUTTON_COLOR_AND_DRAW => {
                button.color = color::rgb565_to_argb(message.param(2)?);
                if subcommand == sub::BUTTON_COLOR_AND_DRAW {
                    button.draw(gfx);
                }
            }
            sub::CAPTION_COLOR | sub::CAPTION_COLOR_AND_DRAW => {
                button.caption_color = color::rgb565_to_argb(message.param(2)?);
                if subcommand == sub::CAPTION_COLOR_AND_DRAW {
                    button.draw(gfx);
                }
            }
            sub::VALUE | sub::VALUE_AND_DRAW => {
                // 16-bit value, or 32-bit split across two params
                let mut value = u32::from(message.param(2)?);
                if message.param_count() == 4 {
                    value |= u32::from(message.param(3)?) << 16;
                }
                button.value = value;
                if button.flags.contains(ButtonFlags::TOGGLE_RED_GREEN) {
                    button.apply_value();
                }
                info!(value, index, "set button value");
                if subcommand == sub::VALUE_AND_DRAW {
                    button.draw(gfx);
                }
            }
            sub::COLOR_AND_VALUE | sub::COLOR_AND_VALUE_AND_DRAW => {
                button.color = color::rgb565_to_argb(message.param(2)?);
                button.value = u32::from(message.param(3)?);
                if button.flags.contains(ButtonFlags::TOGGLE_RED_GREEN) {
                    button.apply_value();
                }
                if subcommand == sub::COLOR_AND_VALUE_AND_DRAW {
                    button.draw(gfx);
                }
            }
            sub::POSITION | sub::POSITION_AND_DRAW => {
                let x = i32::from(message.param_i16(2)?);
                let y = i32::from(message.param_i16(3)?);
                button.set_position(x, y, canvas_width, canvas_height);
                button.position_caption();
                if subcommand == sub::POSITION_AND_DRAW {
                    button.draw(gfx);
                }
            }
            sub::ACTIVE => button.active = true,
            sub::INACTIVE => button.active = false,
            sub::AUTOREPEAT_TIMING => {
                if button.flags.contains(ButtonFlags::AUTOREPEAT) {
                    button.autorepeat = AutorepeatTiming {
                        first_delay_millis: message.param(2)?,
                        first_rate_millis: message.param(3)?,
                        first_count: message.param(4)?,
                        second_rate_millis: message.param(5)?,
                    };
                    info!(index, timing = ?button.autorepeat, "set autorepeat timing");
                } else {
                    warn!(
                        caption = %button.escaped_caption(),
                        index,
                        "refused autorepeat timing for non-autorepeat button"
                    );
                }
            }
            sub::CALLBACK => {
                let mut callback = u32::from(message.param(2)?);
                if message.param_count() == 4 {
                    callback |= u32::from(message.param(3)?) << 16;
                }
                info!(
                    old = format_args!("{:#x}", button.callback),
                    new = format_args!("{callback:#x}"),
                    index,
                    "set button callback"
                );
                button.callback = callback;
            }
            unknown => return Err(DispatchError::UnknownSubcommand { subcommand: unknown }),
        }
        Ok(())
    }

    /// BUTTON_INIT, with the compatibility branch on parameter count:
    /// 9 parameters is the legacy shape (combined size+flags field, 16-bit
    /// callback), 10 splits the fields, 11 extends the callback to 32 bits.
    /// Deployed clients depend on exactly this disambiguation.
    fn button_init(&mut self, message: &Message) -> DispatchResult {
        use opcode::button::INIT;

        let index = usize::from(message.param(0)?);
        let x = i32::from(message.param_i16(1)?);
        let y = i32::from(message.param_i16(2)?);
        let width = i32::from(message.param(3)?);
        let height = i32::from(message.param(4)?);
        let box_color = color::rgb565_to_argb(message.param(5)?);

        let (caption_size, flag_bits, value, callback) = match message.param_count() {
            9 => {
                let size_and_flags = message.param(6)?;
                (
                    size_and_flags & 0xFF,
                    size_and_flags >> 8,
                    u32::from(message.param(7)?),
                    u32::from(message.param(8)?),
                )
            }
            10 => (
                message.param(6)?,
                message.param(7)?,
                u32::from(message.param(8)?),
                u32::from(message.param(9)?),
            ),
            11 => (
                message.param(6)?,
                message.param(7)?,
                u32::from(message.param(8)?),
                message.param_u32(9)?,
            ),
            _ => {
                return Err(DispatchError::InvalidParameter {
                    reason: "button INIT expects 9, 10 or 11 parameters",
                });
            }
        };

        let caption = self.convert_text(message.data_bytes());
        let button = Button::new(
            x,
            y,
            width,
            height,
            box_color,
            caption,
            caption_size,
            ButtonFlags::from_bits_truncate(flag_bits),
            value,
            callback,
            i32::from(self.requested_width),
            i32::from(self.requested_height),
        );

        let slot = if index < self.store.buttons.len() {
            self.store.buttons[index] = button;
            index
        } else {
            let slot = self.store.buttons.len();
            if slot != index {
                debug!(requested = index, actual = slot, "button appended at end of list");
            }
            self.store.buttons.push(button);
            slot
        };
        info!(
            opcode = format_args!("{INIT:#04x}"),
            index = slot,
            caption = %self.store.buttons[slot].escaped_caption(),
            x, y, width, height,
            callback = format_args!("{callback:#x}"),
            list_size = self.store.buttons.len(),
            "init button"
        );
        Ok(())
    }

    /// Hit-test buttons at a logical point and fire the first active hit.
    ///
    /// With `only_autorepeat` the hit is still reported (the router needs
    /// it to gate swipes and long-touch) but only autorepeat buttons fire,
    /// matching the down-pass behavior of up-triggered mode.
    pub(crate) fn press_button_at(
        &mut self,
        x: i32,
        y: i32,
        only_autorepeat: bool,
        gfx: &mut dyn Renderer,
        timers: &mut dyn Timer,
        actions: &mut Vec<SessionAction>,
    ) -> Option<usize> {
        let hit = self
            .store
            .buttons
            .iter()
            .position(|b| b.active && b.callback() != 0 && b.contains(x, y))?;

        let flags = self.store.buttons[hit].flags;
        if only_autorepeat && !flags.contains(ButtonFlags::AUTOREPEAT) {
            return Some(hit);
        }

        if flags.contains(ButtonFlags::BEEP_ON_TOUCH) {
            actions.push(SessionAction::PlayTone {
                index: self.beep.index,
                duration_millis: self.beep.duration_millis,
                volume: self.beep.volume,
            });
        }

        let (callback, value) = {
            let button = &mut self.store.buttons[hit];
            if flags.contains(ButtonFlags::TOGGLE_RED_GREEN) {
                button.value = u32::from(button.value == 0);
                button.apply_value();
                debug!(value = button.value, caption = %button.escaped_caption(), index = hit, "toggled");
                if !flags.contains(ButtonFlags::MANUAL_REFRESH) {
                    button.draw(gfx);
                    actions.push(SessionAction::Invalidate);
                }
            }
            (button.callback(), button.value())
        };
        actions.push(SessionAction::Emit(HostEvent::ButtonCallback {
            index: hit as u16,
            callback,
            value,
        }));

        if flags.contains(ButtonFlags::AUTOREPEAT) {
            let timing = self.store.buttons[hit].autorepeat;
            if timing.first_delay_millis == 0 {
                warn!(index = hit, "autorepeat button without timing");
            } else {
                self.autorepeat = AutorepeatState {
                    phase: AutorepeatPhase::FirstPeriod { remaining: timing.first_count },
                    owner: hit,
                };
                timers.schedule_once(
                    TimerId::Autorepeat,
                    Duration::from_millis(u64::from(timing.first_delay_millis)),
                );
            }
        }
        Some(hit)
    }

    /// One autorepeat timer fire: emit the synthetic callback and schedule
    /// the next fire from the button's *current* timing fields. Release or
    /// moving off the button ends the chain.
    pub(crate) fn handle_autorepeat_fire(
        &mut self,
        timers: &mut dyn Timer,
        actions: &mut Vec<SessionAction>,
    ) {
        if self.autorepeat.phase == AutorepeatPhase::Idle {
            return;
        }
        if !self.pointers[0].active {
            self.autorepeat.phase = AutorepeatPhase::Idle;
            return;
        }
        let owner = self.autorepeat.owner;
        let x = self.to_logical(self.pointers[0].last_x);
        let y = self.to_logical(self.pointers[0].last_y);

        let Some(button) = self.store.buttons.get(owner) else {
            self.autorepeat.phase = AutorepeatPhase::Idle;
            return;
        };
        if !button.contains(x, y) {
            self.autorepeat.phase = AutorepeatPhase::Idle;
            timers.cancel(TimerId::Autorepeat);
            return;
        }

        let flags = button.flags;
        let callback = button.callback();
        let value = button.value();
        let timing = button.autorepeat;

        if flags.contains(ButtonFlags::BEEP_ON_TOUCH) {
            actions.push(SessionAction::PlayTone {
                index: self.beep.index,
                duration_millis: self.beep.duration_millis,
                volume: self.beep.volume,
            });
        }
        actions.push(SessionAction::Emit(HostEvent::ButtonCallback {
            index: owner as u16,
            callback,
            value,
        }));

        let delay_millis = match self.autorepeat.phase {
            AutorepeatPhase::FirstPeriod { remaining } => {
                let remaining = remaining.saturating_sub(1);
                self.autorepeat.phase = if remaining == 0 {
                    AutorepeatPhase::SecondPeriod
                } else {
                    AutorepeatPhase::FirstPeriod { remaining }
                };
                timing.first_rate_millis
            }
            AutorepeatPhase::SecondPeriod => timing.second_rate_millis,
            AutorepeatPhase::Idle => return,
        };
        timers.schedule_once(TimerId::Autorepeat, Duration::from_millis(u64::from(delay_millis)));
    }

    /// Route one slider-range command.
    pub(crate) fn handle_slider_command(
        &mut self,
        message: &Message,
        gfx: &mut dyn Renderer,
    ) -> DispatchResult {
        use opcode::slider as op;

        match message.opcode {
            op::ACTIVATE_ALL => {
                debug!("activate all sliders");
                self.store.set_all_sliders_active(true);
                Ok(())
            }
            op::DEACTIVATE_ALL => {
                debug!("deactivate all sliders");
                self.store.set_all_sliders_active(false);
                Ok(())
            }
            op::GLOBAL_SETTINGS => {
                // reserved on this host; nothing global to configure yet
                debug!(params = message.param_count(), "slider global settings ignored");
                Ok(())
            }
            op::INIT => self.slider_init(message),
            _ => {
                let index = usize::from(message.param(0)?);
                match message.opcode {
                    op::DRAW => {
                        self.store.slider_mut(index)?.draw(gfx);
                        Ok(())
                    }
                    op::DRAW_BORDER => {
                        self.store.slider_mut(index)?.draw_border(gfx);
                        Ok(())
                    }
                    op::SET_CAPTION => {
                        let caption = self.convert_text(message.data_bytes());
                        self.store.slider_mut(index)?.set_caption(caption);
                        Ok(())
                    }
                    op::PRINT_VALUE => {
                        let text_value = self.convert_text(message.data_bytes());
                        self.store.slider_mut(index)?.print_value(&text_value, gfx);
                        Ok(())
                    }
                    op::SETTINGS => self.slider_settings(index, message, gfx),
                    other => Err(DispatchError::UnknownOpcode { opcode: other }),
                }
            }
        }
    }

    /// SLIDER_INIT; 11 parameters carry a 16-bit callback, 12 a 32-bit one
    /// (the same sniffing rule as buttons).
    fn slider_init(&mut self, message: &Message) -> DispatchResult {
        let index = usize::from(message.param(0)?);
        let callback = match message.param_count() {
            11 => u32::from(message.param(10)?),
            12 => message.param_u32(10)?,
            _ => {
                return Err(DispatchError::InvalidParameter {
                    reason: "slider INIT expects 11 or 12 parameters",
                });
            }
        };

        let slider = Slider::new(
            i32::from(message.param_i16(1)?),
            i32::from(message.param_i16(2)?),
            i32::from(message.param(3)?),
            i32::from(message.param(4)?),
            i32::from(message.param_i16(5)?),
            i32::from(message.param_i16(6)?),
            color::rgb565_to_argb(message.param(7)?),
            color::rgb565_to_argb(message.param(8)?),
            SliderFlags::from_bits_truncate(message.param(9)?),
            callback,
            i32::from(self.requested_width),
            i32::from(self.requested_height),
        );

        let slot = if index < self.store.sliders.len() {
            self.store.sliders[index] = slider;
            index
        } else {
            let slot = self.store.sliders.len();
            if slot != index {
                debug!(requested = index, actual = slot, "slider appended at end of list");
            }
            self.store.sliders.push(slider);
            slot
        };
        info!(
            index = slot,
            callback = format_args!("{callback:#x}"),
            list_size = self.store.sliders.len(),
            "init slider"
        );
        Ok(())
    }

    /// Per-field slider settings.
    fn slider_settings(
        &mut self,
        index: usize,
        message: &Message,
        gfx: &mut dyn Renderer,
    ) -> DispatchResult {
        use opcode::slider::set as sub;

        let canvas_width = i32::from(self.requested_width);
        let canvas_height = i32::from(self.requested_height);
        let subcommand = message.param(1)?;
        let slider = self.store.slider_mut(index)?;

        match subcommand {
            sub::BAR_COLOR => slider.bar_color = color::rgb565_to_argb(message.param(2)?),
            sub::THRESHOLD_COLOR => {
                slider.threshold_color = color::rgb565_to_argb(message.param(2)?);
            }
            sub::BORDER_COLOR => slider.border_color = color::rgb565_to_argb(message.param(2)?),
            sub::VALUE | sub::VALUE_AND_DRAW => {
                slider.value = i32::from(message.param_i16(2)?).clamp(0, slider.bar_length);
                info!(value = slider.value, index, "set slider value");
                if subcommand == sub::VALUE_AND_DRAW {
                    slider.draw_bar(gfx);
                }
            }
            sub::THRESHOLD => slider.threshold = i32::from(message.param_i16(2)?),
            sub::POSITION => {
                let x = i32::from(message.param_i16(2)?);
                let y = i32::from(message.param_i16(3)?);
                slider.set_position(x, y, canvas_width, canvas_height);
            }
            sub::ACTIVE => slider.active = true,
            sub::INACTIVE => slider.active = false,
            sub::CALLBACK => {
                let mut callback = u32::from(message.param(2)?);
                if message.param_count() == 4 {
                    callback |= u32::from(message.param(3)?) << 16;
                }
                slider.callback = callback;
            }
            unknown => return Err(DispatchError::UnknownSubcommand { subcommand: unknown }),
        }
        Ok(())
    }

    /// First active slider under a logical point, display-only ones
    /// excluded.
    pub(crate) fn slider_at(&self, x: i32, y: i32) -> Option<usize> {
        self.store
            .sliders
            .iter()
            .position(|s| s.active && !s.flags.contains(SliderFlags::OUTPUT_ONLY) && s.contains(x, y))
    }

    /// Drag (or initial touch) on a captured slider: project the touch on
    /// the bar axis and take the value, redrawing and echoing the callback
    /// on change.
    pub(crate) fn slider_touch(
        &mut self,
        index: usize,
        x: i32,
        y: i32,
        gfx: &mut dyn Renderer,
        actions: &mut Vec<SessionAction>,
    ) {
        let Some(slider) = self.store.sliders.get_mut(index) else {
            return;
        };
        let new_value = slider.value_for_touch(x, y);
        if new_value == slider.value {
            return;
        }
        if slider.flags.contains(SliderFlags::VALUE_BY_CALLBACK) {
            // the client decides; it echoes a SET_VALUE when it accepts
        } else {
            slider.value = new_value;
            slider.draw_bar(gfx);
            actions.push(SessionAction::Invalidate);
        }
        let callback = slider.callback();
        if callback != 0 {
            actions.push(SessionAction::Emit(HostEvent::SliderCallback {
                index: index as u16,
                callback,
                value: new_value.max(0) as u32,
            }));
        }
    }
}
