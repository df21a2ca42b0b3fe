//! Display command handlers (0x10..=0x3F and the variable-data display
//! range 0x60..=0x6F).
//!
//! These decode parameters, apply the session's text state and hand the
//! geometry to the [`Renderer`] in logical coordinates. Nothing here
//! rasterizes; the capability does.

use glasslink_proto::{
    color,
    message::DataTag,
    opcode::{cmd, write},
    Message,
};
use tracing::{info, warn};

use crate::{
    action::InputKind,
    error::{DispatchError, DispatchResult},
    session::{DisplaySession, CHART_SLOTS},
    text, Renderer, SessionAction,
};

/// Default stroke width when a command omits its stroke parameter.
const DEFAULT_STROKE: u16 = 1;

impl DisplaySession {
    /// Route one display-range command.
    pub(crate) fn handle_display(
        &mut self,
        message: &Message,
        gfx: &mut dyn Renderer,
        actions: &mut Vec<SessionAction>,
    ) -> DispatchResult {
        match message.opcode {
            cmd::CLEAR_DISPLAY => {
                let clear_color = color::rgb565_to_argb(message.param(0)?);
                info!(color = format_args!("{clear_color:#010x}"), "clear display");
                gfx.clear(clear_color);
                for chart in &mut self.charts {
                    chart.clear();
                }
                Ok(())
            }
            cmd::DRAW_DISPLAY => {
                actions.push(SessionAction::Invalidate);
                Ok(())
            }
            // only meaningful as a skip marker when commands are buffered;
            // interpreted directly it does nothing
            cmd::CLEAR_DISPLAY_OPTIONAL => Ok(()),
            cmd::DRAW_PIXEL => {
                let x = i32::from(message.param_i16(0)?);
                let y = i32::from(message.param_i16(1)?);
                gfx.draw_pixel(x, y, color::rgb565_to_argb(message.param(2)?));
                Ok(())
            }
            cmd::DRAW_LINE | cmd::DRAW_LINE_REL | cmd::DRAW_VECTOR_DEGREE => {
                self.draw_line_variant(message, gfx)
            }
            cmd::DRAW_VECTOR_RADIAN => {
                let x0 = i32::from(message.param_i16(0)?);
                let y0 = i32::from(message.param_i16(1)?);
                let length = f32::from(message.param(2)?);
                let radian = message.param_f32(3)?;
                let line_color = color::rgb565_to_argb(message.param(5)?);
                let stroke =
                    if message.param_count() > 6 { message.param(6)? } else { DEFAULT_STROKE };
                let x1 = x0 + (radian.cos() * length + 0.5) as i32;
                let y1 = y0 - (radian.sin() * length + 0.5) as i32;
                gfx.draw_line(x0, y0, x1, y1, line_color, stroke);
                Ok(())
            }
            cmd::DRAW_RECT | cmd::DRAW_RECT_REL | cmd::FILL_RECT | cmd::FILL_RECT_REL => {
                self.draw_rect_variant(message, gfx)
            }
            cmd::DRAW_CIRCLE | cmd::FILL_CIRCLE => {
                let cx = i32::from(message.param_i16(0)?);
                let cy = i32::from(message.param_i16(1)?);
                let radius = i32::from(message.param(2)?);
                let circle_color = color::rgb565_to_argb(message.param(3)?);
                if message.opcode == cmd::DRAW_CIRCLE {
                    let stroke =
                        if message.param_count() > 4 { message.param(4)? } else { DEFAULT_STROKE };
                    gfx.draw_circle(cx, cy, radius, circle_color, stroke);
                } else {
                    gfx.fill_circle(cx, cy, radius, circle_color);
                }
                Ok(())
            }
            cmd::WRITE_SETTINGS => self.write_settings(message),
            cmd::DRAW_CHAR | cmd::DRAW_STRING => self.draw_text_command(message, gfx),
            cmd::DEBUG_STRING => {
                let debug_text = String::from_utf8_lossy(message.data_bytes()).into_owned();
                // warning level so the message stands out in host logs
                warn!(text = %debug_text, "client debug string");
                actions.push(SessionAction::ShowDebug(debug_text));
                Ok(())
            }
            cmd::WRITE_STRING => {
                let written = self.convert_text(message.data_bytes());
                self.write_string(&written, gfx);
                Ok(())
            }
            cmd::GET_NUMBER_WITH_SHORT_PROMPT => {
                self.request_input(message, InputKind::Number, actions)
            }
            cmd::GET_TEXT_WITH_SHORT_PROMPT => {
                self.request_input(message, InputKind::Text, actions)
            }
            cmd::DRAW_PATH | cmd::FILL_PATH => self.draw_path_variant(message, gfx),
            cmd::DRAW_CHART => self.draw_chart(message, gfx, true, actions),
            cmd::DRAW_CHART_WITHOUT_DIRECT_RENDERING => {
                self.draw_chart(message, gfx, false, actions)
            }
            other => Err(DispatchError::UnknownOpcode { opcode: other }),
        }
    }

    /// DRAW_LINE, DRAW_LINE_REL and DRAW_VECTOR_DEGREE share their
    /// parameter tail: color at 4, optional stroke at 5.
    fn draw_line_variant(&mut self, message: &Message, gfx: &mut dyn Renderer) -> DispatchResult {
        let x0 = i32::from(message.param_i16(0)?);
        let y0 = i32::from(message.param_i16(1)?);
        let (x1, y1) = match message.opcode {
            cmd::DRAW_LINE_REL => (
                x0 + i32::from(message.param_i16(2)?),
                y0 + i32::from(message.param_i16(3)?),
            ),
            cmd::DRAW_VECTOR_DEGREE => {
                let length = f32::from(message.param(2)?);
                let degree = f32::from(message.param_i16(3)?);
                let radian = degree.to_radians();
                (
                    x0 + (radian.cos() * length + 0.5) as i32,
                    y0 - (radian.sin() * length + 0.5) as i32,
                )
            }
            _ => (i32::from(message.param_i16(2)?), i32::from(message.param_i16(3)?)),
        };
        let line_color = color::rgb565_to_argb(message.param(4)?);
        let stroke = if message.param_count() > 5 { message.param(5)? } else { DEFAULT_STROKE };
        gfx.draw_line(x0, y0, x1, y1, line_color, stroke);
        Ok(())
    }

    /// The four rectangle commands: relative size vs. absolute corners
    /// (which may arrive unsorted), filled vs. stroked.
    fn draw_rect_variant(&mut self, message: &Message, gfx: &mut dyn Renderer) -> DispatchResult {
        let relative = matches!(message.opcode, cmd::DRAW_RECT_REL | cmd::FILL_RECT_REL);
        let filled = matches!(message.opcode, cmd::FILL_RECT | cmd::FILL_RECT_REL);

        let x0 = i32::from(message.param_i16(0)?);
        let y0 = i32::from(message.param_i16(1)?);
        let (x, y, width, height) = if relative {
            (x0, y0, i32::from(message.param_i16(2)?), i32::from(message.param_i16(3)?))
        } else {
            let x1 = i32::from(message.param_i16(2)?);
            let y1 = i32::from(message.param_i16(3)?);
            (x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
        };

        let rect_color = color::rgb565_to_argb(message.param(4)?);
        if filled {
            gfx.fill_rect(x, y, width, height, rect_color);
        } else {
            let stroke = if message.param_count() > 5 { message.param(5)? } else { DEFAULT_STROKE };
            gfx.draw_rect(x, y, width, height, rect_color, stroke);
        }
        Ok(())
    }

    /// WRITE_SETTINGS: the print-emulation state behind WRITE_STRING.
    fn write_settings(&mut self, message: &Message) -> DispatchResult {
        let subcommand = message.param(0)?;
        match subcommand {
            write::SET_SIZE_AND_COLORS_AND_FLAGS => {
                self.print.size = message.param(1)?;
                self.print.color = color::rgb565_to_argb(message.param(2)?);
                self.print.background = color::rgb565_to_argb(message.param(3)?);
                self.print.clear_on_wrap = message.param(4)? > 0;
                info!(
                    size = self.print.size,
                    clear_on_wrap = self.print.clear_on_wrap,
                    "print settings"
                );
                Ok(())
            }
            write::SET_POSITION => {
                self.print.x = i32::from(message.param_i16(1)?);
                self.print.y = i32::from(message.param_i16(2)?);
                Ok(())
            }
            write::SET_LINE_COLUMN => {
                let column = i32::from(message.param(1)?);
                let line = i32::from(message.param(2)?);
                self.print.x = column * text::char_width(self.print.size);
                self.print.y = line * i32::from(self.print.size);
                Ok(())
            }
            unknown => Err(DispatchError::UnknownSubcommand { subcommand: unknown }),
        }
    }

    /// DRAW_CHAR / DRAW_STRING.
    ///
    /// Arity quirk kept for compatibility: two or fewer parameters reuse
    /// the size/color/background of the preceding text command (a legacy
    /// bandwidth optimization); DRAW_STRING with full parameters refreshes
    /// that stored style, DRAW_CHAR never does.
    fn draw_text_command(&mut self, message: &Message, gfx: &mut dyn Renderer) -> DispatchResult {
        let x = i32::from(message.param_i16(0)?);
        let y = i32::from(message.param_i16(1)?);

        let (size, color565, background565) = if message.param_count() <= 2 {
            (self.last_text.size, self.last_text.color, self.last_text.background)
        } else {
            let style = (message.param(2)?, message.param(3)?, message.param(4)?);
            if message.opcode == cmd::DRAW_STRING {
                self.last_text.size = style.0;
                self.last_text.color = style.1;
                self.last_text.background = style.2;
            }
            style
        };
        let text_color = color::rgb565_to_argb(color565);
        let background = if background565 == color::NO_BACKGROUND {
            None
        } else {
            Some(color::rgb565_to_argb(background565))
        };

        let drawn = if message.opcode == cmd::DRAW_CHAR {
            self.convert_char(message.param(5)? as u8).to_string()
        } else {
            self.convert_text(message.data_bytes())
        };

        self.draw_text_lines(x, y, &drawn, size, text_color, background, gfx);
        Ok(())
    }

    /// Draw text that may span lines. A `\n` separator just breaks the
    /// line; a `\r` separator additionally extends the background to the
    /// canvas border for the line it ends.
    #[allow(clippy::too_many_arguments)]
    fn draw_text_lines(
        &mut self,
        x: i32,
        start_y: i32,
        drawn: &str,
        size: u16,
        text_color: u32,
        background: Option<u32>,
        gfx: &mut dyn Renderer,
    ) {
        // split into segments, remembering which separator ended each
        let mut segments: Vec<(String, bool)> = Vec::new();
        let mut current = String::new();
        for ch in drawn.chars() {
            match ch {
                '\n' => segments.push((std::mem::take(&mut current), false)),
                '\r' => segments.push((std::mem::take(&mut current), true)),
                other => current.push(other),
            }
        }
        let trailing = !current.is_empty();
        if trailing {
            segments.push((current, false));
        }

        if segments.len() == 1 && trailing {
            let (line, _) = &segments[0];
            gfx.draw_text(x, start_y, line, size, text_color, background);
            return;
        }

        let mut y = start_y;
        for (line, extend) in &segments {
            if *extend {
                // background for the whole rest of the line
                if let Some(bg) = background {
                    gfx.fill_rect(
                        x,
                        y - text::ascend(size),
                        i32::from(self.requested_width) - x,
                        text::ascend(size) + text::descend(size),
                        bg,
                    );
                }
            }
            if !line.is_empty() {
                let bg = if *extend { None } else { background };
                gfx.draw_text(x, y, line, size, text_color, bg);
                y += text::line_pitch(size);
            }
        }
    }

    /// WRITE_STRING: print emulation with word wrap and page wrap.
    pub(crate) fn write_string(&mut self, written: &str, gfx: &mut dyn Renderer) {
        let glyph = text::char_width(self.print.size).max(1);
        let line_chars = (i32::from(self.requested_width) / glyph).max(1) as usize;

        let mut pending = String::new();
        // char index in `pending` where the current word starts
        let mut word_start = 0usize;

        for ch in written.chars() {
            match ch {
                '\n' => {
                    self.print_flush(&std::mem::take(&mut pending), true, gfx);
                    word_start = 0;
                }
                '\r' => word_start = pending.chars().count(),
                ' ' => {
                    let column = (self.print.x / glyph) as usize + pending.chars().count();
                    if column > 0 {
                        pending.push(' ');
                    }
                    word_start = pending.chars().count();
                }
                other => {
                    let column = (self.print.x / glyph) as usize + pending.chars().count();
                    if column >= line_chars {
                        let word_len = pending.chars().count() - word_start;
                        if word_len >= line_chars {
                            // word longer than a line: hard break
                            self.print_flush(&std::mem::take(&mut pending), true, gfx);
                        } else {
                            // move the unfinished word to the next line
                            let carry: String = pending.chars().skip(word_start).collect();
                            let break_at: String = pending.chars().take(word_start).collect();
                            self.print_flush(&break_at, true, gfx);
                            pending = carry;
                        }
                        word_start = 0;
                    }
                    pending.push(other);
                }
            }
        }
        self.print_flush(&pending, false, gfx);
    }

    /// Draw one buffered print run at the cursor; optionally advance to the
    /// next line, wrapping back to the top of the canvas when full.
    fn print_flush(&mut self, run: &str, newline: bool, gfx: &mut dyn Renderer) {
        if !run.is_empty() {
            let width = text::text_width(self.print.size, run.chars().count());
            gfx.fill_rect(
                self.print.x,
                self.print.y,
                width,
                i32::from(self.print.size),
                self.print.background,
            );
            gfx.draw_text(
                self.print.x,
                self.print.y + text::ascend(self.print.size),
                run,
                self.print.size,
                self.print.color,
                None,
            );
            self.print.x += width;
        }
        if newline {
            self.print.x = 0;
            let next = self.print.y + text::line_pitch(self.print.size);
            self.print.y = if next >= i32::from(self.requested_height) {
                if self.print.clear_on_wrap {
                    gfx.clear(self.print.background);
                }
                0
            } else {
                next
            };
        }
    }

    /// DRAW_PATH / FILL_PATH: vertices travel in the data block as 16- or
    /// 32-bit coordinate pairs depending on the data tag.
    fn draw_path_variant(&mut self, message: &Message, gfx: &mut dyn Renderer) -> DispatchResult {
        let path_color = color::rgb565_to_argb(message.param(0)?);
        let Some(block) = &message.data else {
            return Err(DispatchError::InvalidParameter { reason: "path without data block" });
        };
        let coords: Vec<i32> = match block.tag {
            DataTag::Int => block.as_i32s(),
            _ => block.as_i16s().into_iter().map(i32::from).collect(),
        };
        let points: Vec<(i32, i32)> = coords.chunks_exact(2).map(|c| (c[0], c[1])).collect();
        if points.len() < 2 {
            return Err(DispatchError::InvalidParameter { reason: "path needs two points" });
        }

        if message.opcode == cmd::FILL_PATH {
            gfx.fill_path(&points, path_color);
        } else {
            let stroke = message.param(1)?;
            gfx.draw_path(&points, path_color, stroke);
        }
        Ok(())
    }

    /// Chart trace from unsigned byte samples: one x step per sample. The
    /// previous trace of the addressed chart slot can be erased first by
    /// passing a nonzero delete color.
    fn draw_chart(
        &mut self,
        message: &Message,
        gfx: &mut dyn Renderer,
        present: bool,
        actions: &mut Vec<SessionAction>,
    ) -> DispatchResult {
        let x_start = i32::from(message.param_i16(0)?);
        let y_param = message.param(1)?;
        // chart slot in the top four bits of the y start parameter
        let chart_index = usize::from(y_param >> 12);
        let y_base = if chart_index > 0 { i32::from(y_param & 0x0FFF) } else { i32::from(y_param) };
        if chart_index >= CHART_SLOTS {
            return Err(DispatchError::InvalidParameter { reason: "chart index out of range" });
        }

        let trace_color = color::rgb565_to_argb(message.param(2)?);
        let delete565 = message.param(3)?;
        if delete565 != 0 && self.charts[chart_index].len() > 1 {
            let delete_color = color::rgb565_to_argb(delete565);
            gfx.draw_polyline(&self.charts[chart_index], delete_color, DEFAULT_STROKE);
        }

        let points: Vec<(i32, i32)> = message
            .data_bytes()
            .iter()
            .enumerate()
            .map(|(i, &sample)| (x_start + i as i32, y_base + i32::from(sample)))
            .collect();
        if points.len() > 1 {
            gfx.draw_polyline(&points, trace_color, DEFAULT_STROKE);
        }
        self.charts[chart_index] = points;

        if present {
            actions.push(SessionAction::Invalidate);
        }
        Ok(())
    }
}
