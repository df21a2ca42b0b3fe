//! Touch buttons.
//!
//! A button is a colored box with a centered (possibly multi-line) caption.
//! Touching it echoes the client-supplied callback token back over the
//! wire; flags add a beep, a red/green toggle tied to the value, or
//! autorepeat while held.

use bitflags::bitflags;
use glasslink_proto::color;
use tracing::warn;

use crate::{text, Renderer};

bitflags! {
    /// Behavior flags from the INIT flags field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ButtonFlags: u16 {
        /// Play the touch tone when triggered
        const BEEP_ON_TOUCH = 0x01;
        /// Value 0 shows red, anything else shows green; touch toggles
        const TOGGLE_RED_GREEN = 0x02;
        /// Emit synthetic callbacks while held
        const AUTOREPEAT = 0x04;
        /// Do not redraw automatically after a red/green toggle
        const MANUAL_REFRESH = 0x08;
    }
}

/// Autorepeat schedule of one button.
///
/// After `first_delay` the button fires every `first_rate` for
/// `first_count` fires, then every `second_rate` until release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutorepeatTiming {
    /// Delay before the first synthetic fire, ms
    pub first_delay_millis: u16,
    /// Period of the first phase, ms
    pub first_rate_millis: u16,
    /// Fires in the first phase
    pub first_count: u16,
    /// Period of the second phase, ms
    pub second_rate_millis: u16,
}

/// One touch button.
#[derive(Debug, Clone)]
pub struct Button {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) color: u32,
    pub(crate) caption_color: u32,
    pub(crate) caption_size: u16,
    /// Caption as sent
    raw_caption: String,
    /// Caption for logging, newlines replaced by `|`
    escaped_caption: String,
    caption_lines: Vec<String>,
    /// Baseline x of a single-line caption; `None` for multi-line captions,
    /// which center every line separately at draw time
    caption_x: Option<i32>,
    /// Baseline y of the first caption line
    caption_y: i32,
    pub(crate) value: u32,
    pub(crate) callback: u32,
    pub(crate) flags: ButtonFlags,
    caption_for_true: Option<String>,
    caption_for_false: Option<String>,
    pub(crate) autorepeat: AutorepeatTiming,
    pub(crate) active: bool,
}

impl Button {
    /// Create a button. Geometry is clamped against the canvas; red/green
    /// buttons normalize their value and pick their color from it.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: u32,
        caption: String,
        caption_size: u16,
        flags: ButtonFlags,
        value: u32,
        callback: u32,
        canvas_width: i32,
        canvas_height: i32,
    ) -> Self {
        let mut button = Self {
            x,
            y,
            width,
            height,
            color,
            caption_color: color::BLACK,
            caption_size,
            raw_caption: String::new(),
            escaped_caption: String::new(),
            caption_lines: Vec::new(),
            caption_x: None,
            caption_y: 0,
            value,
            callback,
            flags,
            caption_for_true: None,
            caption_for_false: None,
            autorepeat: AutorepeatTiming::default(),
            active: false,
        };
        button.set_position(x, y, canvas_width, canvas_height);
        if flags.contains(ButtonFlags::TOGGLE_RED_GREEN) {
            button.caption_for_false = Some(caption.clone());
            if button.value != 0 {
                button.value = 1;
                button.color = color::GREEN;
            } else {
                button.color = color::RED;
            }
        }
        button.set_caption(caption);
        button
    }

    /// Caption in its log-safe form.
    #[must_use]
    pub fn escaped_caption(&self) -> &str {
        &self.escaped_caption
    }

    /// Caption lines after newline splitting and trimming.
    #[must_use]
    pub fn caption_lines(&self) -> &[String] {
        &self.caption_lines
    }

    /// Baseline of the first caption line: x (`None` for multi-line) and y.
    #[must_use]
    pub fn caption_position(&self) -> (Option<i32>, i32) {
        (self.caption_x, self.caption_y)
    }

    /// Box origin.
    #[must_use]
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Box size after clamping.
    #[must_use]
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Current box color.
    #[must_use]
    pub fn color(&self) -> u32 {
        self.color
    }

    /// Callback token.
    #[must_use]
    pub fn callback(&self) -> u32 {
        self.callback
    }

    /// Whether the button participates in hit-testing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Move the box, clamping width/height so it stays on the canvas.
    /// Oversize is a client bug worth a warning, never a rejection.
    pub(crate) fn set_position(&mut self, x: i32, y: i32, canvas_width: i32, canvas_height: i32) {
        self.x = x;
        self.y = y;
        if x + self.width > canvas_width {
            warn!(
                caption = %self.escaped_caption,
                x, width = self.width, canvas_width,
                "button exceeds canvas width, clamping"
            );
            self.width = canvas_width - x;
        }
        if y + self.height > canvas_height {
            warn!(
                caption = %self.escaped_caption,
                y, height = self.height, canvas_height,
                "button exceeds canvas height, clamping"
            );
            self.height = canvas_height - y;
        }
    }

    /// Replace the caption and lay it out.
    pub(crate) fn set_caption(&mut self, raw: String) {
        self.escaped_caption = raw.replace('\n', "|");
        self.caption_lines = raw.split('\n').map(|line| line.trim().to_string()).collect();
        self.raw_caption = raw;
        self.position_caption();
    }

    /// Caption set by SET_CAPTION_FOR_VALUE_TRUE.
    pub(crate) fn set_caption_for_value_true(&mut self, raw: String) {
        self.caption_for_true = Some(raw.clone());
        if self.value != 0 {
            self.set_caption(raw);
        }
    }

    /// Recompute caption placement against the current geometry.
    pub(crate) fn position_caption(&mut self) {
        if self.caption_size == 0 {
            return;
        }
        let lines = self.caption_lines.len().max(1);
        if lines > 1 {
            let (y, fits) = text::center_block(self.y, self.height, self.caption_size, lines);
            if !fits {
                warn!(
                    caption = %self.escaped_caption,
                    lines, "caption too high for button, anchoring at top"
                );
            }
            self.caption_y = y;
            self.caption_x = None;
        } else {
            let chars = self.caption_lines.first().map_or(0, String::len);
            let (x, fits) = text::center_line(self.x, self.width, self.caption_size, chars);
            if !fits {
                warn!(caption = %self.escaped_caption, "caption too long for button, left aligning");
            }
            if i32::from(self.caption_size) >= self.height {
                warn!(caption = %self.escaped_caption, "caption too high for button");
            }
            self.caption_x = Some(x);
            self.caption_y =
                self.y + (self.height - i32::from(self.caption_size)) / 2 + text::ascend(self.caption_size);
        }
    }

    /// Re-derive color and caption from the value (red/green buttons).
    /// Any nonzero value normalizes to 1.
    pub(crate) fn apply_value(&mut self) {
        if self.value != 0 {
            self.value = 1;
            self.color = color::GREEN;
            if let Some(caption) = self.caption_for_true.clone() {
                self.set_caption(caption);
            }
        } else {
            self.color = color::RED;
            // a caption swap only exists when a true-caption was set
            if self.caption_for_true.is_some() {
                if let Some(caption) = self.caption_for_false.clone() {
                    self.set_caption(caption);
                }
            }
        }
    }

    /// Whether a logical point lies inside the box, edges included.
    #[must_use]
    pub(crate) fn contains(&self, x: i32, y: i32) -> bool {
        (self.x..=self.x + self.width).contains(&x)
            && (self.y..=self.y + self.height).contains(&y)
    }

    /// Draw box and caption. Drawing activates the button.
    pub(crate) fn draw(&mut self, gfx: &mut dyn Renderer) {
        self.active = true;
        gfx.fill_rect(self.x, self.y, self.width, self.height, self.color);
        self.draw_caption(gfx);
    }

    /// Draw the caption only. Also activates the button.
    pub(crate) fn draw_caption(&mut self, gfx: &mut dyn Renderer) {
        self.active = true;
        if self.caption_size == 0 {
            return;
        }
        match self.caption_x {
            Some(x) => {
                let line = self.caption_lines.first().map_or("", String::as_str);
                gfx.draw_text(x, self.caption_y, line, self.caption_size, self.caption_color, Some(self.color));
            }
            None => {
                let mut y = self.caption_y;
                for line in &self.caption_lines {
                    let (x, fits) = text::center_line(self.x, self.width, self.caption_size, line.len());
                    if !fits {
                        warn!(line = %line, "caption line too long for button, left aligning");
                    }
                    gfx.draw_text(x, y, line, self.caption_size, self.caption_color, Some(self.color));
                    y += text::line_pitch(self.caption_size);
                }
            }
        }
    }

    /// Clear the drawn area and deactivate. The object itself persists and
    /// can be redrawn later.
    pub(crate) fn remove(&mut self, background: u32, gfx: &mut dyn Renderer) {
        gfx.fill_rect(self.x, self.y, self.width, self.height, background);
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_button(caption: &str, width: i32, height: i32, size: u16) -> Button {
        Button::new(
            20,
            40,
            width,
            height,
            color::WHITE,
            caption.to_string(),
            size,
            ButtonFlags::empty(),
            0,
            0x1234,
            320,
            240,
        )
    }

    #[test]
    fn multiline_caption_splits_and_trims() {
        let button = plain_button("Hi\nThere", 100, 60, 10);
        assert_eq!(button.caption_lines(), &["Hi".to_string(), "There".to_string()]);
        assert_eq!(button.escaped_caption(), "Hi|There");

        // block of 2 lines x 10 px in a 60 px box: 40 + (60-20)/2 + ascend
        let (x, y) = button.caption_position();
        assert_eq!(x, None);
        assert_eq!(y, 40 + 20 + text::ascend(10));
    }

    #[test]
    fn single_line_caption_centers_both_axes() {
        let button = plain_button("Go", 100, 30, 10);
        let (x, y) = button.caption_position();
        // 2 chars x 6 px in 100 px box -> 20 + 44
        assert_eq!(x, Some(20 + 44));
        assert_eq!(y, 40 + 10 + text::ascend(10));
    }

    #[test]
    fn oversize_caption_falls_back_to_origin() {
        let button = plain_button("A very long caption indeed", 40, 30, 12);
        let (x, _) = button.caption_position();
        assert_eq!(x, Some(20));
    }

    #[test]
    fn geometry_clamps_against_canvas() {
        let button = plain_button("X", 1000, 1000, 10);
        assert_eq!(button.size(), (300, 200));
    }

    #[test]
    fn red_green_button_normalizes_value_and_color() {
        let mut button = Button::new(
            0,
            0,
            50,
            20,
            color::WHITE,
            "T".to_string(),
            10,
            ButtonFlags::TOGGLE_RED_GREEN,
            7,
            1,
            320,
            240,
        );
        assert_eq!(button.value(), 1);
        assert_eq!(button.color(), color::GREEN);

        button.value = 0;
        button.apply_value();
        assert_eq!(button.color(), color::RED);
    }

    #[test]
    fn hit_testing_is_inclusive_of_edges() {
        let button = plain_button("E", 100, 60, 10);
        assert!(button.contains(20, 40));
        assert!(button.contains(120, 100));
        assert!(!button.contains(121, 100));
        assert!(!button.contains(19, 40));
    }
}
