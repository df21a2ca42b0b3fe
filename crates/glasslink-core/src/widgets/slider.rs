//! Touch sliders.
//!
//! A slider is a bar the user drags to set a value between 0 and the bar
//! length. The filled part is drawn in the bar color below the threshold
//! and in the threshold color at or above it. Sliders follow the same
//! addressing/init/settings pattern as buttons.

use bitflags::bitflags;
use glasslink_proto::color;
use tracing::warn;

use crate::{text, Renderer};

bitflags! {
    /// Behavior flags from the INIT options field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SliderFlags: u16 {
        /// Draw a border around the bar
        const SHOW_BORDER = 0x01;
        /// Print the numeric value next to the bar
        const SHOW_VALUE = 0x02;
        /// Bar travels left-to-right instead of bottom-up
        const HORIZONTAL = 0x04;
        /// Reverse the travel direction
        const INVERSE = 0x08;
        /// Touch emits the callback but does not move the local value;
        /// the client echoes a SET_VALUE when it accepts
        const VALUE_BY_CALLBACK = 0x10;
        /// Display-only: excluded from hit-testing entirely
        const OUTPUT_ONLY = 0x20;
    }
}

/// Default color of the unfilled bar part.
const BAR_BACKGROUND_DEFAULT: u16 = 0xC618;
/// Text size used for the value echo and caption.
const TEXT_SIZE: u16 = 12;

/// One touch slider.
#[derive(Debug, Clone)]
pub struct Slider {
    /// Outer top-left corner (border included)
    pub(crate) x: i32,
    pub(crate) y: i32,
    /// Bar thickness
    pub(crate) bar_width: i32,
    /// Bar travel; also the value range
    pub(crate) bar_length: i32,
    pub(crate) threshold: i32,
    pub(crate) value: i32,
    pub(crate) border_color: u32,
    pub(crate) bar_color: u32,
    pub(crate) bar_background_color: u32,
    pub(crate) threshold_color: u32,
    caption: String,
    pub(crate) callback: u32,
    pub(crate) flags: SliderFlags,
    pub(crate) active: bool,
}

impl Slider {
    /// Create a slider, clamping its footprint against the canvas.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        x: i32,
        y: i32,
        bar_width: i32,
        bar_length: i32,
        threshold: i32,
        value: i32,
        border_color: u32,
        bar_color: u32,
        flags: SliderFlags,
        callback: u32,
        canvas_width: i32,
        canvas_height: i32,
    ) -> Self {
        let mut slider = Self {
            x,
            y,
            bar_width,
            bar_length,
            threshold,
            value: value.clamp(0, bar_length),
            border_color,
            bar_color,
            bar_background_color: color::rgb565_to_argb(BAR_BACKGROUND_DEFAULT),
            threshold_color: color::RED,
            caption: String::new(),
            callback,
            flags,
            active: false,
        };
        slider.clamp_footprint(canvas_width, canvas_height);
        slider
    }

    /// Border thickness; a quarter of the bar width when a border is shown.
    fn border(&self) -> i32 {
        if self.flags.contains(SliderFlags::SHOW_BORDER) { self.bar_width / 4 } else { 0 }
    }

    /// Outer size, border included.
    #[must_use]
    pub fn footprint(&self) -> (i32, i32) {
        let border2 = self.border() * 2;
        if self.flags.contains(SliderFlags::HORIZONTAL) {
            (self.bar_length + border2, self.bar_width + border2)
        } else {
            (self.bar_width + border2, self.bar_length + border2)
        }
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Callback token.
    #[must_use]
    pub fn callback(&self) -> u32 {
        self.callback
    }

    /// Whether the slider participates in hit-testing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Outer origin.
    #[must_use]
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Clamp bar length/width so the outer rect stays on the canvas.
    pub(crate) fn clamp_footprint(&mut self, canvas_width: i32, canvas_height: i32) {
        let (width, height) = self.footprint();
        let over_x = self.x + width - canvas_width;
        let over_y = self.y + height - canvas_height;
        if over_x > 0 || over_y > 0 {
            warn!(
                x = self.x, y = self.y, width, height, canvas_width, canvas_height,
                "slider exceeds canvas, clamping"
            );
            if self.flags.contains(SliderFlags::HORIZONTAL) {
                self.bar_length -= over_x.max(0);
                self.bar_width -= over_y.max(0);
            } else {
                self.bar_width -= over_x.max(0);
                self.bar_length -= over_y.max(0);
            }
            self.bar_length = self.bar_length.max(0);
            self.bar_width = self.bar_width.max(0);
            self.value = self.value.clamp(0, self.bar_length);
        }
    }

    pub(crate) fn set_position(&mut self, x: i32, y: i32, canvas_width: i32, canvas_height: i32) {
        self.x = x;
        self.y = y;
        self.clamp_footprint(canvas_width, canvas_height);
    }

    pub(crate) fn set_caption(&mut self, caption: String) {
        self.caption = caption;
    }

    /// Whether a logical point lies inside the outer rect, edges included.
    #[must_use]
    pub(crate) fn contains(&self, x: i32, y: i32) -> bool {
        let (width, height) = self.footprint();
        (self.x..=self.x + width).contains(&x) && (self.y..=self.y + height).contains(&y)
    }

    /// Map a touch position to a bar value, clamped to the travel range.
    #[must_use]
    pub(crate) fn value_for_touch(&self, x: i32, y: i32) -> i32 {
        let border = self.border();
        let raw = if self.flags.contains(SliderFlags::HORIZONTAL) {
            x - (self.x + border)
        } else {
            // vertical sliders fill bottom-up
            (self.y + border + self.bar_length) - y
        };
        let clamped = raw.clamp(0, self.bar_length);
        if self.flags.contains(SliderFlags::INVERSE) { self.bar_length - clamped } else { clamped }
    }

    /// Fill color of the active bar part for the current value.
    fn fill_color(&self) -> u32 {
        if self.value >= self.threshold { self.threshold_color } else { self.bar_color }
    }

    /// Draw border, bar background and value fill. Drawing activates the
    /// slider.
    pub(crate) fn draw(&mut self, gfx: &mut dyn Renderer) {
        self.active = true;
        if self.flags.contains(SliderFlags::SHOW_BORDER) {
            self.draw_border(gfx);
        }
        self.draw_bar(gfx);
        if !self.caption.is_empty() {
            let (width, _) = self.footprint();
            let (caption_x, _) = text::center_line(self.x, width, TEXT_SIZE, self.caption.len());
            gfx.draw_text(
                caption_x,
                self.y - text::descend(TEXT_SIZE) - 1,
                &self.caption,
                TEXT_SIZE,
                color::BLACK,
                None,
            );
        }
    }

    /// Draw the border frame only.
    pub(crate) fn draw_border(&mut self, gfx: &mut dyn Renderer) {
        self.active = true;
        let (width, height) = self.footprint();
        gfx.fill_rect(self.x, self.y, width, height, self.border_color);
    }

    /// Draw bar background and value fill, the part that changes while
    /// dragging.
    pub(crate) fn draw_bar(&mut self, gfx: &mut dyn Renderer) {
        let border = self.border();
        let display_value =
            if self.flags.contains(SliderFlags::INVERSE) { self.bar_length - self.value } else { self.value };
        if self.flags.contains(SliderFlags::HORIZONTAL) {
            let bar_x = self.x + border;
            let bar_y = self.y + border;
            gfx.fill_rect(
                bar_x + display_value,
                bar_y,
                self.bar_length - display_value,
                self.bar_width,
                self.bar_background_color,
            );
            gfx.fill_rect(bar_x, bar_y, display_value, self.bar_width, self.fill_color());
        } else {
            let bar_x = self.x + border;
            let bar_y = self.y + border;
            gfx.fill_rect(
                bar_x,
                bar_y,
                self.bar_width,
                self.bar_length - display_value,
                self.bar_background_color,
            );
            gfx.fill_rect(
                bar_x,
                bar_y + self.bar_length - display_value,
                self.bar_width,
                display_value,
                self.fill_color(),
            );
        }
        if self.flags.contains(SliderFlags::SHOW_VALUE) {
            let (_, height) = self.footprint();
            gfx.draw_text(
                self.x,
                self.y + height + text::ascend(TEXT_SIZE),
                &self.value.to_string(),
                TEXT_SIZE,
                color::BLACK,
                None,
            );
        }
    }

    /// Print a client-formatted value string below the slider.
    pub(crate) fn print_value(&self, text_value: &str, gfx: &mut dyn Renderer) {
        let (_, height) = self.footprint();
        gfx.draw_text(
            self.x,
            self.y + height + text::ascend(TEXT_SIZE),
            text_value,
            TEXT_SIZE,
            color::BLACK,
            Some(color::WHITE),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_slider() -> Slider {
        Slider::new(
            100,
            50,
            16,
            120,
            60,
            0,
            color::BLACK,
            color::GREEN,
            SliderFlags::SHOW_BORDER,
            0x4000,
            320,
            240,
        )
    }

    #[test]
    fn vertical_touch_maps_bottom_up() {
        let slider = vertical_slider();
        let border = 4; // bar_width / 4
        // touch at the bottom end of the bar -> value 0
        assert_eq!(slider.value_for_touch(105, 50 + border + 120), 0);
        // touch at the top end -> full value
        assert_eq!(slider.value_for_touch(105, 50 + border), 120);
        // out of range clamps
        assert_eq!(slider.value_for_touch(105, 0), 120);
        assert_eq!(slider.value_for_touch(105, 500), 0);
    }

    #[test]
    fn horizontal_touch_maps_left_to_right() {
        let mut slider = vertical_slider();
        slider.flags = SliderFlags::HORIZONTAL;
        assert_eq!(slider.value_for_touch(slider.x + 30, 55), 30);
        assert_eq!(slider.value_for_touch(0, 55), 0);
    }

    #[test]
    fn inverse_flag_flips_the_travel() {
        let mut slider = vertical_slider();
        slider.flags = SliderFlags::HORIZONTAL | SliderFlags::INVERSE;
        assert_eq!(slider.value_for_touch(slider.x, 55), 120);
    }

    #[test]
    fn footprint_includes_the_border() {
        let slider = vertical_slider();
        assert_eq!(slider.footprint(), (16 + 8, 120 + 8));
    }

    #[test]
    fn oversize_slider_clamps_to_canvas() {
        let slider = Slider::new(
            300,
            200,
            16,
            120,
            0,
            0,
            color::BLACK,
            color::GREEN,
            SliderFlags::empty(),
            0,
            320,
            240,
        );
        let (width, height) = slider.footprint();
        assert!(300 + width <= 320);
        assert!(200 + height <= 240);
    }
}
