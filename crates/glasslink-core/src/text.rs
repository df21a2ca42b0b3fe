//! Monospace text metrics and caption layout.
//!
//! The host font is approximated by three factors of the nominal text size:
//! glyph width 0.6x, ascend 0.76x, descend 0.24x. Captions are centered
//! with exactly these formulas; embedded clients position their own labels
//! under the same assumptions, so the numbers are protocol, not styling.

/// Ascend above the baseline as a fraction of text size.
pub const ASCEND_FACTOR: f32 = 0.76;
/// Descend below the baseline as a fraction of text size.
pub const DESCEND_FACTOR: f32 = 0.24;
/// Glyph advance as a fraction of text size.
pub const WIDTH_FACTOR: f32 = 0.6;

/// Line pitch: one pixel of slack keeps descenders of the line above from
/// touching the next line.
#[must_use]
pub fn line_pitch(size: u16) -> i32 {
    i32::from(size) + 1
}

/// Ascend in pixels, rounded.
#[must_use]
pub fn ascend(size: u16) -> i32 {
    (f32::from(size) * ASCEND_FACTOR + 0.5) as i32
}

/// Descend in pixels, rounded.
#[must_use]
pub fn descend(size: u16) -> i32 {
    (f32::from(size) * DESCEND_FACTOR + 0.5) as i32
}

/// Advance of one glyph in pixels, rounded.
#[must_use]
pub fn char_width(size: u16) -> i32 {
    (f32::from(size) * WIDTH_FACTOR + 0.5) as i32
}

/// Width of `chars` glyphs in pixels, rounded once (not per glyph).
#[must_use]
pub fn text_width(size: u16, chars: usize) -> i32 {
    (WIDTH_FACTOR * f32::from(size) * chars as f32 + 0.5) as i32
}

/// Horizontal placement of one caption line inside a box.
///
/// Centered when it fits; a line at least as wide as the box is anchored at
/// the box origin instead (the caller warns, drawing never fails).
#[must_use]
pub fn center_line(box_x: i32, box_width: i32, size: u16, chars: usize) -> (i32, bool) {
    let width = text_width(size, chars);
    if width >= box_width {
        (box_x, false)
    } else {
        (box_x + (box_width - width) / 2, true)
    }
}

/// Vertical baseline placement of a caption of `lines` lines inside a box.
///
/// Single line and multi-line share the shape `top + ascend`: the block of
/// text is centered when it fits, otherwise anchored at the box top (the
/// caller warns).
#[must_use]
pub fn center_block(box_y: i32, box_height: i32, size: u16, lines: usize) -> (i32, bool) {
    let text_height = i32::from(size) * lines as i32;
    if text_height >= box_height {
        (box_y + ascend(size), false)
    } else {
        (box_y + (box_height - text_height) / 2 + ascend(size), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_round_like_the_wire_peers_expect() {
        assert_eq!(ascend(16), 12); // 12.16 -> 12
        assert_eq!(descend(16), 4);
        assert_eq!(char_width(16), 10); // 9.6 -> 10
        assert_eq!(text_width(16, 5), 48); // 48.0 exactly
        assert_eq!(line_pitch(16), 17);
    }

    #[test]
    fn fitting_line_is_centered() {
        // 5 chars at size 10 -> 30 px in a 100 px box -> x = 35
        let (x, fits) = center_line(0, 100, 10, 5);
        assert!(fits);
        assert_eq!(x, 35);
    }

    #[test]
    fn overflowing_line_left_aligns() {
        let (x, fits) = center_line(40, 20, 10, 5);
        assert!(!fits);
        assert_eq!(x, 40);
    }

    #[test]
    fn fitting_block_is_centered() {
        // two lines of size 10 in a 40 px box at y=100:
        // y = 100 + (40 - 20)/2 + ascend(10) = 100 + 10 + 8
        let (y, fits) = center_block(100, 40, 10, 2);
        assert!(fits);
        assert_eq!(y, 118);
    }

    #[test]
    fn overflowing_block_anchors_at_top() {
        let (y, fits) = center_block(100, 15, 10, 2);
        assert!(!fits);
        assert_eq!(y, 100 + ascend(10));
    }
}
