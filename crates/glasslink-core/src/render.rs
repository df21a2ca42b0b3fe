//! Renderer capability.
//!
//! Actual pixel drawing is outside this crate: the session describes what to
//! draw in logical (pre-scale) canvas coordinates and the runtime's renderer
//! rasterizes it, applying the session's scale factor. Keeping drawing
//! behind this seam makes the whole interpreter testable against a
//! recording implementation.

/// Drawing operations the session requires from its host.
///
/// All coordinates are logical canvas coordinates; the implementation is
/// responsible for scaling. Colors are 32-bit ARGB as produced by
/// [`glasslink_proto::color`].
pub trait Renderer {
    /// Fill the whole canvas.
    fn clear(&mut self, color: u32);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: u32);

    /// Stroke an axis-aligned rectangle.
    fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: u32, stroke: u16);

    /// Stroke a line segment. Zero-length lines degenerate to a point.
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32, stroke: u16);

    /// Set a single pixel.
    fn draw_pixel(&mut self, x: i32, y: i32, color: u32);

    /// Stroke a circle.
    fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32, stroke: u16);

    /// Fill a circle.
    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32);

    /// Stroke an open polyline (chart traces).
    fn draw_polyline(&mut self, points: &[(i32, i32)], color: u32, stroke: u16);

    /// Stroke a closed path.
    fn draw_path(&mut self, points: &[(i32, i32)], color: u32, stroke: u16);

    /// Fill a closed path.
    fn fill_path(&mut self, points: &[(i32, i32)], color: u32);

    /// Draw one line of monospace text.
    ///
    /// `y` is the text baseline. When `background` is set the implementation
    /// fills the text cell box (ascend above, descend below the baseline)
    /// before drawing the glyphs.
    fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        size: u16,
        color: u32,
        background: Option<u32>,
    );
}
