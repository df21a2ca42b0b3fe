//! Renderer that records draw calls instead of rasterizing.

use glasslink_core::Renderer;

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Whole-canvas clear
    Clear {
        /// Fill color
        color: u32,
    },
    /// Filled rectangle
    FillRect {
        /// Origin x
        x: i32,
        /// Origin y
        y: i32,
        /// Width
        width: i32,
        /// Height
        height: i32,
        /// Fill color
        color: u32,
    },
    /// Stroked rectangle
    DrawRect {
        /// Origin x
        x: i32,
        /// Origin y
        y: i32,
        /// Width
        width: i32,
        /// Height
        height: i32,
        /// Stroke color
        color: u32,
        /// Stroke width
        stroke: u16,
    },
    /// Line segment
    DrawLine {
        /// Start x
        x0: i32,
        /// Start y
        y0: i32,
        /// End x
        x1: i32,
        /// End y
        y1: i32,
        /// Stroke color
        color: u32,
        /// Stroke width
        stroke: u16,
    },
    /// Single pixel
    DrawPixel {
        /// X
        x: i32,
        /// Y
        y: i32,
        /// Color
        color: u32,
    },
    /// Stroked circle
    DrawCircle {
        /// Center x
        cx: i32,
        /// Center y
        cy: i32,
        /// Radius
        radius: i32,
        /// Stroke color
        color: u32,
        /// Stroke width
        stroke: u16,
    },
    /// Filled circle
    FillCircle {
        /// Center x
        cx: i32,
        /// Center y
        cy: i32,
        /// Radius
        radius: i32,
        /// Fill color
        color: u32,
    },
    /// Open polyline
    Polyline {
        /// Vertices
        points: Vec<(i32, i32)>,
        /// Stroke color
        color: u32,
    },
    /// Stroked closed path
    Path {
        /// Vertices
        points: Vec<(i32, i32)>,
        /// Stroke color
        color: u32,
    },
    /// Filled closed path
    FillPath {
        /// Vertices
        points: Vec<(i32, i32)>,
        /// Fill color
        color: u32,
    },
    /// Text run
    Text {
        /// Baseline start x
        x: i32,
        /// Baseline y
        y: i32,
        /// Drawn text
        text: String,
        /// Nominal size
        size: u16,
        /// Text color
        color: u32,
        /// Cell background, if filled
        background: Option<u32>,
    },
}

/// Renderer capability that appends every call to an op log.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    /// Recorded calls in order
    pub ops: Vec<DrawOp>,
}

impl RecordingRenderer {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything recorded so far.
    pub fn clear_log(&mut self) {
        self.ops.clear();
    }

    /// All recorded text runs, in draw order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Baselines of all recorded text runs, in draw order.
    #[must_use]
    pub fn text_baselines(&self) -> Vec<(i32, i32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self, color: u32) {
        self.ops.push(DrawOp::Clear { color });
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: u32) {
        self.ops.push(DrawOp::FillRect { x, y, width, height, color });
    }

    fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: u32, stroke: u16) {
        self.ops.push(DrawOp::DrawRect { x, y, width, height, color, stroke });
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32, stroke: u16) {
        self.ops.push(DrawOp::DrawLine { x0, y0, x1, y1, color, stroke });
    }

    fn draw_pixel(&mut self, x: i32, y: i32, color: u32) {
        self.ops.push(DrawOp::DrawPixel { x, y, color });
    }

    fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32, stroke: u16) {
        self.ops.push(DrawOp::DrawCircle { cx, cy, radius, color, stroke });
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        self.ops.push(DrawOp::FillCircle { cx, cy, radius, color });
    }

    fn draw_polyline(&mut self, points: &[(i32, i32)], color: u32, _stroke: u16) {
        self.ops.push(DrawOp::Polyline { points: points.to_vec(), color });
    }

    fn draw_path(&mut self, points: &[(i32, i32)], color: u32, _stroke: u16) {
        self.ops.push(DrawOp::Path { points: points.to_vec(), color });
    }

    fn fill_path(&mut self, points: &[(i32, i32)], color: u32) {
        self.ops.push(DrawOp::FillPath { points: points.to_vec(), color });
    }

    fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        size: u16,
        color: u32,
        background: Option<u32>,
    ) {
        self.ops.push(DrawOp::Text { x, y, text: text.to_string(), size, color, background });
    }
}
