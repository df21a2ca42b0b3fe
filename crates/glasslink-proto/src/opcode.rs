//! Opcode numbering and range classification.
//!
//! The opcode space is partitioned into fixed ranges so the dispatcher can
//! route a message without knowing every command. Values 0x01..=0x07 are
//! data tags, never opcodes (see [`crate::message`]). 0x7F is a NOP used by
//! clients as resynchronization padding.
//!
//! The constants below name the commands the host interprets. Unknown values
//! inside a known range are still routed to that range's handler, which logs
//! and ignores them; the stream itself never fails on an unknown opcode.

/// Coarse routing class of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// Internal/global commands (0x08..=0x0F)
    Global,
    /// Display primitives with fixed parameters (0x10..=0x3F)
    Display,
    /// Button commands (0x40..=0x4F)
    Button,
    /// Slider commands (0x50..=0x5F)
    Slider,
    /// Display commands with a data block (0x60..=0x6F)
    DisplayWithData,
    /// Button commands with a data block (0x70..=0x77)
    ButtonWithData,
    /// Slider commands with a data block (0x78..=0x7E)
    SliderWithData,
    /// Resynchronization padding (0x7F), always a no-op
    Nop,
}

impl CommandClass {
    /// Classify an opcode by range. `None` for data tags, 0x00 and values
    /// above 0x7F, which are never valid opcodes.
    #[must_use]
    pub fn of(opcode: u8) -> Option<Self> {
        match opcode {
            0x08..=0x0F => Some(Self::Global),
            0x10..=0x3F => Some(Self::Display),
            0x40..=0x4F => Some(Self::Button),
            0x50..=0x5F => Some(Self::Slider),
            0x60..=0x6F => Some(Self::DisplayWithData),
            0x70..=0x77 => Some(Self::ButtonWithData),
            0x78..=0x7E => Some(Self::SliderWithData),
            0x7F => Some(Self::Nop),
            _ => None,
        }
    }
}

/// Whether a message with this opcode is followed by a data block.
///
/// This is a structural property of the grammar: the decoder must know
/// whether to wait for a data block before surfacing the message.
#[must_use]
pub fn expects_data(opcode: u8) -> bool {
    matches!(
        CommandClass::of(opcode),
        Some(
            CommandClass::DisplayWithData
                | CommandClass::ButtonWithData
                | CommandClass::SliderWithData
        )
    )
}

/// Named command opcodes, grouped the way the ranges are.
pub mod cmd {
    /// Global settings (canvas size, flags, character mapping, timeouts)
    pub const GLOBAL_SETTINGS: u8 = 0x08;
    /// Request the maximum canvas size; answered with a canvas-size event
    pub const REQUEST_MAX_CANVAS_SIZE: u8 = 0x09;
    /// Enable/disable a host sensor
    pub const SENSOR_SETTINGS: u8 = 0x0A;
    /// Prompt the user for a number
    pub const GET_NUMBER: u8 = 0x0C;
    /// Prompt the user for a text line
    pub const GET_TEXT: u8 = 0x0D;
    /// Query host info (currently: local/UTC time)
    pub const GET_INFO: u8 = 0x0E;
    /// Play a tone on the host
    pub const PLAY_TONE: u8 = 0x0F;

    /// Clear the whole canvas with a color
    pub const CLEAR_DISPLAY: u8 = 0x10;
    /// Present the current canvas
    pub const DRAW_DISPLAY: u8 = 0x11;
    /// Optional clear, only meaningful as a skip marker inside buffers
    pub const CLEAR_DISPLAY_OPTIONAL: u8 = 0x12;
    /// Single pixel
    pub const DRAW_PIXEL: u8 = 0x14;
    /// Single character (parameter-carried, no data block)
    pub const DRAW_CHAR: u8 = 0x16;
    /// Line relative to start point
    pub const DRAW_LINE_REL: u8 = 0x20;
    /// Line with absolute endpoints
    pub const DRAW_LINE: u8 = 0x21;
    /// Outlined rectangle, size-relative
    pub const DRAW_RECT_REL: u8 = 0x24;
    /// Filled rectangle, size-relative
    pub const FILL_RECT_REL: u8 = 0x25;
    /// Outlined rectangle, absolute corners
    pub const DRAW_RECT: u8 = 0x26;
    /// Filled rectangle, absolute corners
    pub const FILL_RECT: u8 = 0x27;
    /// Outlined circle
    pub const DRAW_CIRCLE: u8 = 0x28;
    /// Filled circle
    pub const FILL_CIRCLE: u8 = 0x29;
    /// Vector from start point, angle in degrees
    pub const DRAW_VECTOR_DEGREE: u8 = 0x2C;
    /// Vector from start point, angle in radians (f32 across two params)
    pub const DRAW_VECTOR_RADIAN: u8 = 0x2D;
    /// Print-emulation settings (text size/colors, cursor position)
    pub const WRITE_SETTINGS: u8 = 0x34;

    /// Text at a position, data block carries the string
    pub const DRAW_STRING: u8 = 0x60;
    /// Debug text, surfaced to the runtime instead of drawn
    pub const DEBUG_STRING: u8 = 0x61;
    /// Print-emulation output with line/page wrapping
    pub const WRITE_STRING: u8 = 0x62;
    /// GET_NUMBER with a short prompt in the data block
    pub const GET_NUMBER_WITH_SHORT_PROMPT: u8 = 0x64;
    /// GET_TEXT with a short prompt in the data block
    pub const GET_TEXT_WITH_SHORT_PROMPT: u8 = 0x65;
    /// Outlined polygon path, vertices in the data block
    pub const DRAW_PATH: u8 = 0x68;
    /// Filled polygon path
    pub const FILL_PATH: u8 = 0x69;
    /// Chart trace from byte samples
    pub const DRAW_CHART: u8 = 0x6A;
    /// Chart trace without immediate presentation
    pub const DRAW_CHART_WITHOUT_DIRECT_RENDERING: u8 = 0x6B;

    /// Resynchronization padding
    pub const NOP: u8 = 0x7F;
}

/// Button command opcodes (0x40..=0x4F fixed, 0x70..=0x77 with data).
pub mod button {
    /// Draw button box and caption
    pub const DRAW: u8 = 0x40;
    /// Draw caption only
    pub const DRAW_CAPTION: u8 = 0x41;
    /// Per-field settings, subcommand in parameter 1
    pub const SETTINGS: u8 = 0x42;
    /// Clear the drawn area; the button object persists
    pub const REMOVE: u8 = 0x43;
    /// Activate every button
    pub const ACTIVATE_ALL: u8 = 0x48;
    /// Deactivate every button
    pub const DEACTIVATE_ALL: u8 = 0x49;
    /// Global button settings (trigger mode, beep tone)
    pub const GLOBAL_SETTINGS: u8 = 0x4A;
    /// GLOBAL_SETTINGS flag: trigger buttons on touch up instead of down
    pub const GLOBAL_FLAG_USE_UP_EVENTS: u16 = 0x01;
    /// GLOBAL_SETTINGS flag: the following parameters configure the beep
    pub const GLOBAL_FLAG_SET_BEEP_TONE: u16 = 0x02;

    /// Create or replace a button; caption in the data block
    pub const INIT: u8 = 0x70;
    /// Caption used while the value is true (red/green buttons)
    pub const SET_CAPTION_FOR_VALUE_TRUE: u8 = 0x71;
    /// Replace the caption
    pub const SET_CAPTION: u8 = 0x72;
    /// Replace the caption and redraw
    pub const SET_CAPTION_AND_DRAW: u8 = 0x73;

    /// Subcommands of [`SETTINGS`], carried in parameter 1.
    pub mod set {
        /// Box color
        pub const BUTTON_COLOR: u16 = 0x00;
        /// Box color, then redraw
        pub const BUTTON_COLOR_AND_DRAW: u16 = 0x01;
        /// Caption color
        pub const CAPTION_COLOR: u16 = 0x02;
        /// Caption color, then redraw
        pub const CAPTION_COLOR_AND_DRAW: u16 = 0x03;
        /// Value (16- or 32-bit by arity)
        pub const VALUE: u16 = 0x04;
        /// Value, then redraw
        pub const VALUE_AND_DRAW: u16 = 0x05;
        /// Box color and value together
        pub const COLOR_AND_VALUE: u16 = 0x06;
        /// Box color and value, then redraw
        pub const COLOR_AND_VALUE_AND_DRAW: u16 = 0x07;
        /// Position (re-clamped against the canvas)
        pub const POSITION: u16 = 0x08;
        /// Position, then redraw
        pub const POSITION_AND_DRAW: u16 = 0x09;
        /// Activate for hit-testing
        pub const ACTIVE: u16 = 0x10;
        /// Deactivate for hit-testing
        pub const INACTIVE: u16 = 0x11;
        /// Autorepeat delays/rates; refused on non-autorepeat buttons
        pub const AUTOREPEAT_TIMING: u16 = 0x12;
        /// Callback address (16- or 32-bit by arity)
        pub const CALLBACK: u16 = 0x20;
    }
}

/// Slider command opcodes (0x50..=0x5F fixed, 0x78..=0x7E with data).
pub mod slider {
    /// Create or replace a slider
    pub const INIT: u8 = 0x50;
    /// Draw bar, border and value fill
    pub const DRAW: u8 = 0x51;
    /// Per-field settings, subcommand in parameter 1
    pub const SETTINGS: u8 = 0x52;
    /// Draw border only
    pub const DRAW_BORDER: u8 = 0x53;
    /// Activate every slider
    pub const ACTIVATE_ALL: u8 = 0x58;
    /// Deactivate every slider
    pub const DEACTIVATE_ALL: u8 = 0x59;
    /// Global slider settings
    pub const GLOBAL_SETTINGS: u8 = 0x5A;
    /// Caption text in the data block
    pub const SET_CAPTION: u8 = 0x78;
    /// Print a value string next to the slider
    pub const PRINT_VALUE: u8 = 0x79;

    /// Subcommands of [`SETTINGS`], carried in parameter 1.
    pub mod set {
        /// Color of the value fill below the threshold
        pub const BAR_COLOR: u16 = 0x00;
        /// Color of the value fill at/above the threshold
        pub const THRESHOLD_COLOR: u16 = 0x01;
        /// Border color
        pub const BORDER_COLOR: u16 = 0x02;
        /// Current value
        pub const VALUE: u16 = 0x04;
        /// Current value, then redraw
        pub const VALUE_AND_DRAW: u16 = 0x05;
        /// Threshold value
        pub const THRESHOLD: u16 = 0x06;
        /// Position (re-clamped against the canvas)
        pub const POSITION: u16 = 0x08;
        /// Activate for hit-testing
        pub const ACTIVE: u16 = 0x10;
        /// Deactivate for hit-testing
        pub const INACTIVE: u16 = 0x11;
        /// Callback address (16- or 32-bit by arity)
        pub const CALLBACK: u16 = 0x20;
    }
}

/// Subcommands of [`cmd::GLOBAL_SETTINGS`], carried in parameter 0.
pub mod global {
    /// Reset/configure session flags and set the requested canvas size
    pub const SET_FLAGS_AND_SIZE: u16 = 0x00;
    /// Select a codepage for high characters
    pub const SET_CODEPAGE: u16 = 0x01;
    /// Map one high character code to a unicode char
    pub const SET_CHARACTER_MAPPING: u16 = 0x02;
    /// Long-touch timeout in ms; 0 disables long-touch
    pub const SET_LONG_TOUCH_DOWN_TIMEOUT: u16 = 0x08;
    /// Lock or unlock the screen orientation
    pub const SET_SCREEN_ORIENTATION_LOCK: u16 = 0x0C;

    /// Flag bits of [`SET_FLAGS_AND_SIZE`] parameter 1.
    pub mod flags {
        /// Reset widgets, sensors and session flags first
        pub const RESET_ALL: u16 = 0x01;
        /// Do not send basic touch events
        pub const TOUCH_BASIC_DISABLE: u16 = 0x02;
        /// Do not send touch move events
        pub const TOUCH_MOVE_DISABLE: u16 = 0x04;
        /// Enable long-touch detection
        pub const LONG_TOUCH_ENABLE: u16 = 0x08;
        /// Scale the canvas to the maximum that fits the view
        pub const USE_MAX_SIZE: u16 = 0x10;
    }

    /// Orientation lock values of [`SET_SCREEN_ORIENTATION_LOCK`].
    pub mod orientation {
        /// Lock to landscape
        pub const LANDSCAPE: u16 = 0x00;
        /// Lock to portrait
        pub const PORTRAIT: u16 = 0x01;
        /// Lock to whatever is current
        pub const CURRENT: u16 = 0x02;
        /// Release the lock
        pub const UNLOCK: u16 = 0x03;
    }
}

/// Subcommands of [`cmd::GET_INFO`], carried in parameter 0.
pub mod info {
    /// Local time (UTC offset applied by the host)
    pub const LOCAL_TIME: u16 = 0x00;
    /// UTC time
    pub const UTC_TIME: u16 = 0x01;
}

/// Subcommands of [`cmd::WRITE_SETTINGS`], carried in parameter 0.
pub mod write {
    /// Text size, color, background color, clear-on-wrap flag
    pub const SET_SIZE_AND_COLORS_AND_FLAGS: u16 = 0x00;
    /// Cursor position in pixels
    pub const SET_POSITION: u16 = 0x01;
    /// Cursor position in character cells
    pub const SET_LINE_COLUMN: u16 = 0x02;
}
