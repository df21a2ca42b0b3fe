//! Host-generated events and their outbound encoding.
//!
//! The host answers the client with events: raw touch actions, GUI
//! callbacks, lifecycle notifications and query results. Events use the
//! same framing grammar as inbound commands; the channel is symmetric.
//!
//! Each event kind has a fixed parameter shape. Tags below
//! [`FIRST_CALLBACK_TAG`] are raw pointer actions with a small payload;
//! callback tags carry the larger fixed payloads. The embedded receiver
//! uses that split to sanity-check advertised lengths (see
//! [`crate::receiver`]).
//!
//! Only move events are ever coalesced (the router suppresses zero-moves);
//! everything else is sent immediately. At the low baud rates in scope the
//! payloads are small enough that latency wins over batching.

use bytes::BufMut;

use crate::{
    encode,
    errors::ProtocolError,
    message::DataTag,
};

/// First tag value of the callback event family.
pub const FIRST_CALLBACK_TAG: u8 = 0x20;

/// Raw pointer action carried by a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TouchAction {
    /// Pointer went down
    Down = 0x00,
    /// Pointer moved
    Move = 0x01,
    /// Pointer went up
    Up = 0x02,
    /// Gesture cancelled by the platform
    Cancel = 0x03,
}

impl TouchAction {
    /// Parse an action tag.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Down),
            0x01 => Some(Self::Move),
            0x02 => Some(Self::Up),
            0x03 => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Host sensor kinds, numbered like the platform sensor types the original
/// clients were built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorKind {
    /// Accelerometer, m/s^2 including gravity
    Accelerometer = 1,
    /// Magnetic field, uT
    MagneticField = 2,
    /// Gyroscope, rad/s
    Gyroscope = 4,
    /// Gravity vector, m/s^2
    Gravity = 9,
    /// Linear acceleration, m/s^2 excluding gravity
    LinearAcceleration = 10,
}

impl SensorKind {
    /// Parse a sensor kind number.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Accelerometer),
            2 => Some(Self::MagneticField),
            4 => Some(Self::Gyroscope),
            9 => Some(Self::Gravity),
            10 => Some(Self::LinearAcceleration),
            _ => None,
        }
    }
}

/// Event tag byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTag {
    /// Raw pointer action (tags 0x00..=0x03)
    Touch(TouchAction),
    /// Connection established; carries canvas size and a timestamp (0x10)
    ConnectionBuildUp,
    /// Canvas was rescaled; client should redraw (0x11)
    Redraw,
    /// Screen orientation changed (0x12)
    Reorientation,
    /// Host is going away (0x14)
    Disconnect,
    /// Button was triggered (0x20)
    ButtonCallback,
    /// Slider value changed (0x21)
    SliderCallback,
    /// Swipe recognized on empty canvas (0x22)
    Swipe,
    /// Long touch recognized (0x23)
    LongTouchDown,
    /// Number input dialog result (0x28)
    NumberResult,
    /// Info query result (0x29)
    InfoResult,
    /// Text input dialog result, string in the data block (0x2A)
    TextResult,
    /// Outbound padding (0x2F)
    Nop,
    /// Sensor sample (0x30 + sensor kind)
    Sensor(SensorKind),
    /// Maximum canvas size response (0x60)
    CanvasSize,
}

/// First tag value of the sensor event family.
const FIRST_SENSOR_TAG: u8 = 0x30;

impl EventTag {
    /// Wire tag byte.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Touch(action) => action as u8,
            Self::ConnectionBuildUp => 0x10,
            Self::Redraw => 0x11,
            Self::Reorientation => 0x12,
            Self::Disconnect => 0x14,
            Self::ButtonCallback => 0x20,
            Self::SliderCallback => 0x21,
            Self::Swipe => 0x22,
            Self::LongTouchDown => 0x23,
            Self::NumberResult => 0x28,
            Self::InfoResult => 0x29,
            Self::TextResult => 0x2A,
            Self::Nop => 0x2F,
            Self::Sensor(kind) => FIRST_SENSOR_TAG + kind as u8,
            Self::CanvasSize => 0x60,
        }
    }

    /// Parse a wire tag byte.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00..=0x03 => TouchAction::from_u8(value).map(Self::Touch),
            0x10 => Some(Self::ConnectionBuildUp),
            0x11 => Some(Self::Redraw),
            0x12 => Some(Self::Reorientation),
            0x14 => Some(Self::Disconnect),
            0x20 => Some(Self::ButtonCallback),
            0x21 => Some(Self::SliderCallback),
            0x22 => Some(Self::Swipe),
            0x23 => Some(Self::LongTouchDown),
            0x28 => Some(Self::NumberResult),
            0x29 => Some(Self::InfoResult),
            0x2A => Some(Self::TextResult),
            0x2F => Some(Self::Nop),
            0x30..=0x3F => SensorKind::from_u8(value - FIRST_SENSOR_TAG).map(Self::Sensor),
            0x60 => Some(Self::CanvasSize),
            _ => None,
        }
    }

    /// True for callback-family tags (larger fixed payload).
    #[must_use]
    pub fn is_callback(self) -> bool {
        self.to_u8() >= FIRST_CALLBACK_TAG
    }

    /// Fixed parameter count of this event kind.
    #[must_use]
    pub fn param_count(self) -> usize {
        match self {
            Self::Touch(_) => 3,
            Self::Redraw | Self::Disconnect | Self::LongTouchDown | Self::TextResult => 2,
            Self::ConnectionBuildUp
            | Self::Reorientation
            | Self::NumberResult
            | Self::CanvasSize => 4,
            Self::ButtonCallback | Self::SliderCallback | Self::Swipe => 5,
            Self::InfoResult => 8,
            Self::Nop => 0,
            Self::Sensor(_) => 6,
        }
    }

    /// True when a data block follows the parameters.
    #[must_use]
    pub fn expects_data(self) -> bool {
        matches!(self, Self::TextResult)
    }
}

/// One host-to-client event.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Raw pointer action on empty canvas.
    Touch {
        /// Action kind
        action: TouchAction,
        /// Logical x
        x: u16,
        /// Logical y
        y: u16,
        /// Pointer slot index
        pointer: u8,
    },

    /// Connection established.
    ConnectionBuildUp {
        /// Current canvas width
        width: u16,
        /// Current canvas height
        height: u16,
        /// UNIX seconds at the host
        timestamp: u32,
    },

    /// Canvas rescaled; the client should redraw.
    Redraw {
        /// New canvas width
        width: u16,
        /// New canvas height
        height: u16,
    },

    /// View reoriented; carries the new maximum size.
    Reorientation {
        /// New view width
        width: u16,
        /// New view height
        height: u16,
        /// UNIX seconds at the host
        timestamp: u32,
    },

    /// Host is going away.
    Disconnect {
        /// Last view width
        width: u16,
        /// Last view height
        height: u16,
    },

    /// A button fired (touch or autorepeat).
    ButtonCallback {
        /// Widget handle
        index: u16,
        /// Callback token, echoed verbatim
        callback: u32,
        /// Current button value
        value: u32,
    },

    /// A slider value changed.
    SliderCallback {
        /// Widget handle
        index: u16,
        /// Callback token, echoed verbatim
        callback: u32,
        /// Current slider value
        value: u32,
    },

    /// Swipe recognized on otherwise-empty canvas.
    Swipe {
        /// True for a horizontal swipe
        horizontal: bool,
        /// Gesture start x (logical)
        start_x: u16,
        /// Gesture start y (logical)
        start_y: u16,
        /// Signed x displacement (logical)
        delta_x: i16,
        /// Signed y displacement (logical)
        delta_y: i16,
    },

    /// Long touch recognized.
    LongTouchDown {
        /// Down position x (logical)
        x: u16,
        /// Down position y (logical)
        y: u16,
    },

    /// Result of a number input dialog.
    NumberResult {
        /// Callback token, echoed verbatim
        callback: u32,
        /// Entered value
        value: f32,
    },

    /// Result of a text input dialog; text travels in the data block.
    TextResult {
        /// Callback token, echoed verbatim
        callback: u32,
        /// Entered text bytes
        text: Vec<u8>,
    },

    /// Info query result (time subfunctions).
    InfoResult {
        /// Echoed subfunction
        subfunction: u16,
        /// Callback token, echoed verbatim
        callback: u32,
        /// Whether the host timezone uses daylight saving
        uses_daylight_time: bool,
        /// Offset from UTC in milliseconds
        utc_offset_millis: i32,
        /// Requested timestamp, UNIX seconds
        timestamp: u32,
    },

    /// Outbound padding.
    Nop,

    /// One sensor sample.
    Sensor {
        /// Which sensor produced the sample
        kind: SensorKind,
        /// X axis value
        x: f32,
        /// Y axis value
        y: f32,
        /// Z axis value
        z: f32,
    },

    /// Maximum canvas size response.
    CanvasSize {
        /// Maximum view width
        width: u16,
        /// Maximum view height
        height: u16,
        /// UNIX seconds at the host
        timestamp: u32,
    },
}

fn push_u32(params: &mut Vec<u16>, value: u32) {
    params.push((value & 0xFFFF) as u16);
    params.push((value >> 16) as u16);
}

fn push_f32(params: &mut Vec<u16>, value: f32) {
    push_u32(params, value.to_bits());
}

impl HostEvent {
    /// Tag of this event.
    #[must_use]
    pub fn tag(&self) -> EventTag {
        match self {
            Self::Touch { action, .. } => EventTag::Touch(*action),
            Self::ConnectionBuildUp { .. } => EventTag::ConnectionBuildUp,
            Self::Redraw { .. } => EventTag::Redraw,
            Self::Reorientation { .. } => EventTag::Reorientation,
            Self::Disconnect { .. } => EventTag::Disconnect,
            Self::ButtonCallback { .. } => EventTag::ButtonCallback,
            Self::SliderCallback { .. } => EventTag::SliderCallback,
            Self::Swipe { .. } => EventTag::Swipe,
            Self::LongTouchDown { .. } => EventTag::LongTouchDown,
            Self::NumberResult { .. } => EventTag::NumberResult,
            Self::TextResult { .. } => EventTag::TextResult,
            Self::InfoResult { .. } => EventTag::InfoResult,
            Self::Nop => EventTag::Nop,
            Self::Sensor { kind, .. } => EventTag::Sensor(*kind),
            Self::CanvasSize { .. } => EventTag::CanvasSize,
        }
    }

    /// Fixed parameter list of this event.
    #[must_use]
    pub fn params(&self) -> Vec<u16> {
        let mut params = Vec::with_capacity(self.tag().param_count());
        match self {
            Self::Touch { x, y, pointer, .. } => {
                params.extend([*x, *y, u16::from(*pointer)]);
            },
            Self::ConnectionBuildUp { width, height, timestamp }
            | Self::Reorientation { width, height, timestamp }
            | Self::CanvasSize { width, height, timestamp } => {
                params.extend([*width, *height]);
                push_u32(&mut params, *timestamp);
            },
            Self::Redraw { width, height } | Self::Disconnect { width, height } => {
                params.extend([*width, *height]);
            },
            Self::ButtonCallback { index, callback, value }
            | Self::SliderCallback { index, callback, value } => {
                params.push(*index);
                push_u32(&mut params, *callback);
                push_u32(&mut params, *value);
            },
            Self::Swipe { horizontal, start_x, start_y, delta_x, delta_y } => {
                params.extend([
                    u16::from(*horizontal),
                    *start_x,
                    *start_y,
                    *delta_x as u16,
                    *delta_y as u16,
                ]);
            },
            Self::LongTouchDown { x, y } => params.extend([*x, *y]),
            Self::NumberResult { callback, value } => {
                push_u32(&mut params, *callback);
                push_f32(&mut params, *value);
            },
            Self::TextResult { callback, .. } => push_u32(&mut params, *callback),
            Self::InfoResult {
                subfunction,
                callback,
                uses_daylight_time,
                utc_offset_millis,
                timestamp,
            } => {
                params.push(*subfunction);
                push_u32(&mut params, *callback);
                params.push(u16::from(*uses_daylight_time));
                push_u32(&mut params, *utc_offset_millis as u32);
                push_u32(&mut params, *timestamp);
            },
            Self::Nop => {},
            Self::Sensor { x, y, z, .. } => {
                push_f32(&mut params, *x);
                push_f32(&mut params, *y);
                push_f32(&mut params, *z);
            },
        }
        debug_assert_eq!(params.len(), self.tag().param_count());
        params
    }

    /// Encode this event with the shared framing grammar.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<(), ProtocolError> {
        encode::write_header(self.tag().to_u8(), &self.params(), dst)?;
        if let Self::TextResult { text, .. } = self {
            encode::write_data_block(DataTag::Byte, text, dst)?;
        }
        Ok(())
    }

    /// Rebuild an event from its wire pieces.
    ///
    /// Used by the client side of the link and by symmetry tests. Returns
    /// `None` when the parameter count does not match the tag's shape.
    #[must_use]
    pub fn decode(tag: EventTag, params: &[u16], data: &[u8]) -> Option<Self> {
        if params.len() != tag.param_count() {
            return None;
        }
        let u32_at = |lo: usize| u32::from(params[lo]) | (u32::from(params[lo + 1]) << 16);
        let f32_at = |lo: usize| f32::from_bits(u32_at(lo));

        Some(match tag {
            EventTag::Touch(action) => Self::Touch {
                action,
                x: params[0],
                y: params[1],
                pointer: params[2] as u8,
            },
            EventTag::ConnectionBuildUp => Self::ConnectionBuildUp {
                width: params[0],
                height: params[1],
                timestamp: u32_at(2),
            },
            EventTag::Redraw => Self::Redraw { width: params[0], height: params[1] },
            EventTag::Reorientation => Self::Reorientation {
                width: params[0],
                height: params[1],
                timestamp: u32_at(2),
            },
            EventTag::Disconnect => Self::Disconnect { width: params[0], height: params[1] },
            EventTag::ButtonCallback => Self::ButtonCallback {
                index: params[0],
                callback: u32_at(1),
                value: u32_at(3),
            },
            EventTag::SliderCallback => Self::SliderCallback {
                index: params[0],
                callback: u32_at(1),
                value: u32_at(3),
            },
            EventTag::Swipe => Self::Swipe {
                horizontal: params[0] != 0,
                start_x: params[1],
                start_y: params[2],
                delta_x: params[3] as i16,
                delta_y: params[4] as i16,
            },
            EventTag::LongTouchDown => Self::LongTouchDown { x: params[0], y: params[1] },
            EventTag::NumberResult => Self::NumberResult { callback: u32_at(0), value: f32_at(2) },
            EventTag::TextResult => Self::TextResult { callback: u32_at(0), text: data.to_vec() },
            EventTag::InfoResult => Self::InfoResult {
                subfunction: params[0],
                callback: u32_at(1),
                uses_daylight_time: params[3] != 0,
                utc_offset_millis: u32_at(4) as i32,
                timestamp: u32_at(6),
            },
            EventTag::Nop => Self::Nop,
            EventTag::Sensor(kind) => Self::Sensor {
                kind,
                x: f32_at(0),
                y: f32_at(2),
                z: f32_at(4),
            },
            EventTag::CanvasSize => Self::CanvasSize {
                width: params[0],
                height: params[1],
                timestamp: u32_at(2),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        let tags = [
            EventTag::Touch(TouchAction::Down),
            EventTag::Touch(TouchAction::Cancel),
            EventTag::ConnectionBuildUp,
            EventTag::Redraw,
            EventTag::Reorientation,
            EventTag::Disconnect,
            EventTag::ButtonCallback,
            EventTag::SliderCallback,
            EventTag::Swipe,
            EventTag::LongTouchDown,
            EventTag::NumberResult,
            EventTag::InfoResult,
            EventTag::TextResult,
            EventTag::Nop,
            EventTag::Sensor(SensorKind::Gyroscope),
            EventTag::CanvasSize,
        ];
        for tag in tags {
            assert_eq!(EventTag::from_u8(tag.to_u8()), Some(tag));
        }
    }

    #[test]
    fn callback_threshold_splits_the_families() {
        assert!(!EventTag::Touch(TouchAction::Up).is_callback());
        assert!(!EventTag::Redraw.is_callback());
        assert!(EventTag::ButtonCallback.is_callback());
        assert!(EventTag::Sensor(SensorKind::Accelerometer).is_callback());
    }

    #[test]
    fn button_callback_encodes_split_values() {
        let event = HostEvent::ButtonCallback {
            index: 3,
            callback: 0xDEAD_BEEF,
            value: 0x0001_0002,
        };
        assert_eq!(event.params(), vec![3, 0xBEEF, 0xDEAD, 0x0002, 0x0001]);
    }

    #[test]
    fn swipe_deltas_keep_their_sign() {
        let event = HostEvent::Swipe {
            horizontal: true,
            start_x: 10,
            start_y: 20,
            delta_x: -50,
            delta_y: 1,
        };
        let decoded = HostEvent::decode(EventTag::Swipe, &event.params(), &[]).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert!(HostEvent::decode(EventTag::Redraw, &[1, 2, 3], &[]).is_none());
    }
}
