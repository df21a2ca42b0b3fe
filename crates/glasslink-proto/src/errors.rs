//! Error types for the wire layer.
//!
//! Decode-side corruption is not an error: the decoder and receiver recover
//! by scanning for the next sync token and only count what they discarded.
//! `ProtocolError` covers the cases where a caller hands us something we
//! cannot encode, or asks a `Message` for a parameter it does not carry.

use thiserror::Error;

/// Errors produced while building or inspecting protocol frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// More parameters than the wire format allows in one message
    #[error("too many parameters: {count} exceeds maximum of {max}")]
    TooManyParams {
        /// Number of parameters requested
        count: usize,
        /// Maximum the grammar allows
        max: usize,
    },

    /// Data block larger than the wire format allows
    #[error("data block of {len} bytes exceeds maximum of {max}")]
    DataTooLarge {
        /// Requested data length
        len: usize,
        /// Maximum the grammar allows
        max: usize,
    },

    /// Parameter index beyond the message's parameter count
    #[error("missing parameter {index} (message has {available})")]
    MissingParam {
        /// Index that was requested
        index: usize,
        /// Parameters actually present
        available: usize,
    },

    /// Byte value that is not a known data tag
    #[error("unknown data tag {0:#04x}")]
    UnknownDataTag(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_format_with_context() {
        let err = ProtocolError::TooManyParams { count: 99, max: 64 };
        assert_eq!(err.to_string(), "too many parameters: 99 exceeds maximum of 64");

        let err = ProtocolError::MissingParam { index: 4, available: 2 };
        assert_eq!(err.to_string(), "missing parameter 4 (message has 2)");
    }
}
