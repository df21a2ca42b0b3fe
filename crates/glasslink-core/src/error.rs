//! Error types for command dispatch.
//!
//! One bad command must never halt the interpreter, so these errors exist
//! to be *logged*: the dispatch boundary catches them, records opcode and
//! length context, and moves on to the next message.

use glasslink_proto::ProtocolError;
use thiserror::Error;

/// Errors raised while interpreting a single message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Message carried fewer parameters than the handler needs
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Addressed command named a widget slot that was never created
    #[error("no widget at index {index}, only {len} created")]
    NoSuchWidget {
        /// Requested widget index
        index: usize,
        /// Current store length
        len: usize,
    },

    /// Subcommand value the handler does not know
    #[error("unknown subcommand {subcommand:#04x}")]
    UnknownSubcommand {
        /// Offending subcommand value
        subcommand: u16,
    },

    /// Opcode inside a known range but without a handler
    #[error("unknown opcode {opcode:#04x}")]
    UnknownOpcode {
        /// Offending opcode
        opcode: u8,
    },

    /// Parameter value outside its documented domain
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// What was wrong
        reason: &'static str,
    },
}

/// Result alias for command handlers.
pub type DispatchResult = Result<(), DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_carry_context() {
        let err = DispatchError::NoSuchWidget { index: 7, len: 2 };
        assert_eq!(err.to_string(), "no widget at index 7, only 2 created");

        let err = DispatchError::from(ProtocolError::MissingParam { index: 3, available: 1 });
        assert_eq!(err.to_string(), "missing parameter 3 (message has 1)");
    }
}
