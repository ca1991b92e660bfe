//! Parsing opcodes from strings.
//!
//! This module provides a function to parse opcodes from strings.
//! It is a utility function that needs to be enabled with `parse` feature.

use super::OpCode;
use crate::opcode::NAME_TO_OPCODE;
use core::fmt;

/// An error indicating that an opcode is invalid
#[derive(Debug, PartialEq, Eq)]
pub struct OpCodeError(());

impl fmt::Display for OpCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid opcode")
    }
}

impl core::error::Error for OpCodeError {}

impl core::str::FromStr for OpCode {
    type Err = OpCodeError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(OpCodeError(()))
    }
}

impl OpCode {
    /// Parses an opcode from a string.
    ///
    /// This is the inverse of [`as_str`](Self::as_str).
    #[inline]
    pub fn parse(s: &str) -> Option<Self> {
        NAME_TO_OPCODE.get(s).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn test_parse_valid_opcodes() {
        assert_eq!(OpCode::parse("STOP"), Some(OpCode::STOP));
        assert_eq!(OpCode::parse("ADD"), Some(OpCode::ADD));
        assert_eq!(OpCode::parse("PUSH1"), Some(OpCode::PUSH1));
        assert_eq!(OpCode::parse("PUSH32"), Some(OpCode::PUSH32));
        assert_eq!(OpCode::parse("RJUMP"), Some(OpCode::RJUMP));
        assert_eq!(OpCode::parse("RJUMPV"), Some(OpCode::RJUMPV));
        assert_eq!(OpCode::parse("CALLF"), Some(OpCode::CALLF));
        assert_eq!(OpCode::parse("RETF"), Some(OpCode::RETF));
        assert_eq!(OpCode::parse("INVALID"), Some(OpCode::INVALID));
    }

    #[test]
    fn test_parse_invalid_opcodes() {
        assert_eq!(OpCode::parse("JUMP"), None); // Not assigned in EOF
        assert_eq!(OpCode::parse("JUMPI"), None);
        assert_eq!(OpCode::parse(""), None);
        assert_eq!(OpCode::parse("stop"), None); // Case sensitive
        assert_eq!(OpCode::parse(" ADD"), None); // With space
        assert_eq!(OpCode::parse("PUSH"), None); // Incomplete
        assert_eq!(OpCode::parse("PUSH33"), None); // Out of range
    }

    #[test]
    fn test_from_str() {
        assert_eq!(OpCode::from_str("RETF"), Ok(OpCode::RETF));
        assert_eq!(OpCode::from_str("NOT_AN_OPCODE"), Err(OpCodeError(())));
    }

    #[test]
    fn test_parse_inverse_of_as_str() {
        for byte in 0..=255u8 {
            if let Some(opcode) = OpCode::new(byte) {
                assert_eq!(
                    OpCode::parse(opcode.as_str()),
                    Some(opcode),
                    "Failed to parse {} back to opcode 0x{:02x}",
                    opcode.as_str(),
                    byte
                );
            }
        }
    }
}
