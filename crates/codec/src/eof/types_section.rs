use super::{
    decode_helpers::{consume_u16, consume_u8},
    EofDecodeError, Field,
};
use std::vec::Vec;

/// The `outputs` value marking a non-returning function.
pub const NON_RETURNING_FUNCTION: u8 = 0x80;

/// Types section descriptor carrying stack information for the matching code
/// section.
#[derive(Debug, Clone, Default, Hash, PartialEq, Eq, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypesSection {
    /// `inputs` - 1 byte - `0x00-0x7F`
    ///
    /// Number of stack elements the code section consumes
    pub inputs: u8,
    /// `outputs` - 1 byte - `0x00-0x80`
    ///
    /// Number of stack elements the code section returns or 0x80 for non-returning functions
    pub outputs: u8,
    /// `max_stack_height` - 2 bytes - `0x0000-0x03FF`
    ///
    /// Maximum number of elements ever placed onto the stack by the code section
    pub max_stack_height: u16,
}

impl TypesSection {
    /// Returns a new descriptor with the given inputs, outputs and max stack height.
    pub const fn new(inputs: u8, outputs: u8, max_stack_height: u16) -> Self {
        Self {
            inputs,
            outputs,
            max_stack_height,
        }
    }

    /// Returns `true` if the section is non-returning.
    pub const fn is_non_returning(&self) -> bool {
        self.outputs == NON_RETURNING_FUNCTION
    }

    /// Encodes the descriptor into the buffer.
    #[inline]
    pub fn encode(&self, buffer: &mut Vec<u8>) {
        buffer.push(self.inputs);
        buffer.push(self.outputs);
        buffer.extend_from_slice(&self.max_stack_height.to_be_bytes());
    }

    /// Decodes one descriptor from the input.
    #[inline]
    pub fn decode(input: &[u8]) -> Result<(Self, &[u8]), EofDecodeError> {
        let (input, inputs) = consume_u8(input)?;
        let (input, outputs) = consume_u8(input)?;
        let (input, max_stack_height) = consume_u16(input)?;
        let section = Self {
            inputs,
            outputs,
            max_stack_height,
        };
        section.validate()?;
        Ok((section, input))
    }

    /// Validates the descriptor field ranges.
    pub fn validate(&self) -> Result<(), EofDecodeError> {
        if self.inputs > 0x7f {
            return Err(EofDecodeError::OutOfRange(Field::Inputs));
        }
        if self.outputs > NON_RETURNING_FUNCTION {
            return Err(EofDecodeError::OutOfRange(Field::Outputs));
        }
        if self.max_stack_height > 0x03ff {
            return Err(EofDecodeError::OutOfRange(Field::MaxStackHeight));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_and_encode() {
        let (section, rest) = TypesSection::decode(&[0x02, 0x01, 0x03, 0xff, 0xaa]).unwrap();
        assert_eq!(section, TypesSection::new(2, 1, 0x03ff));
        assert_eq!(rest, &[0xaa]);
        assert!(!section.is_non_returning());

        let mut buffer = Vec::new();
        section.encode(&mut buffer);
        assert_eq!(buffer, &[0x02, 0x01, 0x03, 0xff]);
    }

    #[test]
    fn non_returning() {
        let (section, _) = TypesSection::decode(&[0x00, 0x80, 0x00, 0x00]).unwrap();
        assert!(section.is_non_returning());
    }

    #[test]
    fn field_ranges() {
        assert_eq!(
            TypesSection::decode(&[0x80, 0x00, 0x00, 0x00]),
            Err(EofDecodeError::OutOfRange(Field::Inputs))
        );
        assert_eq!(
            TypesSection::decode(&[0x00, 0x81, 0x00, 0x00]),
            Err(EofDecodeError::OutOfRange(Field::Outputs))
        );
        assert_eq!(
            TypesSection::decode(&[0x00, 0x00, 0x04, 0x00]),
            Err(EofDecodeError::OutOfRange(Field::MaxStackHeight))
        );
        // Boundary values are accepted.
        assert!(TypesSection::new(0x7f, 0x80, 0x03ff).validate().is_ok());
    }

    #[test]
    fn truncated_descriptor() {
        assert_eq!(
            TypesSection::decode(&[0x00, 0x00]),
            Err(EofDecodeError::Truncated)
        );
    }
}
