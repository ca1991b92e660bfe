use super::{Eof, EofDecodeError, EofHeader, TypesSection};
use alloy_primitives::Bytes;
use std::vec::Vec;

/// EOF container body.
///
/// Contains the types, code and data sections.
///
/// Can be used to create a new EOF container with the
/// [`into_eof`](EofBody::into_eof) method.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EofBody {
    /// Types descriptors, one per code section, in the same order.
    pub types_section: Vec<TypesSection>,
    /// Code sections.
    pub code_section: Vec<Bytes>,
    /// Data section.
    pub data_section: Bytes,
}

impl EofBody {
    /// Returns the code section at the given index.
    pub fn code(&self, index: usize) -> Option<&Bytes> {
        self.code_section.get(index)
    }

    /// Returns the body length in bytes.
    pub fn size(&self) -> usize {
        self.types_section.len() * 4
            + self.code_section.iter().map(|code| code.len()).sum::<usize>()
            + self.data_section.len()
    }

    /// Creates an EOF container from this body.
    ///
    /// The body is encoded and decoded back so that only well-formed
    /// containers are observable.
    ///
    /// # Panics
    ///
    /// Panics if the body does not assemble into a well-formed container,
    /// e.g. an empty code section or mismatched section counts.
    pub fn into_eof(self) -> Eof {
        let header = EofHeader {
            types_size: (self.types_section.len() * 4) as u16,
            code_sizes: self.code_section.iter().map(|code| code.len() as u16).collect(),
            data_size: self.data_section.len() as u16,
            sum_code_sizes: self.code_section.iter().map(|code| code.len()).sum(),
        };
        let mut buffer = Vec::with_capacity(header.eof_size());
        header.encode(&mut buffer);
        self.encode(&mut buffer);
        Eof::decode(buffer.into()).expect("body does not assemble into a container")
    }

    /// Encodes this body into the given buffer.
    pub fn encode(&self, buffer: &mut Vec<u8>) {
        for types_section in &self.types_section {
            types_section.encode(buffer);
        }

        for code_section in &self.code_section {
            buffer.extend_from_slice(code_section);
        }

        buffer.extend_from_slice(&self.data_section);
    }

    /// Decodes an EOF container body from the given buffer and header.
    ///
    /// The input must hold exactly the layout the header declares: a short
    /// input is [`Truncated`][EofDecodeError::Truncated] and surplus bytes
    /// after the data section are
    /// [`TrailingBytes`][EofDecodeError::TrailingBytes].
    pub fn decode(input: &Bytes, header: &EofHeader) -> Result<Self, EofDecodeError> {
        let header_len = header.size();
        let eof_size = header.eof_size();

        if input.len() < eof_size {
            return Err(EofDecodeError::Truncated);
        }
        if input.len() > eof_size {
            return Err(EofDecodeError::TrailingBytes);
        }

        let mut body = EofBody::default();

        let mut types_input = &input[header_len..];
        for _ in 0..header.types_count() {
            let (types_section, local_input) = TypesSection::decode(types_input)?;
            types_input = local_input;
            body.types_section.push(types_section);
        }

        // Extract code sections
        let mut start = header_len + header.types_size as usize;
        for size in header.code_sizes.iter().map(|x| *x as usize) {
            body.code_section.push(input.slice(start..start + size));
            start += size;
        }

        // The data section is exactly `data_size` bytes; the length checks
        // above guarantee it reaches the end of the input.
        body.data_section = input.slice(start..start + header.data_size as usize);

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{bytes, hex};
    use std::vec;

    #[test]
    fn decode_body_sections() {
        let input = bytes!(
            "ef00010100080200020001000403000200"
            "0080000000000000"
            "00"
            "5c000000"
            "beef"
        );
        let (header, _) = EofHeader::decode(&input).unwrap();
        let body = EofBody::decode(&input, &header).unwrap();
        assert_eq!(
            body.types_section,
            vec![TypesSection::new(0, 0x80, 0), TypesSection::default()]
        );
        assert_eq!(body.code(0).unwrap().as_ref(), &hex!("00"));
        assert_eq!(body.code(1).unwrap().as_ref(), &hex!("5c000000"));
        assert_eq!(body.data_section.as_ref(), &hex!("beef"));
        assert_eq!(body.size(), header.body_size());
    }

    #[test]
    fn body_length_is_exact() {
        let input = bytes!("ef00010100040200010001030002000080000000");
        let (header, _) = EofHeader::decode(&input).unwrap();
        // Data section shorter than `data_size`.
        assert_eq!(
            EofBody::decode(&input, &header),
            Err(EofDecodeError::Truncated)
        );
        // Surplus bytes past the data section.
        let input = bytes!("ef000101000402000100010300020000800000001122aa");
        let (header, _) = EofHeader::decode(&input).unwrap();
        assert_eq!(
            EofBody::decode(&input, &header),
            Err(EofDecodeError::TrailingBytes)
        );
    }

    #[test]
    fn into_eof_round_trip() {
        let body = EofBody {
            types_section: vec![TypesSection::new(0, 0x80, 1)],
            code_section: vec![Bytes::from_static(&hex!("60005000"))],
            data_section: bytes!("010203"),
        };
        let eof = body.clone().into_eof();
        assert_eq!(eof.body, body);
        assert_eq!(eof.raw().len(), eof.size());
        assert_eq!(eof.encode_slow(), *eof.raw());
    }
}
