//! EOF container.
//!
//! Contains body, header and raw bytes.
//!
//! Also contains the code-section verification logic and a pretty printer.
mod body;
mod decode_helpers;
mod header;
/// Pretty printer for EOF code sections. Enabled by `std` feature.
pub mod printer;
mod types_section;
/// Verification logic for the EOF code sections.
pub mod verification;

pub use body::EofBody;
pub use header::{EofHeader, CODE_SECTION_SIZE, KIND_CODE, KIND_DATA, KIND_TYPES, TERMINATOR};
pub use types_section::{TypesSection, NON_RETURNING_FUNCTION};
pub use verification::*;

use alloy_primitives::{bytes, Bytes};
use core::{cmp::min, fmt};
use std::{vec, vec::Vec};

/// EOF magic in [u16] form.
pub const EOF_MAGIC: u16 = 0xEF00;

/// EOF magic number in array form.
///
/// The execution engine recognises EOF bytecode by probing the first two
/// bytes against this sentinel.
pub static EOF_MAGIC_BYTES: Bytes = bytes!("ef00");

/// Maximum number of code sections in a container (EIP-4750 function cap).
pub const MAX_CODE_SECTIONS: usize = 1024;

/// EVM Object Format (EOF) v1 container.
///
/// It consists of a header, body and the raw original bytes.
///
/// Values of this type always satisfy the cross-field layout invariants
/// ([`decode`][Eof::decode] runs [`validate_structure`][Eof::validate_structure]
/// before returning); code-section instruction analysis is performed by
/// [`validate`][Eof::validate] or the [`verification`] entry points.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Eof {
    /// Header of the EOF container.
    pub header: EofHeader,
    /// Body of the EOF container.
    pub body: EofBody,
    /// Raw bytes of the EOF container. Body sections reference chunks of
    /// these bytes.
    pub raw: Bytes,
}

impl Default for Eof {
    fn default() -> Self {
        let body = EofBody {
            // One non-returning function that takes no inputs.
            types_section: vec![TypesSection::new(0, NON_RETURNING_FUNCTION, 0)],
            // One code section with a STOP byte.
            code_section: vec![Bytes::from_static(&[0x00])],
            data_section: Bytes::new(),
        };
        body.into_eof()
    }
}

impl Eof {
    /// Creates a new EOF container from the given body.
    pub fn new(body: EofBody) -> Self {
        body.into_eof()
    }

    /// Decodes an EOF container from raw bytes.
    ///
    /// Parses the header and body and checks the cross-field layout
    /// invariants. Code sections are not analysed; use
    /// [`validate_raw_eof`] for the full pipeline.
    pub fn decode(raw: Bytes) -> Result<Self, EofDecodeError> {
        let (header, _) = EofHeader::decode(&raw)?;
        let body = EofBody::decode(&raw, &header)?;
        let eof = Self { header, body, raw };
        eof.validate_structure()?;
        Ok(eof)
    }

    /// Runs the per-code-section instruction analysis.
    ///
    /// The terminating-instruction check is off; see
    /// [`validate_eof_inner`] to enable it.
    pub fn validate(&self) -> Result<(), EofValidationError> {
        validate_eof(self)
    }

    /// Decodes and fully validates raw EOF bytes.
    pub fn validate_raw(bytes: Bytes) -> Result<Eof, EofError> {
        validate_raw_eof(bytes)
    }

    /// Checks the cross-field invariants between header and body.
    ///
    /// Decoded containers satisfy these by construction; the checks also
    /// hold hand-assembled values to the same layout.
    pub fn validate_structure(&self) -> Result<(), EofDecodeError> {
        let n = self.header.code_sizes.len();
        if self.header.size() < 15 {
            return Err(EofDecodeError::HeaderTooSmall);
        }
        if n > MAX_CODE_SECTIONS {
            return Err(EofDecodeError::TooManyCodeSections);
        }

        // Total-size equation over the declared field widths.
        let expected = 13
            + CODE_SECTION_SIZE * n
            + self.header.types_size as usize
            + self.header.sum_code_sizes
            + self.header.data_size as usize;
        if self.header.size() + self.body.size() != expected {
            return Err(EofDecodeError::SizeMismatch);
        }

        if self.body.types_section.len() != n
            || self.body.code_section.len() != n
            || self.header.types_count() != n
        {
            return Err(EofDecodeError::TypesCountMismatch);
        }

        for (i, code) in self.body.code_section.iter().enumerate() {
            if code.len() != self.header.code_sizes[i] as usize {
                return Err(EofDecodeError::CodeSectionSizeMismatch(i));
            }
        }

        for types in &self.body.types_section {
            types.validate()?;
        }

        Ok(())
    }

    /// Returns len of the header and body in bytes.
    pub fn size(&self) -> usize {
        self.header.size() + self.header.body_size()
    }

    /// Returns raw EOF bytes.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Returns the number of code sections.
    pub fn code_sections_len(&self) -> usize {
        self.body.code_section.len()
    }

    /// Returns the code section at the given index.
    pub fn code(&self, index: usize) -> Option<&Bytes> {
        self.body.code(index)
    }

    /// Returns the types descriptor of the code section at the given index.
    pub fn types(&self, index: usize) -> Option<&TypesSection> {
        self.body.types_section.get(index)
    }

    /// Returns a slice of the data section.
    pub fn data(&self) -> &[u8] {
        &self.body.data_section
    }

    /// Returns a slice of the raw bytes.
    /// If offset is greater than the length of the raw bytes, an empty slice is returned.
    /// If len is greater than the length of the raw bytes, the slice is truncated to the length of the raw bytes.
    pub fn data_slice(&self, offset: usize, len: usize) -> &[u8] {
        self.body
            .data_section
            .get(offset..)
            .and_then(|bytes| bytes.get(..min(len, bytes.len())))
            .unwrap_or(&[])
    }

    /// Re-encodes the container from its parsed parts.
    ///
    /// For containers obtained from [`decode`][Self::decode] this
    /// reproduces the input bytes exactly.
    pub fn encode_slow(&self) -> Bytes {
        let mut buffer: Vec<u8> = Vec::with_capacity(self.size());
        self.header.encode(&mut buffer);
        self.body.encode(&mut buffer);
        buffer.into()
    }
}

/// Header and body fields referenced by decode errors.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    /// The `kind_types` marker byte.
    KindTypes,
    /// The `kind_code` marker byte.
    KindCode,
    /// The `kind_data` marker byte.
    KindData,
    /// The header terminator byte.
    Terminator,
    /// The `types_size` field.
    TypesSize,
    /// The `num_code_sections` field.
    NumCodeSections,
    /// A `code_size` entry.
    CodeSize,
    /// The `data_size` field.
    DataSize,
    /// A types descriptor `inputs` byte.
    Inputs,
    /// A types descriptor `outputs` byte.
    Outputs,
    /// A types descriptor `max_stack_height` field.
    MaxStackHeight,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::KindTypes => "kind_types",
            Self::KindCode => "kind_code",
            Self::KindData => "kind_data",
            Self::Terminator => "terminator",
            Self::TypesSize => "types_size",
            Self::NumCodeSections => "num_code_sections",
            Self::CodeSize => "code_size",
            Self::DataSize => "data_size",
            Self::Inputs => "inputs",
            Self::Outputs => "outputs",
            Self::MaxStackHeight => "max_stack_height",
        };
        f.write_str(s)
    }
}

/// EOF decode errors: header slicing, body slicing and cross-field layout.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EofDecodeError {
    /// Input is shorter than the layout declared by the header
    Truncated,
    /// First two bytes are not `0xEF00`
    BadMagic,
    /// Version byte is not `0x01`
    BadVersion,
    /// A kind marker or the terminator byte has the wrong value
    BadKind(Field),
    /// An integer field falls outside its valid range
    OutOfRange(Field),
    /// The header+body total-size equation does not hold
    SizeMismatch,
    /// Types count, code-section count and `num_code_sections` disagree
    TypesCountMismatch,
    /// A code section's length differs from its declared `code_size`
    CodeSectionSizeMismatch(usize),
    /// Bytes remain after the data section
    TrailingBytes,
    /// More than 1024 code sections
    TooManyCodeSections,
    /// Header is smaller than the 15-byte minimum
    HeaderTooSmall,
}

impl fmt::Display for EofDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Truncated => "unexpected end of input",
            Self::BadMagic => "invalid EOF magic number",
            Self::BadVersion => "invalid EOF version",
            Self::BadKind(field) => {
                return write!(f, "invalid value for `{field}`");
            }
            Self::OutOfRange(field) => {
                return write!(f, "`{field}` value out of range");
            }
            Self::SizeMismatch => "container size does not match the header",
            Self::TypesCountMismatch => "mismatch of code and types section counts",
            Self::CodeSectionSizeMismatch(section) => {
                return write!(f, "code section {section} does not match its declared size");
            }
            Self::TrailingBytes => "trailing bytes after the data section",
            Self::TooManyCodeSections => "more than 1024 code sections",
            Self::HeaderTooSmall => "header is smaller than 15 bytes",
        };
        f.write_str(s)
    }
}

impl core::error::Error for EofDecodeError {}
