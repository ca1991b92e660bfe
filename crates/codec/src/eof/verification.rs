//! Verification logic for EOF code sections.
//!
//! A single linear pass per section checks instruction legality, immediate
//! operand framing and relative-jump destinations. The EIP-5450 stack-height
//! dataflow pass is not implemented here; it becomes a separate module once
//! its specification stabilises.

use crate::{
    eof::{Eof, EofDecodeError},
    opcode::{self, EofVersion},
    utils::read_i16,
};
use alloy_primitives::Bytes;
use core::fmt;
use std::vec;

/// Decodes `raw` into an [`Eof`] container and validates every code section.
///
/// This is the full pipeline: header, body, cross-field structure and
/// per-section instruction analysis, failing on the first violation. The
/// terminating-instruction check is off; see [`validate_raw_eof_inner`].
pub fn validate_raw_eof(raw: Bytes) -> Result<Eof, EofError> {
    validate_raw_eof_inner(raw, false)
}

/// Decodes `raw` into an [`Eof`] container and validates it, optionally
/// requiring every code section to end with a terminating instruction.
#[inline]
pub fn validate_raw_eof_inner(raw: Bytes, require_terminating: bool) -> Result<Eof, EofError> {
    let eof = Eof::decode(raw)?;
    validate_eof_inner(&eof, require_terminating)?;
    Ok(eof)
}

/// Validates every code section of an already decoded [`Eof`] container.
pub fn validate_eof(eof: &Eof) -> Result<(), EofValidationError> {
    validate_eof_inner(eof, false)
}

/// Validates every code section of an [`Eof`] container.
///
/// `require_terminating` additionally demands that the last instruction of
/// each section is terminating. The check is phrased as optional in
/// EIP-4200 and is off in [`validate_eof`].
#[inline]
pub fn validate_eof_inner(eof: &Eof, require_terminating: bool) -> Result<(), EofValidationError> {
    for code in &eof.body.code_section {
        validate_eof_code(code, EofVersion::V1, require_terminating)?;
    }
    Ok(())
}

/// EOF error wrapping both pipeline stages.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum EofError {
    /// Decoding error.
    Decode(EofDecodeError),
    /// Validation Error.
    Validation(EofValidationError),
}

impl From<EofDecodeError> for EofError {
    fn from(err: EofDecodeError) -> Self {
        EofError::Decode(err)
    }
}

impl From<EofValidationError> for EofError {
    fn from(err: EofValidationError) -> Self {
        EofError::Validation(err)
    }
}

impl fmt::Display for EofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EofError::Decode(e) => write!(f, "Bytecode decode error: {e}"),
            EofError::Validation(e) => write!(f, "Bytecode validation error: {e}"),
        }
    }
}

impl core::error::Error for EofError {}

/// Errors of the per-code-section instruction analysis.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum EofValidationError {
    /// An instruction that is not assigned in this EOF version
    UndefinedInstruction {
        /// The offending byte.
        opcode: u8,
        /// Offset of the instruction within its code section.
        offset: usize,
    },
    /// The last instruction's immediate runs past the code end
    TruncatedImmediate,
    /// RJUMP/RJUMPI offset runs past the code end
    TruncatedRelativeJump,
    /// RJUMPV table size byte or table body runs past the code end
    TruncatedJumpTable,
    /// RJUMPV with a zero-size jump table
    EmptyJumpTable,
    /// A relative-jump destination lies outside the code section
    JumpOutOfBounds,
    /// A relative-jump destination lands on an immediate byte
    JumpTargetsImmediate,
    /// The last instruction of a section is not terminating
    NonTerminatingCodeSection,
}

impl fmt::Display for EofValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UndefinedInstruction { opcode, offset } => {
                return write!(f, "undefined instruction 0x{opcode:02X} at offset {offset}");
            }
            Self::TruncatedImmediate => "truncated immediate",
            Self::TruncatedRelativeJump => "truncated relative jump offset",
            Self::TruncatedJumpTable => "truncated jump table",
            Self::EmptyJumpTable => "empty jump table",
            Self::JumpOutOfBounds => "relative jump destination out of bounds",
            Self::JumpTargetsImmediate => "relative jump destination targets an immediate",
            Self::NonTerminatingCodeSection => "no terminating instruction",
        };
        f.write_str(s)
    }
}

impl core::error::Error for EofValidationError {}

/// Validates a single code section in one linear pass:
/// * every byte at an instruction start is a legal opcode,
/// * immediate operands are fully contained in the section,
/// * every relative-jump destination is in bounds and lands on an
///   instruction start, never inside an immediate.
///
/// Jump offsets are two's-complement signed big-endian, relative to the
/// position just after the instruction and its immediates (pc-post).
pub fn validate_eof_code(
    code: &[u8],
    version: EofVersion,
    require_terminating: bool,
) -> Result<(), EofValidationError> {
    let len = code.len();
    // Byte-indexed marks instead of sets: at most one entry per byte keeps
    // the pass O(len).
    let mut is_immediate = vec![false; len];
    let mut is_rjumpdest = vec![false; len];

    let mut last_opcode = None;
    let mut pos = 0;
    while pos < len {
        let op = code[pos];
        pos += 1;

        if !version.is_valid_opcode(op) {
            return Err(EofValidationError::UndefinedInstruction {
                opcode: op,
                offset: pos - 1,
            });
        }

        let mut pc_post = pos + version.immediate_size(op) as usize;

        match op {
            opcode::RJUMP | opcode::RJUMPI => {
                if pos + 2 > len {
                    return Err(EofValidationError::TruncatedRelativeJump);
                }
                let offset = read_i16(code, pos) as isize;
                let dest = pc_post as isize + offset;
                if dest < 0 || dest >= len as isize {
                    return Err(EofValidationError::JumpOutOfBounds);
                }
                is_rjumpdest[dest as usize] = true;
            }
            opcode::RJUMPV => {
                if pos + 1 > len {
                    return Err(EofValidationError::TruncatedJumpTable);
                }
                let table_size = code[pos] as usize;
                if table_size == 0 {
                    return Err(EofValidationError::EmptyJumpTable);
                }
                pc_post = pos + 1 + 2 * table_size;
                if pc_post > len {
                    return Err(EofValidationError::TruncatedJumpTable);
                }
                for entry in 0..table_size {
                    let offset = read_i16(code, pos + 1 + 2 * entry) as isize;
                    let dest = pc_post as isize + offset;
                    if dest < 0 || dest >= len as isize {
                        return Err(EofValidationError::JumpOutOfBounds);
                    }
                    is_rjumpdest[dest as usize] = true;
                }
            }
            _ => {}
        }

        // Record immediate positions. A truncated trailing immediate may
        // reach past the end; the cursor check below reports it.
        for imm in pos..pc_post.min(len) {
            is_immediate[imm] = true;
        }

        // Skip immediates
        pos = pc_post;
        last_opcode = Some(op);
    }

    // Ensure the last instruction's immediate doesn't go over the code end.
    if pos != len {
        return Err(EofValidationError::TruncatedImmediate);
    }

    // Ensure relative jump destinations don't target immediates.
    for byte in 0..len {
        if is_rjumpdest[byte] && is_immediate[byte] {
            return Err(EofValidationError::JumpTargetsImmediate);
        }
    }

    if require_terminating && !matches!(last_opcode, Some(op) if version.is_terminating(op)) {
        return Err(EofValidationError::NonTerminatingCodeSection);
    }

    Ok(())
}
