//! Codec and validator for EVM Object Format (EOF) v1 containers.
//!
//! Raw bytes decode into an [`Eof`] container (header, types section, code
//! sections and data section); every syntactic and per-code-section rule of
//! EIP-3540/3670/4200/4750 is enforced before a container is handed out, and
//! [`Eof::encode_slow`] reproduces the input byte-exactly.
//!
//! The full pipeline is [`validate_raw_eof`]; decoding and per-section
//! analysis are also exposed separately.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc as std;

pub mod eof;
pub mod opcode;
pub mod utils;

pub use eof::{
    verification::{
        validate_eof, validate_eof_code, validate_eof_inner, validate_raw_eof,
        validate_raw_eof_inner, EofError, EofValidationError,
    },
    Eof, EofBody, EofDecodeError, EofHeader, Field, TypesSection, EOF_MAGIC, EOF_MAGIC_BYTES,
};
pub use opcode::{EofVersion, OpCode, OPCODE_INFO};
