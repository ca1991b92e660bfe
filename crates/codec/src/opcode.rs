//! EOF opcode definitions and utilities.
//!
//! The table below is the legal instruction set for EOF v1 code sections:
//! the EIP-3670 base set with `JUMP`/`JUMPI` removed (EIP-4750 forbids
//! dynamic jumps) and `RJUMP`/`RJUMPI`/`RJUMPV` (EIP-4200) plus
//! `CALLF`/`RETF` (EIP-4750) assigned.

#[cfg(feature = "parse")]
pub mod parse;

use core::fmt;

/// An EOF opcode.
///
/// This is always a valid opcode, as declared in the [`opcode`][self] module
/// or the [`OPCODE_INFO`] constant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct OpCode(u8);

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.get();
        if let Some(val) = OPCODE_INFO[n as usize] {
            f.write_str(val.name())
        } else {
            write!(f, "UNKNOWN(0x{n:02X})")
        }
    }
}

impl OpCode {
    /// Instantiates a new opcode from a u8.
    ///
    /// Returns `None` if the byte is not assigned in EOF code.
    #[inline]
    pub const fn new(opcode: u8) -> Option<Self> {
        match OPCODE_INFO[opcode as usize] {
            Some(_) => Some(Self(opcode)),
            None => None,
        }
    }

    /// Returns true if the opcode is a `PUSH` instruction.
    #[inline]
    pub const fn is_push(self) -> bool {
        self.0 >= PUSH1 && self.0 <= PUSH32
    }

    /// Returns true if the opcode is `RJUMP`, `RJUMPI` or `RJUMPV`.
    #[inline]
    pub const fn is_relative_jump(self) -> bool {
        self.0 >= RJUMP && self.0 <= RJUMPV
    }

    /// Returns the opcode as a string. This is the inverse of
    /// [`parse`](Self::parse) when the `parse` feature is enabled.
    #[doc(alias = "name")]
    #[inline]
    pub const fn as_str(self) -> &'static str {
        self.info().name()
    }

    /// Returns the opcode information.
    #[inline]
    pub const fn info(&self) -> OpCodeInfo {
        if let Some(t) = OPCODE_INFO[self.0 as usize] {
            t
        } else {
            panic!("opcode not found")
        }
    }

    /// Returns the number of immediate operand bytes following the opcode.
    #[inline]
    pub const fn immediate_size(&self) -> u8 {
        self.info().immediate_size()
    }

    /// Returns whether this opcode ends control flow in a code section.
    #[inline]
    pub const fn is_terminating(&self) -> bool {
        self.info().is_terminating()
    }

    /// Returns the opcode as a u8.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl PartialEq<u8> for OpCode {
    fn eq(&self, other: &u8) -> bool {
        self.get().eq(other)
    }
}

/// Information about an opcode: name, immediate width, termination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpCodeInfo {
    name: &'static str,
    /// Number of immediate operand bytes.
    ///
    /// RJUMPV is a special case where the width depends on the bytecode: the
    /// entry holds 1 (the mandatory table-size byte) and the jump table that
    /// follows is framed by the validator.
    immediate_size: u8,
    /// If the opcode ends control flow, aka STOP, RETF, ..
    terminating: bool,
}

impl OpCodeInfo {
    /// Creates a new opcode info with the given name and default values.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            immediate_size: 0,
            terminating: false,
        }
    }

    /// Returns the opcode name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns whether this opcode terminates a code section, e.g. `STOP`, `RETF`.
    #[inline]
    pub const fn is_terminating(&self) -> bool {
        self.terminating
    }

    /// Returns the size of the immediate operand in bytes.
    #[inline]
    pub const fn immediate_size(&self) -> u8 {
        self.immediate_size
    }
}

/// EOF container version, selecting the opcode table used for code-section
/// validation.
///
/// Only version 1 is assigned; the variant exists so that the validator's
/// entry points name the fork they analyse for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EofVersion {
    /// EOF version 1 (the `0x01` version byte).
    #[default]
    V1,
}

impl EofVersion {
    /// Maps a header version byte to a known EOF version.
    #[inline]
    pub const fn from_version_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::V1),
            _ => None,
        }
    }

    /// Returns the version byte carried in container headers.
    #[inline]
    pub const fn version_byte(self) -> u8 {
        match self {
            Self::V1 => 0x01,
        }
    }

    /// Returns the opcode info for `opcode`, or `None` if the byte is not a
    /// legal instruction in this version.
    #[inline]
    pub const fn opcode_info(self, opcode: u8) -> Option<OpCodeInfo> {
        match self {
            Self::V1 => OPCODE_INFO[opcode as usize],
        }
    }

    /// Returns true if `opcode` is a legal instruction in this version.
    #[inline]
    pub const fn is_valid_opcode(self, opcode: u8) -> bool {
        self.opcode_info(opcode).is_some()
    }

    /// Returns the fixed immediate width of `opcode`, in bytes.
    ///
    /// Unassigned bytes report 0. For `RJUMPV` this is the mandatory
    /// table-size byte only.
    #[inline]
    pub const fn immediate_size(self, opcode: u8) -> u8 {
        match self.opcode_info(opcode) {
            Some(info) => info.immediate_size(),
            None => 0,
        }
    }

    /// Returns true if `opcode` ends control flow in a code section.
    #[inline]
    pub const fn is_terminating(self, opcode: u8) -> bool {
        match self.opcode_info(opcode) {
            Some(info) => info.is_terminating(),
            None => false,
        }
    }
}

/// Used for [`OPCODE_INFO`] to set the immediate bytes number in the [`OpCodeInfo`].
#[inline]
pub const fn immediate_size(mut op: OpCodeInfo, n: u8) -> OpCodeInfo {
    op.immediate_size = n;
    op
}

/// Use for [`OPCODE_INFO`] to set the terminating flag to true in the [`OpCodeInfo`].
#[inline]
pub const fn terminating(mut op: OpCodeInfo) -> OpCodeInfo {
    op.terminating = true;
    op
}

/// Creates all opcode constants and two maps:
///  * `OPCODE_INFO` maps opcode number to the opcode info
///  * `NAME_TO_OPCODE` that maps opcode name to the opcode number.
macro_rules! opcodes {
    ($($val:literal => $name:ident $(=> $($modifier:ident $(( $($modifier_arg:expr),* ))?),*)?);* $(;)?) => {
        // Constants for each opcode.
        $(
            #[doc = concat!("The `", stringify!($val), "` (\"", stringify!($name),"\") opcode.")]
            pub const $name: u8 = $val;
        )*
        impl OpCode {$(
            #[doc = concat!("The `", stringify!($val), "` (\"", stringify!($name),"\") opcode.")]
            pub const $name: Self = Self($val);
        )*}

        /// Maps each opcode to its info.
        pub static OPCODE_INFO: [Option<OpCodeInfo>; 256] = {
            let mut map = [None; 256];
            let mut prev: u8 = 0;
            $(
                let val: u8 = $val;
                assert!(val == 0 || val > prev, "opcodes must be sorted in ascending order");
                prev = val;
                let info = OpCodeInfo::new(stringify!($name));
                $($(
                let info = $modifier(info, $($($modifier_arg),*)?);
                )*)?
                map[$val] = Some(info);
            )*
            let _ = prev;
            map
        };

        /// Maps each name to its opcode.
        #[cfg(feature = "parse")]
        pub(crate) static NAME_TO_OPCODE: phf::Map<&'static str, OpCode> = stringify_with_cb! { phf_map_cb; $($name)* };
    };
}

/// Callback for creating a [`phf`] map with `stringify_with_cb`.
#[cfg(feature = "parse")]
macro_rules! phf_map_cb {
    ($(#[doc = $s:literal] $id:ident)*) => {
        phf::phf_map! {
            $($s => OpCode::$id),*
        }
    };
}

/// Stringifies identifiers with `paste` so that they are available as literals.
///
/// This doesn't work with [`stringify!`] because it cannot be expanded inside of another macro.
#[cfg(feature = "parse")]
macro_rules! stringify_with_cb {
    ($callback:ident; $($id:ident)*) => { paste::paste! {
        $callback! { $(#[doc = "" $id ""] $id)* }
    }};
}

// EIP-3670 base set; bytes without an entry are undefined instructions and
// reject at validation time. 0x56 (JUMP) and 0x57 (JUMPI) are deliberately
// unassigned per EIP-4750.
opcodes! {
    0x00 => STOP => terminating;
    0x01 => ADD;
    0x02 => MUL;
    0x03 => SUB;
    0x04 => DIV;
    0x05 => SDIV;
    0x06 => MOD;
    0x07 => SMOD;
    0x08 => ADDMOD;
    0x09 => MULMOD;
    0x0A => EXP;
    0x0B => SIGNEXTEND;
    // 0x0C..=0x0F
    0x10 => LT;
    0x11 => GT;
    0x12 => SLT;
    0x13 => SGT;
    0x14 => EQ;
    0x15 => ISZERO;
    0x16 => AND;
    0x17 => OR;
    0x18 => XOR;
    0x19 => NOT;
    0x1A => BYTE;
    0x1B => SHL;
    0x1C => SHR;
    0x1D => SAR;
    // 0x1E..=0x1F
    0x20 => KECCAK256;
    // 0x21..=0x2F
    0x30 => ADDRESS;
    0x31 => BALANCE;
    0x32 => ORIGIN;
    0x33 => CALLER;
    0x34 => CALLVALUE;
    0x35 => CALLDATALOAD;
    0x36 => CALLDATASIZE;
    0x37 => CALLDATACOPY;
    0x38 => CODESIZE;
    0x39 => CODECOPY;
    0x3A => GASPRICE;
    0x3B => EXTCODESIZE;
    0x3C => EXTCODECOPY;
    0x3D => RETURNDATASIZE;
    0x3E => RETURNDATACOPY;
    0x3F => EXTCODEHASH;
    0x40 => BLOCKHASH;
    0x41 => COINBASE;
    0x42 => TIMESTAMP;
    0x43 => NUMBER;
    0x44 => DIFFICULTY;
    0x45 => GASLIMIT;
    0x46 => CHAINID;
    0x47 => SELFBALANCE;
    0x48 => BASEFEE;
    // 0x49..=0x4F
    0x50 => POP;
    0x51 => MLOAD;
    0x52 => MSTORE;
    0x53 => MSTORE8;
    0x54 => SLOAD;
    0x55 => SSTORE;
    // 0x56 JUMP and 0x57 JUMPI are not assigned in EOF
    0x58 => PC;
    0x59 => MSIZE;
    0x5A => GAS;
    0x5B => JUMPDEST;
    0x5C => RJUMP  => immediate_size(2);
    0x5D => RJUMPI => immediate_size(2);
    0x5E => RJUMPV => immediate_size(1);
    // 0x5F (PUSH0) is not assigned in EOF v1
    0x60 => PUSH1  => immediate_size(1);
    0x61 => PUSH2  => immediate_size(2);
    0x62 => PUSH3  => immediate_size(3);
    0x63 => PUSH4  => immediate_size(4);
    0x64 => PUSH5  => immediate_size(5);
    0x65 => PUSH6  => immediate_size(6);
    0x66 => PUSH7  => immediate_size(7);
    0x67 => PUSH8  => immediate_size(8);
    0x68 => PUSH9  => immediate_size(9);
    0x69 => PUSH10 => immediate_size(10);
    0x6A => PUSH11 => immediate_size(11);
    0x6B => PUSH12 => immediate_size(12);
    0x6C => PUSH13 => immediate_size(13);
    0x6D => PUSH14 => immediate_size(14);
    0x6E => PUSH15 => immediate_size(15);
    0x6F => PUSH16 => immediate_size(16);
    0x70 => PUSH17 => immediate_size(17);
    0x71 => PUSH18 => immediate_size(18);
    0x72 => PUSH19 => immediate_size(19);
    0x73 => PUSH20 => immediate_size(20);
    0x74 => PUSH21 => immediate_size(21);
    0x75 => PUSH22 => immediate_size(22);
    0x76 => PUSH23 => immediate_size(23);
    0x77 => PUSH24 => immediate_size(24);
    0x78 => PUSH25 => immediate_size(25);
    0x79 => PUSH26 => immediate_size(26);
    0x7A => PUSH27 => immediate_size(27);
    0x7B => PUSH28 => immediate_size(28);
    0x7C => PUSH29 => immediate_size(29);
    0x7D => PUSH30 => immediate_size(30);
    0x7E => PUSH31 => immediate_size(31);
    0x7F => PUSH32 => immediate_size(32);
    0x80 => DUP1;
    0x81 => DUP2;
    0x82 => DUP3;
    0x83 => DUP4;
    0x84 => DUP5;
    0x85 => DUP6;
    0x86 => DUP7;
    0x87 => DUP8;
    0x88 => DUP9;
    0x89 => DUP10;
    0x8A => DUP11;
    0x8B => DUP12;
    0x8C => DUP13;
    0x8D => DUP14;
    0x8E => DUP15;
    0x8F => DUP16;
    0x90 => SWAP1;
    0x91 => SWAP2;
    0x92 => SWAP3;
    0x93 => SWAP4;
    0x94 => SWAP5;
    0x95 => SWAP6;
    0x96 => SWAP7;
    0x97 => SWAP8;
    0x98 => SWAP9;
    0x99 => SWAP10;
    0x9A => SWAP11;
    0x9B => SWAP12;
    0x9C => SWAP13;
    0x9D => SWAP14;
    0x9E => SWAP15;
    0x9F => SWAP16;
    0xA0 => LOG0;
    0xA1 => LOG1;
    0xA2 => LOG2;
    0xA3 => LOG3;
    0xA4 => LOG4;
    // 0xA5..=0xAF
    0xB0 => CALLF => immediate_size(2);
    0xB1 => RETF  => terminating;
    // 0xB2..=0xEF
    0xF0 => CREATE;
    0xF1 => CALL;
    0xF2 => CALLCODE;
    0xF3 => RETURN => terminating;
    0xF4 => DELEGATECALL;
    0xF5 => CREATE2;
    // 0xF6..=0xF9
    0xFA => STATICCALL;
    // 0xFB..=0xFC
    0xFD => REVERT  => terminating;
    0xFE => INVALID => terminating;
    0xFF => SELFDESTRUCT;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode() {
        let opcode = OpCode::new(0x00).unwrap();
        assert!(!opcode.is_push());
        assert!(opcode.is_terminating());
        assert_eq!(opcode.as_str(), "STOP");
        assert_eq!(opcode.get(), 0x00);
    }

    #[test]
    fn test_immediate_size() {
        let mut expected = [0u8; 256];
        for push in PUSH1..=PUSH32 {
            expected[push as usize] = push - PUSH1 + 1;
        }
        expected[RJUMP as usize] = 2;
        expected[RJUMPI as usize] = 2;
        expected[RJUMPV as usize] = 1;
        expected[CALLF as usize] = 2;

        for (i, opcode) in OPCODE_INFO.iter().enumerate() {
            if let Some(opcode) = opcode {
                assert_eq!(
                    opcode.immediate_size(),
                    expected[i],
                    "immediate_size check failed for {opcode:#?}",
                );
            }
        }
    }

    #[test]
    fn test_enabled_opcodes() {
        // EIP-3670 enumeration, with the EIP-4200/EIP-4750 assignments.
        let opcodes = [
            0x00..=0x0b,
            0x10..=0x1d,
            0x20..=0x20,
            0x30..=0x3f,
            0x40..=0x48,
            0x50..=0x55,
            0x58..=0x5e,
            0x60..=0x7f,
            0x80..=0x8f,
            0x90..=0x9f,
            0xa0..=0xa4,
            0xb0..=0xb1,
            0xf0..=0xf5,
            0xfa..=0xfa,
            0xfd..=0xff,
        ];
        for i in opcodes {
            for opcode in i {
                OpCode::new(opcode).expect("Opcode should be valid and enabled");
            }
        }
    }

    #[test]
    fn test_disabled_opcodes() {
        // Dynamic jumps are rejected in EOF code.
        assert!(OpCode::new(0x56).is_none()); // JUMP
        assert!(OpCode::new(0x57).is_none()); // JUMPI
        // Unassigned bytes.
        assert!(OpCode::new(0x0C).is_none());
        assert!(OpCode::new(0x1E).is_none());
        assert!(OpCode::new(0x49).is_none());
        assert!(OpCode::new(0x5F).is_none());
        assert!(OpCode::new(0xB2).is_none());
        assert!(OpCode::new(0xEF).is_none()); // reserved for the EOF prefix
        assert!(OpCode::new(0xFB).is_none());
    }

    #[test]
    fn count_opcodes() {
        let mut opcode_num = 0;
        for _ in OPCODE_INFO.into_iter().flatten() {
            opcode_num += 1;
        }
        assert_eq!(opcode_num, 146);
    }

    #[test]
    fn test_terminating_opcodes() {
        let terminating = [STOP, RETF, RETURN, REVERT, INVALID];
        let mut expected = [false; 256];
        for terminating in terminating.iter() {
            expected[*terminating as usize] = true;
        }

        for (i, opcode) in OPCODE_INFO.into_iter().enumerate() {
            assert_eq!(
                opcode.map(|opcode| opcode.terminating).unwrap_or_default(),
                expected[i],
                "Opcode {opcode:?} terminating check failed."
            );
        }
    }

    #[test]
    fn test_version_queries() {
        let v1 = EofVersion::V1;
        assert_eq!(EofVersion::from_version_byte(0x01), Some(v1));
        assert_eq!(EofVersion::from_version_byte(0x00), None);
        assert_eq!(EofVersion::from_version_byte(0x02), None);
        assert_eq!(v1.version_byte(), 0x01);

        assert!(v1.is_valid_opcode(RJUMP));
        assert!(v1.is_valid_opcode(CALLF));
        assert!(!v1.is_valid_opcode(0x56));
        assert!(!v1.is_valid_opcode(0xEF));

        assert_eq!(v1.immediate_size(PUSH7), 7);
        assert_eq!(v1.immediate_size(RJUMPI), 2);
        assert_eq!(v1.immediate_size(0x56), 0);

        assert!(v1.is_terminating(INVALID));
        assert!(v1.is_terminating(RETF));
        assert!(!v1.is_terminating(SELFDESTRUCT));
        assert!(!v1.is_terminating(0x56));
    }

    #[test]
    fn test_relative_jumps() {
        assert!(OpCode::RJUMP.is_relative_jump());
        assert!(OpCode::RJUMPI.is_relative_jump());
        assert!(OpCode::RJUMPV.is_relative_jump());
        assert!(!OpCode::JUMPDEST.is_relative_jump());
        assert!(!OpCode::PUSH1.is_relative_jump());
    }

    #[test]
    fn test_opcode_display() {
        assert_eq!(format!("{}", OpCode::STOP), "STOP");
        assert_eq!(format!("{}", OpCode::RJUMPV), "RJUMPV");
        assert_eq!(format!("{}", OpCode::CALLF), "CALLF");
    }
}
