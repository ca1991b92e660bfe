#![cfg(feature = "std")]

/// Prints a disassembly of one code section to stdout.
pub fn print(code: &[u8]) {
    use crate::{opcode::*, utils::read_i16};
    use alloy_primitives::hex;

    let mut i = 0;
    while i < code.len() {
        let op = code[i];
        let opcode = &OPCODE_INFO[op as usize];

        let Some(opcode) = opcode else {
            println!("Unknown opcode: 0x{op:02X}");
            i += 1;
            continue;
        };

        if opcode.immediate_size() != 0 && i + opcode.immediate_size() as usize >= code.len() {
            println!("Malformed code: immediate out of bounds");
            break;
        }

        print!("{}", opcode.name());
        if opcode.immediate_size() != 0 {
            let immediate = &code[i + 1..i + 1 + opcode.immediate_size() as usize];
            print!(" : 0x{:}", hex::encode(immediate));
            if opcode.immediate_size() == 2 {
                print!(" ({})", i16::from_be_bytes(immediate.try_into().unwrap()));
            }
        }
        println!();

        let mut table_immediates = 0;
        if op == RJUMPV {
            let table_size = code[i + 1] as usize;
            table_immediates = table_size * 2;

            // +1 is for the table size byte.
            if i + 1 + table_immediates >= code.len() {
                println!("Malformed code: jump table out of bounds");
                break;
            }

            for entry in 0..table_size {
                let offset = read_i16(code, i + 2 + 2 * entry);
                println!("RJUMPV[{entry}]: 0x{offset:04X} ({offset})");
            }
        }

        i += 1 + opcode.immediate_size() as usize + table_immediates;
    }
}
