use num_traits::FromPrimitive;

use super::instructions::{Instruction, Opcode};
use crate::trap::UmError;

// Decode instruction from raw word
pub fn decode(raw: u32) -> Result<Instruction, UmError> {
    // Extract registers
    let ra = |raw: u32| ((raw >> 6) & 0b111) as usize;
    let rb = |raw: u32| ((raw >> 3) & 0b111) as usize;
    let rc = |raw: u32| (raw & 0b111) as usize;

    // Load value packs its register right below the opcode
    let ra_lv = |raw: u32| ((raw >> 25) & 0b111) as usize;
    let imm_lv = |raw: u32| raw & 0x1ff_ffff;

    let raw_opcode = raw >> 28;

    match Opcode::from_u32(raw_opcode) {
        Some(Opcode::LV) => Ok(Instruction::LoadValue {
            a: ra_lv(raw),
            value: imm_lv(raw),
        }),
        Some(op) => Ok(Instruction::Standard {
            a: ra(raw),
            b: rb(raw),
            c: rc(raw),
            op,
        }),
        None => Err(UmError::InvalidOpcode {
            word: raw,
            opcode: raw_opcode,
        }),
    }
}
