use tracing::debug;

use super::instructions::{Instruction, Opcode};
use super::{State, Um};
use crate::console::IoDevice;
use crate::trap::UmError;

fn exec_standard(
    um: &mut Um,
    io: &mut impl IoDevice,
    a: usize,
    b: usize,
    c: usize,
    op: Opcode,
) -> Result<State, UmError> {
    let rb_data = um.regfile.read(b)?;
    let rc_data = um.regfile.read(c)?;

    // Handle all instructions that write back to register A
    if let Some(result) = match op {
        Opcode::CMOV => {
            if rc_data != 0 {
                Some(rb_data)
            } else {
                None
            }
        }
        Opcode::SLOAD => Some(um.memory.read(rb_data, rc_data)?),
        Opcode::ADD => Some(rb_data.wrapping_add(rc_data)),
        Opcode::MUL => Some(rb_data.wrapping_mul(rc_data)),
        Opcode::DIV => Some(
            rb_data
                .checked_div(rc_data)
                .ok_or(UmError::DivisionByZero)?,
        ),
        Opcode::NAND => Some(!(rb_data & rc_data)),
        _ => None,
    } {
        um.regfile.write(a, result)?;
        return Ok(State::Running);
    }

    match op {
        Opcode::SSTORE => {
            let ra_data = um.regfile.read(a)?;
            um.memory.write(ra_data, rb_data, rc_data)?;
        }
        Opcode::HALT => return Ok(State::Halted),
        Opcode::MAP => {
            let id = um.memory.map(rc_data)?;
            um.regfile.write(b, id)?;
        }
        Opcode::UNMAP => um.memory.unmap(rc_data)?,
        Opcode::OUT => {
            if rc_data > u8::MAX as u32 {
                return Err(UmError::InvalidOutput(rc_data));
            }
            io.put(rc_data as u8)?;
        }
        Opcode::IN => {
            let value = match io.get()? {
                Some(byte) => byte as u32,
                None => u32::MAX,
            };
            um.regfile.write(c, value)?;
        }
        Opcode::LOADP => {
            if rb_data != 0 {
                let program = um.memory.duplicate(rb_data)?;
                debug!(
                    "loading program from segment {} ({} words), entry {}",
                    rb_data,
                    program.len(),
                    rc_data
                );
                um.memory.replace_zero(program);
            }
            um.pc = rc_data;
        }
        // CMOV with a zero condition
        _ => (),
    }
    Ok(State::Running)
}

pub fn exec(
    um: &mut Um,
    io: &mut impl IoDevice,
    instruction: Instruction,
) -> Result<State, UmError> {
    match instruction {
        Instruction::Standard { a, b, c, op } => exec_standard(um, io, a, b, c, op),
        Instruction::LoadValue { a, value } => {
            um.regfile.write(a, value)?;
            Ok(State::Running)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Console;
    use std::io;

    fn exec_op(um: &mut Um, op: Opcode, a: usize, b: usize, c: usize) -> Result<State, UmError> {
        let mut console = Console::new(io::empty(), io::sink());
        exec(um, &mut console, Instruction::Standard { a, b, c, op })
    }

    fn with_registers(values: &[u32]) -> Um {
        let mut um = Um::new(1).unwrap();
        for (num, value) in values.iter().enumerate() {
            um.regfile.write(num, *value).unwrap();
        }
        um
    }

    #[test]
    fn test_cmov() {
        let mut um = with_registers(&[1, 2, 0, 4]);
        assert_eq!(exec_op(&mut um, Opcode::CMOV, 0, 1, 2), Ok(State::Running));
        assert_eq!(um.regfile.read(0), Ok(1));

        assert_eq!(exec_op(&mut um, Opcode::CMOV, 0, 1, 3), Ok(State::Running));
        assert_eq!(um.regfile.read(0), Ok(2));
    }

    #[test]
    fn test_arith_wraps() {
        let mut um = with_registers(&[0, 0xffff_ffff, 1, 0x8000_0000, 2]);
        exec_op(&mut um, Opcode::ADD, 0, 1, 2).unwrap();
        assert_eq!(um.regfile.read(0), Ok(0));

        exec_op(&mut um, Opcode::MUL, 0, 3, 4).unwrap();
        assert_eq!(um.regfile.read(0), Ok(0));

        exec_op(&mut um, Opcode::MUL, 0, 1, 4).unwrap();
        assert_eq!(um.regfile.read(0), Ok(0xffff_fffe));
    }

    #[test]
    fn test_div() {
        let mut um = with_registers(&[0, 17, 5, 0]);
        exec_op(&mut um, Opcode::DIV, 0, 1, 2).unwrap();
        assert_eq!(um.regfile.read(0), Ok(3));

        assert_eq!(
            exec_op(&mut um, Opcode::DIV, 0, 1, 3),
            Err(UmError::DivisionByZero)
        );
        assert_eq!(um.regfile.read(0), Ok(3));
    }

    #[test]
    fn test_div_is_unsigned() {
        let mut um = with_registers(&[0, 0xffff_fffe, 2]);
        exec_op(&mut um, Opcode::DIV, 0, 1, 2).unwrap();
        assert_eq!(um.regfile.read(0), Ok(0x7fff_ffff));
    }

    #[test]
    fn test_nand() {
        let mut um = with_registers(&[0, 0xf0f0_ffff, 0xff00_00ff]);
        exec_op(&mut um, Opcode::NAND, 0, 1, 2).unwrap();
        assert_eq!(um.regfile.read(0), Ok(0x0fff_ff00));

        exec_op(&mut um, Opcode::NAND, 3, 3, 3).unwrap();
        assert_eq!(um.regfile.read(3), Ok(0xffff_ffff));
    }

    #[test]
    fn test_halt() {
        let mut um = with_registers(&[]);
        assert_eq!(exec_op(&mut um, Opcode::HALT, 0, 0, 0), Ok(State::Halted));
    }

    #[test]
    fn test_map_store_load_unmap() {
        let mut um = with_registers(&[0, 0, 4, 0, 0xcafe]);
        exec_op(&mut um, Opcode::MAP, 0, 1, 2).unwrap();
        assert_eq!(um.regfile.read(1), Ok(1));

        // r3 = offset 3, store r4 into segment r1
        um.regfile.write(3, 3).unwrap();
        exec_op(&mut um, Opcode::SSTORE, 1, 3, 4).unwrap();
        exec_op(&mut um, Opcode::SLOAD, 5, 1, 3).unwrap();
        assert_eq!(um.regfile.read(5), Ok(0xcafe));

        exec_op(&mut um, Opcode::UNMAP, 0, 0, 1).unwrap();
        assert_eq!(
            exec_op(&mut um, Opcode::SLOAD, 5, 1, 3),
            Err(UmError::UnmappedSegmentAccess(1))
        );
    }

    #[test]
    fn test_unmap_zero() {
        let mut um = with_registers(&[]);
        assert_eq!(
            exec_op(&mut um, Opcode::UNMAP, 0, 0, 0),
            Err(UmError::InvalidUnmap)
        );
    }

    #[test]
    fn test_sload_out_of_bounds() {
        let mut um = with_registers(&[0, 0, 1]);
        assert_eq!(
            exec_op(&mut um, Opcode::SLOAD, 0, 1, 2),
            Err(UmError::OutOfBoundsOffset {
                segment: 0,
                offset: 1,
                length: 1
            })
        );
    }

    #[test]
    fn test_out() {
        let mut um = with_registers(&[b'z' as u32, 256]);
        let mut console = Console::new(io::empty(), Vec::new());
        let out = |c| Instruction::Standard {
            a: 0,
            b: 0,
            c,
            op: Opcode::OUT,
        };
        assert_eq!(exec(&mut um, &mut console, out(0)), Ok(State::Running));
        assert_eq!(
            exec(&mut um, &mut console, out(1)),
            Err(UmError::InvalidOutput(256))
        );
        assert_eq!(console.into_output(), vec![b'z']);
    }

    #[test]
    fn test_in() {
        let mut um = with_registers(&[]);
        let mut console = Console::new(&[0x41u8][..], io::sink());
        let input = Instruction::Standard {
            a: 0,
            b: 0,
            c: 6,
            op: Opcode::IN,
        };
        exec(&mut um, &mut console, input.clone()).unwrap();
        assert_eq!(um.regfile.read(6), Ok(0x41));

        exec(&mut um, &mut console, input).unwrap();
        assert_eq!(um.regfile.read(6), Ok(0xffff_ffff));
    }

    #[test]
    fn test_loadp_jump() {
        let mut um = with_registers(&[0, 0, 9]);
        exec_op(&mut um, Opcode::LOADP, 0, 1, 2).unwrap();
        assert_eq!(um.pc, 9);
        assert_eq!(um.memory.len(0), Ok(1));
    }

    #[test]
    fn test_loadp_replaces_program() {
        let mut um = with_registers(&[0, 0, 5]);
        exec_op(&mut um, Opcode::MAP, 0, 1, 2).unwrap();
        um.memory.write(1, 4, 0x7000_0000).unwrap();
        um.regfile.write(3, 4).unwrap();

        exec_op(&mut um, Opcode::LOADP, 0, 1, 3).unwrap();
        assert_eq!(um.pc, 4);
        assert_eq!(um.memory.len(0), Ok(5));
        assert_eq!(um.memory.read(0, 4), Ok(0x7000_0000));
        // Source segment stays mapped
        assert_eq!(um.memory.len(1), Ok(5));
    }
}
