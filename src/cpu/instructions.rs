use core::fmt;
use enum_primitive_derive::Primitive;

#[derive(Debug, Clone, Copy, PartialEq, Primitive)]
pub enum Opcode {
    CMOV = 0,
    SLOAD = 1,
    SSTORE = 2,
    ADD = 3,
    MUL = 4,
    DIV = 5,
    NAND = 6,
    HALT = 7,
    MAP = 8,
    UNMAP = 9,
    OUT = 10,
    IN = 11,
    LOADP = 12,
    LV = 13,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Three register operands in the low nine bits.
    Standard {
        a: usize,
        b: usize,
        c: usize,
        op: Opcode,
    },
    /// Load a 25-bit immediate into `a`.
    LoadValue { a: usize, value: u32 },
}

#[cfg(test)]
impl Instruction {
    pub fn encode(&self) -> u32 {
        match self {
            Self::Standard { a, b, c, op } => {
                (*op as u32) << 28 | (*a as u32) << 6 | (*b as u32) << 3 | *c as u32
            }
            Self::LoadValue { a, value } => {
                (Opcode::LV as u32) << 28 | (*a as u32) << 25 | (value & 0x1ff_ffff)
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Standard { a, b, c, op } => match op {
                Opcode::HALT => write!(f, "halt"),
                Opcode::MAP => write!(f, "map - r{}, r{}", b, c),
                Opcode::UNMAP | Opcode::OUT | Opcode::IN => {
                    write!(f, "{} - r{}", format!("{:?}", op).to_lowercase(), c)
                }
                Opcode::LOADP => write!(f, "loadp - r{}, r{}", b, c),
                _ => write!(
                    f,
                    "{} - r{}, r{}, r{}",
                    format!("{:?}", op).to_lowercase(),
                    a,
                    b,
                    c
                ),
            },
            Self::LoadValue { a, value } => write!(f, "lv - r{}, {:#x}", a, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let add = Instruction::Standard {
            a: 1,
            b: 2,
            c: 3,
            op: Opcode::ADD,
        };
        assert_eq!(add.to_string(), "add - r1, r2, r3");

        let out = Instruction::Standard {
            a: 0,
            b: 0,
            c: 5,
            op: Opcode::OUT,
        };
        assert_eq!(out.to_string(), "out - r5");

        let lv = Instruction::LoadValue { a: 7, value: 72 };
        assert_eq!(lv.to_string(), "lv - r7, 0x48");
    }

    #[test]
    fn test_encode() {
        let lv = Instruction::LoadValue { a: 1, value: 10 };
        assert_eq!(lv.encode(), 0xd200_000a);

        let halt = Instruction::Standard {
            a: 0,
            b: 0,
            c: 0,
            op: Opcode::HALT,
        };
        assert_eq!(halt.encode(), 0x7000_0000);
    }
}
