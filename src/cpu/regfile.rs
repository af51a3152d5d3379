use crate::trap::UmError;

pub const NUM_REGISTERS: usize = 8;

#[derive(Debug)]
pub struct RegFile {
    registers: [u32; NUM_REGISTERS],
}

impl RegFile {
    pub fn new() -> Self {
        Self {
            registers: [0; NUM_REGISTERS],
        }
    }

    pub fn read(&self, num: usize) -> Result<u32, UmError> {
        self.registers
            .get(num)
            .copied()
            .ok_or(UmError::InvalidRegisterIndex(num))
    }

    pub fn write(&mut self, num: usize, value: u32) -> Result<(), UmError> {
        let register = self
            .registers
            .get_mut(num)
            .ok_or(UmError::InvalidRegisterIndex(num))?;
        *register = value;
        Ok(())
    }
}
