use tracing::{debug, info, trace};

use self::alu::exec;
use self::decoder::decode;
use self::regfile::RegFile;

use crate::console::IoDevice;
use crate::memory::SegmentedMemory;
use crate::trap::UmError;

pub mod alu;
pub mod decoder;
pub mod instructions;
pub mod regfile;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum State {
    Running,
    Halted,
}

/// Why a run ended without a fault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stop {
    /// A HALT instruction was executed.
    Halted,
    /// The program counter ran past the end of segment 0.
    EndOfProgram,
}

pub struct Um {
    regfile: RegFile,
    memory: SegmentedMemory,
    pc: u32,
    state: State,
    instruction_count: u64,
}

impl Um {
    /// Creates a machine whose program segment holds `length` zero words.
    pub fn new(length: u32) -> Result<Self, UmError> {
        Ok(Self {
            regfile: RegFile::new(),
            memory: SegmentedMemory::new(length)?,
            pc: 0,
            state: State::Running,
            instruction_count: 0,
        })
    }

    /// Stores a program word in segment 0 before execution starts.
    pub fn populate(&mut self, index: u32, word: u32) -> Result<(), UmError> {
        self.memory.write(0, index, word)
    }

    pub fn fetch(&self) -> Result<u32, UmError> {
        self.memory.read(0, self.pc)
    }

    fn at_end(&self) -> Result<bool, UmError> {
        // Segment 0 may have been swapped out by LOADP, so never cache this
        Ok(self.pc as usize >= self.memory.len(0)?)
    }

    /// Executes one instruction.
    pub fn step(&mut self, io: &mut impl IoDevice) -> Result<State, UmError> {
        // Fetch
        let raw = self.fetch()?;
        // Decode
        let instruction = decode(raw)?;
        trace!("{:>08x}: {:>08x}  {}", self.pc, raw, instruction);
        self.pc += 1;
        self.instruction_count += 1;
        // Execute
        self.state = exec(self, io, instruction)?;
        Ok(self.state)
    }

    /// Runs until HALT, the end of segment 0, or the first fault.
    pub fn run(&mut self, io: &mut impl IoDevice) -> Result<Stop, UmError> {
        let result = self.run_loop(io);
        io.flush()?;
        let stop = result?;
        info!("{:?} after {} instructions", stop, self.instruction_count);
        Ok(stop)
    }

    fn run_loop(&mut self, io: &mut impl IoDevice) -> Result<Stop, UmError> {
        while self.state == State::Running {
            if self.at_end()? {
                return Ok(Stop::EndOfProgram);
            }
            self.step(io)?;
        }
        Ok(Stop::Halted)
    }

    /// Releases every segment and the free-id queue.
    pub fn destroy(self) {
        debug!(
            "releasing {} mapped segments, {} free ids",
            self.memory.mapped_count(),
            self.memory.free_count()
        );
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }
}
