use std::io;
use thiserror::Error;

/// Fatal conditions that abort a UM run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UmError {
    #[error("allocation failure: cannot map a segment of {0} words")]
    AllocationFailure(u32),
    #[error("invalid opcode {opcode} in word {word:#010x}")]
    InvalidOpcode { word: u32, opcode: u32 },
    #[error("register index {0} out of range")]
    InvalidRegisterIndex(usize),
    #[error("access to unmapped segment {0}")]
    UnmappedSegmentAccess(u32),
    #[error("offset {offset} out of bounds for segment {segment} of length {length}")]
    OutOfBoundsOffset {
        segment: u32,
        offset: u32,
        length: usize,
    },
    #[error("segment 0 cannot be unmapped")]
    InvalidUnmap,
    #[error("division by zero")]
    DivisionByZero,
    #[error("output value {0} does not fit in a byte")]
    InvalidOutput(u32),
    #[error("i/o failure: {0}")]
    Io(io::ErrorKind),
}

impl From<io::Error> for UmError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.kind())
    }
}

impl UmError {
    /// Process exit status reported for this fault.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::AllocationFailure(_) => 3,
            Self::InvalidOpcode { .. } => 4,
            Self::InvalidRegisterIndex(_) => 5,
            Self::UnmappedSegmentAccess(_) => 6,
            Self::OutOfBoundsOffset { .. } => 7,
            Self::InvalidUnmap => 8,
            Self::DivisionByZero => 9,
            Self::InvalidOutput(_) => 10,
            Self::Io(_) => 11,
        }
    }
}
