use std::io::{self, ErrorKind, Read, Write};

/// Byte-wide I/O port used by the OUT and IN instructions.
pub trait IoDevice {
    fn put(&mut self, byte: u8) -> io::Result<()>;
    /// Next input byte, `None` once the input is exhausted.
    fn get(&mut self) -> io::Result<Option<u8>>;
    fn flush(&mut self) -> io::Result<()>;
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: Read, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: Read, W: Write> IoDevice for Console<R, W> {
    fn put(&mut self, byte: u8) -> io::Result<()> {
        self.output.write_all(&[byte])
    }

    fn get(&mut self) -> io::Result<Option<u8>> {
        // Anything written so far must be visible before blocking on input
        self.output.flush()?;
        let mut c = [0u8];
        loop {
            return match self.input.read(&mut c) {
                Ok(0) => Ok(None),
                Ok(_) => Ok(Some(c[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => Err(e),
            };
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}
