//! Byte-level input and output capabilities supplied by the host.
//!
//! The machine only ever calls [`ByteSource::read_byte`] for `,` and
//! [`ByteSink::write_byte`] for `.`. How those bytes reach a terminal, a
//! file or a test buffer is up to the implementations here.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Read, Write};
use std::str::FromStr;

/// Supplies one byte per `,` instruction. `Ok(None)` means end of input.
pub trait ByteSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Receives one byte per `.` instruction.
pub trait ByteSink {
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }
}

impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.pop_front())
    }
}

impl ByteSource for &[u8] {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let Some((&first, rest)) = self.split_first() else {
            return Ok(None);
        };
        *self = rest;
        Ok(Some(first))
    }
}

impl ByteSink for Vec<u8> {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.push(byte);
        Ok(())
    }
}

/// A source that is always at end of input.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyInput;

impl ByteSource for EmptyInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(None)
    }
}

/// Adapts a closure into a [`ByteSource`].
pub struct FnSource<F>(pub F);

impl<F> ByteSource for FnSource<F>
where
    F: FnMut() -> io::Result<Option<u8>>,
{
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (self.0)()
    }
}

/// Adapts a closure into a [`ByteSink`].
pub struct FnSink<F>(pub F);

impl<F> ByteSink for FnSink<F>
where
    F: FnMut(u8) -> io::Result<()>,
{
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (self.0)(byte)
    }
}

/// How bytes are represented on a host stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IoFormat {
    /// One decimal value per line.
    #[default]
    Numeric,
    /// Raw bytes.
    Char,
}

impl FromStr for IoFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" | "num" | "decimal" => Ok(IoFormat::Numeric),
            "char" | "chars" | "raw" | "bytes" => Ok(IoFormat::Char),
            other => Err(format!("unknown I/O format '{other}' (expected 'numeric' or 'char')")),
        }
    }
}

impl fmt::Display for IoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoFormat::Numeric => write!(f, "numeric"),
            IoFormat::Char => write!(f, "char"),
        }
    }
}

/// Reads bytes from a host stream such as stdin.
///
/// In [`IoFormat::Numeric`] each `read_byte` consumes one line holding a
/// decimal integer, reduced modulo 256. Blank lines are skipped.
pub struct ReaderSource<R> {
    reader: R,
    format: IoFormat,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R, format: IoFormat) -> Self {
        Self { reader, format }
    }

    fn read_raw(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn read_numeric(&mut self) -> io::Result<Option<u8>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value: i64 = trimmed.parse().map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("expected a decimal integer, got '{trimmed}': {e}"),
                )
            })?;
            return Ok(Some(value.rem_euclid(256) as u8));
        }
    }
}

impl<R: BufRead> ByteSource for ReaderSource<R> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.format {
            IoFormat::Numeric => self.read_numeric(),
            IoFormat::Char => self.read_raw(),
        }
    }
}

/// Writes bytes to a host stream such as stdout, flushing after each one
/// so interactive programs show their output before blocking on input.
pub struct WriterSink<W> {
    writer: W,
    format: IoFormat,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: IoFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ByteSink for WriterSink<W> {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        match self.format {
            IoFormat::Numeric => writeln!(self.writer, "{byte}")?,
            IoFormat::Char => self.writer.write_all(&[byte])?,
        }
        self.writer.flush()
    }
}
