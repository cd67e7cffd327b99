//! A tiny tape machine for the eight-instruction language `><+-.,[]`.
//!
//! This crate provides a small interpreter that operates on a fixed memory
//! tape (default 30,000 cells) with a single cursor.
//!
//! Features and behaviors:
//! - Memory tape initialized to 0; cells are bytes that wrap on `+` and `-`.
//! - Strict cursor bounds: moving left from cell 0 or right past the end
//!   returns an error.
//! - Nested loops are matched ahead of time; unmatched brackets are reported
//!   before anything runs.
//! - Any non-instruction character (including whitespace) is an error.
//! - Input `,` and output `.` go through the [`ByteSource`] and [`ByteSink`]
//!   capabilities; on end of input the current cell is set to 0.
//! - By default the host adapters print each output byte as a decimal
//!   number on its own line; [`IoFormat::Char`] writes raw bytes instead.
//!
//! Quick start:
//!
//! ```
//! use tape_vm::{Machine, io::EmptyInput};
//!
//! let mut machine = Machine::from_source("+++>++<[->+<]").unwrap();
//! let mut output: Vec<u8> = Vec::new();
//! machine.run(&mut EmptyInput, &mut output).unwrap();
//! assert_eq!(machine.tape().cells()[..2], [0, 5]);
//! println!("{}", machine.tape_view());
//! ```

pub mod cli_util;
pub mod config;
mod error;
pub mod io;
pub mod jump_table;
pub mod machine;
pub mod program;
pub mod tape;

pub use error::{BracketKind, MachineError};
pub use io::{ByteSink, ByteSource, IoFormat};
pub use jump_table::JumpTable;
pub use machine::{Machine, StepControl};
pub use program::{Instruction, Program};
pub use tape::{DEFAULT_CAPACITY, Tape, TapeView};

use io::{ReaderSource, WriterSink};

/// Parse, validate and run `source` against stdin/stdout, numeric format.
///
/// Returns the halted machine so its tape can be inspected.
pub fn interpret(source: &str) -> Result<Machine, MachineError> {
    let stdin = std::io::stdin();
    let mut input = ReaderSource::new(stdin.lock(), IoFormat::Numeric);
    let mut output = WriterSink::new(std::io::stdout(), IoFormat::Numeric);
    interpret_with(source, &mut input, &mut output)
}

/// Like [`interpret`] with caller-supplied capabilities.
pub fn interpret_with<I, O>(source: &str, input: &mut I, output: &mut O) -> Result<Machine, MachineError>
where
    I: ByteSource + ?Sized,
    O: ByteSink + ?Sized,
{
    let mut machine = Machine::from_source(source)?;
    machine.run(input, output)?;
    Ok(machine)
}
