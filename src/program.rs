//! Source text to instruction sequence.

use std::fmt;
use std::str::FromStr;

use crate::MachineError;

/// One of the eight tape instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// `>`
    Right,
    /// `<`
    Left,
    /// `+`
    Increment,
    /// `-`
    Decrement,
    /// `.`
    Output,
    /// `,`
    Input,
    /// `[`
    LoopStart,
    /// `]`
    LoopEnd,
}

impl Instruction {
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '>' => Instruction::Right,
            '<' => Instruction::Left,
            '+' => Instruction::Increment,
            '-' => Instruction::Decrement,
            '.' => Instruction::Output,
            ',' => Instruction::Input,
            '[' => Instruction::LoopStart,
            ']' => Instruction::LoopEnd,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Instruction::Right => '>',
            Instruction::Left => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopStart => '[',
            Instruction::LoopEnd => ']',
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An immutable, validated sequence of instructions.
///
/// Positions are zero-based character indices into the source text, so an
/// error position can be pointed at directly in the original input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Parse `text`, rejecting any character outside `><+-.,[]`.
    ///
    /// Whitespace and comments are not skipped; they are invalid like any
    /// other foreign character.
    pub fn parse(text: &str) -> Result<Self, MachineError> {
        let instructions = text
            .chars()
            .enumerate()
            .map(|(ip, ch)| Instruction::from_char(ch).ok_or(MachineError::InvalidInstruction { ch, ip }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { instructions })
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, ip: usize) -> Option<Instruction> {
        self.instructions.get(ip).copied()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn iter(&self) -> impl Iterator<Item = Instruction> + '_ {
        self.instructions.iter().copied()
    }
}

impl FromStr for Program {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::parse(s)
    }
}

/// Canonical serialization: the instruction characters in order.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instructions {
            write!(f, "{}", instr.as_char())?;
        }
        Ok(())
    }
}
