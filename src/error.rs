use std::fmt;

/// Errors that can occur while parsing, validating or running a program.
#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    /// Encountered a character outside the instruction set `><+-.,[]`.
    #[error("Invalid instruction: '{ch}' at instruction {ip}")]
    InvalidInstruction { ch: char, ip: usize },

    /// Loops were not balanced; a matching `[` or `]` was not found.
    #[error("Unbalanced bracket {kind} at instruction {ip}")]
    UnbalancedBrackets { ip: usize, kind: BracketKind },

    /// The cursor attempted to move past the last cell.
    #[error("Tape overflow at instruction {ip} (cursor={cursor})")]
    TapeOverflow { ip: usize, cursor: usize },

    /// The cursor attempted to move left of cell 0.
    #[error("Tape underflow at instruction {ip}")]
    TapeUnderflow { ip: usize },

    /// The host input or output capability failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (timeout or signal).
    #[error("Execution aborted: cancelled")]
    Canceled,
}

impl MachineError {
    /// Instruction position the error points at, when it has one.
    pub fn ip(&self) -> Option<usize> {
        match self {
            MachineError::InvalidInstruction { ip, .. }
            | MachineError::UnbalancedBrackets { ip, .. }
            | MachineError::TapeOverflow { ip, .. }
            | MachineError::TapeUnderflow { ip }
            | MachineError::Io { ip, .. } => Some(*ip),
            MachineError::StepLimitExceeded { .. } | MachineError::Canceled => None,
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "'['"),
            BracketKind::Close => write!(f, "']'"),
        }
    }
}
