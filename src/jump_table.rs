use crate::program::{Instruction, Program};
use crate::{BracketKind, MachineError};

/// Precomputed matching bracket positions for O(1) jumps.
///
/// `targets[i]` holds the partner index for a `[` or `]` at index `i`, and
/// `None` for every other instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JumpTable {
    targets: Vec<Option<usize>>,
    pairs: usize,
}

impl JumpTable {
    /// Pair every `]` with the nearest unmatched `[` before it.
    pub fn build(program: &Program) -> Result<Self, MachineError> {
        let mut targets: Vec<Option<usize>> = vec![None; program.len()];
        let mut stack: Vec<usize> = Vec::new();
        let mut pairs = 0;

        for (i, instr) in program.iter().enumerate() {
            match instr {
                Instruction::LoopStart => stack.push(i),
                Instruction::LoopEnd => {
                    let Some(open_index) = stack.pop() else {
                        return Err(MachineError::UnbalancedBrackets {
                            ip: i,
                            kind: BracketKind::Close,
                        });
                    };
                    targets[open_index] = Some(i);
                    targets[i] = Some(open_index);
                    pairs += 1;
                }
                _ => {}
            }
        }

        if let Some(unmatched_open) = stack.last().copied() {
            return Err(MachineError::UnbalancedBrackets {
                ip: unmatched_open,
                kind: BracketKind::Open,
            });
        }

        Ok(Self { targets, pairs })
    }

    /// Index of the bracket matching the one at `ip`.
    pub fn matching(&self, ip: usize) -> Option<usize> {
        self.targets.get(ip).copied().flatten()
    }

    /// Number of matched loops.
    pub fn len(&self) -> usize {
        self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }

    /// `(open, close)` pairs ordered by the opening bracket.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.targets
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.filter(|&j| j > i).map(|j| (i, j)))
    }
}
