use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use log::{debug, trace};

use crate::io::{ByteSink, ByteSource};
use crate::jump_table::JumpTable;
use crate::program::{Instruction, Program};
use crate::tape::{DEFAULT_CAPACITY, Tape, TapeView};
use crate::MachineError;

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone, Debug, Default)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }

    /// Only a step budget, with a flag nobody else holds.
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self::new(Some(max_steps), Arc::new(AtomicBool::new(false)))
    }
}

/// The tape machine.
///
/// The machine maintains:
/// - the validated program and its jump table,
/// - a fixed-capacity memory tape initialized to zeros (30,000 cells by default),
/// - the instruction pointer and a count of executed steps.
#[derive(Debug, Clone)]
pub struct Machine {
    program: Program,
    jumps: JumpTable,
    tape: Tape,
    ip: usize,
    steps: usize,
}

impl Machine {
    /// Build a machine for `program` with the default 30,000-cell tape.
    ///
    /// Fails with [`MachineError::UnbalancedBrackets`] before anything runs.
    pub fn new(program: Program) -> Result<Self, MachineError> {
        Self::with_capacity(program, DEFAULT_CAPACITY)
    }

    /// Build a machine for `program` with a custom tape size.
    pub fn with_capacity(program: Program, capacity: usize) -> Result<Self, MachineError> {
        let jumps = JumpTable::build(&program)?;
        let tape = Tape::new(capacity);
        debug!(
            "machine ready: {} instructions, {} loops, {} cells",
            program.len(),
            jumps.len(),
            tape.capacity()
        );
        Ok(Self {
            program,
            jumps,
            tape,
            ip: 0,
            steps: 0,
        })
    }

    /// Parse `source` and build a machine with the default tape.
    pub fn from_source(source: &str) -> Result<Self, MachineError> {
        Self::new(Program::parse(source)?)
    }

    /// Parse `source` and build a machine with a custom tape size.
    pub fn from_source_with_capacity(source: &str, capacity: usize) -> Result<Self, MachineError> {
        Self::with_capacity(Program::parse(source)?, capacity)
    }

    /// Execute the program until completion.
    ///
    /// `,` stores the next byte from `input`, or 0 once input is exhausted.
    /// `.` hands the current cell to `output`.
    pub fn run<I, O>(&mut self, input: &mut I, output: &mut O) -> Result<(), MachineError>
    where
        I: ByteSource + ?Sized,
        O: ByteSink + ?Sized,
    {
        self.execute(input, output, None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    ///
    /// Both are checked once before every instruction.
    pub fn run_with_control<I, O>(
        &mut self,
        input: &mut I,
        output: &mut O,
        step_control: &StepControl,
    ) -> Result<(), MachineError>
    where
        I: ByteSource + ?Sized,
        O: ByteSink + ?Sized,
    {
        self.execute(input, output, Some(step_control))
    }

    fn execute<I, O>(
        &mut self,
        input: &mut I,
        output: &mut O,
        step_control: Option<&StepControl>,
    ) -> Result<(), MachineError>
    where
        I: ByteSource + ?Sized,
        O: ByteSink + ?Sized,
    {
        while !self.is_halted() {
            if let Some(ctrl) = step_control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    debug!("cancelled at instruction {} after {} steps", self.ip, self.steps);
                    return Err(MachineError::Canceled);
                }
                if let Some(max) = ctrl.max_steps {
                    if self.steps >= max {
                        return Err(MachineError::StepLimitExceeded { limit: max });
                    }
                }
            }

            self.step(input, output)?;
        }

        debug!(
            "halted after {} steps (cursor={}, high water mark={})",
            self.steps,
            self.tape.cursor(),
            self.tape.high_water_mark()
        );
        Ok(())
    }

    /// Execute exactly one instruction. Does nothing once halted.
    pub fn step<I, O>(&mut self, input: &mut I, output: &mut O) -> Result<(), MachineError>
    where
        I: ByteSource + ?Sized,
        O: ByteSink + ?Sized,
    {
        let Some(instr) = self.program.get(self.ip) else {
            return Ok(());
        };
        trace!(
            "step={} ip={} cursor={} cell={} instr={}",
            self.steps,
            self.ip,
            self.tape.cursor(),
            self.tape.get(),
            instr
        );

        match instr {
            Instruction::Right => {
                if !self.tape.move_right() {
                    return Err(MachineError::TapeOverflow {
                        ip: self.ip,
                        cursor: self.tape.cursor(),
                    });
                }
            }
            Instruction::Left => {
                if !self.tape.move_left() {
                    return Err(MachineError::TapeUnderflow { ip: self.ip });
                }
            }
            Instruction::Increment => {
                self.tape.increment();
            }
            Instruction::Decrement => {
                self.tape.decrement();
            }
            Instruction::Output => {
                output
                    .write_byte(self.tape.get())
                    .map_err(|source| MachineError::Io { ip: self.ip, source })?;
            }
            Instruction::Input => {
                let byte = input
                    .read_byte()
                    .map_err(|source| MachineError::Io { ip: self.ip, source })?;
                // EOF leaves a 0 in the cell
                self.tape.set(byte.unwrap_or(0));
            }
            Instruction::LoopStart => {
                if self.tape.get() == 0 {
                    if let Some(j) = self.jumps.matching(self.ip) {
                        self.ip = j;
                    }
                }
            }
            Instruction::LoopEnd => {
                if self.tape.get() != 0 {
                    if let Some(j) = self.jumps.matching(self.ip) {
                        self.ip = j;
                    }
                }
            }
        }

        // A jump lands on the matching bracket; this moves past it.
        self.ip += 1;
        self.steps += 1;
        Ok(())
    }

    pub fn is_halted(&self) -> bool {
        self.ip >= self.program.len()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn jump_table(&self) -> &JumpTable {
        &self.jumps
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn cursor(&self) -> usize {
        self.tape.cursor()
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }

    pub fn high_water_mark(&self) -> usize {
        self.tape.high_water_mark()
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Inspection window over the visited cells. Never mutates the machine.
    pub fn tape_view(&self) -> TapeView<'_> {
        self.tape.view()
    }
}
