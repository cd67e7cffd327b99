use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use tape_vm::cli_util::print_machine_error;
use tape_vm::config::{Overrides, Settings};
use tape_vm::io::{ReaderSource, WriterSink};
use tape_vm::{IoFormat, Machine, MachineError, StepControl};

use super::load_source;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Read code from PATH instead of positional CODE
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Number of tape cells (fallback TAPEVM_CAPACITY; default 30000)
    #[arg(long = "capacity", value_name = "CELLS")]
    pub capacity: Option<usize>,

    /// Byte format on stdin/stdout: numeric or char (fallback TAPEVM_FORMAT; default numeric)
    #[arg(long = "format", value_name = "FORMAT")]
    pub format: Option<IoFormat>,

    /// Print the visited tape window to stderr after the run
    #[arg(long = "dump")]
    pub dump: bool,

    /// Wall-clock timeout in milliseconds (fallback TAPEVM_TIMEOUT_MS; default unlimited)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback TAPEVM_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Concatenated code parts
    #[arg(value_name = "CODE", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,
}

enum Outcome {
    Finished(Box<Machine>, Result<(), MachineError>),
    TimedOut(u64),
    Interrupted,
    Crashed,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    let code_str = match load_source(program, args.file.as_deref(), &args.code) {
        Ok(s) => s,
        Err(exit) => return exit,
    };

    let settings = Settings::load(Overrides {
        capacity: args.capacity,
        format: args.format,
        max_steps: args.max_steps,
        timeout_ms: args.timeout_ms,
    });
    debug!("{settings:?}");

    // Parse and validate up front so no worker is spawned for a bad program.
    let machine = match Machine::from_source_with_capacity(&code_str, settings.capacity) {
        Ok(m) => m,
        Err(err) => {
            print_machine_error(Some(program), &code_str, &err);
            return 1;
        }
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        let interrupted = interrupted.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::Relaxed);
            cancel.store(true, Ordering::Relaxed);
        }) {
            warn!("failed to set ctrl+c handler: {e}");
        }
    }

    let outcome = execute(machine, &settings, cancel, &interrupted);
    if settings.format == IoFormat::Char {
        // For readability, ensure raw output ends with a newline
        println!();
    }
    let _ = io::stdout().flush();

    match outcome {
        Outcome::Finished(machine, result) => {
            let exit_code = match result {
                Ok(()) => 0,
                Err(err) => {
                    print_machine_error(Some(program), &code_str, &err);
                    1
                }
            };
            if args.dump {
                eprintln!("{}", machine.tape_view());
                eprintln!("cursor={} steps={}", machine.cursor(), machine.steps());
            }
            let _ = io::stderr().flush();
            exit_code
        }
        Outcome::TimedOut(timeout_ms) => {
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
            let _ = io::stderr().flush();
            1
        }
        Outcome::Crashed => {
            eprintln!("{program}: interpreter thread terminated unexpectedly");
            let _ = io::stderr().flush();
            1
        }
        Outcome::Interrupted => {
            eprintln!("Execution aborted: interrupted");
            let _ = io::stderr().flush();
            130
        }
    }
}

/// Run the machine on a worker thread with cooperative cancellation.
///
/// The worker may stay blocked on stdin after a timeout; the process exits
/// right after, so it is never joined.
fn execute(
    mut machine: Machine,
    settings: &Settings,
    cancel: Arc<AtomicBool>,
    interrupted: &AtomicBool,
) -> Outcome {
    let (tx, rx) = mpsc::channel::<(Machine, Result<(), MachineError>)>();
    let format = settings.format;
    let ctrl = StepControl::new(settings.max_steps, cancel.clone());

    thread::spawn(move || {
        let stdin = io::stdin();
        let mut input = ReaderSource::new(stdin.lock(), format);
        let mut output = WriterSink::new(io::stdout(), format);
        let res = machine.run_with_control(&mut input, &mut output, &ctrl);
        let _ = tx.send((machine, res));
    });

    let deadline = settings
        .timeout_ms
        .map(|ms| (ms, Instant::now() + Duration::from_millis(ms)));

    loop {
        if interrupted.load(Ordering::Relaxed) {
            return Outcome::Interrupted;
        }
        if let Some((ms, at)) = deadline {
            if Instant::now() >= at {
                cancel.store(true, Ordering::Relaxed);
                return Outcome::TimedOut(ms);
            }
        }

        match rx.recv_timeout(POLL_INTERVAL) {
            // Only ctrl+c or the deadline set the flag; the deadline returned above.
            Ok((_, Err(MachineError::Canceled))) => return Outcome::Interrupted,
            Ok((machine, res)) => return Outcome::Finished(Box::new(machine), res),
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => return Outcome::Crashed,
        }
    }
}
