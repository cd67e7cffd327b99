use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use tape_vm::Machine;
use tape_vm::cli_util::print_machine_error;

use super::load_source;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Read code from PATH instead of positional CODE
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Concatenated code parts
    #[arg(value_name = "CODE", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,
}

/// Parse and validate without running anything.
pub fn run(program: &str, args: CheckArgs) -> i32 {
    let code_str = match load_source(program, args.file.as_deref(), &args.code) {
        Ok(s) => s,
        Err(exit) => return exit,
    };

    match Machine::from_source(&code_str) {
        Ok(machine) => {
            println!(
                "ok: {} instructions, {} loops",
                machine.program().len(),
                machine.jump_table().len()
            );
            let _ = io::stdout().flush();
            0
        }
        Err(err) => {
            print_machine_error(Some(program), &code_str, &err);
            1
        }
    }
}
