mod commands;

use clap::{Parser, Subcommand};

use commands::check::CheckArgs;
use commands::run::RunArgs;

const PROGRAM: &str = "tapevm";

#[derive(Parser, Debug)]
#[command(
    name = "tapevm",
    version,
    about = "Run programs for the eight-instruction tape machine ><+-.,[]",
    after_help = "Notes:\n- Any character outside ><+-.,[] (including whitespace) is an error.\n- In numeric format `.` prints each cell as a decimal line and `,` reads one decimal per line.\n- In char format bytes are passed through raw; on EOF `,` stores 0.\n- Set RUST_LOG=trace to log every executed instruction to stderr."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program
    Run(RunArgs),
    /// Parse and validate a program without running it
    Check(CheckArgs),
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let code = match cli.command {
        Command::Run(args) => commands::run::run(PROGRAM, args),
        Command::Check(args) => commands::check::run(PROGRAM, args),
    };

    std::process::exit(code);
}
