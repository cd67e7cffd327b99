pub mod check;
pub mod run;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Resolve program text from `--file` or the concatenated positional parts.
///
/// A single trailing line ending is dropped from files so editors that add
/// one do not produce an invalid program. Returns the exit code on failure.
pub fn load_source(program: &str, file: Option<&Path>, code: &[String]) -> Result<String, i32> {
    match (file, code.is_empty()) {
        (Some(_), false) => {
            eprintln!("{program}: cannot use positional code together with --file");
            let _ = io::stderr().flush();
            Err(2)
        }
        (None, true) => {
            eprintln!("{program}: no program given (pass CODE or --file <PATH>)");
            let _ = io::stderr().flush();
            Err(2)
        }
        (Some(path), true) => match fs::read_to_string(path) {
            Ok(s) => {
                let trimmed = s.strip_suffix('\n').map(|t| t.strip_suffix('\r').unwrap_or(t));
                Ok(trimmed.unwrap_or(s.as_str()).to_string())
            }
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                Err(1)
            }
        },
        (None, false) => Ok(code.join("")),
    }
}
