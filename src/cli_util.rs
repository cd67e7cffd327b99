use std::io::{self, Write};
use crate::MachineError;

/// Pretty-print a structured MachineError with caret positioning.
/// If `program` is `Some("tapevm")`, prefix messages with "tapevm: ...".
pub fn print_machine_error(program: Option<&str>, code: &str, err: &MachineError) {
    let _ = write_machine_error(&mut io::stderr().lock(), program, code, err);
    let _ = io::stderr().flush();
}

/// Same as [`print_machine_error`] but into any writer.
pub fn write_machine_error<W: Write>(
    out: &mut W,
    program: Option<&str>,
    code: &str,
    err: &MachineError,
) -> io::Result<()> {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        MachineError::InvalidInstruction { ch, ip } => {
            let msg = prefix_program(&format!("Parse error: invalid instruction '{}'", ch.escape_debug()));
            write_error_with_context(out, &msg, code, *ip)
        }
        MachineError::UnbalancedBrackets { ip, kind } => {
            let msg = prefix_program(&format!("Parse error: unbalanced bracket {kind}"));
            write_error_with_context(out, &msg, code, *ip)
        }
        MachineError::TapeOverflow { ip, cursor } => {
            let msg = prefix_program(&format!("Runtime error: tape overflow (cursor={cursor})"));
            write_error_with_context(out, &msg, code, *ip)
        }
        MachineError::TapeUnderflow { ip } => {
            let msg = prefix_program("Runtime error: tape underflow (cursor=0)");
            write_error_with_context(out, &msg, code, *ip)
        }
        MachineError::Io { ip, source } => {
            let msg = prefix_program(&format!("I/O error: {source}"));
            write_error_with_context(out, &msg, code, *ip)
        }
        MachineError::StepLimitExceeded { .. } | MachineError::Canceled => {
            writeln!(out, "{err}")
        }
    }
}

/// Write a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
fn write_error_with_context<W: Write>(out: &mut W, prefix: &str, code: &str, pos: usize) -> io::Result<()> {
    writeln!(out, "{prefix} at instruction {pos}")?;

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    // Control characters would break the caret alignment.
    let slice: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    writeln!(out, "  {}", slice)?;

    let caret_offset_chars = pos.saturating_sub(start_char);
    writeln!(out, "  {}^", " ".repeat(caret_offset_chars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BracketKind;

    fn render(program: Option<&str>, code: &str, err: &MachineError) -> String {
        let mut buf = Vec::new();
        write_machine_error(&mut buf, program, code, err).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn caret_points_at_offending_char() {
        let err = MachineError::InvalidInstruction { ch: 'a', ip: 2 };
        let text = render(Some("tapevm"), "++a+", &err);
        assert_eq!(
            text,
            "tapevm: Parse error: invalid instruction 'a' at instruction 2\n  ++a+\n    ^\n"
        );
    }

    #[test]
    fn long_programs_are_windowed() {
        let code = format!("{}]{}", "+".repeat(100), "-".repeat(100));
        let err = MachineError::UnbalancedBrackets { ip: 100, kind: BracketKind::Close };
        let text = render(None, &code, &err);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Parse error: unbalanced bracket ']' at instruction 100");
        assert_eq!(lines[1].trim().chars().count(), 65);
        assert_eq!(lines[2].find('^'), lines[1].find(']'));
    }

    #[test]
    fn newline_is_escaped_and_blanked() {
        let err = MachineError::InvalidInstruction { ch: '\n', ip: 1 };
        let text = render(None, "+\n", &err);
        assert!(text.starts_with("Parse error: invalid instruction '\\n' at instruction 1\n"));
        assert!(text.contains("\n  + \n   ^\n"));
    }

    #[test]
    fn aborts_have_no_context() {
        let text = render(Some("tapevm"), "+[]", &MachineError::StepLimitExceeded { limit: 10 });
        assert_eq!(text, "Execution aborted: step limit exceeded (10)\n");
    }
}
