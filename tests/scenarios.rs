// End-to-end checks of the library surface with injected I/O.
use std::cell::RefCell;
use std::io;

use tape_vm::io::{EmptyInput, FnSink};
use tape_vm::{interpret_with, BracketKind, Machine, MachineError, Program};

#[test]
fn transfer_program_final_state() {
    let mut output: Vec<u8> = Vec::new();
    let machine = interpret_with("+++>++<[->+<]", &mut EmptyInput, &mut output).unwrap();
    assert_eq!(machine.tape().cells()[0], 0);
    assert_eq!(machine.tape().cells()[1], 5);
    assert_eq!(machine.cursor(), 0);
    assert!(output.is_empty());
}

#[test]
fn transfer_program_on_two_cell_tape() {
    let mut machine = Machine::from_source_with_capacity("+++>++<[->+<]", 2).unwrap();
    machine.run(&mut EmptyInput, &mut Vec::<u8>::new()).unwrap();
    assert_eq!(machine.tape().cells(), &[0, 5]);
}

#[test]
fn single_write_then_loop_clears_cell() {
    let calls = RefCell::new(Vec::new());
    let mut sink = FnSink(|b: u8| -> io::Result<()> {
        calls.borrow_mut().push(b);
        Ok(())
    });
    let machine = interpret_with("+.[-]", &mut EmptyInput, &mut sink).unwrap();
    assert_eq!(*calls.borrow(), vec![1u8]);
    assert_eq!(machine.tape().cells()[0], 0);
    assert!(machine.is_halted());
}

#[test]
fn lone_open_bracket_executes_nothing() {
    let calls = RefCell::new(0usize);
    let mut sink = FnSink(|_: u8| -> io::Result<()> {
        *calls.borrow_mut() += 1;
        Ok(())
    });
    let result = interpret_with(".[", &mut EmptyInput, &mut sink);
    assert!(matches!(
        result,
        Err(MachineError::UnbalancedBrackets { ip: 1, kind: BracketKind::Open })
    ));
    assert_eq!(*calls.borrow(), 0);

    let result = Machine::from_source("[");
    assert!(matches!(result, Err(MachineError::UnbalancedBrackets { ip: 0, .. })));
}

#[test]
fn foreign_character_at_start() {
    let result = Machine::from_source("@");
    assert!(matches!(result, Err(MachineError::InvalidInstruction { ch: '@', ip: 0 })));
}

#[test]
fn malformed_nesting_is_rejected() {
    for source in ["[[]", "[]]", "]["] {
        let result = Machine::from_source(source);
        assert!(
            matches!(result, Err(MachineError::UnbalancedBrackets { .. })),
            "{source} should be rejected"
        );
    }
}

#[test]
fn bracket_pairs_form_a_bijection() {
    let program = Program::parse("+[>[->+<]<[-[+]]]").unwrap();
    let machine = Machine::new(program.clone()).unwrap();
    let table = machine.jump_table();

    let opens: Vec<usize> = program
        .iter()
        .enumerate()
        .filter(|(_, i)| i.as_char() == '[')
        .map(|(ip, _)| ip)
        .collect();
    let mut closes_seen = Vec::new();
    for open in opens {
        let close = table.matching(open).expect("every [ has a partner");
        assert!(close > open);
        assert_eq!(program.get(close).map(|i| i.as_char()), Some(']'));
        assert_eq!(table.matching(close), Some(open));
        closes_seen.push(close);
    }
    closes_seen.sort_unstable();
    closes_seen.dedup();
    assert_eq!(closes_seen.len(), table.len());
}

#[test]
fn cell_arithmetic_wraps() {
    let mut machine = Machine::from_source_with_capacity("-", 1).unwrap();
    machine.run(&mut EmptyInput, &mut Vec::<u8>::new()).unwrap();
    assert_eq!(machine.tape().cells()[0], 255);

    let mut machine = Machine::from_source_with_capacity("-+", 1).unwrap();
    machine.run(&mut EmptyInput, &mut Vec::<u8>::new()).unwrap();
    assert_eq!(machine.tape().cells()[0], 0);
}

#[test]
fn cursor_bounds() {
    let mut machine = Machine::from_source_with_capacity("<", 4).unwrap();
    let result = machine.run(&mut EmptyInput, &mut Vec::<u8>::new());
    assert!(matches!(result, Err(MachineError::TapeUnderflow { ip: 0 })));

    let mut machine = Machine::from_source_with_capacity(">>>>", 4).unwrap();
    let result = machine.run(&mut EmptyInput, &mut Vec::<u8>::new());
    assert!(matches!(result, Err(MachineError::TapeOverflow { ip: 3, cursor: 3 })));
}

#[test]
fn hello_world_in_char_bytes() {
    let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
    let mut output: Vec<u8> = Vec::new();
    interpret_with(code, &mut EmptyInput, &mut output).unwrap();
    assert_eq!(output, b"Hello World!\n");
}

#[test]
fn high_water_mark_tracks_furthest_cell() {
    let mut machine = Machine::from_source(">>>+<<<").unwrap();
    machine.run(&mut EmptyInput, &mut Vec::<u8>::new()).unwrap();
    assert_eq!(machine.cursor(), 0);
    assert_eq!(machine.high_water_mark(), 3);
    assert_eq!(machine.tape_view().cells(), &[0, 0, 0, 1]);
}
