use k2::{parse_rom, Assembler, ExecutionError, Machine, Opcode, Status, SyntaxError};

/// Assembles `source`, hands the text form to the ROM loader as the tools do through a file,
/// and runs the result.
fn assemble_and_run(source: &str) -> (Machine, Result<(), ExecutionError>) {
  let text    = Assembler::new().assemble_to_text(source).unwrap();
  let program = parse_rom(&text).unwrap();

  let mut machine = Machine::new();
  machine.load(&program).unwrap();
  let result = machine.execute();
  (machine, result)
}

#[test]
fn assembled_text_loads_back() {
  let source = "LD R1 0x0A\nADD R1 R2\n";
  let text   = Assembler::new().assemble_to_text(source).unwrap();
  assert_eq!(text, "000a\n2010\n");
  assert_eq!(parse_rom(&text).unwrap(), vec![0x000A, 0x2010]);
}

#[test]
fn subroutine() {
  // CALL 0x002 resumes at 0x003 and RET comes back to 0x001. J 0x006 then resumes at the LA,
  // the eighth and last cycle.
  let source = "
    CALL 0x002
    LD R3 1
    J 0x006
    LD R1 6
    LD R2 7
    MULT R1 R2
    RET
    LA 0x7FF
  ";
  let (machine, result) = assemble_and_run(source);
  result.unwrap();

  assert_eq!(machine.status(), Status::HaltedNormal);
  assert_eq!(machine.registers()[0], 42);
  assert_eq!(machine.registers()[2], 1);
  assert_eq!(machine.sp(), 0);
  assert_eq!(machine.rm(), 0x7FF);
}

#[test]
fn cycle_budget_ignores_control_flow() {
  // J 0x001 resumes at the ADD, so it runs twice. With five words loaded there are five
  // cycles: LD, LD, ADD, J, ADD.
  let source = "LD R1 0\nLD R2 3\nADD R1 R2\nJ 0x001\nLD R4 9";
  let (machine, result) = assemble_and_run(source);
  result.unwrap();

  assert_eq!(machine.registers()[0], 6);
  assert_eq!(machine.registers()[3], 0);
  assert_eq!(machine.pc(), 3);
  assert_eq!(machine.status(), Status::HaltedNormal);
}

#[test]
fn arithmetic_fault_stops_the_run() {
  let (machine, result) = assemble_and_run("LD R1 8\nMOD R1 R2\nLD R1 1");
  assert_eq!(result, Err(ExecutionError::ArithmeticFault { address: 1, opcode: Opcode::Mod }));
  assert_eq!(machine.status(), Status::HaltedError);
  assert_eq!(machine.registers()[0], 8);
}

#[test]
fn syntax_error_produces_no_output() {
  let result = Assembler::new().assemble_to_text("LD R1 1\nLD R99 2\n");
  match result {
    Err(SyntaxError::UnknownSymbol { line: 2, .. }) => {}
    other => panic!("unexpected result {:?}", other)
  }
}

#[test]
fn register_dump_after_run() {
  let (machine, result) = assemble_and_run("LD R1 0x0A\nLD R2 3\nMOD R1 R2");
  result.unwrap();
  let dump = machine.register_dump();
  let mut lines = dump.lines();
  assert_eq!(lines.next(), Some("R1: 0a"));
  assert_eq!(lines.next(), Some("R2: 03"));
  assert_eq!(dump.lines().last(), Some("RF: 01"));
}
