//! Machine state and the fetch/decode/execute engine.
//!
//! A run executes a fixed number of cycles, normally the number of words loaded. There is no
//! halt instruction, and the cycle count ignores control flow entirely: jumps and calls may
//! revisit words or run past the loaded program before the count is used up.
//!
//! Every cycle ends with `PC += 1`, including cycles whose instruction just set the PC. A jump
//! or call to `A` therefore resumes execution at `A + 1`, and `RET` resumes at the word after
//! the `CALL`. This is part of the ISA's observable behavior and must be kept.

use std::error::Error;
use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::address::{Address, MEMORY_SIZE};
use crate::bytecode::{decode, Fields, Opcode, Word};
#[cfg(feature = "trace_computation")]
use crate::bytecode::try_decode_instruction;
use crate::symboltable::register_name;

/// Number of general purpose registers, R1..R12.
pub const REGISTER_COUNT: usize = 12;
/// Number of return address slots in the call stack.
pub const STACK_DEPTH: usize = 16;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Status {
  /// Loaded (or fresh) and not yet run.
  Ready,
  Running,
  /// Finished its cycle budget.
  HaltedNormal,
  /// Stopped by an `ExecutionError`.
  HaltedError,
}

impl Display for Status {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Status::Ready        => write!(f, "Ready"),
      Status::Running      => write!(f, "Running"),
      Status::HaltedNormal => write!(f, "Halted"),
      Status::HaltedError  => write!(f, "Halted on error"),
    }
  }
}

/// Reasons a run stops early. `address` is always the address the failing instruction was
/// fetched from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ExecutionError {
  /// The opcode nibble has no handler. Every nibble is currently defined, so this can only
  /// happen if an opcode is removed.
  InvalidOpcode {
    address : u16,
    word    : Word
  },
  /// `DIV` or `MOD` with a zero divisor.
  ArithmeticFault {
    address : u16,
    opcode  : Opcode
  },
  /// A register index of 12 or more (RD, RS, RF or SP in assembly) was read or written as a
  /// general purpose register.
  RegisterOutOfRange {
    address : u16,
    index   : u8
  },
  /// `CALL` with all stack slots in use.
  StackOverflow {
    address : u16
  },
  /// `RET` with an empty stack.
  StackUnderflow {
    address : u16
  },
  /// The PC ran past the end of memory.
  FetchOutOfRange {
    pc : u16
  },
  /// `load` was given more words than memory holds.
  ProgramTooLarge {
    words : usize
  },
}

impl Display for ExecutionError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      ExecutionError::InvalidOpcode { address, word } => {
        write!(f, "Invalid opcode in word {:04x} at 0x{:03x}.", word, address)
      }
      ExecutionError::ArithmeticFault { address, opcode } => {
        write!(f, "Arithmetic fault: {} by zero at 0x{:03x}.", opcode, address)
      }
      ExecutionError::RegisterOutOfRange { address, index } => {
        write!(
          f,
          "Register {} (index {}) at 0x{:03x} is not a general purpose register.",
          register_name(*index), index, address
        )
      }
      ExecutionError::StackOverflow { address } => {
        write!(f, "Call stack overflow at 0x{:03x}: all {} slots in use.", address, STACK_DEPTH)
      }
      ExecutionError::StackUnderflow { address } => {
        write!(f, "Call stack underflow at 0x{:03x}: RET with an empty stack.", address)
      }
      ExecutionError::FetchOutOfRange { pc } => {
        write!(f, "Program counter 0x{:04x} is past the end of memory.", pc)
      }
      ExecutionError::ProgramTooLarge { words } => {
        write!(f, "Program of {} words does not fit in {} words of memory.", words, MEMORY_SIZE)
      }
    }
  }
}

impl Error for ExecutionError {}

pub struct Machine {
  // Memory Store
  memory      : Vec<Word>,

  // Registers //
  registers   : [u8; REGISTER_COUNT], // General purpose registers R1..R12
  rm          : u16,                  // Last loaded address
  rd          : u8,
  rs          : u8,
  rf          : u16,                  // Modulo results and shift overflow
  pc          : u16,
  sp          : u8,                   // Index of the next free stack slot
  instruction : Word,                 // Most recently fetched word

  stack       : [u16; STACK_DEPTH],

  program_length : usize,
  status         : Status,
}

impl Machine {

  // region Display methods

  fn make_register_table<T>(
      name      : &str,
      registers : &[T],
      highlight : Option<usize>,
      start     : usize
    ) -> Table
    where T: std::fmt::LowerHex
  {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);

    for (i, value) in registers.iter().enumerate() {
      match Some(i) == highlight {

        true  => {
          table.add_row(row![r->format!("* --> {}{} =", name, i + start), format!("{:02x}", value)]);
        }

        false => {
          table.add_row(row![r->format!("{}{} =", name, i + start), format!("{:02x}", value)]);
        }

      }
    }
    table
  }

  fn make_special_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);
    table.add_row(row![r->"RM =", format!("{:02x}", self.rm)]);
    table.add_row(row![r->"RD =", format!("{:02x}", self.rd)]);
    table.add_row(row![r->"RS =", format!("{:02x}", self.rs)]);
    table.add_row(row![r->"RF =", format!("{:02x}", self.rf)]);
    table.add_row(row![r->"PC =", format!("{:03x}", self.pc)]);
    table.add_row(row![r->"SP =", format!("{:02x}", self.sp)]);
    table
  }

  /**
    The general purpose and special registers, one `NAME: value` line each, values in at least
    two lowercase hex digits.

    ```text
    R1: 0a
    ...
    R12: 00
    RM: 123
    RD: 00
    RS: 00
    RF: 01
    ```
  */
  pub fn register_dump(&self) -> String {
    let mut dump = String::new();
    for (i, value) in self.registers.iter().enumerate() {
      dump.push_str(&format!("{}: {:02x}\n", register_name(i as u8), value));
    }
    dump.push_str(&format!("RM: {:02x}\n", self.rm));
    dump.push_str(&format!("RD: {:02x}\n", self.rd));
    dump.push_str(&format!("RS: {:02x}\n", self.rs));
    dump.push_str(&format!("RF: {:02x}\n", self.rf));
    dump
  }

  // endregion

  // region Low-level utility methods

  pub fn new() -> Machine {
    Machine {
      memory         : vec![0; MEMORY_SIZE],
      registers      : [0; REGISTER_COUNT],
      rm             : 0,
      rd             : 0,
      rs             : 0,
      rf             : 0,
      pc             : 0,
      sp             : 0,
      instruction    : 0,
      stack          : [0; STACK_DEPTH],
      program_length : 0,
      status         : Status::Ready,
    }
  }

  pub fn status(&self) -> Status { self.status }
  pub fn pc(&self) -> u16 { self.pc }
  pub fn sp(&self) -> u8 { self.sp }
  pub fn rm(&self) -> u16 { self.rm }
  pub fn rf(&self) -> u16 { self.rf }
  pub fn instruction(&self) -> Word { self.instruction }
  pub fn registers(&self) -> &[u8] { &self.registers }
  pub fn stack(&self) -> &[u16] { &self.stack }
  pub fn memory(&self) -> &[Word] { &self.memory }
  pub fn program_length(&self) -> usize { self.program_length }

  fn register(&self, address: u16, index: u8) -> Result<u8, ExecutionError> {
    self.registers
        .get(index as usize)
        .copied()
        .ok_or(ExecutionError::RegisterOutOfRange { address, index })
  }

  fn set_register(&mut self, address: u16, index: u8, value: u8) -> Result<(), ExecutionError> {
    match self.registers.get_mut(index as usize) {
      Some(register) => {
        *register = value;
        Ok(())
      }
      None => Err(ExecutionError::RegisterOutOfRange { address, index })
    }
  }

  // endregion

  // region Loading and running

  /**
    Copies `program` into memory starting at 0x000 and makes its length the cycle budget for
    `execute`. Nothing else is reset; load into a fresh machine for a clean run.
  */
  pub fn load(&mut self, program: &[Word]) -> Result<(), ExecutionError> {
    if program.len() > MEMORY_SIZE {
      return Err(ExecutionError::ProgramTooLarge { words: program.len() });
    }
    self.memory[..program.len()].copy_from_slice(program);
    self.program_length = program.len();
    self.status = Status::Ready;

    #[cfg(feature = "trace_computation")]
      eprintln!("Loaded {} words of program memory.", program.len());

    Ok(())
  }

  /// Runs one cycle per loaded word.
  pub fn execute(&mut self) -> Result<(), ExecutionError> {
    self.run(self.program_length)
  }

  /// Runs exactly `cycles` cycles unless one of them fails.
  pub fn run(&mut self, cycles: usize) -> Result<(), ExecutionError> {
    for _ in 0..cycles {
      self.cycle()?;
    }
    self.status = Status::HaltedNormal;
    Ok(())
  }

  /// One fetch/decode/execute cycle. On error the machine is left in `Status::HaltedError` with
  /// the PC still pointing at the failing instruction.
  pub fn cycle(&mut self) -> Result<(), ExecutionError> {
    self.status = Status::Running;
    let result = self.step();
    if result.is_err() {
      self.status = Status::HaltedError;
    }
    result
  }

  fn step(&mut self) -> Result<(), ExecutionError> {
    let address = self.pc;
    let cell    = Address::from_pc(address).ok_or(ExecutionError::FetchOutOfRange { pc: address })?;

    self.instruction = self.memory[cell.idx()];
    let word = self.instruction;
    let (opcode, fields) = decode(word).ok_or(ExecutionError::InvalidOpcode { address, word })?;

    #[cfg(feature = "trace_computation")]
      {
        if let Some(instruction) = try_decode_instruction(word) {
          eprintln!("{}: {:04x}  {}", cell, word, instruction);
        }
      }

    self.dispatch(address, opcode, fields)?;

    // Unconditional, even after J/CALL/RET set the PC.
    self.pc = self.pc.wrapping_add(1);

    #[cfg(feature = "trace_computation")] eprintln!("{}", self);

    Ok(())
  }

  fn dispatch(&mut self, address: u16, opcode: Opcode, fields: Fields) -> Result<(), ExecutionError> {
    let Fields { rx, ry, imm8, addr12 } = fields;

    match opcode {
      Opcode::Ld   => self.set_register(address, rx, imm8),
      Opcode::Mv   => {
        let value = self.register(address, ry)?;
        self.set_register(address, rx, value)
      }
      Opcode::Add  => self.arithmetic(address, rx, ry, |x, y| Some(x.wrapping_add(y))),
      Opcode::Sub  => self.arithmetic(address, rx, ry, |x, y| Some(x.wrapping_sub(y))),
      Opcode::Mult => self.arithmetic(address, rx, ry, |x, y| Some(x.wrapping_mul(y))),
      Opcode::Div  => self.arithmetic(address, rx, ry, |x, y| x.checked_div(y)),
      Opcode::Mod  => self.modulo(address, rx, ry),
      Opcode::Skp  => {
        self.skip_if(rx == ry);
        Ok(())
      }
      Opcode::Sne  => {
        self.skip_if(rx != ry);
        Ok(())
      }
      Opcode::J    => {
        self.pc = addr12;
        Ok(())
      }
      Opcode::Call => self.call(address, addr12),
      Opcode::Ret  => self.ret(address),
      Opcode::La   => {
        self.rm = addr12;
        Ok(())
      }
      Opcode::Sra  => self.shift(address, rx, ry, |x, n| x.checked_shr(n)),
      Opcode::Sla  => self.shift(address, rx, ry, |x, n| x.checked_shl(n)),
      Opcode::Wa   => {
        self.write_address(rx, imm8);
        Ok(())
      }
    }
  }

  // endregion

  // region Instruction methods

  /**
    `Rx = Rx op Ry` with 8 bit wrapping. `op` returns `None` for a zero divisor, which is an
    arithmetic fault and leaves `Rx` untouched.

    The only fallible `op` is `DIV`, so the fault always names it.
  */
  fn arithmetic<F>(&mut self, address: u16, rx: u8, ry: u8, op: F) -> Result<(), ExecutionError>
    where F: Fn(u8, u8) -> Option<u8>
  {
    let x = self.register(address, rx)?;
    let y = self.register(address, ry)?;
    let result = op(x, y).ok_or(ExecutionError::ArithmeticFault { address, opcode: Opcode::Div })?;
    self.set_register(address, rx, result)
  }

  /// `RF = Rx % Ry`. Registers are not written.
  fn modulo(&mut self, address: u16, rx: u8, ry: u8) -> Result<(), ExecutionError> {
    let x = self.register(address, rx)?;
    let y = self.register(address, ry)?;
    let result = x.checked_rem(y).ok_or(ExecutionError::ArithmeticFault { address, opcode: Opcode::Mod })?;
    self.rf = result as u16;
    Ok(())
  }

  /**
    Skips the next word. `SKP` and `SNE` compare the raw register *indices* from the
    instruction, not the registers' contents, so whether they skip is fixed at assembly time.
    That is almost certainly not what the ISA intended, but it is what the encoding does.
  */
  fn skip_if(&mut self, condition: bool) {
    if condition {
      self.pc = self.pc.wrapping_add(1);
    }
  }

  /// Pushes the PC of the `CALL` itself; the post-cycle increment moves past it on return.
  fn call(&mut self, address: u16, target: u16) -> Result<(), ExecutionError> {
    let slot = self.stack
                   .get_mut(self.sp as usize)
                   .ok_or(ExecutionError::StackOverflow { address })?;
    *slot = self.pc;
    self.sp += 1;
    self.pc = target;
    Ok(())
  }

  fn ret(&mut self, address: u16) -> Result<(), ExecutionError> {
    if self.sp == 0 {
      return Err(ExecutionError::StackUnderflow { address });
    }
    self.sp -= 1;
    self.pc = self.stack[self.sp as usize];
    Ok(())
  }

  /**
    Shifts `Rx` by the *value* of `Ry`. Shifting by eight or more clears the register. `RF` gets
    bit 7 of the result.
  */
  fn shift<F>(&mut self, address: u16, rx: u8, ry: u8, op: F) -> Result<(), ExecutionError>
    where F: Fn(u8, u32) -> Option<u8>
  {
    let x      = self.register(address, rx)?;
    let amount = self.register(address, ry)?;
    let result = op(x, amount as u32).unwrap_or(0);
    self.set_register(address, rx, result)?;
    self.rf = ((result >> 7) & 1) as u16;
    Ok(())
  }

  /**
    Stores the register *index* `rx` (not the register's value) at `memory[address]`. Like
    `SKP`/`SNE`, this is probably an ISA bug, but the encoding says so and programs may rely on
    it.
  */
  fn write_address(&mut self, rx: u8, address: u8) {
    self.memory[address as usize] = rx as Word;
  }

  // endregion

}

impl Default for Machine {
  fn default() -> Self {
    Machine::new()
  }
}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let r_table = Machine::make_register_table("R", &self.registers, None, 1);
    let s_table = self.make_special_table();
    // The highlighted stack slot is the next one `CALL` will use.
    let k_table = Machine::make_register_table("S", &self.stack, Some(self.sp as usize), 0);

    let mut combined_table = table!([r_table, s_table, k_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Special", ub->"Stack"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "Status: {}\tIR: {:04x}\n{}", self.status, self.instruction, combined_table)
  }
}
