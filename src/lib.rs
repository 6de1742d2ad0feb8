/*!
  K2 is a tiny 16 bit instruction set with an assembler and a simulator.

  ```text
  source text -> [`Assembler`] -> words -> [`words_to_text`] -> ROM text
  ROM text -> [`rom::parse_rom`] -> words -> [`Machine::load`] -> [`Machine::execute`]
  ```

  The assembler and the machine share one instruction codec in `bytecode`, so they agree on
  the encoding of every opcode. Moving the ROM text between the two is left to the caller; the
  `k2asm` and `k2emu` binaries do it through files.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
pub mod chariter;
pub mod machine;
pub mod rom;
pub mod symboltable;
pub mod token;

pub use bytecode::{assemble, words_to_text, Assembler, Instruction, Opcode, SyntaxError, Word};
pub use machine::{ExecutionError, Machine, Status};
pub use rom::{parse_rom, RomError};
