/*!

  The machine uses a 16 bit word for both instructions and memory cells. Every instruction is
  exactly one word, and memory addresses are 12 bits and address words, not bytes. The sizes
  of instruction components are as follows:

    Opcode:     4 bits
    Register:   4 bits (an index, R1 = 0 through R12 = 11)
    Immediate:  8 bits
    Address:   12 bits

  An enum is used for the opcode only, not the entire instruction. `Instruction` is the
  unencoded form and enumerates operand shapes rather than opcodes; `Opcode::format` says which shape an opcode uses. The assembler and the machine
  both go through `binary` so they agree on every bit.

*/

mod assembly;
mod binary;
mod grammar;
mod instruction;

pub use assembly::{assemble, words_to_text, Assembler, SyntaxError};
pub use binary::{addr12, decode, encode_instruction, imm8, opcode_bits, rx, ry,
                 try_decode_instruction, Fields, Word};
pub use grammar::{GrammarNode, GrammarTable};
pub use instruction::{Format, Instruction, Opcode};
