use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::address::Address;
use crate::symboltable::register_name;

/**
  Opcodes of the machine.

  The discriminant of each variant is its 4 bit numeric code, i.e. the top nibble of the
  encoded instruction word. All sixteen nibbles are taken, so the order the opcodes are listed
  below is significant and must not change.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,         PartialEq, Debug,            Hash
)]
#[repr(u8)]
pub enum Opcode {
  #[strum(serialize = "LD")]   Ld,    // LD Rx imm8
  #[strum(serialize = "MV")]   Mv,    // MV Rx Ry
  #[strum(serialize = "ADD")]  Add,   // ADD Rx Ry
  #[strum(serialize = "SUB")]  Sub,   // SUB Rx Ry
  #[strum(serialize = "MULT")] Mult,  // MULT Rx Ry
  #[strum(serialize = "DIV")]  Div,   // DIV Rx Ry
  #[strum(serialize = "MOD")]  Mod,   // MOD Rx Ry
  #[strum(serialize = "SKP")]  Skp,   // SKP Rx Ry
  #[strum(serialize = "SNE")]  Sne,   // SNE Rx Ry
  #[strum(serialize = "J")]    J,     // J addr12
  #[strum(serialize = "CALL")] Call,  // CALL addr12
  #[strum(serialize = "RET")]  Ret,   // RET
  #[strum(serialize = "LA")]   La,    // LA addr12
  #[strum(serialize = "SRA")]  Sra,   // SRA Rx
  #[strum(serialize = "SLA")]  Sla,   // SLA Rx
  #[strum(serialize = "WA")]   Wa,    // WA Rx addr8
}

/// Which slices of the instruction word carry the operands of an opcode.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Format {
  /// [Opcode:4][Rx:4][Ry:4][Reserved:4]
  RegisterPair,
  /// [Opcode:4][Rx:4][Imm:8]
  RegisterImmediate,
  /// [Opcode:4][Address:12]
  Address,
  /// [Opcode:4][Reserved:12]
  Nullary,
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn mnemonic(&self) -> &'static str {
    (*self).into()
  }

  pub fn format(&self) -> Format {
    match self {
      | Opcode::Mv
      | Opcode::Add
      | Opcode::Sub
      | Opcode::Mult
      | Opcode::Div
      | Opcode::Mod
      | Opcode::Skp
      | Opcode::Sne
      | Opcode::Sra
      | Opcode::Sla => Format::RegisterPair,

      | Opcode::Ld
      | Opcode::Wa  => Format::RegisterImmediate,

      | Opcode::J
      | Opcode::Call
      | Opcode::La  => Format::Address,

      Opcode::Ret   => Format::Nullary,
    }
  }
}

/// Holds the unencoded components of an instruction. As such, it enumerates the possible
/// instruction argument combinations. Register operands are 4 bit indices, not values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// [Opcode:4][Rx:4][Ry:4][Reserved:4]
  Registers {
    opcode : Opcode,
    rx     : u8,
    ry     : u8
  },
  /// [Opcode:4][Rx:4][Imm:8]
  Immediate {
    opcode : Opcode,
    rx     : u8,
    imm    : u8
  },
  /// [Opcode:4][Address:12]
  Jump {
    opcode  : Opcode,
    address : Address
  },
  /// [Opcode:4][Reserved:12]
  Nullary(Opcode),
}

/// Writes the instruction back out as assembly text.
impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      // The shifts only take Rx in assembly; Ry is shown when it isn't the default.
      Instruction::Registers { opcode: opcode @ Opcode::Sra, rx, ry: 0 }
      | Instruction::Registers { opcode: opcode @ Opcode::Sla, rx, ry: 0 } => {
        write!(f, "{} {}", opcode, register_name(*rx))
      }

      Instruction::Registers { opcode, rx, ry } => {
        write!(f, "{} {} {}", opcode, register_name(*rx), register_name(*ry))
      }

      Instruction::Immediate { opcode, rx, imm } => {
        write!(f, "{} {} 0x{:02x}", opcode, register_name(*rx), imm)
      }

      Instruction::Jump { opcode, address } => {
        write!(f, "{} {}", opcode, address)
      }

      Instruction::Nullary(opcode) => {
        write!(f, "{}", opcode)
      }

    }
  }
}
