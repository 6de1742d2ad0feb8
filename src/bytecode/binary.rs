/*!
  This module is responsible for the encoding and decoding of binary instructions.

  Every instruction is one 16 bit word. The top nibble is always the opcode; the meaning of the
  remaining twelve bits depends only on the opcode (see `Opcode::format`). The field slices
  overlap, so a word carries no record of which interpretation applies:

  ```text
    15    12 11     8 7      4 3      0
    [Opcode ][  Rx   ][  Ry   ][  --  ]
    [Opcode ][  Rx   ][      Imm8     ]
    [Opcode ][          Addr12        ]
  ```
*/
use std::convert::TryFrom;

use super::{Format, Instruction, Opcode};
use crate::address::{Address, AddressNumberType, ADDRESS_MASK};

// If you change this you must also change `encode_instruction` and `decode`.
pub type Word = u16;

const OPCODE_SHIFT : u32 = 12;
const RX_SHIFT     : u32 = 8;
const RY_SHIFT     : u32 = 4;
const NIBBLE_MASK  : Word = 0xF;
const BYTE_MASK    : Word = 0xFF;

// region Raw field access

pub fn opcode_bits(word: Word) -> u8 {
  (word >> OPCODE_SHIFT) as u8
}

pub fn rx(word: Word) -> u8 {
  ((word >> RX_SHIFT) & NIBBLE_MASK) as u8
}

pub fn ry(word: Word) -> u8 {
  ((word >> RY_SHIFT) & NIBBLE_MASK) as u8
}

pub fn imm8(word: Word) -> u8 {
  (word & BYTE_MASK) as u8
}

pub fn addr12(word: Word) -> AddressNumberType {
  word & ADDRESS_MASK
}

// endregion

/// Every field slice of a word, read without regard to which ones the opcode actually uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Fields {
  pub rx     : u8,
  pub ry     : u8,
  pub imm8   : u8,
  pub addr12 : AddressNumberType
}

impl Fields {
  pub fn of(word: Word) -> Fields {
    Fields {
      rx     : rx(word),
      ry     : ry(word),
      imm8   : imm8(word),
      addr12 : addr12(word)
    }
  }
}

/**
  Splits a word into its opcode and raw fields. Every nibble currently names an opcode, so this
  never returns `None`; the `Option` exists so that a gap in the opcode space surfaces as an
  error in the machine rather than a panic here.
*/
pub fn decode(word: Word) -> Option<(Opcode, Fields)> {
  let opcode = Opcode::try_from(opcode_bits(word)).ok()?;
  Some((opcode, Fields::of(word)))
}

/// Decodes into the typed `Instruction` matching the opcode's format.
pub fn try_decode_instruction(word: Word) -> Option<Instruction> {
  let (opcode, fields) = decode(word)?;

  let instruction =
    match opcode.format() {
      Format::RegisterPair => Instruction::Registers {
        opcode,
        rx: fields.rx,
        ry: fields.ry
      },
      Format::RegisterImmediate => Instruction::Immediate {
        opcode,
        rx  : fields.rx,
        imm : fields.imm8
      },
      Format::Address => Instruction::Jump {
        opcode,
        address: Address::new(fields.addr12)
      },
      Format::Nullary => Instruction::Nullary(opcode)
    };

  Some(instruction)
}

/**
  Encodes the instruction into a word. It is the caller's responsibility to use the correct
  `Instruction` variant for the given opcode. Operands are masked into their slices without
  any range check; the assembler checks widths before it gets here.
*/
pub fn encode_instruction(instruction: Instruction) -> Word {
  match instruction {

    Instruction::Registers { opcode, rx, ry } => {
      // [Opcode:4][Rx:4][Ry:4][Reserved:4]
      opcode_slice(opcode)
        | ((rx as Word & NIBBLE_MASK) << RX_SHIFT)
        | ((ry as Word & NIBBLE_MASK) << RY_SHIFT)
    },

    Instruction::Immediate { opcode, rx, imm } => {
      // [Opcode:4][Rx:4][Imm:8]
      opcode_slice(opcode)
        | ((rx as Word & NIBBLE_MASK) << RX_SHIFT)
        | imm as Word
    },

    Instruction::Jump { opcode, address } => {
      // [Opcode:4][Address:12]
      opcode_slice(opcode) | address.value()
    },

    Instruction::Nullary(opcode) => {
      // [Opcode:4][Reserved:12]
      opcode_slice(opcode)
    },
  }
}

fn opcode_slice(opcode: Opcode) -> Word {
  (opcode.code() as Word) << OPCODE_SHIFT
}


#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn field_slices() {
    let word: Word = 0xABCD;
    assert_eq!(opcode_bits(word), 0xA);
    assert_eq!(rx(word), 0xB);
    assert_eq!(ry(word), 0xC);
    assert_eq!(imm8(word), 0xCD);
    assert_eq!(addr12(word), 0xBCD);
  }

  #[test]
  fn known_encodings() {
    let add = Instruction::Registers { opcode: Opcode::Add, rx: 0, ry: 1 };
    let ld  = Instruction::Immediate { opcode: Opcode::Ld, rx: 0, imm: 0x0A };
    let call = Instruction::Jump { opcode: Opcode::Call, address: Address::new(0x123) };

    assert_eq!(encode_instruction(add), 0x2010);
    assert_eq!(encode_instruction(ld), 0x000A);
    assert_eq!(encode_instruction(call), 0xA123);
    assert_eq!(encode_instruction(Instruction::Nullary(Opcode::Ret)), 0xB000);
  }

  #[test]
  fn encoding_masks_oversized_registers() {
    let mv = Instruction::Registers { opcode: Opcode::Mv, rx: 0x1F, ry: 0x12 };
    assert_eq!(encode_instruction(mv), 0x1F20);
  }

  #[test]
  fn round_trip() {
    for opcode in Opcode::iter() {
      match opcode.format() {

        Format::RegisterPair => {
          for rx in 0..16u8 {
            for ry in 0..16u8 {
              let instruction = Instruction::Registers { opcode, rx, ry };
              assert_eq!(try_decode_instruction(encode_instruction(instruction)), Some(instruction));
            }
          }
        }

        Format::RegisterImmediate => {
          for rx in 0..16u8 {
            for imm in [0u8, 1, 0x7F, 0x80, 0xFF].iter().copied() {
              let instruction = Instruction::Immediate { opcode, rx, imm };
              assert_eq!(try_decode_instruction(encode_instruction(instruction)), Some(instruction));
            }
          }
        }

        Format::Address => {
          for raw in [0u16, 1, 0x0FF, 0x100, 0xABC, 0xFFF].iter().copied() {
            let instruction = Instruction::Jump { opcode, address: Address::new(raw) };
            assert_eq!(try_decode_instruction(encode_instruction(instruction)), Some(instruction));
          }
        }

        Format::Nullary => {
          let instruction = Instruction::Nullary(opcode);
          assert_eq!(try_decode_instruction(encode_instruction(instruction)), Some(instruction));
        }

      }
    }
  }

  #[test]
  fn decoding_is_total() {
    for word in 0..=Word::max_value() {
      let (opcode, fields) = decode(word).expect("every nibble is an opcode");
      assert_eq!(opcode.code(), opcode_bits(word));
      assert_eq!(fields, Fields::of(word));
      assert!(try_decode_instruction(word).is_some());
    }
  }
}
