/*!
  The grammar table describes, per opcode, the sequence of tokens a statement must consist of.

  Each sequence starts with a head node that only accepts the opcode's own mnemonic, followed
  by one node per operand slot. An operand node accepts a primary token kind and, for LD's
  immediate, a secondary one. The shapes are:

  | Opcodes                                | Operand slots             |
  |----------------------------------------|---------------------------|
  | `MV ADD SUB MULT DIV MOD SKP SNE`      | register, register        |
  | `LD`                                   | register, number\|address |
  | `WA`                                   | register, address         |
  | `J CALL LA`                            | address                   |
  | `SRA SLA`                              | register                  |
  | `RET`                                  | (none)                    |
*/

use strum::IntoEnumIterator;

use super::Opcode;
use crate::token::{Token, TokenKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct GrammarNode {
  pub primary   : TokenKind,
  pub secondary : Option<TokenKind>,
  /// Exact text the token must have. Only set on the head node.
  pub literal   : Option<&'static str>
}

impl GrammarNode {

  fn head(opcode: Opcode) -> GrammarNode {
    GrammarNode {
      primary   : TokenKind::Opcode,
      secondary : None,
      literal   : Some(opcode.mnemonic())
    }
  }

  fn operand(kind: TokenKind) -> GrammarNode {
    GrammarNode {
      primary   : kind,
      secondary : None,
      literal   : None
    }
  }

  fn either(primary: TokenKind, secondary: TokenKind) -> GrammarNode {
    GrammarNode {
      primary,
      secondary : Some(secondary),
      literal   : None
    }
  }

  pub fn accepts_kind(&self, kind: TokenKind) -> bool {
    self.primary == kind || self.secondary == Some(kind)
  }

  pub fn accepts(&self, token: &Token) -> bool {
    match self.literal {
      Some(literal) => literal == token.text && self.primary == token.kind,
      None          => self.accepts_kind(token.kind)
    }
  }
}

fn operand_slots(opcode: Opcode) -> Vec<GrammarNode> {
  use TokenKind::{Address, Number, Register};

  match opcode {
    | Opcode::Mv
    | Opcode::Add
    | Opcode::Sub
    | Opcode::Mult
    | Opcode::Div
    | Opcode::Mod
    | Opcode::Skp
    | Opcode::Sne => vec![GrammarNode::operand(Register), GrammarNode::operand(Register)],

    Opcode::Ld    => vec![GrammarNode::operand(Register), GrammarNode::either(Number, Address)],
    Opcode::Wa    => vec![GrammarNode::operand(Register), GrammarNode::operand(Address)],

    | Opcode::J
    | Opcode::Call
    | Opcode::La  => vec![GrammarNode::operand(Address)],

    | Opcode::Sra
    | Opcode::Sla => vec![GrammarNode::operand(Register)],

    Opcode::Ret   => vec![],
  }
}

/// Every opcode's grammar sequence, built once and read-only afterward.
#[derive(Clone, Debug)]
pub struct GrammarTable {
  // Indexed by opcode code.
  sequences: Vec<Vec<GrammarNode>>
}

impl GrammarTable {

  pub fn new() -> GrammarTable {
    let sequences =
      Opcode::iter()
        .map(|opcode| {
          let mut sequence = vec![GrammarNode::head(opcode)];
          sequence.extend(operand_slots(opcode));
          sequence
        })
        .collect();
    GrammarTable { sequences }
  }

  /// The full sequence for `opcode`, head node first.
  pub fn sequence(&self, opcode: Opcode) -> &[GrammarNode] {
    &self.sequences[opcode.code() as usize]
  }

  /// The operand slots for `opcode`, i.e. the sequence without its head.
  pub fn operands(&self, opcode: Opcode) -> &[GrammarNode] {
    &self.sequence(opcode)[1..]
  }
}

impl Default for GrammarTable {
  fn default() -> Self {
    GrammarTable::new()
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn heads_carry_the_mnemonic() {
    let table = GrammarTable::new();
    for opcode in Opcode::iter() {
      let head = table.sequence(opcode)[0];
      assert_eq!(head.primary, TokenKind::Opcode);
      assert_eq!(head.literal, Some(opcode.mnemonic()));
    }
  }

  #[test]
  fn operand_counts() {
    let table = GrammarTable::new();
    let count = |opcode| table.operands(opcode).len();
    assert_eq!(count(Opcode::Div), 2);
    assert_eq!(count(Opcode::Ld), 2);
    assert_eq!(count(Opcode::Wa), 2);
    assert_eq!(count(Opcode::Call), 1);
    assert_eq!(count(Opcode::Sla), 1);
    assert_eq!(count(Opcode::Ret), 0);
  }

  #[test]
  fn immediate_accepts_number_or_address() {
    let table = GrammarTable::new();
    let imm = table.operands(Opcode::Ld)[1];
    assert!(imm.accepts_kind(TokenKind::Number));
    assert!(imm.accepts_kind(TokenKind::Address));
    assert!(!imm.accepts_kind(TokenKind::Register));

    let wa = table.operands(Opcode::Wa)[1];
    assert!(!wa.accepts_kind(TokenKind::Number));
  }

  #[test]
  fn head_requires_exact_mnemonic() {
    let table = GrammarTable::new();
    let head = table.sequence(Opcode::Add)[0];
    let add = Token { text: "ADD", kind: TokenKind::Opcode, line: 1 };
    let sub = Token { text: "SUB", kind: TokenKind::Opcode, line: 1 };
    assert!(head.accepts(&add));
    assert!(!head.accepts(&sub));
  }
}
