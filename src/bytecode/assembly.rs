/*!
  The human readable textual form of bytecode is called assembly. This module turns assembly
  source into instruction words.

  Assembly is a single pass over the token stream. Every statement starts with an opcode
  mnemonic, and the opcode's grammar sequence says what tokens must follow. There are no
  labels and no error recovery: the first violation aborts the whole assembly.

  ```text
  LD R1 0x0A      ; R1 = 10          -> 000a
  LD R2 3                            -> 0103
  ADD R1 R2       ; R1 = R1 + R2     -> 2010
  ```
  (The `;` comments above are for the reader; the assembler has no comment syntax.)
*/

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::{encode_instruction, Format, GrammarNode, GrammarTable, Instruction, Opcode, Word};
use crate::address::{Address, ADDRESS_MASK};
use crate::symboltable::RegisterTable;
use crate::token::{Token, TokenKind, Tokenizer};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyntaxError {
  /// A statement started with something other than an opcode.
  NotAnOpcode {
    line  : usize,
    token : String,
    kind  : TokenKind
  },
  /// An operand slot got a token of the wrong kind.
  UnexpectedToken {
    line     : usize,
    token    : String,
    expected : String,
    found    : TokenKind
  },
  /// An operand slot got a token that isn't any known symbol or literal.
  UnknownSymbol {
    line  : usize,
    token : String
  },
  /// A literal doesn't fit the field it is encoded into.
  OutOfRange {
    line  : usize,
    token : String,
    max   : u32
  }
}

impl SyntaxError {
  pub fn line(&self) -> usize {
    match self {
      | SyntaxError::NotAnOpcode { line, .. }
      | SyntaxError::UnexpectedToken { line, .. }
      | SyntaxError::UnknownSymbol { line, .. }
      | SyntaxError::OutOfRange { line, .. } => *line
    }
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      SyntaxError::NotAnOpcode { line, token, kind } => {
        write!(f, "Invalid syntax on line {}: {} is a(n) {}, not a valid opcode.", line, token, kind)
      }
      SyntaxError::UnexpectedToken { line, token, expected, found } => {
        write!(f, "Invalid syntax on line {}: expected {} but found {} {}.", line, expected, found, token)
      }
      SyntaxError::UnknownSymbol { line, token } => {
        write!(f, "Invalid syntax on line {}: {} is not a known keyword or symbol.", line, token)
      }
      SyntaxError::OutOfRange { line, token, max } => {
        write!(f, "Invalid syntax on line {}: {} does not fit in its field (max 0x{:x}).", line, token, max)
      }
    }
  }
}

impl Error for SyntaxError {}

/// The text of a token for an error message.
fn quote(token: &Token) -> String {
  token.to_string()
}

fn describe(node: &GrammarNode) -> String {
  match node.secondary {
    Some(secondary) => format!("{} or {}", node.primary, secondary),
    None            => node.primary.to_string()
  }
}

/// An operand token that matched its grammar node, with its encoded value.
#[derive(Clone, Copy, Debug)]
struct Operand<'a> {
  token : Token<'a>,
  value : u32
}

impl<'a> Operand<'a> {
  fn check_width(&self, max: u32) -> Result<u32, SyntaxError> {
    match self.value <= max {
      true  => Ok(self.value),
      false => Err(SyntaxError::OutOfRange {
        line  : self.token.line,
        token : quote(&self.token),
        max
      })
    }
  }
}

/// Owns the grammar and register tables for its lifetime; both are read-only once built.
#[derive(Clone, Debug, Default)]
pub struct Assembler {
  grammar   : GrammarTable,
  registers : RegisterTable
}

impl Assembler {

  pub fn new() -> Assembler {
    Assembler {
      grammar   : GrammarTable::new(),
      registers : RegisterTable::new()
    }
  }

  /// Assembles `source` into one word per statement.
  pub fn assemble(&self, source: &str) -> Result<Vec<Word>, SyntaxError> {
    let mut tokenizer = Tokenizer::new(source, &self.registers);
    let mut words     = vec![];

    loop {
      let token = tokenizer.next_token();
      match token.kind {

        TokenKind::EndOfInput => break,

        TokenKind::Opcode => {
          let word = self.assemble_statement(token, &mut tokenizer)?;
          #[cfg(feature = "trace_computation")]
            eprintln!("line {:>4}: {:04x}", token.line, word);
          words.push(word);
        }

        kind => {
          return Err(SyntaxError::NotAnOpcode {
            line  : token.line,
            token : quote(&token),
            kind
          });
        }

      }
    }

    Ok(words)
  }

  /// Assembles `source` into the text form of the words: four lowercase hex digits per word,
  /// each on its own newline-terminated line.
  pub fn assemble_to_text(&self, source: &str) -> Result<String, SyntaxError> {
    let words = self.assemble(source)?;
    Ok(words_to_text(&words))
  }

  /// Walks the grammar sequence for the opcode in `head`, pulling one token per operand slot.
  fn assemble_statement<'a>(&self, head: Token<'a>, tokenizer: &mut Tokenizer<'a>)
    -> Result<Word, SyntaxError>
  {
    let opcode = Opcode::from_str(head.text).map_err(|_| SyntaxError::UnknownSymbol {
      line  : head.line,
      token : quote(&head)
    })?;

    let sequence = self.grammar.sequence(opcode);
    if !sequence[0].accepts(&head) {
      return Err(SyntaxError::NotAnOpcode {
        line  : head.line,
        token : quote(&head),
        kind  : head.kind
      });
    }

    let mut operands: Vec<Operand<'a>> = Vec::with_capacity(2);
    for node in &sequence[1..] {
      let token = tokenizer.next_token();
      operands.push(self.match_operand(node, token)?);
    }

    self.encode(opcode, &operands)
  }

  fn match_operand<'a>(&self, node: &GrammarNode, token: Token<'a>) -> Result<Operand<'a>, SyntaxError> {
    if token.kind == TokenKind::Invalid {
      return Err(SyntaxError::UnknownSymbol {
        line  : token.line,
        token : quote(&token)
      });
    }
    if !node.accepts(&token) {
      return Err(SyntaxError::UnexpectedToken {
        line     : token.line,
        token    : quote(&token),
        expected : describe(node),
        found    : token.kind
      });
    }

    let value =
      match token.kind {
        TokenKind::Register => self.registers.get_code(token.text).map(u32::from),
        // Literals too long for a `u32` are certainly too wide for any field.
        _                   => Some(token.literal_value().unwrap_or(u32::max_value()))
      };

    match value {
      Some(value) => Ok(Operand { token, value }),
      None        => Err(SyntaxError::UnknownSymbol {
        line  : token.line,
        token : quote(&token)
      })
    }
  }

  fn encode(&self, opcode: Opcode, operands: &[Operand]) -> Result<Word, SyntaxError> {
    let instruction =
      match (opcode.format(), operands) {

        (Format::RegisterPair, [rx, ry]) => Instruction::Registers {
          opcode,
          rx : rx.value as u8,
          ry : ry.value as u8
        },

        // SRA and SLA only name Rx.
        (Format::RegisterPair, [rx]) => Instruction::Registers {
          opcode,
          rx : rx.value as u8,
          ry : 0
        },

        (Format::RegisterImmediate, [rx, imm]) => Instruction::Immediate {
          opcode,
          rx  : rx.value as u8,
          imm : imm.check_width(0xFF)? as u8
        },

        (Format::Address, [address]) => Instruction::Jump {
          opcode,
          address : Address::new(address.check_width(ADDRESS_MASK as u32)? as u16)
        },

        (Format::Nullary, []) => Instruction::Nullary(opcode),

        (format, operands) => {
          unreachable!(
            "Unreachable: the grammar table gave {} {} operands, which do not fit the {:?} format.",
            opcode,
            operands.len(),
            format
          );
        }
      };

    Ok(encode_instruction(instruction))
  }
}

/// Assembles `source` with a freshly built `Assembler`.
pub fn assemble(source: &str) -> Result<Vec<Word>, SyntaxError> {
  Assembler::new().assemble(source)
}

/// Formats words as four lowercase hex digits each, one per newline-terminated line.
pub fn words_to_text(words: &[Word]) -> String {
  words.iter()
       .map(|word| format!("{:04x}\n", word))
       .collect()
}
