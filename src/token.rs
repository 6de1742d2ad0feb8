/*!
  The tokenizer turns assembly source into a stream of classified tokens.

  A token is a maximal run of characters other than the separators (space and newline; a
  carriage return also separates so that CRLF sources read the same). Each token is classified
  into exactly one `TokenKind`, checked in this order:

    1. the end of input sentinel,
    2. a register name from the `RegisterTable`,
    3. an opcode mnemonic,
    4. a hex literal, `0x` followed by one or more hex digits of either case,
    5. a decimal literal, one or more ASCII digits,
    6. anything else is invalid.
*/

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nom::{
  IResult,
  bytes::complete::tag,
  character::complete::{digit1, hex_digit1},
  combinator::all_consuming,
  sequence::preceded
};
use strum_macros::Display as StrumDisplay;

use crate::bytecode::Opcode;
use crate::chariter::CharIter;
use crate::symboltable::RegisterTable;

#[derive(StrumDisplay, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum TokenKind {
  #[strum(serialize = "opcode")]       Opcode,
  #[strum(serialize = "register")]     Register,
  #[strum(serialize = "address")]      Address,
  #[strum(serialize = "number")]       Number,
  #[strum(serialize = "invalid")]      Invalid,
  #[strum(serialize = "end of input")] EndOfInput,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct Token<'a> {
  pub text : &'a str,
  pub kind : TokenKind,
  /// The 1-based source line the token starts on.
  pub line : usize
}

impl<'a> Token<'a> {
  /**
    The numeric value of a literal token: decimal for `Number`, hex without the `0x` for
    `Address`. Returns `None` for other kinds, or if the literal doesn't fit in a `u32`.
  */
  pub fn literal_value(&self) -> Option<u32> {
    match self.kind {
      TokenKind::Number  => u32::from_str_radix(self.text, 10).ok(),
      TokenKind::Address => u32::from_str_radix(&self.text[2..], 16).ok(),
      _                  => None
    }
  }
}

impl<'a> Display for Token<'a> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.kind {
      TokenKind::EndOfInput => write!(f, "end of input"),
      _                     => write!(f, "`{}`", self.text)
    }
  }
}

fn hex_literal(input: &str) -> IResult<&str, &str> {
  all_consuming(preceded(tag("0x"), hex_digit1))(input)
}

fn decimal_literal(input: &str) -> IResult<&str, &str> {
  all_consuming(digit1)(input)
}

pub fn is_separator(c: char) -> bool {
  c == ' ' || c == '\n' || c == '\r'
}

/// Classifies a single token's text. The empty string is the end of input.
pub fn classify(text: &str, registers: &RegisterTable) -> TokenKind {
  if text.is_empty() {
    TokenKind::EndOfInput
  } else if registers.contains(text) {
    TokenKind::Register
  } else if Opcode::from_str(text).is_ok() {
    TokenKind::Opcode
  } else if hex_literal(text).is_ok() {
    TokenKind::Address
  } else if decimal_literal(text).is_ok() {
    TokenKind::Number
  } else {
    TokenKind::Invalid
  }
}

/// Reads classified tokens from source text. Once the text is exhausted every call to
/// `next_token` returns an `EndOfInput` token.
pub struct Tokenizer<'a> {
  chars     : CharIter<'a>,
  registers : &'a RegisterTable,
  line      : usize
}

impl<'a> Tokenizer<'a> {

  pub fn new(text: &'a str, registers: &'a RegisterTable) -> Tokenizer<'a> {
    Tokenizer {
      chars : CharIter::new(text),
      registers,
      line  : 1
    }
  }

  pub fn next_token(&mut self) -> Token<'a> {
    // Runs of separators collapse.
    while let Some(c) = self.chars.peek() {
      if !is_separator(c) {
        break;
      }
      if c == '\n' {
        self.line += 1;
      }
      self.chars.next();
    }

    let text = self.chars.get_prefix_match(|c: char| !is_separator(c)).unwrap_or("");
    Token {
      text,
      kind : classify(text, self.registers),
      line : self.line
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(text: &str) -> Vec<TokenKind> {
    let registers = RegisterTable::new();
    let mut tokenizer = Tokenizer::new(text, &registers);
    let mut kinds = vec![];
    loop {
      let token = tokenizer.next_token();
      kinds.push(token.kind);
      if token.kind == TokenKind::EndOfInput {
        return kinds;
      }
    }
  }

  #[test]
  fn classification() {
    let registers = RegisterTable::new();
    assert_eq!(classify("R1", &registers), TokenKind::Register);
    assert_eq!(classify("RF", &registers), TokenKind::Register);
    assert_eq!(classify("CALL", &registers), TokenKind::Opcode);
    assert_eq!(classify("0x0A", &registers), TokenKind::Address);
    assert_eq!(classify("0xfff", &registers), TokenKind::Address);
    assert_eq!(classify("42", &registers), TokenKind::Number);
    assert_eq!(classify("", &registers), TokenKind::EndOfInput);
  }

  #[test]
  fn invalid_tokens() {
    let registers = RegisterTable::new();
    for text in ["0x", "0xZZ", "R13", "ld", "12a", "-1", "0X10"].iter() {
      assert_eq!(classify(text, &registers), TokenKind::Invalid, "{}", text);
    }
  }

  #[test]
  fn separators_collapse() {
    assert_eq!(
      kinds("  LD   R1\n\n\n 0x0A \r\n"),
      vec![TokenKind::Opcode, TokenKind::Register, TokenKind::Address, TokenKind::EndOfInput]
    );
    assert_eq!(kinds(""), vec![TokenKind::EndOfInput]);
    assert_eq!(kinds(" \n "), vec![TokenKind::EndOfInput]);
  }

  #[test]
  fn tracks_lines() {
    let registers = RegisterTable::new();
    let mut tokenizer = Tokenizer::new("RET\n\nJ 0x10", &registers);
    assert_eq!(tokenizer.next_token().line, 1);
    let j = tokenizer.next_token();
    assert_eq!((j.text, j.line), ("J", 3));
    assert_eq!(tokenizer.next_token().text, "0x10");
    assert_eq!(tokenizer.next_token().kind, TokenKind::EndOfInput);
    assert_eq!(tokenizer.next_token().kind, TokenKind::EndOfInput);
  }

  #[test]
  fn literal_values() {
    let number  = Token { text: "255", kind: TokenKind::Number, line: 1 };
    let address = Token { text: "0xAbC", kind: TokenKind::Address, line: 1 };
    let huge    = Token { text: "0x123456789", kind: TokenKind::Address, line: 1 };
    assert_eq!(number.literal_value(), Some(255));
    assert_eq!(address.literal_value(), Some(0xABC));
    assert_eq!(huge.literal_value(), None);
  }
}
