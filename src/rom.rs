/*!
  Reads the text form of a program, the "ROM" the simulator loads.

  A ROM is whitespace separated hexadecimal tokens, each one instruction word, in load order.
  The `0x` prefix is optional. This is exactly what the assembler writes, so the output of
  `Assembler::assemble_to_text` can be fed straight back in.
*/

use std::error::Error;
use std::fmt::{Display, Formatter};

use nom::{
  IResult,
  bytes::complete::tag,
  character::complete::hex_digit1,
  combinator::{all_consuming, opt},
  sequence::preceded
};

use crate::bytecode::Word;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RomError {
  /// A token that isn't a hex number, or is one that doesn't fit in a word.
  InvalidToken {
    line  : usize,
    token : String
  }
}

impl Display for RomError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      RomError::InvalidToken { line, token } => {
        write!(f, "Error on line {} of ROM: `{}` is not a 16 bit hex word.", line, token)
      }
    }
  }
}

impl Error for RomError {}

fn hex_word(input: &str) -> IResult<&str, &str> {
  all_consuming(preceded(opt(tag("0x")), hex_digit1))(input)
}

/// Parses every word in `text`, in order.
pub fn parse_rom(text: &str) -> Result<Vec<Word>, RomError> {
  let mut words = vec![];

  for (index, line) in text.lines().enumerate() {
    for token in line.split_whitespace() {
      let word =
        hex_word(token)
          .ok()
          .and_then(|(_, digits)| Word::from_str_radix(digits, 16).ok())
          .ok_or_else(|| RomError::InvalidToken {
            line  : index + 1,
            token : token.to_string()
          })?;
      words.push(word);
    }
  }

  Ok(words)
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn one_word_per_line() {
    assert_eq!(parse_rom("000a\n2010\n").unwrap(), vec![0x000A, 0x2010]);
  }

  #[test]
  fn any_whitespace_and_prefix() {
    assert_eq!(
      parse_rom("  0xA123 ffff\t1\n\n\r\n  b000  ").unwrap(),
      vec![0xA123, 0xFFFF, 0x0001, 0xB000]
    );
    assert_eq!(parse_rom("").unwrap(), Vec::<Word>::new());
  }

  #[test]
  fn bad_tokens() {
    assert_eq!(
      parse_rom("000a\nzz").unwrap_err(),
      RomError::InvalidToken { line: 2, token: "zz".to_string() }
    );
    assert!(parse_rom("10000").is_err());
    assert!(parse_rom("0x").is_err());
    assert!(parse_rom("12-3").is_err());
  }
}
