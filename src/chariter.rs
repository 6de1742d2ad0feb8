/// A cursor over the characters of a string slice that can peek one character ahead and hand
/// out prefixes of the remaining text without copying.
#[derive(Clone, Debug)]
pub struct CharIter<'d> {
  text: &'d str
}

impl<'d> Iterator for CharIter<'d> {
  type Item = char;

  fn next(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.text = &self.text[c.len_utf8()..];
    Some(c)
  }
}

impl<'d> CharIter<'d> {

  pub fn new(text: &'d str) -> Self {
    CharIter { text }
  }

  /// Returns the next character without consuming it.
  pub fn peek(&self) -> Option<char> {
    self.text.chars().next()
  }

  pub fn is_empty(&self) -> bool {
    self.text.is_empty()
  }

  /// Gives the unconsumed part of the underlying string slice.
  pub fn data(&self) -> &'d str {
    self.text
  }

  /// Consumes the prefix for which each character `c` matches `pred(c)`, returning the prefix,
  /// or `None` if the prefix is empty.
  pub fn get_prefix_match(&mut self, pred: fn(char) -> bool) -> Option<&'d str> {
    // The index of the first character (byte) that doesn't match `pred`.
    let end = self.text.find(|c: char| !pred(c)).unwrap_or_else(|| self.text.len());
    match end {
      0 => None,
      _ => {
        let (prefix, rest) = self.text.split_at(end);
        self.text = rest;
        Some(prefix)
      }
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn peek_and_next() {
    let mut c = CharIter::new("abcd");
    assert_eq!(c.peek(), Some('a'));
    assert_eq!(c.next(), Some('a'));
    assert_eq!(c.next(), Some('b'));
    assert_eq!(c.next(), Some('c'));
    assert_eq!(c.peek(), Some('d'));
    assert_eq!(c.next(), Some('d'));
    assert_eq!(c.next(), None);
    assert_eq!(c.next(), None);
  }

  #[test]
  fn empty_chars() {
    let c = CharIter::new("");
    assert!(c.is_empty());
    let mut c2 = CharIter::new("");
    assert_eq!(c2.next(), None);
    assert_eq!(c2.peek(), None);
  }

  #[test]
  fn get_empty_prefix() {
    let mut c = CharIter::new("");
    let result = c.get_prefix_match(|ch: char| ch.is_uppercase());
    assert_eq!(result, None);
    assert_eq!(c.next(), None);
    assert_eq!(c.data(), "");
  }

  #[test]
  fn get_prefix() {
    let mut c = CharIter::new("ABCDEFGabcd");
    let result = c.get_prefix_match(|ch: char| ch.is_uppercase());
    assert_eq!(result, Some("ABCDEFG"));
    assert_eq!(c.next(), Some('a'));
    assert_eq!(c.data(), "bcd");
  }

  #[test]
  fn prefix_is_everything() {
    let mut c = CharIter::new("LD");
    assert_eq!(c.get_prefix_match(|ch: char| ch != ' '), Some("LD"));
    assert!(c.is_empty());
  }
}
