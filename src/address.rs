//! A 12 bit word address into machine memory, with some convenience functions.

use std::fmt::{Display, Formatter};

/// Raw numeric type of an address. Only the low 12 bits are significant.
pub type AddressNumberType = u16;

/// Number of words of machine memory, `0x000..=0xFFF`.
pub const MEMORY_SIZE: usize = 4096;
/// Mask selecting the 12 significant bits of an address.
pub const ADDRESS_MASK: AddressNumberType = 0x0FFF;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Address(AddressNumberType);

impl Address {
  /// Truncates `raw` to 12 bits. Callers that care about overflow check with `from_pc` or
  /// compare against `ADDRESS_MASK` first.
  pub fn new(raw: AddressNumberType) -> Address {
    Address(raw & ADDRESS_MASK)
  }

  /// Converts a program counter into an address, or `None` if the counter has run past the end
  /// of memory.
  pub fn from_pc(pc: u16) -> Option<Address> {
    match (pc as usize) < MEMORY_SIZE {
      true  => Some(Address(pc)),
      false => None
    }
  }

  /// Converts the address to an index into memory.
  pub fn idx(&self) -> usize {
    self.0 as usize
  }

  pub fn value(&self) -> AddressNumberType {
    self.0
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "0x{:03x}", self.0)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncates_to_twelve_bits() {
    assert_eq!(Address::new(0xF123).value(), 0x123);
    assert_eq!(Address::new(0x0FFF).idx(), 0xFFF);
  }

  #[test]
  fn pc_past_end_of_memory() {
    assert_eq!(Address::from_pc(0x0FFF), Some(Address::new(0xFFF)));
    assert_eq!(Address::from_pc(0x1000), None);
  }

  #[test]
  fn display() {
    assert_eq!(format!("{}", Address::new(0xA)), "0x00a");
  }
}
