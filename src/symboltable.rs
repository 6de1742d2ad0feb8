use bimap::BiMap;

/// Assembly names of the sixteen 4 bit register codes, indexed by code. Only R1..R12 name
/// general purpose registers in the machine; the remaining names are accepted by the assembler
/// and encoded, but the machine has no general purpose register behind them.
pub const REGISTER_NAMES: [&str; 16] = [
  "R1", "R2", "R3", "R4", "R5", "R6", "R7", "R8", "R9", "R10", "R11", "R12",
  "RD", "RS", "RF", "SP"
];

/// The name of a register code. Only the low nibble of `code` is used.
pub fn register_name(code: u8) -> &'static str {
  REGISTER_NAMES[(code & 0xF) as usize]
}

/**
  A register table is a mapping between register names as written in assembly and their 4 bit
  codes. A register table is really just a convenience wrapper around a BiMap.
*/
#[derive(Clone, Debug)]
pub struct RegisterTable {
  table: BiMap<&'static str, u8>
}

impl RegisterTable {

  pub fn new() -> RegisterTable {
    let mut table = BiMap::new();
    for (code, name) in REGISTER_NAMES.iter().enumerate() {
      table.insert(*name, code as u8);
    }
    RegisterTable { table }
  }

  pub fn contains(&self, name: &str) -> bool {
    self.table.contains_left(name)
  }

  pub fn get_code(&self, name: &str) -> Option<u8> {
    self.table.get_by_left(name).copied()
  }

  pub fn get_name(&self, code: u8) -> Option<&'static str> {
    self.table.get_by_right(&code).copied()
  }
}

impl Default for RegisterTable {
  fn default() -> Self {
    RegisterTable::new()
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_to_codes() {
    let table = RegisterTable::new();
    assert_eq!(table.get_code("R1"), Some(0x0));
    assert_eq!(table.get_code("R12"), Some(0xB));
    assert_eq!(table.get_code("SP"), Some(0xF));
    assert_eq!(table.get_code("R13"), None);
    assert_eq!(table.get_code("r1"), None);
  }

  #[test]
  fn codes_to_names() {
    let table = RegisterTable::new();
    for code in 0..16u8 {
      assert_eq!(table.get_name(code), Some(register_name(code)));
    }
    assert_eq!(table.get_name(16), None);
  }
}
