use std::collections::HashMap;

use bimap::BiMap;
use string_cache::DefaultAtom;

/// Label names are interned.
pub type Label = DefaultAtom;

/**
  A symbol table is a mapping between label names and the index of the instruction they mark
  in the instruction stream. Several labels may mark the same instruction. Label names are
  unique, and the first label given to an instruction is the one it is listed under, which is
  what the `BiMap` records.
*/
#[derive(Debug)]
pub struct SymbolTable {
  addresses: HashMap<Label, usize>,
  names: BiMap<Label, usize>
}

impl SymbolTable {

  pub fn new() -> SymbolTable {
    SymbolTable {
      addresses: HashMap::new(),
      names: BiMap::new()
    }
  }

  /// The first label defined for the instruction at `address`.
  pub fn get_symbol(&self, address: usize) -> Option<&Label> {
    self.names.get_by_right(&address)
  }

  pub fn get_address(&self, label: &str) -> Option<usize> {
    self.addresses.get(&Label::from(label)).copied()
  }

  /// Fails, returning the rejected pair, if the label is already defined.
  pub fn insert(&mut self, label: Label, address: usize) -> Result<(), (Label, usize)> {
    if self.addresses.contains_key(&label) {
      return Err((label, address));
    }
    self.addresses.insert(label.clone(), address);
    // An instruction that already has a name keeps it.
    let _ = self.names.insert_no_overwrite(label, address);
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.addresses.len()
  }

  pub fn is_empty(&self) -> bool {
    self.addresses.is_empty()
  }
}

impl Default for SymbolTable {
  fn default() -> Self {
    SymbolTable::new()
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn labels_resolve_both_ways() {
    let mut symbols = SymbolTable::new();
    assert!(symbols.is_empty());
    symbols.insert(Label::from("loop"), 3).unwrap();
    symbols.insert(Label::from("done"), 7).unwrap();

    assert_eq!(symbols.get_address("loop"), Some(3));
    assert_eq!(symbols.get_symbol(7).map(|l| &**l), Some("done"));
    assert_eq!(symbols.get_address("missing"), None);
    assert_eq!(symbols.len(), 2);
  }

  #[test]
  fn duplicate_names_are_rejected() {
    let mut symbols = SymbolTable::new();
    symbols.insert(Label::from("loop"), 0).unwrap();
    assert!(symbols.insert(Label::from("loop"), 1).is_err());
    assert_eq!(symbols.get_address("loop"), Some(0));
    assert_eq!(symbols.len(), 1);
  }

  #[test]
  fn an_instruction_may_have_several_labels() {
    let mut symbols = SymbolTable::new();
    symbols.insert(Label::from("main"), 0).unwrap();
    symbols.insert(Label::from("again"), 0).unwrap();

    assert_eq!(symbols.get_address("main"), Some(0));
    assert_eq!(symbols.get_address("again"), Some(0));
    assert_eq!(symbols.get_symbol(0).map(|l| &**l), Some("main"));
    assert_eq!(symbols.len(), 2);
  }
}
