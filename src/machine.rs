//! The state of the virtual CPU: register file, program counter, and memory.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::bytecode::Word;
use crate::register::RegisterFile;

/// Size of memory in words.
pub const MEMORY_SIZE: usize = 1024;

/**
  Exactly one `MachineState` exists per run. It is created zero-initialized and handed by
  mutable reference to every execution rule.

  The program counter is an index into the instruction stream, not a byte address. Memory is
  word addressed and no execution rule touches it yet.
*/
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MachineState {
  pub registers : RegisterFile,
  pub pc        : usize,
  pub memory    : Box<[Word; MEMORY_SIZE]>,
}

impl MachineState {

  pub fn new() -> MachineState {
    MachineState {
      registers : RegisterFile::new(),
      pc        : 0,
      memory    : Box::new([0; MEMORY_SIZE]),
    }
  }

  /// True once the program counter has run off the end of a program of `length` words.
  pub fn is_halted(&self, length: usize) -> bool {
    self.pc >= length
  }

  // region Display methods

  fn make_register_table<T, I>(rows: I) -> Table
    where T: Display,
          I: Iterator<Item = (String, T)>
  {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Name", ubl->"Contents"]);

    for (name, value) in rows {
      table.add_row(row![r->format!("{} =", name), format!("{}", value)]);
    }
    table
  }

  // endregion

}

impl Default for MachineState {
  fn default() -> Self {
    MachineState::new()
  }
}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

/// Renders the registers next to the nonzero memory words. Zero words are elided.
impl Display for MachineState {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let r_table =
      MachineState::make_register_table(
        self.registers.iter().map(|(register, value)| (register.to_string(), value))
      );
    let m_table =
      MachineState::make_register_table(
        self.memory
            .iter()
            .enumerate()
            .filter(|(_, word)| **word != 0)
            .map(|(i, word)| (format!("M[{}]", i), format!("{:#010x}", word)))
      );

    let mut combined_table = table!([r_table, m_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Memory"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "PC: {}\n{}", self.pc, combined_table)
  }
}
