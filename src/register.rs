//! The closed set of general-purpose register names and the register file they index.

use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

pub const REGISTER_COUNT: usize = 32;

/**
  Canonical register identifiers. The discriminant of each variant is the register's number,
  which is what appears in the 5 bit `rs`, `rt`, and `rd` fields of an encoded instruction.
  Consequently, the order the registers are listed below is significant.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,         PartialEq, Debug,           Hash
)]
#[repr(u8)]
pub enum Register {
  #[strum(to_string = "$zero")] Zero,
  #[strum(to_string = "$at")]   At,

  #[strum(to_string = "$v0")]   V0,
  #[strum(to_string = "$v1")]   V1,

  #[strum(to_string = "$a0")]   A0,
  #[strum(to_string = "$a1")]   A1,
  #[strum(to_string = "$a2")]   A2,
  #[strum(to_string = "$a3")]   A3,

  #[strum(to_string = "$t0")]   T0,
  #[strum(to_string = "$t1")]   T1,
  #[strum(to_string = "$t2")]   T2,
  #[strum(to_string = "$t3")]   T3,
  #[strum(to_string = "$t4")]   T4,
  #[strum(to_string = "$t5")]   T5,
  #[strum(to_string = "$t6")]   T6,
  #[strum(to_string = "$t7")]   T7,

  #[strum(to_string = "$s0")]   S0,
  #[strum(to_string = "$s1")]   S1,
  #[strum(to_string = "$s2")]   S2,
  #[strum(to_string = "$s3")]   S3,
  #[strum(to_string = "$s4")]   S4,
  #[strum(to_string = "$s5")]   S5,
  #[strum(to_string = "$s6")]   S6,
  #[strum(to_string = "$s7")]   S7,

  #[strum(to_string = "$t8")]   T8,
  #[strum(to_string = "$t9")]   T9,

  #[strum(to_string = "$k0")]   K0,
  #[strum(to_string = "$k1")]   K1,

  #[strum(to_string = "$gp")]   Gp,
  #[strum(to_string = "$sp")]   Sp,

  #[strum(to_string = "$s8")]   S8,
  #[strum(to_string = "$ra")]   Ra,
}

use Register::*;

/// Register numbers in order, so that a 5 bit field can be mapped to a name without failure.
static BY_NUMBER: [Register; REGISTER_COUNT] = [
  Zero, At, V0, V1, A0, A1, A2, A3,
  T0, T1, T2, T3, T4, T5, T6, T7,
  S0, S1, S2, S3, S4, S5, S6, S7,
  T8, T9, K0, K1, Gp, Sp, S8, Ra,
];

impl Register {
  pub fn number(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Converts the number to an index into the register file.
  pub fn idx(&self) -> usize {
    self.number() as usize
  }

  /// Maps the low 5 bits of `field` to a register. Higher bits are ignored.
  pub fn from_field(field: u32) -> Register {
    BY_NUMBER[(field & 0x1F) as usize]
  }
}


/**
  The general purpose registers. Register `$zero` is hardwired: it always reads as zero and
  writes to it are discarded.
*/
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RegisterFile {
  values: [i32; REGISTER_COUNT]
}

impl RegisterFile {
  pub fn new() -> RegisterFile {
    RegisterFile {
      values: [0; REGISTER_COUNT]
    }
  }

  pub fn read(&self, register: Register) -> i32 {
    self.values[register.idx()]
  }

  pub fn write(&mut self, register: Register, value: i32) {
    if register == Zero {
      return;
    }
    self.values[register.idx()] = value;
  }

  /// The registers paired with their current values, in register number order.
  pub fn iter(&self) -> impl Iterator<Item = (Register, i32)> + '_ {
    BY_NUMBER.iter().map(move |r| (*r, self.values[r.idx()]))
  }
}

impl Default for RegisterFile {
  fn default() -> Self {
    RegisterFile::new()
  }
}

impl Display for RegisterFile {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let text =
      self.iter()
          .filter(|(_, value)| *value != 0)
          .map(|(register, value)| format!("{}={}", register, value))
          .collect::<Vec<String>>()
          .join(", ");
    write!(f, "[{}]", text)
  }
}


#[cfg(test)]
mod tests {
  use std::convert::TryFrom;
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn numbers_follow_the_conventional_order() {
    assert_eq!(Zero.number(), 0);
    assert_eq!(V0.number(), 2);
    assert_eq!(A0.number(), 4);
    assert_eq!(T0.number(), 8);
    assert_eq!(S0.number(), 16);
    assert_eq!(T8.number(), 24);
    assert_eq!(Sp.number(), 29);
    assert_eq!(Ra.number(), 31);
  }

  #[test]
  fn field_lookup_agrees_with_discriminants() {
    for register in Register::iter() {
      assert_eq!(Register::from_field(register.number() as u32), register);
      assert_eq!(Register::try_from(register.number()).ok(), Some(register));
    }
    assert!(Register::try_from(32u8).is_err());
  }

  #[test]
  fn names_parse_and_print() {
    assert_eq!(Register::from_str("$t2"), Ok(T2));
    assert_eq!(Register::from_str("$ra"), Ok(Ra));
    assert!(Register::from_str("t2").is_err());
    assert!(Register::from_str("$t10").is_err());
    assert_eq!(S8.to_string(), "$s8");
  }

  #[test]
  fn zero_register_ignores_writes() {
    let mut registers = RegisterFile::new();
    registers.write(Zero, 17);
    registers.write(T0, -3);
    assert_eq!(registers.read(Zero), 0);
    assert_eq!(registers.read(T0), -3);
    assert_eq!(registers.to_string(), "[$t0=-3]");
  }
}
