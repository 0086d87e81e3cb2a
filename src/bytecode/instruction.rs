use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

use crate::register::Register;

/// The three canonical instruction encodings.
#[derive(StrumDisplay, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Format {
  /// [Opcode:6=0][rs:5][rt:5][rd:5][shamt:5=0][funct:6]
  Register,
  /// [Opcode:6][rs:5][rt:5][immediate:16]
  Immediate,
  /// [Opcode:6][address:26]
  Jump,
}

/**
  Values of the 6 bit primary opcode field. Every register-type instruction shares
  `Opcode::Special` and is told apart by its `Function`.
*/
#[derive(
  StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,               PartialEq,     Debug, Hash
)]
#[repr(u8)]
pub enum Opcode {
  Special = 0x00,
  Jump    = 0x02,
  JumpAndLink = 0x03,
  AddImmediate = 0x08,
  AddImmediateUnsigned = 0x09,
}

/// Values of the 6 bit function field of register-type instructions.
#[derive(
  StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,               PartialEq,     Debug, Hash
)]
#[repr(u8)]
pub enum Function {
  Syscall     = 0x0C,
  Break       = 0x0D,
  Add         = 0x20,
  AddUnsigned = 0x21,
  Sub         = 0x22,
  SubUnsigned = 0x23,
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }
}

impl Function {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }
}

/**
  The mnemonics understood by the assembler. The textual form of each variant is its
  lowercase mnemonic, so `Operation::from_str("addiu")` resolves a mnemonic.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter,
  Clone,        Copy,          Eq,         PartialEq, Debug, Hash
)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
  // Immediate-type //
  Addi,
  Addiu,

  // Register-type //
  Add,
  Addu,
  Sub,
  Subu,

  // Jump-type //
  J,
  Jal,

  // Special //
  Syscall,
  Break,
}

impl Operation {
  pub fn format(&self) -> Format {
    match self {
      Operation::Addi | Operation::Addiu => Format::Immediate,
      Operation::J | Operation::Jal      => Format::Jump,
      _                                  => Format::Register,
    }
  }

  /// The primary opcode. All register-type operations have `Opcode::Special`.
  pub fn opcode(&self) -> Opcode {
    match self {
      Operation::Addi  => Opcode::AddImmediate,
      Operation::Addiu => Opcode::AddImmediateUnsigned,
      Operation::J     => Opcode::Jump,
      Operation::Jal   => Opcode::JumpAndLink,
      _                => Opcode::Special,
    }
  }

  /// The function field, for register-type operations only.
  pub fn function(&self) -> Option<Function> {
    match self {
      Operation::Add     => Some(Function::Add),
      Operation::Addu    => Some(Function::AddUnsigned),
      Operation::Sub     => Some(Function::Sub),
      Operation::Subu    => Some(Function::SubUnsigned),
      Operation::Syscall => Some(Function::Syscall),
      Operation::Break   => Some(Function::Break),
      _                  => None,
    }
  }

  /// The operand kinds the operation takes, in assembly order.
  pub fn signature(&self) -> &'static [OperandKind] {
    const REG: OperandKind = OperandKind::Register;
    const IMM: OperandKind = OperandKind::Immediate;
    match self {
      Operation::Addi | Operation::Addiu    => &[REG, REG, IMM],
      Operation::Add  | Operation::Addu
      | Operation::Sub | Operation::Subu    => &[REG, REG, REG],
      Operation::J    | Operation::Jal      => &[IMM],
      Operation::Syscall | Operation::Break => &[],
    }
  }

  pub fn arity(&self) -> usize {
    self.signature().len()
  }
}

#[derive(StrumDisplay, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum OperandKind {
  #[strum(to_string = "register")]
  Register,
  #[strum(to_string = "immediate")]
  Immediate,
}

/// An instruction argument, tagged by kind.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Operand {
  Register(Register),
  Immediate(i32),
}

impl Operand {
  pub fn kind(&self) -> OperandKind {
    match self {
      Operand::Register(_)  => OperandKind::Register,
      Operand::Immediate(_) => OperandKind::Immediate,
    }
  }
}

impl Display for Operand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Operand::Register(register) => write!(f, "{}", register),
      Operand::Immediate(value)   => write!(f, "{}", value),
    }
  }
}

/**
  Holds the unencoded components of an instruction: the operation and its operands in
  assembly order (`add rd, rs, rt`, `addi rt, rs, imm`, `j target`). An `Instruction` is
  consumed once by the encoder; execution only ever sees the encoded word.
*/
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Instruction {
  pub operation: Operation,
  pub operands: Vec<Operand>,
}

impl Instruction {
  pub fn new(operation: Operation, operands: Vec<Operand>) -> Instruction {
    Instruction { operation, operands }
  }

  pub fn register(operation: Operation, rd: Register, rs: Register, rt: Register) -> Instruction {
    Instruction::new(
      operation,
      vec![Operand::Register(rd), Operand::Register(rs), Operand::Register(rt)]
    )
  }

  pub fn immediate(operation: Operation, rt: Register, rs: Register, immediate: i32) -> Instruction {
    Instruction::new(
      operation,
      vec![Operand::Register(rt), Operand::Register(rs), Operand::Immediate(immediate)]
    )
  }

  pub fn jump(operation: Operation, target: i32) -> Instruction {
    Instruction::new(operation, vec![Operand::Immediate(target)])
  }

  pub fn nullary(operation: Operation) -> Instruction {
    Instruction::new(operation, vec![])
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.operands.is_empty() {

      true  => write!(f, "{}", self.operation),

      false => {
        write!(
          f,
          "{} {}",
          self.operation,
          self.operands
              .iter()
              .map(Operand::to_string)
              .collect::<Vec<String>>()
              .join(", ")
        )
      }

    }
  }
}
