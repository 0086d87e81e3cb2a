/*!
  This module is responsible for the encoding and decoding of binary instructions.

  The encoders check that every field fits its width and fail with an `EncodingError`
  rather than masking off the excess bits.
*/
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use super::{Format, Function, Instruction, Opcode, Operand, OperandKind, Operation};
use crate::error::{EncodingError, ExecutionError};
use crate::register::Register;

// If you change this you must also change the shifts and masks below.
pub type Word = u32;

const OPCODE_SHIFT: u32 = 26;
const RS_SHIFT: u32 = 21;
const RT_SHIFT: u32 = 16;
const RD_SHIFT: u32 = 11;

const REGISTER_BITS: u32 = 5;
const FUNCTION_BITS: u32 = 6;
const IMMEDIATE_BITS: u32 = 16;
const ADDRESS_BITS: u32 = 26;

const FUNCTION_MASK: Word = 0x3F;
const IMMEDIATE_MASK: Word = 0xFFFF;
const ADDRESS_MASK: Word = 0x3FF_FFFF;

/// The fields of an encoded instruction, after the opcode and function have been recognized.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum DecodedInstruction {
  /// [Opcode:6=0][rs:5][rt:5][rd:5][shamt:5=0][funct:6]
  Register {
    function: Function,
    rs: Register,
    rt: Register,
    rd: Register
  },
  /// [Opcode:6][rs:5][rt:5][immediate:16]
  Immediate {
    opcode: Opcode,
    rs: Register,
    rt: Register,
    immediate: u16
  },
  /// [Opcode:6][address:26]
  Jump {
    opcode: Opcode,
    address: u32
  },
}

impl DecodedInstruction {
  pub fn format(&self) -> Format {
    match self {
      DecodedInstruction::Register { .. }  => Format::Register,
      DecodedInstruction::Immediate { .. } => Format::Immediate,
      DecodedInstruction::Jump { .. }      => Format::Jump,
    }
  }
}

impl Display for DecodedInstruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      DecodedInstruction::Register { function: Function::Syscall, .. } => write!(f, "syscall"),

      DecodedInstruction::Register { function: Function::Break, .. } => write!(f, "break"),

      DecodedInstruction::Register { function, rs, rt, rd } => {
        write!(f, "{}({}, {}, {})", function, rd, rs, rt)
      }

      DecodedInstruction::Immediate { opcode, rs, rt, immediate } => {
        write!(f, "{}({}, {}, {})", opcode, rt, rs, *immediate as i16)
      }

      DecodedInstruction::Jump { opcode, address } => {
        write!(f, "{}({})", opcode, address)
      }

    }
  }
}

fn check_field(field: &'static str, value: u32, bits: u32) -> Result<Word, EncodingError> {
  match value >> bits {
    0 => Ok(value),
    _ => Err(EncodingError::FieldOverflow { field, value: value as i64, bits })
  }
}

/// Packs a register-type instruction. The primary opcode and `shamt` are always zero.
pub fn encode_register(function: Function, rd: u32, rs: u32, rt: u32) -> Result<Word, EncodingError> {
  let rs = check_field("rs", rs, REGISTER_BITS)?;
  let rt = check_field("rt", rt, REGISTER_BITS)?;
  let rd = check_field("rd", rd, REGISTER_BITS)?;
  let funct = check_field("funct", function.code() as u32, FUNCTION_BITS)?;

  Ok(
    (rs << RS_SHIFT) |
    (rt << RT_SHIFT) |
    (rd << RD_SHIFT) |
    funct
  )
}

pub fn encode_immediate(opcode: Opcode, rt: u32, rs: u32, immediate: u32) -> Result<Word, EncodingError> {
  let rs = check_field("rs", rs, REGISTER_BITS)?;
  let rt = check_field("rt", rt, REGISTER_BITS)?;
  let immediate = check_field("immediate", immediate, IMMEDIATE_BITS)?;

  Ok(
    ((opcode.code() as Word) << OPCODE_SHIFT) |
    (rs << RS_SHIFT) |
    (rt << RT_SHIFT) |
    immediate
  )
}

pub fn encode_jump(opcode: Opcode, address: u32) -> Result<Word, EncodingError> {
  let address = check_field("address", address, ADDRESS_BITS)?;
  Ok(((opcode.code() as Word) << OPCODE_SHIFT) | address)
}

/**
  Immediates may be given either as a signed value or as the raw 16 bit pattern, so anything in
  `-32768..=65535` is accepted. Negative values are stored in two's complement.
*/
fn immediate_field(value: i32) -> Result<Word, EncodingError> {
  match value {
    v if v < i16::MIN as i32 || v > u16::MAX as i32 => {
      Err(EncodingError::FieldOverflow { field: "immediate", value: v as i64, bits: IMMEDIATE_BITS })
    }
    v => Ok((v as u32) & IMMEDIATE_MASK)
  }
}

fn address_field(value: i32) -> Result<Word, EncodingError> {
  match u32::try_from(value) {
    Ok(address) => check_field("address", address, ADDRESS_BITS),
    Err(_)      => {
      Err(EncodingError::FieldOverflow { field: "address", value: value as i64, bits: ADDRESS_BITS })
    }
  }
}

fn describe(kinds: impl Iterator<Item = OperandKind>) -> String {
  kinds.map(|k| k.to_string()).collect::<Vec<String>>().join(", ")
}

/**
  Encodes the instruction into a machine word, choosing the format from the operation. The
  operands must match `Operation::signature()` in number and kind.
*/
pub fn encode_instruction(instruction: &Instruction) -> Result<Word, EncodingError> {
  let operation = instruction.operation;
  let signature = operation.signature();
  let matches =
    signature.len() == instruction.operands.len() &&
    signature.iter().zip(instruction.operands.iter()).all(|(kind, operand)| *kind == operand.kind());

  if !matches {
    return Err(EncodingError::WrongOperands {
      operation: operation.into(),
      expected: describe(signature.iter().copied()),
      given: describe(instruction.operands.iter().map(Operand::kind)),
    });
  }

  let register = |i: usize| -> u32 {
    match instruction.operands[i] {
      Operand::Register(r) => r.number() as u32,
      Operand::Immediate(_) => unreachable!("operand kinds were checked against the signature"),
    }
  };
  let immediate = |i: usize| -> i32 {
    match instruction.operands[i] {
      Operand::Immediate(value) => value,
      Operand::Register(_) => unreachable!("operand kinds were checked against the signature"),
    }
  };

  match (operation.format(), operation.function()) {

    (Format::Register, Some(function)) => {
      match signature.is_empty() {
        true  => encode_register(function, 0, 0, 0),
        false => encode_register(function, register(0), register(1), register(2)),
      }
    }

    (Format::Immediate, _) => {
      encode_immediate(operation.opcode(), register(0), register(1), immediate_field(immediate(2))?)
    }

    (Format::Jump, _) => encode_jump(operation.opcode(), address_field(immediate(0))?),

    (Format::Register, None) => unreachable!("register-type operation without a function code"),

  }
}

/**
  Recognizes the primary opcode (bits 31..26) and, when it is zero, the function field
  (bits 5..0), then extracts the remaining fields for the matching format.
*/
pub fn decode_instruction(word: Word) -> Result<DecodedInstruction, ExecutionError> {
  let opcode_bits = (word >> OPCODE_SHIFT) as u8;
  let opcode = Opcode::try_from(opcode_bits).map_err(|_| ExecutionError::UnknownOpcode(opcode_bits))?;

  let rs = Register::from_field(word >> RS_SHIFT);
  let rt = Register::from_field(word >> RT_SHIFT);

  let decoded =
    match opcode {

      Opcode::Special => {
        let function_bits = (word & FUNCTION_MASK) as u8;
        let function =
          Function::try_from(function_bits).map_err(|_| ExecutionError::UnknownFunction(function_bits))?;
        DecodedInstruction::Register {
          function,
          rs,
          rt,
          rd: Register::from_field(word >> RD_SHIFT)
        }
      }

      Opcode::AddImmediate | Opcode::AddImmediateUnsigned => {
        DecodedInstruction::Immediate {
          opcode,
          rs,
          rt,
          immediate: (word & IMMEDIATE_MASK) as u16
        }
      }

      Opcode::Jump | Opcode::JumpAndLink => {
        DecodedInstruction::Jump {
          opcode,
          address: word & ADDRESS_MASK
        }
      }

    };

  Ok(decoded)
}


#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;
  use crate::register::Register::*;

  #[test]
  fn register_layout_matches_mips() {
    // add $t2, $t0, $t1
    let word = encode_register(Function::Add, 10, 8, 9).unwrap();
    assert_eq!(word, 0x0109_5020);
  }

  #[test]
  fn immediate_layout_matches_mips() {
    // addi $t0, $zero, 5
    let word = encode_immediate(Opcode::AddImmediate, 8, 0, 5).unwrap();
    assert_eq!(word, 0x2008_0005);
  }

  #[test]
  fn jump_layout_matches_mips() {
    assert_eq!(encode_jump(Opcode::Jump, 3).unwrap(), 0x0800_0003);
    assert_eq!(encode_jump(Opcode::JumpAndLink, ADDRESS_MASK).unwrap(), 0x0FFF_FFFF);
  }

  #[test]
  fn syscall_is_its_function_code() {
    let word = encode_instruction(&Instruction::nullary(Operation::Syscall)).unwrap();
    assert_eq!(word, 0x0000_000C);
  }

  #[test]
  fn oversized_fields_are_rejected() {
    assert_eq!(
      encode_register(Function::Sub, 32, 0, 0),
      Err(EncodingError::FieldOverflow { field: "rd", value: 32, bits: 5 })
    );
    assert_eq!(
      encode_immediate(Opcode::AddImmediate, 1, 1, 0x1_0000),
      Err(EncodingError::FieldOverflow { field: "immediate", value: 0x1_0000, bits: 16 })
    );
    assert_eq!(
      encode_jump(Opcode::Jump, 1 << 26),
      Err(EncodingError::FieldOverflow { field: "address", value: 1 << 26, bits: 26 })
    );
    assert!(encode_instruction(&Instruction::immediate(Operation::Addi, T0, T0, -32769)).is_err());
    assert!(encode_instruction(&Instruction::jump(Operation::J, -1)).is_err());
  }

  #[test]
  fn negative_immediates_use_twos_complement() {
    let word = encode_instruction(&Instruction::immediate(Operation::Addiu, T0, T1, -1)).unwrap();
    assert_eq!(word & IMMEDIATE_MASK, 0xFFFF);
  }

  #[test]
  fn operands_must_match_the_signature() {
    let missing = Instruction::new(Operation::Add, vec![Operand::Register(T0), Operand::Register(T1)]);
    let wrong_kind = Instruction::new(
      Operation::Addi,
      vec![Operand::Register(T0), Operand::Register(T1), Operand::Register(T2)]
    );
    match encode_instruction(&missing) {
      Err(EncodingError::WrongOperands { operation, expected, given }) => {
        assert_eq!(operation, "add");
        assert_eq!(expected, "register, register, register");
        assert_eq!(given, "register, register");
      }
      other => panic!("expected WrongOperands, got {:?}", other),
    }
    assert!(encode_instruction(&wrong_kind).is_err());
  }

  #[test]
  fn unknown_opcodes_and_functions_are_reported() {
    match decode_instruction(0x3F << 26) {
      Err(ExecutionError::UnknownOpcode(0x3F)) => {}
      other => panic!("expected UnknownOpcode, got {:?}", other),
    }
    match decode_instruction(0x0000_0001) {
      Err(ExecutionError::UnknownFunction(0x01)) => {}
      other => panic!("expected UnknownFunction, got {:?}", other),
    }
  }

  #[test]
  fn decoded_instructions_display_their_fields() {
    let word = encode_instruction(&Instruction::immediate(Operation::Addi, T0, Zero, -2)).unwrap();
    assert_eq!(decode_instruction(word).unwrap().to_string(), "AddImmediate($t0, $zero, -2)");
  }

  #[test]
  fn decoding_recovers_the_format() {
    for (instruction, format) in vec![
      (Instruction::register(Operation::Subu, T0, T1, T2), Format::Register),
      (Instruction::immediate(Operation::Addiu, T0, T1, 4), Format::Immediate),
      (Instruction::jump(Operation::Jal, 12), Format::Jump),
      (Instruction::nullary(Operation::Break), Format::Register),
    ] {
      let word = encode_instruction(&instruction).unwrap();
      assert_eq!(decode_instruction(word).unwrap().format(), format);
      assert_eq!(instruction.operation.format(), format);
    }
  }

  proptest! {
    #[test]
    fn register_fields_survive_encoding(rs in 0u32..32, rt in 0u32..32, rd in 0u32..32, sub in any::<bool>()) {
      let function = if sub { Function::Sub } else { Function::Add };
      let word = encode_register(function, rd, rs, rt).unwrap();
      prop_assert_eq!(
        decode_instruction(word).unwrap(),
        DecodedInstruction::Register {
          function,
          rs: Register::from_field(rs),
          rt: Register::from_field(rt),
          rd: Register::from_field(rd)
        }
      );
    }

    #[test]
    fn immediate_fields_survive_encoding(rs in 0u32..32, rt in 0u32..32, immediate in 0u32..=0xFFFF) {
      let word = encode_immediate(Opcode::AddImmediateUnsigned, rt, rs, immediate).unwrap();
      prop_assert_eq!(
        decode_instruction(word).unwrap(),
        DecodedInstruction::Immediate {
          opcode: Opcode::AddImmediateUnsigned,
          rs: Register::from_field(rs),
          rt: Register::from_field(rt),
          immediate: immediate as u16
        }
      );
    }
  }
}
