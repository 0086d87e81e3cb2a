/*!
  The human readable textual form of machine code is called assembly. This module leverages the
  `strum` derives of the instruction related enums to resolve mnemonics and register names.

  One statement per line:

  ```text
  # comment
  start:  addi $t0, $zero, 5    # a label may precede a statement
          add  $t2, $t0, $t1
          j    start
  done:
  ```

  A label on an otherwise empty line marks the next instruction. Immediates are signed
  decimal literals; anywhere an immediate is expected, a label may be used instead and
  stands for the index of the instruction it marks.

  Assembly is fail-fast: the first unresolvable name or malformed literal is reported with
  its line number, and nothing is returned for the rest of the program.
*/

use std::str::FromStr;

use nom::{
  IResult,
  branch::alt,
  bytes::complete::{is_not, tag},
  character::complete::{
    alpha1,
    alphanumeric1,
    char as one_char,
    not_line_ending,
    space0
  },
  combinator::{all_consuming, map, opt, recognize},
  multi::{many0, separated_list},
  sequence::{delimited, pair, preceded, terminated, tuple}
};
use thiserror::Error;
use tracing::debug;

use super::{encode_instruction, Format, Instruction, Operand, OperandKind, Operation, Word};
use crate::error::EncodingError;
use crate::register::Register;
use crate::symboltable::{Label, SymbolTable};

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum AssemblyErrorKind {
  #[error("{0} is not an operation")]
  NotAnOperation(String),
  #[error("unknown register {0}")]
  UnknownRegister(String),
  #[error("could not parse number {0}")]
  MalformedNumber(String),
  #[error("immediate {value} is outside {min}..={max}")]
  ImmediateOutOfRange {
    value: i64,
    min: i64,
    max: i64
  },
  #[error("{operation} requires {expected} operands but was given {given}")]
  WrongArity {
    operation: Operation,
    expected: usize,
    given: usize
  },
  #[error("operand {position} of {operation} must be a {expected}, found {found}")]
  WrongOperandKind {
    operation: Operation,
    position: usize,
    expected: OperandKind,
    found: String
  },
  #[error("undefined label {0}")]
  UndefinedLabel(String),
  #[error("label {0} is already defined")]
  DuplicateLabel(String),
  #[error("syntax error at `{0}`")]
  Syntax(String),
  #[error(transparent)]
  Encoding(#[from] EncodingError),
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("line {line}: {kind}")]
pub struct AssemblyError {
  pub line: usize,
  pub kind: AssemblyErrorKind
}

impl AssemblyError {
  fn new(line: usize, kind: AssemblyErrorKind) -> AssemblyError {
    AssemblyError { line, kind }
  }
}

/// An assembled program: instructions in program order, the source line of each, and labels.
#[derive(Debug)]
pub struct Program {
  pub instructions: Vec<Instruction>,
  pub lines: Vec<usize>,
  pub symbols: SymbolTable,
}

impl Program {
  pub fn len(&self) -> usize {
    self.instructions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }

  /// Encodes every instruction, reporting the source line of the first that cannot be encoded.
  pub fn encode(&self) -> Result<Vec<Word>, AssemblyError> {
    self.instructions
        .iter()
        .zip(self.lines.iter())
        .map(|(instruction, line)| {
          encode_instruction(instruction).map_err(|e| AssemblyError::new(*line, e.into()))
        })
        .collect()
  }
}

// region Line grammar

/// The pieces of one source line, before any name is resolved.
#[derive(Debug, Eq, PartialEq)]
struct RawLine<'a> {
  label: Option<&'a str>,
  statement: Option<(&'a str, Vec<&'a str>)>
}

fn identifier(input: &str) -> IResult<&str, &str> {
  recognize(
    pair(
      alt((alpha1, tag("_"))),
      many0(alt((alphanumeric1, tag("_"))))
    )
  )(input)
}

fn label_definition(input: &str) -> IResult<&str, &str> {
  terminated(identifier, preceded(space0, one_char(':')))(input)
}

// Operands are classified after parsing, so that a malformed one gets a precise error.
fn operand(input: &str) -> IResult<&str, &str> {
  is_not(", \t#")(input)
}

fn statement(input: &str) -> IResult<&str, (&str, Vec<&str>)> {
  pair(
    identifier,
    preceded(
      space0,
      separated_list(delimited(space0, one_char(','), space0), operand)
    )
  )(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
  preceded(one_char('#'), not_line_ending)(input)
}

fn line(input: &str) -> IResult<&str, RawLine> {
  map(
    all_consuming(
      tuple((
        preceded(space0, opt(label_definition)),
        preceded(space0, opt(statement)),
        preceded(space0, opt(comment)),
      ))
    ),
    |(label, statement, _)| RawLine { label, statement }
  )(input)
}

fn parse_line(text: &str) -> Result<RawLine, AssemblyErrorKind> {
  match line(text) {
    Ok((_rest, raw)) => Ok(raw),
    | Err(nom::Err::Error((rest, _kind)))
    | Err(nom::Err::Failure((rest, _kind))) => Err(AssemblyErrorKind::Syntax(rest.trim().to_string())),
    Err(nom::Err::Incomplete(_)) => Err(AssemblyErrorKind::Syntax(text.trim().to_string())),
  }
}

// endregion

// region Operand resolution

fn parse_register(token: &str) -> Result<Register, AssemblyErrorKind> {
  Register::from_str(token).map_err(|_| AssemblyErrorKind::UnknownRegister(token.to_string()))
}

/// A signed decimal literal: an optional `-` followed by digits only.
fn parse_number(token: &str) -> Result<i64, AssemblyErrorKind> {
  let digits = token.strip_prefix('-').unwrap_or(token);
  if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
    return Err(AssemblyErrorKind::MalformedNumber(token.to_string()));
  }
  token.parse::<i64>().map_err(|_| AssemblyErrorKind::MalformedNumber(token.to_string()))
}

fn parse_immediate(operation: Operation, token: &str, symbols: &SymbolTable)
  -> Result<i32, AssemblyErrorKind>
{
  let value =
    match token.chars().next() {
      Some(c) if c.is_ascii_digit() || c == '-' => parse_number(token)?,
      _ => {
        match symbols.get_address(token) {
          Some(address) => address as i64,
          None          => return Err(AssemblyErrorKind::UndefinedLabel(token.to_string())),
        }
      }
    };

  // Jump targets are range checked by the encoder against the 26 bit address field.
  let (min, max) =
    match operation.format() {
      Format::Immediate => (i16::MIN as i64, i16::MAX as i64),
      _                 => (i32::MIN as i64, i32::MAX as i64),
    };
  match value {
    v if v < min || v > max => Err(AssemblyErrorKind::ImmediateOutOfRange { value: v, min, max }),
    v => Ok(v as i32)
  }
}

fn resolve(mnemonic: &str, tokens: &[&str], symbols: &SymbolTable)
  -> Result<Instruction, AssemblyErrorKind>
{
  let operation =
    Operation::from_str(mnemonic).map_err(|_| AssemblyErrorKind::NotAnOperation(mnemonic.to_string()))?;

  if operation.arity() != tokens.len() {
    return Err(AssemblyErrorKind::WrongArity {
      operation,
      expected: operation.arity(),
      given: tokens.len()
    });
  }

  let mut operands = Vec::with_capacity(tokens.len());
  for (position, (kind, token)) in operation.signature().iter().zip(tokens.iter()).enumerate() {
    let is_register = token.starts_with('$');
    let operand =
      match (kind, is_register) {

        (OperandKind::Register, true)   => Operand::Register(parse_register(token)?),

        (OperandKind::Immediate, false) => Operand::Immediate(parse_immediate(operation, token, symbols)?),

        (expected, _) => {
          return Err(AssemblyErrorKind::WrongOperandKind {
            operation,
            position: position + 1,
            expected: *expected,
            found: token.to_string()
          });
        }

      };
    operands.push(operand);
  }

  Ok(Instruction::new(operation, operands))
}

// endregion

/**
  Assembles `text` into a `Program`. Labels are collected in a first pass, so a jump may refer
  to a label defined further down. Line numbers in errors count from 1.
*/
pub fn parse_assembly(text: &str) -> Result<Program, AssemblyError> {
  let mut symbols = SymbolTable::new();
  let mut statements: Vec<(usize, &str, Vec<&str>)> = Vec::new();

  for (index, source) in text.lines().enumerate() {
    let line_number = index + 1;
    let raw = parse_line(source).map_err(|kind| AssemblyError::new(line_number, kind))?;

    if let Some(label) = raw.label {
      symbols
        .insert(Label::from(label), statements.len())
        .map_err(|_| {
          AssemblyError::new(line_number, AssemblyErrorKind::DuplicateLabel(label.to_string()))
        })?;
    }
    if let Some((mnemonic, tokens)) = raw.statement {
      statements.push((line_number, mnemonic, tokens));
    }
  }

  let mut instructions = Vec::with_capacity(statements.len());
  let mut lines = Vec::with_capacity(statements.len());
  for (line_number, mnemonic, tokens) in statements {
    let instruction =
      resolve(mnemonic, &tokens, &symbols).map_err(|kind| AssemblyError::new(line_number, kind))?;
    instructions.push(instruction);
    lines.push(line_number);
  }

  debug!("assembled {} instructions with {} labels", instructions.len(), symbols.len());

  Ok(Program { instructions, lines, symbols })
}
