//! Error types shared by the encoder, the decoder, and the execution rules.

use std::io;

use thiserror::Error;

/// Returned by the encoder instead of silently truncating a field that does not fit.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum EncodingError {
  #[error("{field} value {value} does not fit in {bits} bits")]
  FieldOverflow {
    field: &'static str,
    value: i64,
    bits: u32
  },
  #[error("{operation} expects operands ({expected}) but was given ({given})")]
  WrongOperands {
    operation: &'static str,
    expected: String,
    given: String
  },
}

/**
  Every way a run can enter the faulted state. The faulting instruction has not mutated the
  machine state, and the program counter still points at it.
*/
#[derive(Debug, Error)]
pub enum ExecutionError {
  #[error("unknown opcode {0:#04x}")]
  UnknownOpcode(u8),
  #[error("unknown function code {0:#04x} for a register-type instruction")]
  UnknownFunction(u8),
  #[error("unsupported syscall {0}")]
  UnsupportedSyscall(i32),
  #[error("{0} is not yet implemented")]
  NotYetImplemented(&'static str),
  #[error("execution did not halt within {0} steps")]
  StepLimit(u64),
  #[error("could not write to the console")]
  Console(#[from] io::Error),
}
