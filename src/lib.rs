/*!
  An assembler and interpreter for a small subset of MIPS.

  Text is assembled into `Instruction`s (`bytecode::parse_assembly`), each instruction is
  encoded into a 32 bit word (`bytecode::encode_instruction`), and the words are run against a
  `MachineState` (`vm::execute_many`). The only observable effect of a program is the output of
  the print-integer syscall.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod bytecode;
pub mod config;
pub mod error;
pub mod machine;
pub mod register;
pub mod symboltable;
pub mod syscall;
pub mod vm;

pub use error::{EncodingError, ExecutionError};
pub use machine::MachineState;
pub use vm::{execute_bounded, execute_many, execute_one, Step};
