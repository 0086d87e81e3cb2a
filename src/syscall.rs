//! The syscall hook. The syscall number is read from `$v0` and its argument from `$a0`.

use std::io::Write;

use num_enum::TryFromPrimitive;
use strum_macros::Display as StrumDisplay;
use tracing::debug;

use crate::error::ExecutionError;
use crate::machine::MachineState;
use crate::register::Register;

#[derive(StrumDisplay, TryFromPrimitive, Clone, Copy, Eq, PartialEq, Debug)]
#[repr(i32)]
pub enum Syscall {
  /// Writes `$a0` as a signed decimal followed by a newline.
  PrintInteger = 0,
}

/// Performs the syscall selected by `$v0`. No register is modified.
pub fn handle_syscall(state: &MachineState, console: &mut dyn Write) -> Result<(), ExecutionError> {
  let number = state.registers.read(Register::V0);
  let syscall =
    Syscall::try_from_primitive(number).map_err(|_| ExecutionError::UnsupportedSyscall(number))?;

  debug!("syscall {} at pc={}", syscall, state.pc);

  match syscall {
    Syscall::PrintInteger => {
      writeln!(console, "{}", state.registers.read(Register::A0))?;
    }
  }
  Ok(())
}
