//! Decoding, dispatch, and the execution rules for each instruction format.

use std::io::Write;

use tracing::trace;

use crate::bytecode::{decode_instruction, DecodedInstruction, Function, Opcode, Word};
use crate::error::ExecutionError;
use crate::machine::MachineState;
use crate::register::Register;
use crate::syscall::handle_syscall;

/**
  What the batch loop should do with the program counter after an instruction. Execution
  rules never touch the program counter themselves; advancing it is the loop's job.
*/
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Step {
  /// Fall through to the next instruction.
  Next,
  /// Transfer control to the given instruction index.
  Jump(usize),
}

// region Execution rules

fn execute_register(
  state: &mut MachineState,
  function: Function,
  rs: Register,
  rt: Register,
  rd: Register,
  console: &mut dyn Write
) -> Result<Step, ExecutionError>
{
  // Signed and unsigned variants are identical: there is no overflow trap.
  match function {

    Function::Add | Function::AddUnsigned => {
      let value = state.registers.read(rs).wrapping_add(state.registers.read(rt));
      state.registers.write(rd, value);
    }

    Function::Sub | Function::SubUnsigned => {
      let value = state.registers.read(rs).wrapping_sub(state.registers.read(rt));
      state.registers.write(rd, value);
    }

    Function::Syscall => handle_syscall(state, console)?,

    Function::Break => return Err(ExecutionError::NotYetImplemented("break")),

  }

  Ok(Step::Next)
}

fn execute_immediate(
  state: &mut MachineState,
  opcode: Opcode,
  rs: Register,
  rt: Register,
  immediate: u16
) -> Result<Step, ExecutionError>
{
  // The 16 bit immediate is sign extended.
  let immediate = immediate as i16 as i32;

  match opcode {

    Opcode::AddImmediate | Opcode::AddImmediateUnsigned => {
      let value = state.registers.read(rs).wrapping_add(immediate);
      state.registers.write(rt, value);
      Ok(Step::Next)
    }

    _ => Err(ExecutionError::UnknownOpcode(opcode.code())),

  }
}

fn execute_jump(state: &mut MachineState, opcode: Opcode, address: u32) -> Result<Step, ExecutionError> {
  match opcode {

    Opcode::Jump => Ok(Step::Jump(address as usize)),

    Opcode::JumpAndLink => {
      let return_address = (state.pc + 1) as i32;
      state.registers.write(Register::Ra, return_address);
      Ok(Step::Jump(address as usize))
    }

    _ => Err(ExecutionError::UnknownOpcode(opcode.code())),

  }
}

// endregion

/**
  Decodes `word` and applies the matching execution rule to `state` exactly once. The program
  counter is left alone; the returned `Step` says where execution continues. On error the
  state is unchanged.
*/
pub fn execute_one(state: &mut MachineState, word: Word, console: &mut dyn Write)
  -> Result<Step, ExecutionError>
{
  let decoded = decode_instruction(word)?;
  trace!("pc={} {:#010x} {}-type {}", state.pc, word, decoded.format(), decoded);

  match decoded {

    DecodedInstruction::Register { function, rs, rt, rd } => {
      execute_register(state, function, rs, rt, rd, console)
    }

    DecodedInstruction::Immediate { opcode, rs, rt, immediate } => {
      execute_immediate(state, opcode, rs, rt, immediate)
    }

    DecodedInstruction::Jump { opcode, address } => execute_jump(state, opcode, address),

  }
}

fn advance(state: &mut MachineState, step: Step) {
  match step {
    Step::Next => state.pc += 1,
    Step::Jump(target) => {
      trace!("jump from {} to {}", state.pc, target);
      state.pc = target;
    }
  }
}

/**
  Runs `words` from the current program counter until it reaches the end of the stream, or
  until `limit` instructions have run when one is given. Returns the number of instructions
  executed.
*/
fn run_until_halt(
  state: &mut MachineState,
  words: &[Word],
  console: &mut dyn Write,
  limit: Option<u64>
) -> Result<u64, ExecutionError>
{
  let mut steps: u64 = 0;
  while !state.is_halted(words.len()) {
    if let Some(limit) = limit {
      if steps == limit {
        return Err(ExecutionError::StepLimit(limit));
      }
    }
    let step = execute_one(state, words[state.pc], console)?;
    advance(state, step);
    steps += 1;

    #[cfg(feature = "trace_computation")] println!("{}", state);
  }
  Ok(steps)
}

/**
  Runs `words` from the current program counter until it reaches the end of the stream. A
  jump to any index at or past the end also halts the program.
*/
pub fn execute_many(state: &mut MachineState, words: &[Word], console: &mut dyn Write)
  -> Result<(), ExecutionError>
{
  run_until_halt(state, words, console, None).map(|_| ())
}

/// As `execute_many`, but gives up with `ExecutionError::StepLimit` after `limit` instructions.
pub fn execute_bounded(
  state: &mut MachineState,
  words: &[Word],
  console: &mut dyn Write,
  limit: u64
) -> Result<u64, ExecutionError>
{
  run_until_halt(state, words, console, Some(limit))
}
