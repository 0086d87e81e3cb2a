/*!

  Machine words are 32 bits. Every instruction is exactly one word, in one of three formats
  selected by the 6 bit primary opcode in the most significant bits:

    Register:  [Opcode:6=0][rs:5][rt:5][rd:5][shamt:5=0][funct:6]
    Immediate: [Opcode:6][rs:5][rt:5][immediate:16]
    Jump:      [Opcode:6][address:26]

  All register-type instructions share primary opcode zero and are told apart by the 6 bit
  function field. Jump addresses are indices into the instruction stream, not byte addresses,
  since the program counter counts instructions.

  The textual form of an instruction (`Instruction`) is an operation and its operands; it
  exists only until it is encoded. The interpreter only ever sees encoded words, which it
  decodes into a `DecodedInstruction` one at a time.

*/

mod binary;
mod instruction;
pub mod assembly;

pub use binary::{
  decode_instruction, encode_immediate, encode_instruction, encode_jump, encode_register,
  DecodedInstruction, Word
};
pub use instruction::{Format, Function, Instruction, Opcode, Operand, OperandKind, Operation};
pub use assembly::{parse_assembly, AssemblyError, AssemblyErrorKind, Program};
