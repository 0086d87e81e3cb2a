use mipsvm::bytecode::{parse_assembly, AssemblyErrorKind};
use mipsvm::register::Register;
use mipsvm::{execute_bounded, execute_many, ExecutionError, MachineState};

fn run(text: &str) -> (MachineState, String) {
  let words = parse_assembly(text).unwrap().encode().unwrap();
  let mut state = MachineState::new();
  let mut console = Vec::<u8>::new();
  execute_many(&mut state, &words, &mut console).unwrap();
  (state, String::from_utf8(console).unwrap())
}

#[test]
fn sum_demo_prints_twelve() {
  let (state, output) = run(include_str!("../demos/sum.s"));
  assert_eq!(output, "12\n");
  assert_eq!(state.pc, 6);
  assert_eq!(state.registers.read(Register::T2), 12);
}

#[test]
fn jump_demo_prints_the_return_address() {
  let (state, output) = run(include_str!("../demos/jump.s"));
  assert_eq!(output, "1\n");
  assert_eq!(state.registers.read(Register::Ra), 1);
}

#[test]
fn syscall_convention_with_preset_registers() {
  let words = parse_assembly(
    "addi $t0,$zero,5\naddi $t1,$zero,7\nadd $t2,$t0,$t1\nsyscall"
  ).unwrap().encode().unwrap();

  // $v0 = 0 by construction; $a0 mirrors $t2 by convention.
  let mut state = MachineState::new();
  let mut console = Vec::<u8>::new();
  execute_bounded(&mut state, &words, &mut console, 3).unwrap_err();
  assert_eq!(state.pc, 3);
  let sum = state.registers.read(Register::T2);
  state.registers.write(Register::A0, sum);
  execute_many(&mut state, &words, &mut console).unwrap();

  assert_eq!(String::from_utf8(console).unwrap(), "12\n");
  assert_eq!(state.pc, 4);
}

#[test]
fn printing_many_values() {
  let (_, output) = run("
    addi $a0, $zero, -3
    syscall
    addi $a0, $a0, 1
    syscall
    addi $a0, $a0, 32767
    syscall
  ");
  assert_eq!(output, "-3\n-2\n32765\n");
}

#[test]
fn unsupported_syscall_faults() {
  let words = parse_assembly("addi $v0, $zero, 1\nsyscall").unwrap().encode().unwrap();
  let mut state = MachineState::new();
  let mut console = Vec::<u8>::new();
  match execute_many(&mut state, &words, &mut console) {
    Err(ExecutionError::UnsupportedSyscall(1)) => {}
    other => panic!("expected UnsupportedSyscall, got {:?}", other),
  }
  assert_eq!(state.pc, 1);
  assert!(console.is_empty());
}

#[test]
fn assembly_errors_stop_before_execution() {
  let e = parse_assembly("addi $t0, $zero, 1\naddi $t0, $zero, x1").unwrap_err();
  assert_eq!(e.line, 2);
  assert_eq!(e.kind, AssemblyErrorKind::UndefinedLabel("x1".to_string()));
}
