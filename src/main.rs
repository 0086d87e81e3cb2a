use std::fs;
use std::io::{self, Write};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use mipsvm::bytecode::{parse_assembly, Program, Word};
use mipsvm::config::Config;
use mipsvm::{execute_bounded, execute_many, MachineState};

fn print_listing(program: &Program, words: &[Word]) {
  for (i, (instruction, word)) in program.instructions.iter().zip(words.iter()).enumerate() {
    let label =
      program.symbols
             .get_symbol(i)
             .map(|label| format!("{}:", label))
             .unwrap_or_default();
    println!("{:>4}  {:<12} {:#010x}  {}", i, label, word, instruction);
  }
}

fn run(config: &Config) -> Result<()> {
  let text =
    fs::read_to_string(&config.source)
      .with_context(|| format!("Could not open the file: {}", config.source.display()))?;

  let program = parse_assembly(&text)?;
  if program.is_empty() {
    warn!("{} contains no instructions", config.source.display());
  }
  let words = program.encode()?;
  info!("{} assembled to {} words", config.source.display(), program.len());

  if config.listing {
    print_listing(&program, &words);
  }

  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED");

  let mut state = MachineState::new();
  let result = {
    let stdout = io::stdout();
    let mut console = stdout.lock();
    let result =
      match config.max_steps {
        Some(limit) => execute_bounded(&mut state, &words, &mut console, limit).map(|_| ()),
        None        => execute_many(&mut state, &words, &mut console),
      };
    console.flush()?;
    result
  };

  if config.dump {
    println!("{}", state);
  }

  result.with_context(|| {
    let line = program.lines.get(state.pc).copied().unwrap_or_default();
    format!("Program faulted at instruction {} (line {})", state.pc, line)
  })
}

fn main() {
  let config = Config::parse();

  tracing_subscriber::fmt()
    .with_max_level(config.log_level())
    .with_writer(io::stderr)
    .init();

  if let Err(e) = run(&config) {
    eprintln!("Error: {:#}", e);
    process::exit(1);
  }
}
