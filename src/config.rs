//! Command line configuration for the `mipsvm` binary.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::Level;

/// Assemble a MIPS source file and run it.
#[derive(Debug, Clone, Parser)]
#[command(name = "mipsvm", version, about)]
pub struct Config {
  /// Assembly source file, one instruction per line.
  #[arg(value_name = "FILE")]
  pub source: PathBuf,

  /// Print every instruction and its encoded word before running.
  #[arg(short, long)]
  pub listing: bool,

  /// Print the machine state after the run.
  #[arg(short, long)]
  pub dump: bool,

  /// Stop with an error after this many instructions.
  #[arg(long, value_name = "N")]
  pub max_steps: Option<u64>,

  /// Log more. Repeat for more detail (-v info, -vv debug, -vvv trace).
  #[arg(short, long, action = ArgAction::Count)]
  pub verbose: u8,
}

impl Config {
  pub fn log_level(&self) -> Level {
    match self.verbose {
      0 => Level::WARN,
      1 => Level::INFO,
      2 => Level::DEBUG,
      _ => Level::TRACE,
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_flags() {
    let config = Config::try_parse_from(["mipsvm", "prog.s", "--dump", "-vvv", "--max-steps", "50"]).unwrap();
    assert_eq!(config.source, PathBuf::from("prog.s"));
    assert!(config.dump);
    assert!(!config.listing);
    assert_eq!(config.max_steps, Some(50));
    assert_eq!(config.log_level(), Level::TRACE);
  }

  #[test]
  fn requires_a_source_file() {
    assert!(Config::try_parse_from(["mipsvm"]).is_err());
  }

  #[test]
  fn defaults_to_quiet() {
    let config = Config::try_parse_from(["mipsvm", "prog.s"]).unwrap();
    assert_eq!(config.log_level(), Level::WARN);
    assert_eq!(config.max_steps, None);
  }
}
