//! Loads a ROM, runs one cycle per word, and dumps the registers to stdout.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

use k2::{parse_rom, Machine};

#[derive(Parser)]
#[command(version, about = "Runs a K2 ROM and prints the final registers")]
struct Args {
  /// ROM file of whitespace separated hex words
  #[arg(default_value = "a.out")]
  rom: PathBuf,
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
  let text = fs::read_to_string(&args.rom)
    .map_err(|e| format!("Cannot read {}: {}", args.rom.display(), e))?;
  let program = parse_rom(&text)?;

  let mut machine = Machine::new();
  machine.load(&program)?;
  machine.execute()?;

  print!("{}", machine.register_dump());
  Ok(())
}

fn main() {
  let args = Args::parse();
  if let Err(e) = run(&args) {
    eprintln!("{}", e);
    exit(1);
  }
}
