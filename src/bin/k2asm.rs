//! Assembles a source file and writes the words to stdout, one per line.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

use k2::Assembler;

#[derive(Parser)]
#[command(version, about = "Assembles K2 source into hex instruction words")]
struct Args {
  /// Assembly source file
  source: PathBuf,
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
  let source = fs::read_to_string(&args.source)
    .map_err(|e| format!("Cannot read {}: {}", args.source.display(), e))?;
  let text = Assembler::new().assemble_to_text(&source)?;
  print!("{}", text);
  Ok(())
}

fn main() {
  let args = Args::parse();
  if let Err(e) = run(&args) {
    eprintln!("{}", e);
    exit(1);
  }
}
