use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use minesweeper_field::Field;
use presenter::Presenter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use surface::TerminalSurface;
use tracing::info;

mod presenter;
mod surface;

/// Minesweeper in the terminal. Left click uncovers a cell, Esc or Ctrl+C quits.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Number of columns (at most 32)
  #[arg(short, long, default_value_t = 8)]
  width: u32,
  /// Number of rows (at most 32)
  #[arg(short = 'H', long, default_value_t = 8)]
  height: u32,
  /// Number of bombs (at most width * height)
  #[arg(short, long, default_value_t = 10)]
  bombs: u32,
  /// Seed for bomb placement, for replaying the same field
  #[arg(long)]
  seed: Option<u64>,
  /// Write logs to this file; nothing is logged otherwise
  #[arg(long)]
  log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> Result<()> {
  let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

fn make_field(args: &Args) -> Result<Field> {
  let field = match args.seed {
    Some(seed) => Field::with_rng(args.width, args.height, args.bombs, StdRng::seed_from_u64(seed)),
    None => Field::new(args.width, args.height, args.bombs),
  };
  field.context("Error while creating minesweeper")
}

fn main() -> Result<()> {
  let args = Args::parse();
  if let Some(path) = &args.log_file {
    init_logging(path)?;
  }

  let mut field = make_field(&args)?;
  let surface = TerminalSurface::new().context("Error while creating renderer")?;
  Presenter::new(&mut field, surface)?.run()?;

  info!(uncovered = field.uncovered_count(), "Game closed");
  Ok(())
}
