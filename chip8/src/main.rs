//! Runs a Chip-8 program in an SDL2 window.
//!
//! ```bash
//! chip8 roms/PONG --clock-hz 700 --log-level debug
//! ```
//!
//! `--disassemble` prints a listing of the program instead of running it.
//!
//! Hold Space to fast-forward, Backspace to rewind and press Escape to quit.
use clap::Parser;
use simple_logger::SimpleLogger;

use crate::config::{Args, Config};

mod config;
mod keymap;
mod run;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    SimpleLogger::new().with_level(args.log_level).init()?;

    let config = Config::from(args);
    if config.disassemble {
        return run::disassemble(&config.rom);
    }
    run::run(config)
}
