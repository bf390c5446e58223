use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use emu8::{CLOCK_SPEED, TIMER_SPEED};

#[derive(Parser, Debug)]
#[command(name = "chip8", version, about = "Runs a Chip-8 program", long_about = None)]
pub struct Args {
    /// Path to the program image
    pub rom: PathBuf,

    /// Instructions executed per second
    #[arg(long, default_value_t = CLOCK_SPEED, value_parser = clap::value_parser!(u32).range(1..))]
    pub clock_hz: u32,

    /// Delay and sound timer decrements per second
    #[arg(long, default_value_t = TIMER_SPEED, value_parser = clap::value_parser!(u32).range(1..))]
    pub timer_hz: u32,

    /// Window pixels per Chip-8 pixel
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=64))]
    pub scale: u32,

    /// One of off, error, warn, info, debug or trace
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,

    /// Stop on the first unknown opcode instead of skipping it
    #[arg(long)]
    pub halt_on_fault: bool,

    /// Seed for the random number generator, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print a listing of the program and exit without running it
    #[arg(long)]
    pub disassemble: bool,
}

/// Everything the run-loop needs to know, with rates already turned into periods
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub rom: PathBuf,
    pub clock_period: Duration,
    pub timer_period: Duration,
    pub scale: u32,
    pub halt_on_fault: bool,
    pub seed: Option<u64>,
    pub disassemble: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            rom: args.rom,
            clock_period: Duration::from_secs(1) / args.clock_hz,
            timer_period: Duration::from_secs(1) / args.timer_hz,
            scale: args.scale,
            halt_on_fault: args.halt_on_fault,
            seed: args.seed,
            disassemble: args.disassemble,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["chip8", "pong.ch8"]).unwrap();
        assert_eq!(args.log_level, LevelFilter::Info);
        let config = Config::from(args);
        assert_eq!(config.rom, PathBuf::from("pong.ch8"));
        assert_eq!(config.clock_period, Duration::from_millis(2));
        assert_eq!(config.timer_period, Duration::from_nanos(16_666_666));
        assert_eq!(config.scale, 10);
        assert!(!config.halt_on_fault);
        assert_eq!(config.seed, None);
        assert!(!config.disassemble);
    }

    #[test]
    fn test_disassemble_flag() {
        let args = Args::try_parse_from(["chip8", "pong.ch8", "--disassemble"]).unwrap();
        assert!(Config::from(args).disassemble);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "chip8",
            "pong.ch8",
            "--clock-hz",
            "1000",
            "--scale",
            "4",
            "--log-level",
            "trace",
            "--halt-on-fault",
            "--seed",
            "42",
        ])
        .unwrap();
        assert_eq!(args.log_level, LevelFilter::Trace);
        let config = Config::from(args);
        assert_eq!(config.clock_period, Duration::from_millis(1));
        assert_eq!(config.scale, 4);
        assert!(config.halt_on_fault);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_rejects_zero_rates() {
        assert!(Args::try_parse_from(["chip8", "pong.ch8", "--clock-hz", "0"]).is_err());
        assert!(Args::try_parse_from(["chip8", "pong.ch8", "--timer-hz", "0"]).is_err());
    }

    #[test]
    fn test_requires_rom() {
        assert!(Args::try_parse_from(["chip8"]).is_err());
    }
}
