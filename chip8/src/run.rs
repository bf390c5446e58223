use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;

use display::Display;
use emu8::constants::PROGRAM_START;
use emu8::{Chip8, Fault, Frame, Keypad};

use crate::config::Config;
use crate::keymap::keymap;

/// Longest stretch of wall-clock time the machine will try to catch up on at once
const MAX_CATCH_UP: Duration = Duration::from_millis(100);
/// How often the window polls for input and redraws
const UI_PERIOD: Duration = Duration::from_millis(4);

/// Shared cancellation token; whichever thread stops first lowers it
#[derive(Clone, Debug)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        RunFlag(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Playback modifiers held down by the user
#[derive(Clone, Debug, Default)]
struct Modifiers {
    fast_forward: Arc<AtomicBool>,
    rewind: Arc<AtomicBool>,
}

impl Modifiers {
    fn fast_forward(&self) -> bool {
        self.fast_forward.load(Ordering::Acquire)
    }

    fn rewind(&self) -> bool {
        self.rewind.load(Ordering::Acquire)
    }

    fn set_fast_forward(&self, held: bool) {
        self.fast_forward.store(held, Ordering::Release);
    }

    fn set_rewind(&self, held: bool) {
        self.rewind.store(held, Ordering::Release);
    }
}

/// # Pacer
/// Converts elapsed wall-clock time into whole CPU steps and timer ticks.
///
/// Leftover time is carried over to the next call so that neither rate drifts.
#[derive(Debug)]
struct Pacer {
    clock_period: Duration,
    timer_period: Duration,
    cpu_debt: Duration,
    timer_debt: Duration,
}

impl Pacer {
    fn new(clock_period: Duration, timer_period: Duration) -> Self {
        Pacer {
            clock_period,
            timer_period,
            cpu_debt: Duration::ZERO,
            timer_debt: Duration::ZERO,
        }
    }

    /// Returns the (steps, ticks) owed after `elapsed` more time has passed
    fn advance(&mut self, elapsed: Duration) -> (u32, u32) {
        let elapsed = elapsed.min(MAX_CATCH_UP);
        self.cpu_debt += elapsed;
        self.timer_debt += elapsed;
        (
            drain(&mut self.cpu_debt, self.clock_period),
            drain(&mut self.timer_debt, self.timer_period),
        )
    }

    /// How long until the next step falls due
    fn until_next_step(&self) -> Duration {
        self.clock_period.saturating_sub(self.cpu_debt)
    }
}

fn drain(debt: &mut Duration, period: Duration) -> u32 {
    let mut count = 0;
    while *debt >= period {
        *debt -= period;
        count += 1;
    }
    count
}

/// Loads the program then runs the machine on its own thread until the user quits or the
/// machine stops.
///
/// This thread keeps the window: it renders the newest frame the machine publishes and
/// feeds key events into the shared keypad.
pub fn run(config: Config) -> anyhow::Result<()> {
    let mut chip8 = match config.seed {
        Some(seed) => Chip8::with_rng(StdRng::seed_from_u64(seed)),
        None => Chip8::new(),
    };
    let file = File::open(&config.rom)
        .with_context(|| format!("unable to open {}", config.rom.display()))?;
    chip8
        .load_rom(&mut BufReader::new(file))
        .with_context(|| format!("unable to load {}", config.rom.display()))?;
    log::info!("loaded {}", config.rom.display());

    let sdl = sdl2::init().map_err(|e| anyhow!("sdl2: {}", e))?;
    let mut display = Display::new(&sdl, config.scale)?;
    let mut events = sdl.event_pump().map_err(|e| anyhow!("sdl2: {}", e))?;

    let keypad = chip8.keypad();
    let run_flag = RunFlag::new();
    let modifiers = Modifiers::default();
    // Only the newest frame matters; the machine holds on to anything the window hasn't taken
    let (frames_tx, frames_rx) = mpsc::sync_channel::<Frame>(1);

    let machine = {
        let run_flag = run_flag.clone();
        let modifiers = modifiers.clone();
        thread::Builder::new()
            .name("machine".into())
            .spawn(move || execute(chip8, &config, &run_flag, &modifiers, frames_tx))?
    };

    let result = present(
        &mut display,
        &mut events,
        &keypad,
        &run_flag,
        &modifiers,
        &frames_rx,
    );
    run_flag.stop();
    drop(frames_rx);
    let stopped = machine
        .join()
        .map_err(|_| anyhow!("machine thread panicked"))?;
    result?;
    stopped.context("machine stopped")?;
    Ok(())
}

/// Prints a listing of the program image instead of running it
pub fn disassemble(rom: &Path) -> anyhow::Result<()> {
    let program =
        std::fs::read(rom).with_context(|| format!("unable to open {}", rom.display()))?;
    for line in emu8::disassemble(&program, PROGRAM_START) {
        println!("{}", line);
    }
    Ok(())
}

/// The window side of the loop: input in, frames out
fn present(
    display: &mut Display,
    events: &mut sdl2::EventPump,
    keypad: &Keypad,
    run_flag: &RunFlag,
    modifiers: &Modifiers,
    frames: &Receiver<Frame>,
) -> anyhow::Result<()> {
    while run_flag.is_running() {
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => {
                    log::info!("quitting");
                    run_flag.stop();
                }
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => keypad.press(kc),
                    (Keycode::Space, _) => modifiers.set_fast_forward(true),
                    (Keycode::Backspace, _) => modifiers.set_rewind(true),
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => keypad.release(kc),
                    (Keycode::Space, _) => modifiers.set_fast_forward(false),
                    (Keycode::Backspace, _) => modifiers.set_rewind(false),
                    _ => continue,
                },
                // Key-ups are never delivered to an unfocused window
                Event::Window {
                    win_event: WindowEvent::FocusLost,
                    ..
                } => keypad.clear(),
                _ => continue,
            };
        }

        if let Some(frame) = frames.try_iter().last() {
            display.render(&frame)?;
        }
        thread::sleep(UI_PERIOD);
    }
    Ok(())
}

/// The machine side of the loop: owns the `Chip8` and paces it against the wall clock.
///
/// Returns the fault that stopped the machine, if one did.
fn execute(
    mut chip8: Chip8,
    config: &Config,
    run_flag: &RunFlag,
    modifiers: &Modifiers,
    frames: SyncSender<Frame>,
) -> Result<(), Fault> {
    let mut pacer = Pacer::new(config.clock_period, config.timer_period);
    let mut pending: Option<Frame> = None;
    let mut last_cycle = Instant::now();

    while run_flag.is_running() {
        let current_time = Instant::now();
        let mut elapsed = current_time - last_cycle;
        last_cycle = current_time;

        // Whether or not the clock speed should be respected
        let fast_forward = modifiers.fast_forward();
        if fast_forward {
            elapsed = elapsed.max(config.clock_period);
        }
        let (steps, ticks) = pacer.advance(elapsed);

        if modifiers.rewind() {
            for _ in 0..steps {
                if !chip8.rewind() {
                    break;
                }
            }
        } else {
            for _ in 0..steps {
                match chip8.step() {
                    Ok(()) => {}
                    Err(Fault::UnknownOpcode { .. }) if !config.halt_on_fault => {}
                    Err(fault) => {
                        log::error!("machine stopped: {}", fault);
                        run_flag.stop();
                        return Err(fault);
                    }
                }
            }
            for _ in 0..ticks {
                chip8.tick();
            }
        }

        if let Some(frame) = chip8.take_frame() {
            pending = Some(frame);
        }
        if let Some(frame) = pending.take() {
            match frames.try_send(frame) {
                Ok(()) => {}
                Err(TrySendError::Full(frame)) => pending = Some(frame),
                Err(TrySendError::Disconnected(_)) => break,
            }
        }

        if !fast_forward {
            thread::sleep(pacer.until_next_step());
        }
    }
    log::debug!("machine thread exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacer() -> Pacer {
        Pacer::new(Duration::from_millis(2), Duration::from_secs(1) / 60)
    }

    #[test]
    fn test_pacer_counts_whole_periods() {
        let mut pacer = pacer();
        assert_eq!(pacer.advance(Duration::from_millis(10)), (5, 0));
        assert_eq!(pacer.until_next_step(), Duration::from_millis(2));
    }

    #[test]
    fn test_pacer_carries_remainders() {
        let mut pacer = pacer();
        assert_eq!(pacer.advance(Duration::from_millis(10)), (5, 0));
        assert_eq!(pacer.advance(Duration::from_millis(7)), (3, 1));
        assert_eq!(pacer.until_next_step(), Duration::from_millis(1));
    }

    #[test]
    fn test_pacer_caps_catch_up() {
        let mut pacer = pacer();
        assert_eq!(pacer.advance(Duration::from_secs(1)), (50, 6));
    }

    fn config(halt_on_fault: bool) -> Config {
        Config {
            rom: "test.ch8".into(),
            clock_period: Duration::from_millis(1),
            timer_period: Duration::from_millis(16),
            scale: 1,
            halt_on_fault,
            seed: None,
            disassemble: false,
        }
    }

    fn execute_program(program: &[u8], halt_on_fault: bool) -> (Result<(), Fault>, RunFlag) {
        let mut chip8 = Chip8::new();
        chip8.load_program(program).unwrap();
        let run_flag = RunFlag::new();
        let (frames_tx, _frames_rx) = mpsc::sync_channel(1);
        let result = execute(
            chip8,
            &config(halt_on_fault),
            &run_flag,
            &Modifiers::default(),
            frames_tx,
        );
        (result, run_flag)
    }

    #[test]
    fn test_execute_reports_fatal_fault() {
        // RET with nothing to return to
        let (result, run_flag) = execute_program(&[0x00, 0xEE], false);
        assert_eq!(result, Err(Fault::StackUnderflow { address: 0x200 }));
        assert!(!run_flag.is_running());
    }

    #[test]
    fn test_execute_halts_on_unknown_opcode_when_asked() {
        let (result, run_flag) = execute_program(&[0xFF, 0xFF], true);
        assert_eq!(
            result,
            Err(Fault::UnknownOpcode {
                opcode: 0xFFFF,
                address: 0x200
            })
        );
        assert!(!run_flag.is_running());
    }

    #[test]
    fn test_execute_skips_unknown_opcode_by_default() {
        // An unknown opcode then RET, so the machine still stops on its own
        let (result, _) = execute_program(&[0xFF, 0xFF, 0x00, 0xEE], false);
        assert_eq!(result, Err(Fault::StackUnderflow { address: 0x202 }));
    }

    #[test]
    fn test_run_flag_is_shared() {
        let run_flag = RunFlag::new();
        let other = run_flag.clone();
        assert!(run_flag.is_running());
        thread::spawn(move || other.stop()).join().unwrap();
        assert!(!run_flag.is_running());
    }

    #[test]
    fn test_modifiers_are_shared() {
        let modifiers = Modifiers::default();
        let other = modifiers.clone();
        other.set_rewind(true);
        assert!(modifiers.rewind());
        assert!(!modifiers.fast_forward());
    }
}
