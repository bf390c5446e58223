use std::collections::VecDeque;
use std::io::Read;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::constants::{MAX_PROGRAM_SIZE, MAX_SAVED_STATES};
use crate::error::{Fault, LoadError};
use crate::framebuffer::Frame;
use crate::instruction::Instruction;
use crate::keypad::Keypad;
use crate::operations::{self, Peripherals};
use crate::state::State;

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - a shared handle on the `keypad`
///  - whether a fatal fault has `halted` it
///
/// Supplies interfaces for:
/// - loading programs
/// - stepping the CPU and ticking its timers, at whatever cadence the host likes
/// - rewinding the CPU
/// - inspecting its frame buffer for rendering by some display
///
/// Nothing here blocks, loops or spawns; the host owns the run-loop.
pub struct Chip8 {
    state: State,
    previous_states: VecDeque<State>,
    keypad: Keypad,
    rng: Box<dyn RngCore + Send>,
    halted: Option<Fault>,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A machine whose `CXNN` draws its random bytes from `rng`
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Chip8 {
            state: State::new(),
            previous_states: VecDeque::with_capacity(MAX_SAVED_STATES),
            keypad: Keypad::new(),
            rng: Box::new(rng),
            halted: None,
        }
    }

    /// Puts the machine back to its power-on state: registers, timers, stack and screen
    /// cleared, memory holding only the font set and the pc at 0x200.
    ///
    /// The keypad is left alone since it mirrors whatever the host is holding down.
    pub fn reset(&mut self) {
        log::info!("resetting machine");
        self.state = State::new();
        self.previous_states.clear();
        self.halted = None;
    }

    /// Resets the machine and copies `program` into memory at 0x200.
    ///
    /// A program too large to fit is rejected before the machine is touched.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::TooLarge {
                size: program.len(),
            });
        }
        self.reset();
        self.state.memory.load_program(program)?;
        log::info!("loaded {} byte program", program.len());
        Ok(())
    }

    /// Load a rom from some source
    ///
    /// # Arguments
    /// * `reader` a reader that yields a raw program image
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), LoadError> {
        let mut program = Vec::with_capacity(MAX_PROGRAM_SIZE);
        // Read one byte past the limit so that oversized images are caught
        reader
            .take(MAX_PROGRAM_SIZE as u64 + 1)
            .read_to_end(&mut program)?;
        self.load_program(&program)
    }

    /// Advances the CPU by a single instruction
    /// - fetches the opcode at the pc
    /// - decodes and executes it
    ///
    /// Unknown opcodes are skipped and reported. Any other fault halts the machine until it is
    /// reset, leaving the state as it was before the faulting instruction.
    pub fn step(&mut self) -> Result<(), Fault> {
        if self.halted.is_some() {
            return Err(Fault::Halted);
        }
        match self.execute() {
            Err(fault @ Fault::UnknownOpcode { .. }) => {
                log::warn!("{}; skipping", fault);
                Err(fault)
            }
            Err(fault) => {
                log::error!("{}; halting", fault);
                self.halted = Some(fault);
                Err(fault)
            }
            ok => ok,
        }
    }

    fn execute(&mut self) -> Result<(), Fault> {
        let pc = self.state.pc;
        let op = self.state.memory.fetch(pc)?;
        let instruction = match Instruction::decode(op) {
            Some(instruction) => instruction,
            None => {
                self.save_state();
                self.state.pc = pc.wrapping_add(2);
                return Err(Fault::UnknownOpcode {
                    opcode: op.0,
                    address: pc,
                });
            }
        };
        log::trace!(
            "{:#05X} {} {} v{:02X?} i{:04X}",
            pc,
            op,
            instruction,
            self.state.v,
            self.state.i
        );

        let snapshot = self.state.clone();
        let mut io = Peripherals {
            keypad: &self.keypad,
            rng: self.rng.as_mut(),
        };
        operations::execute(instruction, &mut self.state, &mut io)?;
        // A key wait that is still waiting changed nothing worth rewinding to
        let stalled = matches!(instruction, Instruction::WaitKey { .. }) && self.state.pc == pc;
        if !stalled {
            self.push_history(snapshot);
        }
        Ok(())
    }

    /// Decrements both timers once
    pub fn tick(&mut self) {
        self.state.timers.tick();
    }

    /// One step followed by one timer tick. A halted machine's timers stay frozen.
    pub fn cycle(&mut self) -> Result<(), Fault> {
        let result = self.step();
        if self.halted.is_none() {
            self.tick();
        }
        result
    }

    /// Reverses the CPU by a single step if possible
    /// - if there are previous_states, pops the last one and restores it
    pub fn rewind(&mut self) -> bool {
        match self.previous_states.pop_front() {
            Some(state) => {
                log::debug!("rewound to {:#05X}", state.pc);
                self.state = state;
                self.state.frame_buffer.mark_dirty();
                self.halted = None;
                true
            }
            None => false,
        }
    }

    /// Puts the current state in previous_states
    fn save_state(&mut self) {
        let state = self.state.clone();
        self.push_history(state);
    }

    /// - if there are already MAX_SAVED_STATES saved then the oldest is dropped
    fn push_history(&mut self, state: State) {
        if self.previous_states.len() == MAX_SAVED_STATES {
            self.previous_states.pop_back();
        }
        self.previous_states.push_front(state);
    }

    /// Another handle on the keypad, for whoever is feeding input
    pub fn keypad(&self) -> Keypad {
        self.keypad.clone()
    }

    pub fn frame(&self) -> &Frame {
        self.state.frame_buffer.pixels()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.frame_buffer.is_dirty()
    }

    pub fn clear_dirty(&mut self) {
        self.state.frame_buffer.clear_dirty();
    }

    /// Returns a copy of the frame and lowers the dirty flag if the display should be redrawn
    pub fn take_frame(&mut self) -> Option<Frame> {
        if self.is_dirty() {
            self.clear_dirty();
            Some(*self.frame())
        } else {
            None
        }
    }

    /// Whether a tone should currently be playing
    pub fn sound_active(&self) -> bool {
        self.state.timers.sound_active()
    }

    /// The fault that halted the machine, if any
    pub fn halted(&self) -> Option<Fault> {
        self.halted
    }

    pub fn state(&self) -> &State {
        &self.state
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
