use crate::constants::{FLAG_REGISTER, PROGRAM_START, REGISTER_COUNT};
use crate::framebuffer::Framebuffer;
use crate::memory::Memory;
use crate::stack::CallStack;
use crate::timers::Timers;

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the flag register; several instructions clobber it
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Stack
/// - 16 return addresses and the stack pointer
///
/// Timers
/// - 2 8-bit timers (delay & sound)
///
/// ## Memory
/// - 4096 bytes of addressable memory with the font set at 0x000
/// - 64x32 frame buffer and its dirty flag
///
/// The keypad is not part of the state: it belongs to whoever is feeding input,
/// and rewinding never un-presses keys.
#[derive(Clone)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub stack: CallStack,
    pub timers: Timers,
    pub memory: Memory,
    pub frame_buffer: Framebuffer,
}

impl State {
    pub fn new() -> Self {
        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            // 0x200 is where ROMs are loaded into memory
            pc: PROGRAM_START,
            stack: CallStack::new(),
            timers: Timers::new(),
            memory: Memory::new(),
            frame_buffer: Framebuffer::new(),
        }
    }

    pub fn vx(&self, x: u8) -> u8 {
        self.v[x as usize]
    }

    pub fn set_vx(&mut self, x: u8, value: u8) {
        self.v[x as usize] = value;
    }

    pub fn flag(&self) -> u8 {
        self.v[FLAG_REGISTER]
    }

    pub fn set_flag(&mut self, set: bool) {
        self.v[FLAG_REGISTER] = u8::from(set);
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
