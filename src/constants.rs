/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// Highest valid address
pub const MAX_ADDRESS: u16 = (MEMORY_SIZE - 1) as u16;

/// Programs are loaded into memory (and execution begins) here
pub const PROGRAM_START: u16 = 0x200;

/// Largest program image that fits between `PROGRAM_START` and the end of memory
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Number of return addresses the call stack can hold
pub const STACK_DEPTH: usize = 16;

/// Number of general purpose registers (V0..VF)
pub const REGISTER_COUNT: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG_REGISTER: usize = 0xF;

/// Number of keys on the hexadecimal keypad
pub const KEY_COUNT: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Sprites are always 8 pixels wide
pub const SPRITE_WIDTH: usize = 8;

/// Default instruction rate of the host run-loop, in Hz
pub const CLOCK_SPEED: u32 = 500;

/// Default timer rate of the host run-loop, in Hz
pub const TIMER_SPEED: u32 = 60;

/// How many past states are kept around for rewinding
pub const MAX_SAVED_STATES: usize = 1024;

/// Address of the first glyph in the font set
pub const FONT_START: u16 = 0x000;

/// Each glyph in the font set is 5 rows tall
pub const GLYPH_HEIGHT: u16 = 5;

/// # Font set
/// Sprites for the hexadecimal digits 0..F, each 4 pixels wide and 5 rows tall.
///
/// `FX29` points I at `FONT_START + Vx * GLYPH_HEIGHT`.
#[rustfmt::skip]
pub const FONT_SET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
