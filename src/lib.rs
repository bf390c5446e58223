//! A Chip-8 interpreter core.
//!
//! The interpreter owns its memory, registers, stack, timers and frame buffer and is driven
//! one `step` at a time by a host. Input is fed in through a shared `Keypad` handle and the
//! screen is read back out through `Chip8::take_frame`. Windowing, sound and ROM files live
//! outside of this crate.

pub use chip8::Chip8;
pub use constants::{CLOCK_SPEED, TIMER_SPEED};
pub use error::{Fault, LoadError};
pub use framebuffer::{Frame, Framebuffer};
pub use instruction::{disassemble, Instruction};
pub use keypad::Keypad;
pub use memory::Memory;
pub use opcode::Opcode;
pub use stack::CallStack;
pub use state::State;
pub use timers::Timers;

mod chip8;
pub mod constants;
mod error;
mod framebuffer;
mod instruction;
mod keypad;
mod memory;
mod opcode;
mod operations;
mod stack;
mod state;
mod timers;
