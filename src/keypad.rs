use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::constants::KEY_COUNT;

/// # Keypad
/// Chip-8 input is generated with a hexadecimal keypad:
/// ```text
/// |1|2|3|C|
/// |4|5|6|D|
/// |7|8|9|E|
/// |A|0|B|F|
/// ```
///
/// The key latch is the only piece of machine state written from outside the interpreter, so
/// it's kept behind an `Arc` of atomics. Cloning a `Keypad` hands out another handle onto the
/// same latch; an input thread can hold one while the machine runs elsewhere. A press is
/// visible to the next `step` that starts after `press` returns.
#[derive(Clone, Debug, Default)]
pub struct Keypad {
    keys: Arc<[AtomicBool; KEY_COUNT]>,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was pressed
    pub fn press(&self, key: u8) {
        self.set(key, true);
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was released
    pub fn release(&self, key: u8) {
        self.set(key, false);
    }

    /// Keys outside of 0..F are never pressed
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys
            .get(key as usize)
            .map_or(false, |k| k.load(Ordering::Acquire))
    }

    /// The lowest numbered key currently held down
    pub fn first_pressed(&self) -> Option<u8> {
        (0..KEY_COUNT as u8).find(|&key| self.is_pressed(key))
    }

    pub fn clear(&self) {
        for key in self.keys.iter() {
            key.store(false, Ordering::Release);
        }
    }

    fn set(&self, key: u8, pressed: bool) {
        if let Some(k) = self.keys.get(key as usize) {
            k.store(pressed, Ordering::Release);
        } else {
            log::warn!("ignoring key {:#X} outside of the keypad", key);
        }
    }
}
